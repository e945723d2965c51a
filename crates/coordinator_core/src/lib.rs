//! Coordinator tree, message routing and flow reconciliation.
//!
//! A [`CoordinatorTree`] owns every coordinator. Messages sent to a node go
//! through its components, then its own handler, then up to its parent. Flow
//! coordinators answer `TriggerFlow` by asking a builder chain (or a state
//! function) what to show and reconciling that into their navigation stack.

pub mod builder;
pub mod component;
pub mod config;
pub mod flow;
pub mod mailbox;
mod modal;
pub mod reconcile;
pub mod stack;
pub mod tree;

pub use builder::{Builder, BuilderResult, ComposableBuilder, Description};
pub use component::Component;
pub use flow::{
    trigger_flow_in_children, BuildableFlowCoordinator, FlowComputable, FlowPresentable,
    MissingStatePolicy, NavigationFlowCoordinator,
};
pub use mailbox::{mailbox, Mailbox, MailboxError, MailboxSender};
pub use reconcile::{reconcile, FlowPhase, Reconciliation};
pub use stack::NavigationStack;
pub use tree::{Coordinator, CoordinatorTree, Disposition, PassthroughCoordinator};

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;

#[cfg(test)]
#[path = "tests/tree_tests.rs"]
mod tree_tests;

#[cfg(test)]
#[path = "tests/routing_tests.rs"]
mod routing_tests;

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod reconcile_tests;

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod flow_tests;

#[cfg(test)]
#[path = "tests/modal_tests.rs"]
mod modal_tests;

#[cfg(test)]
#[path = "tests/mailbox_tests.rs"]
mod mailbox_tests;
