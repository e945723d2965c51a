//! Coordinators that own a navigation container and decide what it shows.

mod buildable;
mod navigation;

pub use buildable::BuildableFlowCoordinator;
pub use navigation::{FlowComputable, FlowPresentable, MissingStatePolicy, NavigationFlowCoordinator};

use shared::{domain::{CoordinatorId, PresentType}, error::CoordinatorResult, protocol::Message};

use crate::tree::CoordinatorTree;

/// Triggers the flow of every child, each animated only if its unit is on
/// screen. Without children the coordinator triggers itself instead.
pub fn trigger_flow_in_children(
    tree: &mut CoordinatorTree,
    coordinator: CoordinatorId,
) -> CoordinatorResult<()> {
    let children = tree.children(coordinator).to_vec();
    if children.is_empty() {
        let animated = tree.should_animate(coordinator);
        return tree.send(coordinator, Message::trigger_flow(animated, PresentType::Present));
    }

    for child in children {
        if !tree.contains(child) {
            continue;
        }
        let animated = tree.should_animate(child);
        tree.send(child, Message::trigger_flow(animated, PresentType::Present))?;
    }
    Ok(())
}
