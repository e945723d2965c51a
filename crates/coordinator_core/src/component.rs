use std::{any::Any, rc::Rc};

use shared::{domain::CoordinatorId, error::CoordinatorResult, protocol::Message};

use crate::tree::CoordinatorTree;

/// Pluggable message handler attached to a coordinator. Components are asked
/// in registration order; the first one that can handle a message gets it
/// exclusively.
pub trait Component: Any {
    /// Must not have side effects: it is asked before anything is decided.
    fn can_handle(&self, message: &Message, tree: &CoordinatorTree, coordinator: CoordinatorId)
        -> bool;

    fn handle(
        &self,
        message: &Message,
        tree: &mut CoordinatorTree,
        coordinator: CoordinatorId,
    ) -> CoordinatorResult<()>;
}

pub(crate) struct ComponentEntry {
    pub(crate) handler: Rc<dyn Component>,
    pub(crate) any: Rc<dyn Any>,
}
