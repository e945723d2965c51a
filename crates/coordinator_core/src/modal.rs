//! Modal presentation of child coordinators on top of their parent's unit.

use presentation::{Completion, TransitionConfig, UnitRef};
use shared::{
    domain::CoordinatorId,
    error::{CoordinatorError, CoordinatorResult},
};
use tracing::debug;

use crate::tree::CoordinatorTree;

fn top_most(unit: UnitRef) -> UnitRef {
    let mut current = unit;
    while let Some(next) = current.presented_unit() {
        current = next;
    }
    current
}

impl CoordinatorTree {
    fn require_root_unit(&self, coordinator: CoordinatorId) -> CoordinatorResult<UnitRef> {
        if !self.contains(coordinator) {
            return Err(CoordinatorError::UnknownCoordinator(coordinator));
        }
        self.root_unit(coordinator)
            .ok_or(CoordinatorError::NoRootUnit { coordinator })
    }

    /// Adds `child` under `parent` and shows the child's unit modally on the
    /// parent's own unit.
    pub fn present_child(
        &mut self,
        parent: CoordinatorId,
        child: CoordinatorId,
        animated: bool,
        transition: &TransitionConfig,
        on_complete: Option<Completion>,
    ) -> CoordinatorResult<()> {
        let host = self.require_root_unit(parent)?;
        let unit = self.require_root_unit(child)?;
        self.add(parent, child)?;

        debug!(parent = parent.0, child = child.0, animated, "presenting child coordinator");
        host.show_modal(unit, animated, transition, on_complete);
        Ok(())
    }

    /// Like [`present_child`](Self::present_child) but presents on the
    /// top-most unit already shown above the parent.
    pub fn present_child_in_hierarchy(
        &mut self,
        parent: CoordinatorId,
        child: CoordinatorId,
        animated: bool,
        transition: &TransitionConfig,
        on_complete: Option<Completion>,
    ) -> CoordinatorResult<()> {
        let host = top_most(self.require_root_unit(parent)?);
        let unit = self.require_root_unit(child)?;
        self.add(parent, child)?;

        debug!(
            parent = parent.0,
            child = child.0,
            host = host.id().0,
            "presenting child coordinator in hierarchy"
        );
        host.show_modal(unit, animated, transition, on_complete);
        Ok(())
    }

    /// Presents a bare unit on the top-most unit above `parent`.
    pub fn present_unit_in_hierarchy(
        &self,
        parent: CoordinatorId,
        unit: UnitRef,
        animated: bool,
        transition: &TransitionConfig,
        on_complete: Option<Completion>,
    ) -> CoordinatorResult<()> {
        let host = top_most(self.require_root_unit(parent)?);
        host.show_modal(unit, animated, transition, on_complete);
        Ok(())
    }

    /// Dismisses a modally presented child and releases it. Returns `false`
    /// without touching anything when the child's unit is not what is
    /// currently presented above `parent`. A child attached somewhere other
    /// than `parent` only loses its modal and stays in the tree.
    pub fn dismiss_child(
        &mut self,
        parent: CoordinatorId,
        child: CoordinatorId,
        animated: bool,
        on_complete: Option<Completion>,
    ) -> CoordinatorResult<bool> {
        let target = self.require_root_unit(child)?.id();

        let mut presenter = self.require_root_unit(parent)?;
        loop {
            match presenter.presented_unit() {
                Some(presented) if presented.id() == target => break,
                Some(presented) => presenter = presented,
                None => {
                    debug!(
                        parent = parent.0,
                        child = child.0,
                        "child is not presented, ignoring stale dismiss"
                    );
                    return Ok(false);
                }
            }
        }

        self.release(parent, child)?;
        debug!(parent = parent.0, child = child.0, animated, "dismissing child coordinator");
        presenter.dismiss_modal(animated, on_complete);
        Ok(true)
    }
}
