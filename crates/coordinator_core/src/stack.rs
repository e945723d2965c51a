use presentation::{unit_ids, Completion, TransitionConfig, UnitRef};
use shared::domain::UnitId;
use tracing::debug;

/// Navigation container for one coordinator subtree: the ordered stack of
/// units plus at most one modal layered on top.
pub struct NavigationStack {
    container: UnitRef,
}

impl NavigationStack {
    pub fn new(container: UnitRef) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &UnitRef {
        &self.container
    }

    pub fn units(&self) -> Vec<UnitRef> {
        self.container.stack()
    }

    pub fn unit_ids(&self) -> Vec<UnitId> {
        unit_ids(&self.container.stack())
    }

    pub fn set_stack(&self, units: Vec<UnitRef>, animated: bool) {
        debug!(
            container = self.container.id().0,
            units = ?unit_ids(&units),
            animated,
            "setting stack"
        );
        self.container.set_stack(units, animated);
    }

    pub fn presented(&self) -> Option<UnitRef> {
        self.container.presented_unit()
    }

    pub fn present_modal(
        &self,
        unit: UnitRef,
        animated: bool,
        transition: &TransitionConfig,
        on_complete: Option<Completion>,
    ) {
        debug!(
            container = self.container.id().0,
            unit = unit.id().0,
            animated,
            "presenting modal"
        );
        self.container
            .show_modal(unit, animated, transition, on_complete);
    }

    /// Returns `false` when nothing was presented.
    pub fn dismiss_modal(&self, animated: bool, on_complete: Option<Completion>) -> bool {
        let Some(presented) = self.presented() else {
            return false;
        };
        debug!(
            container = self.container.id().0,
            unit = presented.id().0,
            animated,
            "dismissing modal"
        );
        self.container.dismiss_modal(animated, on_complete);
        true
    }
}
