use presentation::UnitRef;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{CoordinatorId, PresentType},
    error::{CoordinatorError, CoordinatorResult},
    protocol::Message,
};
use tracing::{error, info, warn};

use crate::{
    reconcile::{reconcile, FlowCycle, FlowPhase},
    stack::NavigationStack,
    tree::{Coordinator, CoordinatorTree, Disposition},
};

/// Computes the current flow state, `None` when there is no valid state.
pub trait FlowComputable<S> {
    fn compute_state(&self, tree: &CoordinatorTree, coordinator: CoordinatorId) -> Option<S>;
}

impl<S, F> FlowComputable<S> for F
where
    F: Fn(&CoordinatorTree, CoordinatorId) -> Option<S>,
{
    fn compute_state(&self, tree: &CoordinatorTree, coordinator: CoordinatorId) -> Option<S> {
        self(tree, coordinator)
    }
}

/// Maps a flow state to the stack of units that represents it.
pub trait FlowPresentable<S> {
    fn units_for_state(&self, state: &S) -> Vec<UnitRef>;
}

impl<S, F> FlowPresentable<S> for F
where
    F: Fn(&S) -> Vec<UnitRef>,
{
    fn units_for_state(&self, state: &S) -> Vec<UnitRef> {
        self(state)
    }
}

/// What to do when a flow has no state to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStatePolicy {
    /// Fail the trigger with `MissingFlowState`.
    #[default]
    Abort,
    /// Treat it like an exhausted builder chain and send `Done`.
    Complete,
}

/// Flow coordinator driven by an explicit state value rather than builders.
pub struct NavigationFlowCoordinator<S> {
    stack: NavigationStack,
    flow: Box<dyn FlowPresentable<S>>,
    state: Box<dyn FlowComputable<S>>,
    missing_state: MissingStatePolicy,
    cycle: FlowCycle,
}

impl<S: 'static> NavigationFlowCoordinator<S> {
    pub fn new(
        container: UnitRef,
        flow: impl FlowPresentable<S> + 'static,
        state: impl FlowComputable<S> + 'static,
    ) -> Self {
        Self {
            stack: NavigationStack::new(container),
            flow: Box::new(flow),
            state: Box::new(state),
            missing_state: MissingStatePolicy::default(),
            cycle: FlowCycle::default(),
        }
    }

    pub fn with_missing_state(mut self, policy: MissingStatePolicy) -> Self {
        self.missing_state = policy;
        self
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn phase(&self) -> FlowPhase {
        self.cycle.phase()
    }

    pub fn trigger_flow(
        &self,
        tree: &mut CoordinatorTree,
        me: CoordinatorId,
        animated: bool,
        direction: PresentType,
    ) -> CoordinatorResult<()> {
        let Some(cycle) = self.cycle.begin() else {
            warn!(coordinator = me.0, "flow already running, dropping trigger");
            return Ok(());
        };

        // Same rule as builder flows: a new state starts from a clean subtree.
        tree.release_children(me)?;

        let Some(state) = self.state.compute_state(tree, me) else {
            drop(cycle);
            return match self.missing_state {
                MissingStatePolicy::Abort => {
                    error!(coordinator = me.0, "no flow state available, required to proceed");
                    Err(CoordinatorError::MissingFlowState { coordinator: me })
                }
                MissingStatePolicy::Complete => {
                    info!(coordinator = me.0, "no flow state, flow done");
                    tree.send(me, Message::Done(me.into()))
                }
            };
        };

        cycle.applying();
        let units = self.flow.units_for_state(&state);
        tree.adopt_units(me, &units)?;
        let outcome = reconcile(&self.stack, units, animated, direction);
        info!(coordinator = me.0, ?outcome, "flow applied");
        Ok(())
    }
}

impl<S: 'static> Coordinator for NavigationFlowCoordinator<S> {
    fn root_unit(&self) -> Option<UnitRef> {
        Some(self.stack.container().clone())
    }

    fn handle(
        &self,
        tree: &mut CoordinatorTree,
        me: CoordinatorId,
        message: &Message,
    ) -> CoordinatorResult<Disposition> {
        let Message::TriggerFlow(trigger) = message else {
            return Ok(Disposition::Declined);
        };

        // With a modal up, rebuild underneath it instantly and let the
        // dismissal carry the animation.
        if self.stack.presented().is_some() {
            self.trigger_flow(tree, me, false, trigger.present_type)?;
            self.stack.dismiss_modal(trigger.animated, None);
        } else {
            self.trigger_flow(tree, me, trigger.animated, trigger.present_type)?;
        }
        Ok(Disposition::Handled)
    }
}
