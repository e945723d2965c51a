use presentation::UnitRef;
use shared::{
    domain::{CoordinatorId, PresentType},
    error::CoordinatorResult,
    protocol::{Message, ReloadMessage},
};
use tracing::{debug, info, warn};

use crate::{
    builder::Builder,
    reconcile::{reconcile, FlowCycle, FlowPhase},
    stack::NavigationStack,
    tree::{Coordinator, CoordinatorTree, Disposition},
};

/// Flow coordinator whose next screen comes from a builder chain.
pub struct BuildableFlowCoordinator {
    stack: NavigationStack,
    builder: Box<dyn Builder>,
    cycle: FlowCycle,
}

impl BuildableFlowCoordinator {
    pub fn new(container: UnitRef, builder: impl Builder + 'static) -> Self {
        Self {
            stack: NavigationStack::new(container),
            builder: Box::new(builder),
            cycle: FlowCycle::default(),
        }
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn phase(&self) -> FlowPhase {
        self.cycle.phase()
    }

    pub fn has_build_describable(&self, tree: &CoordinatorTree, me: CoordinatorId) -> bool {
        self.builder.describable(tree, me).is_some()
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

        // A new flow always starts from a clean subtree.
        tree.release_children(me)?;
        self.stack.dismiss_modal(animated, None);

        let Some(description) = self.builder.describable(tree, me) else {
            drop(cycle);
            info!(coordinator = me.0, "nothing more to display, flow done");
            return tree.send(me, Message::Done(me.into()));
        };

        let Some(result) = self.builder.build(&description, tree, me) else {
            drop(cycle);
            warn!(
                coordinator = me.0,
                description = description.label(),
                "builder advertised a description it could not build, flow done"
            );
            return tree.send(me, Message::Done(me.into()));
        };

        cycle.applying();
        if let Some(child) = result.coordinator() {
            tree.add(me, child)?;
        }

        let units = vec![result.unit().clone()];
        tree.adopt_units(me, &units)?;
        let outcome = reconcile(&self.stack, units, animated, direction);
        info!(
            coordinator = me.0,
            description = description.label(),
            unit = result.unit().id().0,
            ?outcome,
            "flow applied"
        );
        Ok(())
    }

    /// Children first: the coordinator's own trigger releases them.
    ///
    /// The self trigger travels in `reload.present_type`, `Present` when
    /// unset. Callers can ask for a backward rebuild this way, which a plain
    /// reload never does.
    pub fn reload(
        &self,
        tree: &mut CoordinatorTree,
        me: CoordinatorId,
        reload: &ReloadMessage,
    ) -> CoordinatorResult<()> {
        debug!(coordinator = me.0, options = ?reload.options, "reloading");

        if reload.options.includes_children() {
            for child in tree.children(me).to_vec() {
                if !tree.contains(child) {
                    continue;
                }
                let animated = tree.should_animate(child);
                tree.send(child, Message::trigger_flow(animated, PresentType::Present))?;
            }
        }

        if reload.options.includes_self() {
            let animated = self.stack.container().is_currently_visible();
            let direction = reload.present_type.unwrap_or_default();
            tree.send(me, Message::trigger_flow(animated, direction))?;
        }
        Ok(())
    }
}

impl Coordinator for BuildableFlowCoordinator {
    fn root_unit(&self) -> Option<UnitRef> {
        Some(self.stack.container().clone())
    }

    fn handle(
        &self,
        tree: &mut CoordinatorTree,
        me: CoordinatorId,
        message: &Message,
    ) -> CoordinatorResult<Disposition> {
        match message {
            Message::TriggerFlow(trigger) => {
                self.trigger_flow(tree, me, trigger.animated, trigger.present_type)?;
                Ok(Disposition::Handled)
            }
            Message::Reload(reload) => {
                self.reload(tree, me, reload)?;
                Ok(Disposition::Handled)
            }
            _ => Ok(Disposition::Declined),
        }
    }
}
