//! Merges a newly computed sequence of units into a displayed stack.

use std::{cell::Cell, collections::HashSet};

use presentation::UnitRef;
use shared::domain::PresentType;

use crate::stack::NavigationStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Stack set to exactly the new units.
    Replaced,
    /// New units placed under the current stack, then popped back to.
    Inserted,
    /// Backward merge would have shown a unit twice; replaced instead.
    DuplicateFallback,
}

pub fn reconcile(
    stack: &NavigationStack,
    units: Vec<UnitRef>,
    animated: bool,
    direction: PresentType,
) -> Reconciliation {
    if direction == PresentType::Present {
        stack.set_stack(units, animated);
        return Reconciliation::Replaced;
    }

    let mut combined = units.clone();
    combined.extend(stack.units());

    let unique: HashSet<_> = combined.iter().map(|unit| unit.id()).collect();
    if unique.len() != combined.len() {
        stack.set_stack(units, animated);
        return Reconciliation::DuplicateFallback;
    }

    stack.set_stack(combined, false);
    stack.set_stack(units, animated);
    Reconciliation::Inserted
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowPhase {
    #[default]
    Idle,
    Computing,
    Applying,
}

/// Phase of a flow coordinator. A cycle is entered from `Idle` and returns
/// there when its guard drops, on every exit path.
#[derive(Debug, Default)]
pub struct FlowCycle {
    phase: Cell<FlowPhase>,
}

impl FlowCycle {
    pub fn phase(&self) -> FlowPhase {
        self.phase.get()
    }

    /// `None` while another cycle is still running.
    pub fn begin(&self) -> Option<CycleGuard<'_>> {
        if self.phase.get() != FlowPhase::Idle {
            return None;
        }
        self.phase.set(FlowPhase::Computing);
        Some(CycleGuard { cycle: self })
    }
}

pub struct CycleGuard<'a> {
    cycle: &'a FlowCycle,
}

impl CycleGuard<'_> {
    pub fn applying(&self) {
        self.cycle.phase.set(FlowPhase::Applying);
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.cycle.phase.set(FlowPhase::Idle);
    }
}
