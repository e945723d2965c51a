//! In-memory units for tests and the demo binary. Every operation is applied
//! immediately and recorded so callers can assert on the exact sequence.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use shared::domain::UnitId;
use tracing::warn;

use crate::{unit_ids, Completion, DisplayHost, PresentableUnit, TransitionConfig, UnitRef};

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

fn next_unit_id() -> UnitId {
    UnitId(NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOp {
    SetStack {
        units: Vec<UnitId>,
        animated: bool,
    },
    ShowModal {
        unit: UnitId,
        animated: bool,
        transition: TransitionConfig,
    },
    DismissModal {
        unit: Option<UnitId>,
        animated: bool,
    },
}

pub struct HeadlessUnit {
    id: UnitId,
    name: String,
    visible: Cell<bool>,
    stack: RefCell<Vec<UnitRef>>,
    presented: RefCell<Option<UnitRef>>,
    ops: RefCell<Vec<UnitOp>>,
}

impl HeadlessUnit {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            id: next_unit_id(),
            name: name.into(),
            visible: Cell::new(false),
            stack: RefCell::new(Vec::new()),
            presented: RefCell::new(None),
            ops: RefCell::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    pub fn ops(&self) -> Vec<UnitOp> {
        self.ops.borrow().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.borrow_mut().clear();
    }

    pub fn stack_ids(&self) -> Vec<UnitId> {
        unit_ids(&self.stack.borrow())
    }

    fn record(&self, op: UnitOp) {
        self.ops.borrow_mut().push(op);
    }
}

impl fmt::Debug for HeadlessUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessUnit")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("stack", &self.stack_ids())
            .finish()
    }
}

impl PresentableUnit for HeadlessUnit {
    fn id(&self) -> UnitId {
        self.id
    }

    fn is_currently_visible(&self) -> bool {
        self.visible.get()
    }

    fn presented_unit(&self) -> Option<UnitRef> {
        self.presented.borrow().clone()
    }

    fn show_modal(
        &self,
        unit: UnitRef,
        animated: bool,
        transition: &TransitionConfig,
        on_complete: Option<Completion>,
    ) {
        if let Some(current) = self.presented.borrow().as_ref() {
            warn!(
                unit = self.id.0,
                presented = current.id().0,
                "already presenting a unit, ignoring show_modal"
            );
            return;
        }

        self.record(UnitOp::ShowModal {
            unit: unit.id(),
            animated,
            transition: transition.clone(),
        });
        *self.presented.borrow_mut() = Some(unit);

        if let Some(on_complete) = on_complete {
            on_complete();
        }
    }

    fn dismiss_modal(&self, animated: bool, on_complete: Option<Completion>) {
        let dismissed = self.presented.borrow_mut().take();
        self.record(UnitOp::DismissModal {
            unit: dismissed.as_ref().map(|unit| unit.id()),
            animated,
        });
        drop(dismissed);

        if let Some(on_complete) = on_complete {
            on_complete();
        }
    }

    fn set_stack(&self, units: Vec<UnitRef>, animated: bool) {
        self.record(UnitOp::SetStack {
            units: unit_ids(&units),
            animated,
        });
        *self.stack.borrow_mut() = units;
    }

    fn stack(&self) -> Vec<UnitRef> {
        self.stack.borrow().clone()
    }
}

/// Display host that marks its root unit visible when shown.
#[derive(Default)]
pub struct HeadlessDisplay {
    root: Option<Rc<HeadlessUnit>>,
    shown: Cell<usize>,
}

impl HeadlessDisplay {
    pub fn new(root: Option<Rc<HeadlessUnit>>) -> Rc<Self> {
        Rc::new(Self {
            root,
            shown: Cell::new(0),
        })
    }

    pub fn times_shown(&self) -> usize {
        self.shown.get()
    }
}

impl DisplayHost for HeadlessDisplay {
    fn make_visible(&self) {
        self.shown.set(self.shown.get() + 1);
        if let Some(root) = &self.root {
            root.set_visible(true);
        }
    }
}
