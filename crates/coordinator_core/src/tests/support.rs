use std::{cell::RefCell, collections::HashMap, rc::Rc};

use presentation::{headless::HeadlessUnit, PresentableUnit, UnitRef};
use shared::{
    domain::{CoordinatorId, UnitId},
    error::CoordinatorResult,
    protocol::Message,
};

use crate::{
    builder::{Builder, BuilderResult, Description},
    component::Component,
    flow::BuildableFlowCoordinator,
    tree::{Coordinator, CoordinatorTree, Disposition},
};

pub type Log = Rc<RefCell<Vec<(CoordinatorId, Message)>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn kinds(log: &Log) -> Vec<(CoordinatorId, &'static str)> {
    log.borrow()
        .iter()
        .map(|(id, message)| (*id, message.kind()))
        .collect()
}

pub fn count(log: &Log, coordinator: CoordinatorId, kind: &str) -> usize {
    log.borrow()
        .iter()
        .filter(|(id, message)| *id == coordinator && message.kind() == kind)
        .count()
}

/// Sees every message offered to its coordinator and never claims one.
pub struct Spy {
    pub seen: Log,
}

impl Component for Spy {
    fn can_handle(&self, message: &Message, _tree: &CoordinatorTree, coordinator: CoordinatorId) -> bool {
        self.seen.borrow_mut().push((coordinator, message.clone()));
        false
    }

    fn handle(
        &self,
        _message: &Message,
        _tree: &mut CoordinatorTree,
        _coordinator: CoordinatorId,
    ) -> CoordinatorResult<()> {
        unreachable!("spy never claims messages")
    }
}

/// Claims every message of one kind.
pub struct Claim {
    pub kind: &'static str,
    pub handled: Log,
}

impl Component for Claim {
    fn can_handle(&self, message: &Message, _tree: &CoordinatorTree, _coordinator: CoordinatorId) -> bool {
        message.kind() == self.kind
    }

    fn handle(
        &self,
        message: &Message,
        _tree: &mut CoordinatorTree,
        coordinator: CoordinatorId,
    ) -> CoordinatorResult<()> {
        self.handled.borrow_mut().push((coordinator, message.clone()));
        Ok(())
    }
}

/// Plain coordinator that records what reaches its own handler and handles
/// only the kinds it was told to.
pub struct Recording {
    pub unit: Option<UnitRef>,
    pub handles: Vec<&'static str>,
    pub received: Log,
}

impl Recording {
    pub fn new(received: &Log) -> Self {
        Self {
            unit: None,
            handles: Vec::new(),
            received: received.clone(),
        }
    }

    pub fn handling(mut self, kind: &'static str) -> Self {
        self.handles.push(kind);
        self
    }

    pub fn with_unit(mut self, unit: UnitRef) -> Self {
        self.unit = Some(unit);
        self
    }
}

impl Coordinator for Recording {
    fn root_unit(&self) -> Option<UnitRef> {
        self.unit.clone()
    }

    fn handle(
        &self,
        _tree: &mut CoordinatorTree,
        me: CoordinatorId,
        message: &Message,
    ) -> CoordinatorResult<Disposition> {
        self.received.borrow_mut().push((me, message.clone()));
        if self.handles.contains(&message.kind()) {
            Ok(Disposition::Handled)
        } else {
            Ok(Disposition::Declined)
        }
    }
}

/// A second coordinator type for typed lookups.
#[derive(Default)]
pub struct Marker;

impl Coordinator for Marker {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Welcome,
    Login,
    Home,
    /// Built as a nested flow coordinator.
    Settings,
}

/// Shared application state the screen builder reads.
#[derive(Clone, Default)]
pub struct AppState {
    current: Rc<RefCell<Option<Screen>>>,
}

impl AppState {
    pub fn set(&self, screen: Option<Screen>) {
        *self.current.borrow_mut() = screen;
    }

    pub fn get(&self) -> Option<Screen> {
        *self.current.borrow()
    }
}

/// One unit per screen, shared between a builder and the test that drives it,
/// so identity is stable across triggers.
#[derive(Clone, Default)]
pub struct ScreenUnits {
    units: Rc<RefCell<HashMap<Screen, Rc<HeadlessUnit>>>>,
}

impl ScreenUnits {
    pub fn get(&self, screen: Screen) -> Rc<HeadlessUnit> {
        self.units
            .borrow_mut()
            .entry(screen)
            .or_insert_with(|| HeadlessUnit::new(format!("{screen:?}")))
            .clone()
    }

    pub fn id(&self, screen: Screen) -> UnitId {
        self.get(screen).id()
    }
}

pub struct ScreenBuilder {
    pub state: AppState,
    pub units: ScreenUnits,
    /// When set, `build` refuses everything it described.
    pub broken: bool,
}

impl ScreenBuilder {
    pub fn new(state: &AppState, units: &ScreenUnits) -> Self {
        Self {
            state: state.clone(),
            units: units.clone(),
            broken: false,
        }
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

impl Builder for ScreenBuilder {
    fn describable(&self, _tree: &CoordinatorTree, _coordinator: CoordinatorId) -> Option<Description> {
        self.state.get().map(Description::new)
    }

    fn build(
        &self,
        description: &Description,
        tree: &mut CoordinatorTree,
        _coordinator: CoordinatorId,
    ) -> Option<BuilderResult> {
        if self.broken {
            return None;
        }
        let screen = *description.downcast_ref::<Screen>()?;
        match screen {
            Screen::Settings => {
                let nested = tree.insert(BuildableFlowCoordinator::new(
                    self.units.get(Screen::Settings),
                    NeverBuilder,
                ));
                BuilderResult::from_coordinator(tree, nested).ok()
            }
            other => Some(BuilderResult::from_unit(self.units.get(other))),
        }
    }
}

/// Builder that never has anything to show.
pub struct NeverBuilder;

impl Builder for NeverBuilder {
    fn build(
        &self,
        _description: &Description,
        _tree: &mut CoordinatorTree,
        _coordinator: CoordinatorId,
    ) -> Option<BuilderResult> {
        None
    }
}
