//! Arena that owns every coordinator node and routes messages between them.
//!
//! Parents own their children exclusively; the parent link stored on a child is
//! only a handle back into the arena. Behaviors are reference counted so a
//! handler can run while the tree is mutably borrowed, which is what lets a
//! node send to itself, its parent or its children from inside `handle`.

use std::{any::Any, collections::HashMap, rc::Rc};

use presentation::{DisplayHost, UnitRef};
use shared::{
    domain::{CoordinatorId, UnitId},
    error::{CoordinatorError, CoordinatorResult},
    protocol::Message,
};
use tracing::{debug, error};

use crate::component::{Component, ComponentEntry};

/// What a coordinator's own handler did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Handled,
    /// Pass the message on to the parent.
    Declined,
}

/// Behavior attached to a node of the tree.
pub trait Coordinator: Any {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Unit this coordinator displays, for coordinators that expose one.
    fn root_unit(&self) -> Option<UnitRef> {
        None
    }

    fn handle(
        &self,
        tree: &mut CoordinatorTree,
        me: CoordinatorId,
        message: &Message,
    ) -> CoordinatorResult<Disposition> {
        let _ = (tree, me, message);
        Ok(Disposition::Declined)
    }
}

/// Coordinator with no local handling; everything goes to components or up
/// to the parent.
#[derive(Debug, Default)]
pub struct PassthroughCoordinator;

impl Coordinator for PassthroughCoordinator {}

struct Node {
    behavior: Rc<dyn Coordinator>,
    any: Rc<dyn Any>,
    parent: Option<CoordinatorId>,
    children: Vec<CoordinatorId>,
    components: Vec<ComponentEntry>,
    host: Option<Rc<dyn DisplayHost>>,
    /// Units bound through `adopt_units`, replaced on every adoption.
    adopted: Vec<UnitId>,
}

#[derive(Default)]
pub struct CoordinatorTree {
    nodes: HashMap<CoordinatorId, Node>,
    next_id: u64,
    unit_owners: HashMap<UnitId, CoordinatorId>,
}

impl CoordinatorTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached node. It stays in the arena until it is attached to a
    /// parent and released with it, or destroyed explicitly.
    pub fn insert<C: Coordinator>(&mut self, behavior: C) -> CoordinatorId {
        self.insert_node(Rc::new(behavior), None)
    }

    /// Adds a root node that owns the display host for its subtree.
    pub fn insert_root<C: Coordinator>(
        &mut self,
        host: Rc<dyn DisplayHost>,
        behavior: C,
    ) -> CoordinatorId {
        self.insert_node(Rc::new(behavior), Some(host))
    }

    fn insert_node<C: Coordinator>(
        &mut self,
        behavior: Rc<C>,
        host: Option<Rc<dyn DisplayHost>>,
    ) -> CoordinatorId {
        self.next_id += 1;
        let id = CoordinatorId(self.next_id);

        if let Some(unit) = behavior.root_unit() {
            self.unit_owners.insert(unit.id(), id);
        }

        debug!(coordinator = id.0, name = behavior.name(), "inserted coordinator");
        self.nodes.insert(
            id,
            Node {
                behavior: behavior.clone(),
                any: behavior,
                parent: None,
                children: Vec::new(),
                components: Vec::new(),
                host,
                adopted: Vec::new(),
            },
        );
        id
    }

    pub fn contains(&self, id: CoordinatorId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: CoordinatorId) -> CoordinatorResult<&Node> {
        self.nodes
            .get(&id)
            .ok_or(CoordinatorError::UnknownCoordinator(id))
    }

    fn node_mut(&mut self, id: CoordinatorId) -> CoordinatorResult<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or(CoordinatorError::UnknownCoordinator(id))
    }

    pub fn parent(&self, id: CoordinatorId) -> Option<CoordinatorId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: CoordinatorId) -> &[CoordinatorId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn root_of(&self, id: CoordinatorId) -> Option<CoordinatorId> {
        let mut current = self.nodes.contains_key(&id).then_some(id)?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    pub fn is_ancestor(&self, ancestor: CoordinatorId, of: CoordinatorId) -> bool {
        let mut current = self.parent(of);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn add(&mut self, parent: CoordinatorId, child: CoordinatorId) -> CoordinatorResult<()> {
        if parent == child {
            error!(coordinator = child.0, "refusing to add coordinator as its own child");
            return Err(CoordinatorError::SelfParenting { coordinator: child });
        }
        self.node(parent)?;
        self.node(child)?;
        if self.is_ancestor(child, parent) {
            error!(
                parent = parent.0,
                child = child.0,
                "refusing to add an ancestor as a child"
            );
            return Err(CoordinatorError::Cycle { parent, child });
        }

        match self.parent(child) {
            Some(current) if current == parent => return Ok(()),
            Some(current) => self.detach(current, child),
            None => {}
        }

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        debug!(parent = parent.0, child = child.0, "attached coordinator");
        Ok(())
    }

    pub fn remove(&mut self, parent: CoordinatorId, child: CoordinatorId) -> CoordinatorResult<()> {
        if parent == child {
            error!(coordinator = child.0, "refusing to remove coordinator from itself");
            return Err(CoordinatorError::SelfParenting { coordinator: child });
        }
        self.node(parent)?;

        if self.parent(child) == Some(parent) {
            self.detach(parent, child);
            debug!(parent = parent.0, child = child.0, "detached coordinator");
        }
        Ok(())
    }

    fn detach(&mut self, parent: CoordinatorId, child: CoordinatorId) {
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|id| *id != child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
    }

    /// Detaches `child` from `parent` and drops its whole subtree. A `child`
    /// that belongs to some other parent is left where it is.
    pub fn release(&mut self, parent: CoordinatorId, child: CoordinatorId) -> CoordinatorResult<()> {
        let owned = self.parent(child) == Some(parent);
        self.remove(parent, child)?;
        if owned {
            self.destroy(child)?;
        }
        Ok(())
    }

    pub fn release_children(&mut self, parent: CoordinatorId) -> CoordinatorResult<()> {
        while let Some(child) = self.children(parent).first().copied() {
            self.release(parent, child)?;
        }
        Ok(())
    }

    pub fn destroy(&mut self, id: CoordinatorId) -> CoordinatorResult<()> {
        self.node(id)?;
        if let Some(parent) = self.parent(id) {
            self.detach(parent, id);
        }

        let mut pending = vec![id];
        let mut doomed = Vec::new();
        while let Some(current) = pending.pop() {
            pending.extend(self.children(current).iter().copied());
            doomed.push(current);
        }

        // Leaves go first so a node never outlives its parent in the arena.
        for current in doomed.into_iter().rev() {
            self.nodes.remove(&current);
            self.unit_owners.retain(|_, owner| *owner != current);
            debug!(coordinator = current.0, "destroyed coordinator");
        }
        Ok(())
    }

    pub fn add_component<C: Component>(
        &mut self,
        id: CoordinatorId,
        component: C,
    ) -> CoordinatorResult<()> {
        let component = Rc::new(component);
        self.node_mut(id)?.components.push(ComponentEntry {
            handler: component.clone(),
            any: component,
        });
        Ok(())
    }

    pub fn component_count(&self, id: CoordinatorId) -> usize {
        self.nodes
            .get(&id)
            .map(|node| node.components.len())
            .unwrap_or_default()
    }

    /// Component of type `C` on `id` or the nearest ancestor that has one.
    pub fn find_component<C: Component>(&self, id: CoordinatorId) -> Option<Rc<C>> {
        let mut current = self.nodes.contains_key(&id).then_some(id);
        while let Some(node_id) = current {
            let node = self.nodes.get(&node_id)?;
            let found = node
                .components
                .iter()
                .find_map(|entry| entry.any.clone().downcast::<C>().ok());
            if found.is_some() {
                return found;
            }
            current = node.parent;
        }
        None
    }

    pub fn behavior<T: Coordinator>(&self, id: CoordinatorId) -> Option<Rc<T>> {
        self.nodes.get(&id)?.any.clone().downcast::<T>().ok()
    }

    pub fn is<T: Coordinator>(&self, id: CoordinatorId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|node| node.any.is::<T>())
    }

    /// First descendant of type `T`, depth-first pre-order.
    pub fn find_child<T: Coordinator>(&self, id: CoordinatorId) -> Option<CoordinatorId> {
        let mut pending: Vec<CoordinatorId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = pending.pop() {
            if self.is::<T>(current) {
                return Some(current);
            }
            pending.extend(self.children(current).iter().rev().copied());
        }
        None
    }

    /// Nearest ancestor of type `T`.
    pub fn find_parent<T: Coordinator>(&self, id: CoordinatorId) -> Option<CoordinatorId> {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if self.is::<T>(parent) {
                return Some(parent);
            }
            current = self.parent(parent);
        }
        None
    }

    pub fn root_unit(&self, id: CoordinatorId) -> Option<UnitRef> {
        self.nodes.get(&id)?.behavior.root_unit()
    }

    /// Whether a transition on this coordinator should animate: only when its
    /// root unit is on screen. Coordinators without a unit always animate.
    pub fn should_animate(&self, id: CoordinatorId) -> bool {
        self.root_unit(id)
            .map_or(true, |unit| unit.is_currently_visible())
    }

    /// Display host of the nearest ancestor (or self) that owns one.
    pub fn display_host(&self, id: CoordinatorId) -> Option<Rc<dyn DisplayHost>> {
        let mut current = self.nodes.contains_key(&id).then_some(id);
        while let Some(node_id) = current {
            let node = self.nodes.get(&node_id)?;
            if let Some(host) = &node.host {
                return Some(host.clone());
            }
            current = node.parent;
        }
        None
    }

    pub fn show(&self, id: CoordinatorId) -> CoordinatorResult<()> {
        self.node(id)?;
        match self.display_host(id) {
            Some(host) => host.make_visible(),
            None => debug!(coordinator = id.0, "no display host to show"),
        }
        Ok(())
    }

    pub fn bind_unit(&mut self, unit: UnitId, coordinator: CoordinatorId) -> CoordinatorResult<()> {
        self.node(coordinator)?;
        self.unit_owners.insert(unit, coordinator);
        Ok(())
    }

    /// Binds the units a flow just placed on screen to `owner`, so they reach
    /// it through `send_from_unit`. Units already owned by another live
    /// coordinator keep that owner. Units adopted earlier that `owner` no
    /// longer shows are unbound.
    pub fn adopt_units(&mut self, owner: CoordinatorId, units: &[UnitRef]) -> CoordinatorResult<()> {
        let previous = std::mem::take(&mut self.node_mut(owner)?.adopted);
        for unit in previous {
            if self.unit_owners.get(&unit) == Some(&owner) {
                self.unit_owners.remove(&unit);
            }
        }

        let mut adopted = Vec::with_capacity(units.len());
        for unit in units {
            let id = unit.id();
            let taken = self
                .unit_owners
                .get(&id)
                .is_some_and(|current| self.nodes.contains_key(current));
            if !taken {
                self.unit_owners.insert(id, owner);
                adopted.push(id);
            }
        }

        debug!(coordinator = owner.0, units = adopted.len(), "adopted units");
        self.node_mut(owner)?.adopted = adopted;
        Ok(())
    }

    pub fn coordinator_for_unit(&self, unit: UnitId) -> Option<CoordinatorId> {
        self.unit_owners.get(&unit).copied()
    }

    /// Delivers a message on behalf of a unit to the coordinator bound to it.
    /// Returns `false` when no live coordinator owns the unit.
    pub fn send_from_unit(&mut self, unit: UnitId, message: Message) -> CoordinatorResult<bool> {
        match self.coordinator_for_unit(unit) {
            Some(coordinator) if self.contains(coordinator) => {
                self.send(coordinator, message)?;
                Ok(true)
            }
            _ => {
                debug!(unit = unit.0, message = message.kind(), "no coordinator bound to unit");
                Ok(false)
            }
        }
    }

    /// Routes a message: components in registration order, then the node's
    /// own handler, then the parent.
    pub fn send(&mut self, id: CoordinatorId, message: Message) -> CoordinatorResult<()> {
        let (behavior, components) = {
            let node = self.node(id)?;
            let components: Vec<Rc<dyn Component>> = node
                .components
                .iter()
                .map(|entry| entry.handler.clone())
                .collect();
            (node.behavior.clone(), components)
        };

        for (index, component) in components.iter().enumerate() {
            if component.can_handle(&message, self, id) {
                debug!(
                    coordinator = id.0,
                    component = index,
                    message = message.kind(),
                    "component handling message"
                );
                return component.handle(&message, self, id);
            }
        }

        match behavior.handle(self, id, &message)? {
            Disposition::Handled => Ok(()),
            Disposition::Declined => self.unhandled(id, message),
        }
    }

    fn unhandled(&mut self, id: CoordinatorId, message: Message) -> CoordinatorResult<()> {
        match self.parent(id) {
            Some(parent) => self.send(parent, message),
            None => {
                debug!(
                    coordinator = id.0,
                    message = message.kind(),
                    "unhandled message at root, discarding"
                );
                Ok(())
            }
        }
    }
}
