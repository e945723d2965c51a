//! Builders turn "what should be shown next" into a unit, and optionally the
//! coordinator that drives it.

use std::{any::Any, fmt, rc::Rc};

use presentation::UnitRef;
use shared::{
    domain::CoordinatorId,
    error::{CoordinatorError, CoordinatorResult},
};
use tracing::{debug, trace};

use crate::tree::CoordinatorTree;

/// Opaque value only the builder that produced it knows how to read.
#[derive(Clone)]
pub struct Description {
    label: String,
    value: Rc<dyn Any>,
}

impl Description {
    pub fn new<T: Any + fmt::Debug>(value: T) -> Self {
        Self {
            label: format!("{value:?}"),
            value: Rc::new(value),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Description").field(&self.label).finish()
    }
}

pub struct BuilderResult {
    unit: UnitRef,
    coordinator: Option<CoordinatorId>,
}

impl BuilderResult {
    pub fn from_unit(unit: UnitRef) -> Self {
        Self {
            unit,
            coordinator: None,
        }
    }

    /// Result backed by a coordinator; the unit is always that coordinator's
    /// root unit.
    pub fn from_coordinator(
        tree: &CoordinatorTree,
        coordinator: CoordinatorId,
    ) -> CoordinatorResult<Self> {
        if !tree.contains(coordinator) {
            return Err(CoordinatorError::UnknownCoordinator(coordinator));
        }
        let unit = tree
            .root_unit(coordinator)
            .ok_or(CoordinatorError::NoRootUnit { coordinator })?;
        Ok(Self {
            unit,
            coordinator: Some(coordinator),
        })
    }

    pub fn unit(&self) -> &UnitRef {
        &self.unit
    }

    pub fn coordinator(&self) -> Option<CoordinatorId> {
        self.coordinator
    }
}

impl fmt::Debug for BuilderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderResult")
            .field("unit", &self.unit.id())
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

pub trait Builder {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn describable(&self, tree: &CoordinatorTree, coordinator: CoordinatorId) -> Option<Description> {
        let _ = (tree, coordinator);
        None
    }

    /// Builders must build every description they hand out from
    /// `describable`; `None` here is treated as the flow being complete.
    fn build(
        &self,
        description: &Description,
        tree: &mut CoordinatorTree,
        coordinator: CoordinatorId,
    ) -> Option<BuilderResult>;
}

/// Ordered chain of builders. The first builder with an answer wins.
#[derive(Default)]
pub struct ComposableBuilder {
    builders: Vec<Box<dyn Builder>>,
}

impl ComposableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, builder: impl Builder + 'static) -> Self {
        self.push(builder);
        self
    }

    pub fn push(&mut self, builder: impl Builder + 'static) {
        self.builders.push(Box::new(builder));
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl Builder for ComposableBuilder {
    fn describable(&self, tree: &CoordinatorTree, coordinator: CoordinatorId) -> Option<Description> {
        for builder in &self.builders {
            trace!(coordinator = coordinator.0, builder = builder.name(), "asking builder for describable");
            if let Some(description) = builder.describable(tree, coordinator) {
                debug!(
                    coordinator = coordinator.0,
                    builder = builder.name(),
                    description = description.label(),
                    "builder returned describable"
                );
                return Some(description);
            }
        }
        None
    }

    fn build(
        &self,
        description: &Description,
        tree: &mut CoordinatorTree,
        coordinator: CoordinatorId,
    ) -> Option<BuilderResult> {
        self.builders
            .iter()
            .find_map(|builder| builder.build(description, tree, coordinator))
    }
}
