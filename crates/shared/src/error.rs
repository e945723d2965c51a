use thiserror::Error;

use crate::domain::CoordinatorId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("{coordinator} cannot be its own parent or child")]
    SelfParenting { coordinator: CoordinatorId },
    #[error("{child} is an ancestor of {parent} and cannot become its child")]
    Cycle {
        parent: CoordinatorId,
        child: CoordinatorId,
    },
    #[error("unknown coordinator {0}")]
    UnknownCoordinator(CoordinatorId),
    #[error("no flow state available for {coordinator}, required to proceed")]
    MissingFlowState { coordinator: CoordinatorId },
    #[error("{coordinator} exposes no root unit")]
    NoRootUnit { coordinator: CoordinatorId },
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

impl CoordinatorError {
    /// Structural errors mean the caller broke a tree invariant.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CoordinatorError::SelfParenting { .. } | CoordinatorError::Cycle { .. }
        )
    }
}
