//! Domain Layer - Core Entity Trait
//!
//! Every addressable value (outline, node record) exposes its identifier
//! through `Entity`. Errors for all domain operations live here too.

use std::hash::Hash;

use thiserror::Error;

use super::ids::{NodeId, OutlineId};

/// Core trait for all domain entities
pub trait Entity {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + Hash;

    /// Returns the entity's unique identifier
    fn id(&self) -> &Self::Id;
}

/// Index of the entity with `id` in a slice
pub fn position_by_id<T: Entity>(entities: &[T], id: &T::Id) -> Option<usize> {
    entities.iter().position(|entity| entity.id() == id)
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Outline not found: {0}")]
    OutlineNotFound(OutlineId),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Parent node not found: {0}")]
    ParentNotFound(NodeId),

    #[error("No outline selected")]
    NoCurrentOutline,

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Malformed import: {0}")]
    MalformedImport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl DomainError {
    /// True for the variants raised when an id does not resolve
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::OutlineNotFound(_)
                | DomainError::NodeNotFound(_)
                | DomainError::ParentNotFound(_)
        )
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::MalformedImport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named {
        id: OutlineId,
    }

    impl Entity for Named {
        type Id = OutlineId;

        fn id(&self) -> &OutlineId {
            &self.id
        }
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::NodeNotFound(NodeId::from("n1"));
        assert_eq!(err.to_string(), "Node not found: n1");

        let err = DomainError::NoCurrentOutline;
        assert_eq!(err.to_string(), "No outline selected");
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::ParentNotFound(NodeId::from("p")).is_not_found());
        assert!(DomainError::OutlineNotFound(OutlineId::from("o")).is_not_found());
        assert!(!DomainError::Storage("disk".to_string()).is_not_found());
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ nope")
            .expect_err("should fail to parse");
        let err: DomainError = json_error.into();
        assert!(matches!(err, DomainError::MalformedImport(_)));
    }

    #[test]
    fn test_position_by_id() {
        let items = vec![
            Named { id: OutlineId::from("a") },
            Named { id: OutlineId::from("b") },
        ];
        assert_eq!(position_by_id(&items, &OutlineId::from("b")), Some(1));
        assert_eq!(position_by_id(&items, &OutlineId::from("c")), None);
    }
}
