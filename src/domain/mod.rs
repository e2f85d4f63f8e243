//! Domain Layer
//!
//! Identifiers, outline nodes, outline aggregates and the shared error type.

mod entity;
mod ids;
mod node;
mod outline;

pub use entity::{position_by_id, DomainError, DomainResult, Entity};
pub use ids::{NodeId, OutlineId};
pub use node::{NodePatch, OutlineNode};
pub use outline::{Outline, OutlinePatch};
