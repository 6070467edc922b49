//! Scene layer: spatial entities and the registry that owns them
//!
//! - [`entity`] - the transformable entity and its collision queries
//! - [`registry`] - ownership, role groupings, deferred destruction, and
//!   scene-wide collision/raycast dispatch

pub mod entity;
pub mod registry;

pub use entity::{EntityId, SpatialEntity};
pub use registry::{Behavior, Role, SceneError, SceneRegistry};
