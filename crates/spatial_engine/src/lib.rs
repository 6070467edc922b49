//! # Spatial Engine
//!
//! The spatial core of a small real-time 3D game engine: transformable
//! entities, oriented-bounding-box collision detection, segment raycasts
//! against box faces, and a Wavefront OBJ loader that feeds bounding
//! extents into the collision system.
//!
//! ## Modules
//!
//! - [`foundation`] - Math types and angle/rotation helpers
//! - [`collision`] - Separating-axis and box-face intersection algorithms
//! - [`scene`] - Spatial entities and the owning scene registry
//! - [`assets`] - OBJ/MTL parsing into deduplicated attribute streams
//! - [`config`] - Query-tuning configuration loaded from TOML
//!
//! ## Quick Start
//!
//! ```rust
//! use spatial_engine::prelude::*;
//!
//! let mut registry = SceneRegistry::new();
//!
//! let mut crate_box = SpatialEntity::new();
//! crate_box.set_bounding_box(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
//! crate_box.add_tag("crate");
//! let id = registry.add_body(crate_box);
//!
//! let hit = registry.raycast(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 10.0), &[]);
//! assert!(hit.is_some());
//!
//! registry.remove(id);
//! registry.collect_garbage();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod collision;
pub mod config;
pub mod foundation;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{Model, MtlParser, ObjError},
        collision::BoundingBox,
        config::RegistryConfig,
        foundation::math::{Quat, Vec2, Vec3, Vec4},
        scene::{Behavior, EntityId, Role, SceneError, SceneRegistry, SpatialEntity},
    };
}
