//! Scene registry: entity ownership, role groupings, and scene-wide queries
//!
//! The registry exclusively owns every [`SpatialEntity`] in an arena keyed
//! by versioned ids, groups them by role under named scenes, and brokers
//! collision and raycast queries across the active scene. Destruction is
//! deferred: [`SceneRegistry::remove`] only queues an id, and the entity
//! stays live and queryable until the end-of-frame
//! [`SceneRegistry::collect_garbage`] pass, so update logic never
//! invalidates an iteration in progress.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::collision;
use crate::config::RegistryConfig;
use crate::foundation::math::Vec3;
use crate::scene::entity::{EntityId, SpatialEntity};

/// Tag that keeps an entity in consideration for queries regardless of its
/// distance from the query's reference point.
pub const ALWAYS_CONSIDERED_TAG: &str = "floor";

/// Role an entity is registered under within a scene. Groupings are
/// metadata only; ownership always stays with the registry's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Viewpoint entities, excluded from collision iteration.
    Camera,
    /// Collidable world entities; the set collision and raycast queries
    /// walk.
    Body,
    /// Overlay entities, excluded from collision iteration.
    Ui,
}

/// Registry query errors
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// The id does not resolve to a live entity.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityId),
}

/// Per-frame logic attached to an entity.
///
/// Behaviors are taken out of their entity for the duration of the call,
/// so `registry` is free to look up, mutate, spawn, or [`remove`]
/// (`SceneRegistry::remove`) any entity, including the behavior's own.
pub trait Behavior {
    /// Advance this entity by `delta` seconds. `id` is the entity the
    /// behavior is attached to.
    fn update(&mut self, id: EntityId, registry: &mut SceneRegistry, delta: f32);
}

/// Per-scene role groupings (ids only, not ownership).
#[derive(Default)]
struct SceneRoles {
    cameras: Vec<EntityId>,
    bodies: Vec<EntityId>,
    uis: Vec<EntityId>,
}

impl SceneRoles {
    fn group_mut(&mut self, role: Role) -> &mut Vec<EntityId> {
        match role {
            Role::Camera => &mut self.cameras,
            Role::Body => &mut self.bodies,
            Role::Ui => &mut self.uis,
        }
    }

    fn scrub(&mut self, id: EntityId) {
        self.cameras.retain(|&kept| kept != id);
        self.bodies.retain(|&kept| kept != id);
        self.uis.retain(|&kept| kept != id);
    }
}

/// Owner of all spatial entities and dispatcher for scene-wide queries.
pub struct SceneRegistry {
    entities: SlotMap<EntityId, SpatialEntity>,
    trash: Vec<EntityId>,
    current_scene: String,
    scenes: HashMap<String, SceneRoles>,
    config: RegistryConfig,
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRegistry {
    /// Create a registry with the default configuration and a single
    /// active scene named `"default"`.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with an explicit configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entities: SlotMap::with_key(),
            trash: Vec::new(),
            current_scene: String::from("default"),
            scenes: HashMap::new(),
            config,
        }
    }

    /// Query filter configuration in effect.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Insert `entity` under `role` in the current scene and return its
    /// id. The id is stamped back onto the entity, and the current
    /// scene's groupings are created lazily on first use.
    pub fn add(&mut self, entity: SpatialEntity, role: Role) -> EntityId {
        let id = self.entities.insert(entity);
        if let Some(stored) = self.entities.get_mut(id) {
            stored.assign_id(id);
        }
        self.scenes
            .entry(self.current_scene.clone())
            .or_default()
            .group_mut(role)
            .push(id);
        id
    }

    /// Insert a camera entity into the current scene.
    pub fn add_camera(&mut self, entity: SpatialEntity) -> EntityId {
        self.add(entity, Role::Camera)
    }

    /// Insert a collidable body entity into the current scene.
    pub fn add_body(&mut self, entity: SpatialEntity) -> EntityId {
        self.add(entity, Role::Body)
    }

    /// Insert a UI entity into the current scene.
    pub fn add_ui(&mut self, entity: SpatialEntity) -> EntityId {
        self.add(entity, Role::Ui)
    }

    /// Look up a live entity.
    pub fn get(&self, id: EntityId) -> Option<&SpatialEntity> {
        self.entities.get(id)
    }

    /// Look up a live entity mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SpatialEntity> {
        self.entities.get_mut(id)
    }

    /// Number of live entities across all scenes.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry owns no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Queue `id` for destruction at the next [`Self::collect_garbage`]
    /// pass. The entity stays live and queryable for the rest of the
    /// frame.
    pub fn remove(&mut self, id: EntityId) {
        if !self.trash.contains(&id) {
            self.trash.push(id);
        }
    }

    /// Destroy every queued entity and scrub its id from every scene's
    /// role groupings. Call once per frame, after all updates.
    pub fn collect_garbage(&mut self) {
        for id in std::mem::take(&mut self.trash) {
            self.entities.remove(id);
            for roles in self.scenes.values_mut() {
                roles.scrub(id);
            }
        }
    }

    /// Name of the active scene.
    pub fn current_scene(&self) -> &str {
        &self.current_scene
    }

    /// Switch the active scene. Entities registered under other scene
    /// names survive the switch; they just stop participating in query
    /// iteration until their scene is active again.
    pub fn set_current_scene(&mut self, name: impl Into<String>) {
        self.current_scene = name.into();
    }

    /// Ids of the body-role entities in the active scene.
    pub fn bodies(&self) -> &[EntityId] {
        self.scenes
            .get(&self.current_scene)
            .map_or(&[], |roles| roles.bodies.as_slice())
    }

    /// Two-level query filter: an entity is skipped when it carries any
    /// tag from `ignore_tags`, and otherwise skipped unless it is inside
    /// the render-distance cube around `reference` or carries the
    /// always-considered tag.
    fn should_ignore(
        &self,
        entity: &SpatialEntity,
        reference: Vec3,
        ignore_tags: &[&str],
    ) -> bool {
        if ignore_tags.iter().any(|tag| entity.has_tag(tag)) {
            return true;
        }
        let nearby =
            collision::point_in_box(entity.position(), reference, self.config.render_distance);
        !(nearby || entity.has_tag(ALWAYS_CONSIDERED_TAG))
    }

    /// Cast the segment `start..end` against every body in the active
    /// scene and return the nearest hit distance, or `None` when nothing
    /// is struck. Entities filtered out by [`should_ignore`] relative to
    /// `start` never participate.
    pub fn raycast(&self, start: Vec3, end: Vec3, ignore_tags: &[&str]) -> Option<f32> {
        let mut nearest: Option<f32> = None;
        for &id in self.bodies() {
            let Some(entity) = self.entities.get(id) else {
                continue;
            };
            if self.should_ignore(entity, start, ignore_tags) {
                continue;
            }
            if let Some(distance) = entity.ray_intersect(start, end) {
                if nearest.map_or(true, |best| distance < best) {
                    nearest = Some(distance);
                }
            }
        }
        nearest
    }

    /// Find the first body in the active scene whose box intersects the
    /// box of entity `id`. A cheap collision-radius prefilter runs before
    /// the precise separating-axis test.
    ///
    /// # Errors
    ///
    /// [`SceneError::EntityNotFound`] when `id` is not live.
    pub fn collides(
        &self,
        id: EntityId,
        ignore_tags: &[&str],
    ) -> Result<Option<EntityId>, SceneError> {
        let query = self
            .entities
            .get(id)
            .ok_or(SceneError::EntityNotFound(id))?;
        let center = query.position();

        for &other_id in self.bodies() {
            if other_id == id {
                continue;
            }
            let Some(other) = self.entities.get(other_id) else {
                continue;
            };
            if self.should_ignore(other, center, ignore_tags) {
                continue;
            }
            // Broad phase before the SAT narrow phase
            if !collision::point_in_box(other.position(), center, self.config.collision_radius) {
                continue;
            }
            if query.intersects(other) {
                return Ok(Some(other_id));
            }
        }
        Ok(None)
    }

    /// Run every attached [`Behavior`] in the active scene for one frame
    /// step. Entities registered under other scene names are not stepped.
    /// Behaviors are taken out of their entity for the call so they can
    /// freely mutate the registry; a behavior replaced mid-update (the
    /// entity installed a new one) wins over the put-back.
    pub fn update(&mut self, delta: f32) {
        let ids: Vec<EntityId> =
            self.scenes
                .get(&self.current_scene)
                .map_or_else(Vec::new, |roles| {
                    roles
                        .cameras
                        .iter()
                        .chain(&roles.bodies)
                        .chain(&roles.uis)
                        .copied()
                        .collect()
                });
        for id in ids {
            let Some(mut behavior) = self
                .entities
                .get_mut(id)
                .and_then(|entity| entity.behavior.take())
            else {
                continue;
            };
            behavior.update(id, self, delta);
            if let Some(entity) = self.entities.get_mut(id) {
                if entity.behavior.is_none() {
                    entity.behavior = Some(behavior);
                }
            }
        }
    }

    /// Dump every live entity at debug level.
    pub fn log_entities(&self) {
        for entity in self.entities.values() {
            log::debug!("{entity}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn body_at(position: Vec3) -> SpatialEntity {
        let mut entity = SpatialEntity::new()
            .with_bounding_box(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        entity.set_position(position);
        entity
    }

    #[test]
    fn test_add_assigns_distinct_ids_and_stamps_entity() {
        let mut registry = SceneRegistry::new();
        let a = registry.add_body(body_at(Vec3::zeros()));
        let b = registry.add_body(body_at(Vec3::new(3.0, 0.0, 0.0)));

        assert_ne!(a, b);
        assert_eq!(registry.get(a).unwrap().id(), a);
        assert_eq!(registry.get(b).unwrap().id(), b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.bodies(), &[a, b]);
    }

    #[test]
    fn test_only_bodies_participate_in_raycast() {
        let mut registry = SceneRegistry::new();
        registry.add_camera(body_at(Vec3::zeros()));
        registry.add_ui(body_at(Vec3::zeros()));

        let hit = registry.raycast(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0), &[]);
        assert_eq!(hit, None);

        registry.add_body(body_at(Vec3::zeros()));
        let hit = registry.raycast(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0), &[]);
        assert_relative_eq!(hit.unwrap(), 4.0, epsilon = EPSILON);
    }

    #[test]
    fn test_raycast_returns_nearest_of_stacked_boxes() {
        let mut registry = SceneRegistry::new();
        registry.add_body(body_at(Vec3::new(0.0, 0.0, 2.0)));
        registry.add_body(body_at(Vec3::zeros()));

        let hit = registry.raycast(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0), &[]);
        // Near face of the box at the origin, not of the one behind it
        assert_relative_eq!(hit.unwrap(), 4.0, epsilon = EPSILON);
    }

    #[test]
    fn test_raycast_respects_ignore_tags() {
        let mut registry = SceneRegistry::new();
        registry.add_body(body_at(Vec3::zeros()).with_tag("bullet"));

        let start = Vec3::new(0.0, 0.0, -5.0);
        let end = Vec3::new(0.0, 0.0, 5.0);
        assert_eq!(registry.raycast(start, end, &["bullet"]), None);
        assert!(registry.raycast(start, end, &[]).is_some());
    }

    #[test]
    fn test_filter_skips_distant_unless_always_considered() {
        let config = RegistryConfig {
            render_distance: 10.0,
            ..RegistryConfig::default()
        };
        let mut registry = SceneRegistry::with_config(config);
        let far = Vec3::new(0.0, 0.0, 50.0);
        registry.add_body(body_at(far));

        let start = Vec3::new(0.0, 0.0, 40.0);
        let end = Vec3::new(0.0, 0.0, 60.0);
        // Within the segment but outside the render-distance cube around
        // the ray start once the start moves away
        let distant_start = Vec3::new(0.0, 0.0, -100.0);
        assert!(registry.raycast(start, end, &[]).is_some());
        assert_eq!(registry.raycast(distant_start, far, &[]), None);

        let mut registry = SceneRegistry::with_config(RegistryConfig {
            render_distance: 10.0,
            ..RegistryConfig::default()
        });
        registry.add_body(body_at(far).with_tag(ALWAYS_CONSIDERED_TAG));
        assert!(registry.raycast(distant_start, Vec3::new(0.0, 0.0, 60.0), &[]).is_some());
    }

    #[test]
    fn test_collides_finds_overlap_and_reports_missing_ids() {
        let mut registry = SceneRegistry::new();
        let a = registry.add_body(body_at(Vec3::zeros()));
        let b = registry.add_body(body_at(Vec3::new(1.5, 0.0, 0.0)));
        let far = registry.add_body(body_at(Vec3::new(50.0, 0.0, 0.0)));

        assert_eq!(registry.collides(a, &[]).unwrap(), Some(b));
        assert_eq!(registry.collides(far, &[]).unwrap(), None);

        registry.remove(a);
        registry.collect_garbage();
        assert!(matches!(
            registry.collides(a, &[]),
            Err(SceneError::EntityNotFound(_))
        ));
    }

    #[test]
    fn test_collides_broad_phase_prefilter() {
        let config = RegistryConfig {
            collision_radius: 1.0,
            ..RegistryConfig::default()
        };
        let mut registry = SceneRegistry::with_config(config);
        // Boxes overlap geometrically but the other's center sits outside
        // the collision radius, so the broad phase rejects the pair
        let a = registry.add_body(body_at(Vec3::zeros()));
        registry.add_body(body_at(Vec3::new(1.5, 0.0, 0.0)));

        assert_eq!(registry.collides(a, &[]).unwrap(), None);
    }

    #[test]
    fn test_deferred_removal_keeps_entity_live_until_collection() {
        let mut registry = SceneRegistry::new();
        let id = registry.add_body(body_at(Vec3::zeros()));

        registry.remove(id);
        registry.remove(id); // double removal is harmless
        assert!(registry.get(id).is_some());
        assert!(registry
            .raycast(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0), &[])
            .is_some());

        registry.collect_garbage();
        assert!(registry.get(id).is_none());
        assert!(registry.bodies().is_empty());
        assert_eq!(
            registry.raycast(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0), &[]),
            None
        );
    }

    #[test]
    fn test_scene_switching_is_non_destructive() {
        let mut registry = SceneRegistry::new();
        let arena_body = registry.add_body(body_at(Vec3::zeros()));

        registry.set_current_scene("menu");
        assert!(registry.bodies().is_empty());
        assert!(registry.get(arena_body).is_some());

        let menu_body = registry.add_body(body_at(Vec3::zeros()));
        assert_eq!(registry.bodies(), &[menu_body]);

        registry.set_current_scene("default");
        assert_eq!(registry.bodies(), &[arena_body]);
    }

    struct Mover {
        step: Vec3,
    }

    impl Behavior for Mover {
        fn update(&mut self, id: EntityId, registry: &mut SceneRegistry, delta: f32) {
            if let Some(entity) = registry.get_mut(id) {
                let step = self.step * delta;
                entity.set_position(entity.position() + step);
            }
        }
    }

    struct Reaper {
        victim: EntityId,
    }

    impl Behavior for Reaper {
        fn update(&mut self, _id: EntityId, registry: &mut SceneRegistry, _delta: f32) {
            // The victim must still be queryable mid-frame
            assert!(registry.get(self.victim).is_some());
            registry.remove(self.victim);
            assert!(registry.get(self.victim).is_some());
        }
    }

    #[test]
    fn test_update_dispatches_behaviors() {
        let mut registry = SceneRegistry::new();
        let id = registry.add_body(body_at(Vec3::zeros()).with_behavior(Box::new(Mover {
            step: Vec3::new(1.0, 0.0, 0.0),
        })));

        registry.update(0.5);
        registry.update(0.5);
        assert_relative_eq!(
            registry.get(id).unwrap().position(),
            Vec3::new(1.0, 0.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_update_only_steps_active_scene() {
        let mut registry = SceneRegistry::new();
        let arena_mover = registry.add_body(body_at(Vec3::zeros()).with_behavior(Box::new(
            Mover {
                step: Vec3::new(1.0, 0.0, 0.0),
            },
        )));

        // Behaviors in an inactive scene must not run
        registry.set_current_scene("menu");
        registry.update(1.0);
        assert_eq!(registry.get(arena_mover).unwrap().position(), Vec3::zeros());

        registry.set_current_scene("default");
        registry.update(1.0);
        assert_relative_eq!(
            registry.get(arena_mover).unwrap().position(),
            Vec3::new(1.0, 0.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_behavior_removal_is_deferred_across_frame() {
        let mut registry = SceneRegistry::new();
        let victim = registry.add_body(body_at(Vec3::zeros()));
        registry.add_body(
            body_at(Vec3::new(5.0, 0.0, 0.0)).with_behavior(Box::new(Reaper { victim })),
        );

        registry.update(1.0 / 60.0);
        assert!(registry.get(victim).is_some());

        registry.collect_garbage();
        assert!(registry.get(victim).is_none());
        assert_eq!(registry.bodies().len(), 1);
    }
}
