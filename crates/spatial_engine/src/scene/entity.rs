//! The transformable spatial entity
//!
//! A [`SpatialEntity`] is a position, orientation, and scale plus a
//! local-space bounding box and a tag set. It is the unit the collision
//! engine and the scene registry operate on; rendering-specific state
//! (meshes, materials, light parameters) lives elsewhere and only
//! references entities.

use std::collections::HashSet;
use std::fmt;

use crate::collision::{
    self, BoundingBox, FACE_CORNER_INDICES, NUM_BOX_CORNERS,
};
use crate::foundation::math::{axis_angle_to_rotation, Quat, Vec3};
use crate::scene::registry::Behavior;

slotmap::new_key_type! {
    /// Stable identity of an entity owned by a
    /// [`SceneRegistry`](crate::scene::SceneRegistry). Keys are versioned
    /// and never reused, so a stale id held across a garbage-collection
    /// pass can never resolve to a different entity.
    pub struct EntityId;
}

/// A positioned, oriented, scaled object participating in collision and
/// raycast queries.
///
/// New entities sit at the origin with identity orientation, unit scale,
/// and a degenerate (zero-size) bounding box; callers set real extents
/// (usually from a parsed [`Model`](crate::assets::Model)) before
/// collision queries become meaningful.
pub struct SpatialEntity {
    id: EntityId,
    tags: HashSet<String>,
    position: Vec3,
    orientation: Quat,
    scale: Vec3,
    bounding_box: BoundingBox,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Default for SpatialEntity {
    fn default() -> Self {
        Self {
            id: EntityId::default(),
            tags: HashSet::new(),
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            bounding_box: BoundingBox::empty(),
            behavior: None,
        }
    }
}

impl SpatialEntity {
    /// Create an entity with the default transform and no collision
    /// geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: attach a per-frame behavior.
    #[must_use]
    pub fn with_behavior(mut self, behavior: Box<dyn Behavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Builder: set local bounding extents.
    #[must_use]
    pub fn with_bounding_box(mut self, min: Vec3, max: Vec3) -> Self {
        self.set_bounding_box(min, max);
        self
    }

    /// Builder: add a collision-filtering tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.add_tag(tag);
        self
    }

    /// The registry-assigned identity. Default (null) until the entity
    /// is inserted into a registry.
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    /// Add a tag used by collision filtering. Tags describe roles
    /// ("floor", "bullet", "player"), not types.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    /// Whether `tag` is in this entity's tag set.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// All tags on this entity.
    pub fn tags(&self) -> &HashSet<String> {
        &self.tags
    }

    /// Current world position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Set the world position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Current orientation (always unit length).
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Set the orientation directly.
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
    }

    /// Set the orientation from an angle-axis pair. The angle is degrees
    /// unless `radians` is set; the axis must be non-zero.
    pub fn set_orientation_axis_angle(&mut self, angle: f32, axis: Vec3, radians: bool) {
        self.orientation = axis_angle_to_rotation(angle, axis, radians);
    }

    /// Current scale factors.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set the scale factors. Components are expected to be finite;
    /// non-positive components mirror geometry and are not validated.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Translate by `distance` expressed in the entity's local frame:
    /// `position += orientation * distance`. Moving "forward" is a move
    /// along local -Z regardless of where the entity currently faces.
    pub fn move_local(&mut self, distance: Vec3) {
        self.position += self.orientation * distance;
    }

    /// Compose a new local rotation onto the current orientation. The
    /// delta is applied in the entity's current frame
    /// (`orientation * delta`), matching [`Self::move_local`].
    pub fn turn(&mut self, angle: f32, axis: Vec3, radians: bool) {
        self.orientation *= axis_angle_to_rotation(angle, axis, radians);
    }

    /// Place the entity at `eye` oriented so its local -Z axis points at
    /// `center`, with `up` resolving roll.
    ///
    /// Precondition: `eye != center` and `up` not parallel to the
    /// eye-to-center direction; degenerate input leaves the orientation
    /// unspecified (it is not validated here).
    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.position = eye;
        self.orientation = Quat::look_at_rh(&(center - eye), &up).inverse();
    }

    /// Local bounding extents and alignment flag.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Store local-space bounding extents (body-aligned).
    pub fn set_bounding_box(&mut self, min: Vec3, max: Vec3) {
        self.bounding_box.min = min;
        self.bounding_box.max = max;
    }

    /// Choose whether the box ignores the entity's orientation and stays
    /// world-axis-aligned.
    pub fn set_axis_aligned(&mut self, axis_aligned: bool) {
        self.bounding_box.axis_aligned = axis_aligned;
    }

    /// The eight world-space corners of the bounding box, in the stable
    /// order the SAT axis pairing relies on: local corners are rotated by
    /// the orientation (skipped for axis-aligned boxes) and translated by
    /// the position.
    pub fn bounding_box_corners(&self) -> [Vec3; NUM_BOX_CORNERS] {
        let mut corners = self.bounding_box.corners();
        for corner in &mut corners {
            if !self.bounding_box.axis_aligned {
                *corner = self.orientation * *corner;
            }
            *corner += self.position;
        }
        corners
    }

    /// Whether the world-space `point` is inside or touching this
    /// entity's bounding box. The point is carried into local space
    /// (inverse translate, inverse rotate) and compared componentwise.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let local = self.orientation.inverse() * (point - self.position);
        let bounds = &self.bounding_box;
        local.x >= bounds.min.x
            && local.x <= bounds.max.x
            && local.y >= bounds.min.y
            && local.y <= bounds.max.y
            && local.z >= bounds.min.z
            && local.z <= bounds.max.z
    }

    /// Separating-axis test against another entity's bounding box. True
    /// when no tested axis separates the two corner sets.
    pub fn intersects(&self, other: &SpatialEntity) -> bool {
        collision::boxes_intersect(&self.bounding_box_corners(), &other.bounding_box_corners())
    }

    /// Cast the segment `start..end` against the six faces of this
    /// entity's bounding box and return the nearest accepted hit
    /// distance, or `None` for a miss.
    pub fn ray_intersect(&self, start: Vec3, end: Vec3) -> Option<f32> {
        let corners = self.bounding_box_corners();
        let mut nearest: Option<f32> = None;
        for indices in FACE_CORNER_INDICES {
            let face = [
                corners[indices[0]],
                corners[indices[1]],
                corners[indices[2]],
                corners[indices[3]],
            ];
            if let Some(distance) = collision::segment_face_intersection(start, end, &face) {
                if nearest.map_or(true, |best| distance < best) {
                    nearest = Some(distance);
                }
            }
        }
        nearest
    }
}

impl fmt::Display for SpatialEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        let axis = self
            .orientation
            .axis()
            .map_or_else(|| Vec3::new(0.0, 0.0, -1.0), |a| a.into_inner());
        write!(
            f,
            "[{:?}]: {{{}}}, {{p: ({}, {}, {}), o: {{{}, ({}, {}, {})}}, s: ({}, {}, {})}}",
            self.id,
            tags.join(", "),
            self.position.x,
            self.position.y,
            self.position.z,
            self.orientation.angle(),
            axis.x,
            axis.y,
            axis.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
        )
    }
}
