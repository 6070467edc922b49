//! Oriented-box collision and segment-intersection algorithms
//!
//! The narrow-phase core of the engine. Everything here works on plain
//! corner sets so it can be driven both by a single entity pair and by
//! the scene registry's query loops.
//!
//! # Key operations
//!
//! - [`boxes_intersect`] - separating-axis test over two boxes' corners
//! - [`segment_face_intersection`] - line segment vs. one box face
//! - [`point_in_box`] - cheap cube test used as the broad phase
//!
//! The SAT here tests the six corner-derived edge axes only (three per
//! box); the nine edge-cross axes of a full OBB test are deliberately
//! omitted to match the engine's established collision behavior.

use crate::foundation::math::{aligning_rotation, Vec3};

/// Number of corners on a bounding box.
pub const NUM_BOX_CORNERS: usize = 8;

/// Smallest hit distance a segment cast will report. Hits closer than
/// this are treated as touching the ray origin and discarded.
pub const MIN_HIT_DISTANCE: f32 = 0.01;

const EPSILON: f32 = 1e-6;

/// Corner indices of the six box faces, each an ordered quad into the
/// array produced by [`BoundingBox::corners`].
pub const FACE_CORNER_INDICES: [[usize; 4]; 6] = [
    [0, 1, 3, 6],
    [0, 3, 5, 2],
    [2, 5, 4, 7],
    [1, 6, 4, 7],
    [0, 2, 1, 7],
    [3, 5, 4, 6],
];

/// Axis-aligned extents in an entity's local (unscaled, unrotated) space.
///
/// A zero-volume box is legal and means "no collision geometry yet";
/// every query against it simply reports no contact of interest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Componentwise minimum corner.
    pub min: Vec3,
    /// Componentwise maximum corner. Must dominate `min` componentwise.
    pub max: Vec3,
    /// Treat the box as world-axis-aligned: skip the owning entity's
    /// orientation when generating world-space corners.
    pub axis_aligned: bool,
}

impl BoundingBox {
    /// Create a body-aligned box from local extents.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            axis_aligned: false,
        }
    }

    /// The degenerate zero-volume box used before real extents are known.
    pub fn empty() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros())
    }

    /// Whether this box encloses no volume at all.
    pub fn is_empty(&self) -> bool {
        self.min == self.max
    }

    /// The eight local-space corners, in the stable order the SAT and
    /// face tables rely on: min, +x, +z, +y, max, +y+z, +x+y, +x+z.
    pub fn corners(&self) -> [Vec3; NUM_BOX_CORNERS] {
        [
            self.min,
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            self.max,
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Project `points` onto `axis` and return the covered `(min, max)`
/// interval. The axis should be unit length for distances to be metric,
/// but interval comparisons only need consistent scaling.
pub fn min_max_on_axis(axis: Vec3, points: &[Vec3]) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for point in points {
        let projected = axis.dot(point);
        min = min.min(projected);
        max = max.max(projected);
    }
    (min, max)
}

/// Separating-axis test between two boxes given as world-space corner
/// sets in the [`BoundingBox::corners`] order.
///
/// Candidate axes are each box's three edge directions out of corner 0.
/// The test returns false as soon as one axis separates the projected
/// intervals; degenerate (zero-length) edges are skipped, so a
/// zero-volume box never separates anything by itself.
pub fn boxes_intersect(a: &[Vec3; NUM_BOX_CORNERS], b: &[Vec3; NUM_BOX_CORNERS]) -> bool {
    let axes = [
        a[0] - a[1],
        a[0] - a[2],
        a[0] - a[3],
        b[0] - b[1],
        b[0] - b[2],
        b[0] - b[3],
    ];

    for axis in axes {
        let length = axis.norm();
        if length < EPSILON {
            continue;
        }
        let axis = axis / length;

        let (a_min, a_max) = min_max_on_axis(axis, a);
        let (b_min, b_max) = min_max_on_axis(axis, b);

        if (a_min > b_max && a_min > b_min) || (a_max < b_max && a_max < b_min) {
            return false;
        }
    }

    true
}

/// Intersect the segment `start..end` with one box face given as an
/// ordered quad of world-space corners.
///
/// The segment is rotated so its direction lies along +Z with `start` at
/// the origin, the face is spun about Z so one edge lies along X, and
/// the four corners must then cover all four XY quadrants around the
/// origin (a coarse convex-quad containment test). The hit distance
/// comes from the face's own plane equation in the segment-aligned
/// frame. Returns `None` for misses, degenerate (zero-area or edge-on)
/// faces, and hits outside `[MIN_HIT_DISTANCE, segment length]`.
pub fn segment_face_intersection(start: Vec3, end: Vec3, face: &[Vec3; 4]) -> Option<f32> {
    let direction = end - start;
    let length = direction.norm();
    if length < EPSILON {
        return None;
    }

    // Face corners in the segment-aligned frame: ray origin at (0, 0, 0),
    // ray direction along +Z.
    let to_z = aligning_rotation(direction / length, Vec3::z());
    let local = [
        to_z * (face[0] - start),
        to_z * (face[1] - start),
        to_z * (face[2] - start),
        to_z * (face[3] - start),
    ];

    // Plane normal from the face's own edges. A zero Z component means
    // the face is degenerate or edge-on to the segment.
    let normal = (local[1] - local[0]).cross(&(local[2] - local[0]));
    if normal.z.abs() < EPSILON {
        return None;
    }

    // Spin about Z so the first face edge lies along X; the quadrant
    // check below assumes the quad is axis-aligned in 2D.
    let edge = local[1] - local[0];
    let spin = aligning_rotation(Vec3::new(edge.x, edge.y, 0.0), Vec3::x());

    let mut quadrants = [false; 4];
    for corner in &local {
        let spun = spin * *corner;
        let quadrant = usize::from(spun.x >= 0.0) | (usize::from(spun.y >= 0.0) << 1);
        quadrants[quadrant] = true;
    }
    if quadrants.iter().any(|covered| !covered) {
        return None;
    }

    // The segment is the Z axis here, so the plane crossing is at
    // z = (n . p0) / n.z. The spin preserves Z, so either frame works.
    let distance = normal.dot(&local[0]) / normal.z;
    if (MIN_HIT_DISTANCE..=length).contains(&distance) {
        Some(distance)
    } else {
        None
    }
}

/// Broad-phase test: is `point` inside the axis-aligned cube of
/// half-extent `half_extent` centered on `center`?
pub fn point_in_box(point: Vec3, center: Vec3, half_extent: f32) -> bool {
    let offset = point - center;
    offset.x.abs() <= half_extent && offset.y.abs() <= half_extent && offset.z.abs() <= half_extent
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::axis_angle_to_rotation;

    const EPSILON: f32 = 1e-5;

    fn unit_box_corners_at(position: Vec3) -> [Vec3; NUM_BOX_CORNERS] {
        let bounds = BoundingBox::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let mut corners = bounds.corners();
        for corner in &mut corners {
            *corner += position;
        }
        corners
    }

    #[test]
    fn test_corner_order_is_stable() {
        let bounds = BoundingBox::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let corners = bounds.corners();
        assert_eq!(corners, bounds.corners());
        assert_eq!(corners[0], bounds.min);
        assert_eq!(corners[4], bounds.max);
        // Corners 1..3 step one axis each off the min corner
        assert_eq!(corners[1], Vec3::new(1.0, -2.0, -3.0));
        assert_eq!(corners[2], Vec3::new(-1.0, -2.0, 3.0));
        assert_eq!(corners[3], Vec3::new(-1.0, 2.0, -3.0));
    }

    #[test]
    fn test_min_max_on_axis() {
        let points = [
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(3.0, 5.0, -2.0),
            Vec3::new(0.5, -4.0, 1.0),
        ];
        let (min, max) = min_max_on_axis(Vec3::x(), &points);
        assert_relative_eq!(min, -1.0, epsilon = EPSILON);
        assert_relative_eq!(max, 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_boxes_intersect_overlap_and_separation() {
        let at_origin = unit_box_corners_at(Vec3::zeros());
        let overlapping = unit_box_corners_at(Vec3::new(1.5, 0.0, 0.0));
        let separated = unit_box_corners_at(Vec3::new(10.0, 0.0, 0.0));

        assert!(boxes_intersect(&at_origin, &overlapping));
        assert!(!boxes_intersect(&at_origin, &separated));
        // Symmetry
        assert!(boxes_intersect(&overlapping, &at_origin));
        assert!(!boxes_intersect(&separated, &at_origin));
    }

    #[test]
    fn test_boxes_intersect_degenerate_box_never_separates() {
        let at_origin = unit_box_corners_at(Vec3::zeros());
        let degenerate = [Vec3::new(0.5, 0.5, 0.5); NUM_BOX_CORNERS];
        // All axes are skipped, so the test falls through to "intersecting"
        assert!(boxes_intersect(&at_origin, &degenerate));
    }

    #[test]
    fn test_segment_face_hit_distance() {
        let face = [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ];
        let hit = segment_face_intersection(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0), &face);
        assert_relative_eq!(hit.unwrap(), 5.0, epsilon = EPSILON);
    }

    #[test]
    fn test_segment_face_hit_rotated_quad() {
        // A quad spun 45 degrees about the ray axis must still register;
        // the edge-alignment spin squares it back up before the quadrant
        // coverage check.
        let spin = axis_angle_to_rotation(45.0, Vec3::z(), false);
        let face = [
            spin * Vec3::new(-1.0, -1.0, 2.0),
            spin * Vec3::new(1.0, -1.0, 2.0),
            spin * Vec3::new(1.0, 1.0, 2.0),
            spin * Vec3::new(-1.0, 1.0, 2.0),
        ];
        let hit = segment_face_intersection(Vec3::zeros(), Vec3::new(0.0, 0.0, 4.0), &face);
        assert_relative_eq!(hit.unwrap(), 2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_segment_face_miss() {
        let face = [
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(3.0, -1.0, 0.0),
            Vec3::new(3.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        let hit = segment_face_intersection(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0), &face);
        assert_eq!(hit, None);
    }

    #[test]
    fn test_segment_face_beyond_segment_end() {
        let face = [
            Vec3::new(-1.0, -1.0, 20.0),
            Vec3::new(1.0, -1.0, 20.0),
            Vec3::new(1.0, 1.0, 20.0),
            Vec3::new(-1.0, 1.0, 20.0),
        ];
        let hit = segment_face_intersection(Vec3::zeros(), Vec3::new(0.0, 0.0, 5.0), &face);
        assert_eq!(hit, None);
    }

    #[test]
    fn test_segment_face_degenerate_face_is_no_hit() {
        // All four corners collinear: zero-area face, guarded division
        let face = [
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(2.0, 0.0, 1.0),
        ];
        let hit = segment_face_intersection(Vec3::zeros(), Vec3::new(0.0, 0.0, 5.0), &face);
        assert_eq!(hit, None);
    }

    #[test]
    fn test_segment_face_edge_on_face_is_no_hit() {
        // Face parallel to the segment direction
        let face = [
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
        ];
        let hit = segment_face_intersection(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0), &face);
        assert_eq!(hit, None);
    }

    #[test]
    fn test_point_in_box() {
        let center = Vec3::new(1.0, 1.0, 1.0);
        assert!(point_in_box(Vec3::new(2.0, 0.5, 1.5), center, 2.0));
        assert!(point_in_box(Vec3::new(3.0, 1.0, 1.0), center, 2.0));
        assert!(!point_in_box(Vec3::new(3.1, 1.0, 1.0), center, 2.0));
    }
}
