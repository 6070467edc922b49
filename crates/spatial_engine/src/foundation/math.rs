//! Math utilities and types
//!
//! Provides the fundamental math types for the spatial core, plus the
//! angle and rotation helpers the entity and collision code is built on.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Unit quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;
    use std::ops::{Add, Mul, Sub};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// Linear interpolation: `start + weight * (end - start)`.
    ///
    /// Generic over scalars and vectors. The weight is not clamped to
    /// `[0, 1]`; callers interpolating time ratios clamp it themselves.
    pub fn lerp<T>(weight: f32, start: T, end: T) -> T
    where
        T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
    {
        start + (end - start) * weight
    }
}

/// Build the unit quaternion rotating by `angle` about `axis`.
///
/// The angle is taken as degrees unless `radians` is set. The axis is
/// normalized here; passing a zero-length axis is a caller error and
/// produces an unspecified rotation.
pub fn axis_angle_to_rotation(angle: f32, axis: Vec3, radians: bool) -> Quat {
    let angle = if radians { angle } else { utils::deg_to_rad(angle) };
    Quat::from_axis_angle(&Unit::new_normalize(axis), angle)
}

/// The rotation carrying `from` onto `to`.
///
/// Degenerate input (parallel or anti-parallel vectors, or a zero-length
/// vector) yields the identity rotation. True anti-parallel alignment
/// would need a half turn about some perpendicular axis; collapsing it to
/// a no-op mirrors the behavior the rest of the engine was tuned against.
pub fn aligning_rotation(from: Vec3, to: Vec3) -> Quat {
    Quat::rotation_between(&from, &to).unwrap_or_else(Quat::identity)
}
