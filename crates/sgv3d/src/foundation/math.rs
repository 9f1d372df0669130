//! Math utilities and types
//!
//! Column-vector conventions throughout: a matrix applied to a point is
//! `m * p`, so `parent * local` applies `local` first.

pub use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

/// Extension trait for Mat4 with the constructors scene code reaches for
pub trait Mat4Ext {
    /// Translation matrix
    fn translation(offset: Vec3) -> Mat4;

    /// Uniform scale matrix
    fn uniform_scale(factor: f32) -> Mat4;

    /// Non-uniform scale matrix
    fn nonuniform_scale(factors: Vec3) -> Mat4;

    /// Rotation around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Rotation around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Rotation around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Rotation of `angle` radians around an arbitrary axis
    fn rotation_axis(axis: Vec3, angle: f32) -> Mat4;

    /// OpenGL-style perspective projection (clip z in [-1, 1])
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn translation(offset: Vec3) -> Mat4 {
        Mat4::new_translation(&offset)
    }

    fn uniform_scale(factor: f32) -> Mat4 {
        Mat4::new_scaling(factor)
    }

    fn nonuniform_scale(factors: Vec3) -> Mat4 {
        Mat4::new_nonuniform_scaling(&factors)
    }

    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn rotation_axis(axis: Vec3, angle: f32) -> Mat4 {
        // A zero axis has no direction; treat it as no rotation.
        match Unit::try_new(axis, f32::EPSILON) {
            Some(axis) => Mat4::from_axis_angle(&axis, angle),
            None => Mat4::identity(),
        }
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }
}
