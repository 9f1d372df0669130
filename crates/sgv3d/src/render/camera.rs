//! Free-roam camera
//!
//! Mouse deltas steer yaw/pitch, held keys move along the view basis. The
//! camera owns its view and projection matrices and writes them to whatever
//! camera uniforms the [`BindingLayout`] resolved.

use bitflags::bitflags;

use crate::foundation::math::{constants, utils, Mat4, Mat4Ext, Vec2, Vec3};
use crate::render::device::{DeviceResult, GraphicsDevice};
use crate::render::layout::BindingLayout;

bitflags! {
    /// Movement keys held this frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MoveKeys: u8 {
        /// Move against the camera up vector (q / page up)
        const DOWN = 1 << 0;
        /// Move along the view direction (w / up)
        const FORWARD = 1 << 1;
        /// Move along the camera up vector (e / page down)
        const UP = 1 << 2;
        /// Strafe left (a / left)
        const LEFT = 1 << 3;
        /// Move against the view direction (s / down)
        const BACK = 1 << 4;
        /// Strafe right (d / right)
        const RIGHT = 1 << 5;
    }
}

/// Camera steered by mouse deltas and movement keys
#[derive(Debug, Clone)]
pub struct FreeRoamCamera {
    position: Vec3,
    direction: Vec3,
    /// Yaw (x) and pitch (y) in radians
    theta: Vec2,
    look_speed: f32,
    move_speed: f32,
    projection: Mat4,
    view: Mat4,
}

impl Default for FreeRoamCamera {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl FreeRoamCamera {
    /// Camera at the origin looking down -Z
    pub fn new(look_speed: f32, move_speed: f32) -> Self {
        let mut camera = Self {
            position: Vec3::zeros(),
            direction: Vec3::zeros(),
            theta: Vec2::new(0.0, 0.0),
            look_speed,
            move_speed,
            projection: Mat4::identity(),
            view: Mat4::identity(),
        };
        camera.set_direction(Vec3::new(0.0, 0.0, -1.0));
        camera
    }

    /// Position in world space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Current view matrix
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Current projection matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Move the camera without changing where it looks
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.rebuild_view();
    }

    /// Point the camera along `direction`
    ///
    /// Yaw and pitch are re-derived so later mouse input continues from here.
    pub fn set_direction(&mut self, direction: Vec3) {
        let Some(dir) = direction.try_normalize(f32::EPSILON) else {
            log::warn!("Ignoring zero camera direction");
            return;
        };
        self.theta = Vec2::new(dir.x.atan2(dir.z), dir.y.clamp(-1.0, 1.0).asin());
        self.direction = dir;
        self.rebuild_view();
    }

    /// Perspective projection from a vertical field of view in degrees
    pub fn set_projection(&mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Mat4::perspective(utils::deg_to_rad(fov_degrees), aspect, near, far);
    }

    /// Apply one frame of mouse look and key movement
    pub fn update(&mut self, mouse: Vec2, keys: MoveKeys, dt: f32) {
        self.theta += mouse * (self.look_speed * dt);
        // Stop short of the poles so the right vector stays defined
        let limit = constants::HALF_PI - 1e-3;
        self.theta.y = self.theta.y.clamp(-limit, limit);
        self.direction = direction_from(self.theta);

        let right = self.right();
        let up = right.cross(&self.direction);

        let mut movement = Vec3::zeros();
        for (key, step) in [
            (MoveKeys::DOWN, -up),
            (MoveKeys::FORWARD, self.direction),
            (MoveKeys::UP, up),
            (MoveKeys::LEFT, -right),
            (MoveKeys::BACK, -self.direction),
            (MoveKeys::RIGHT, right),
        ] {
            if keys.contains(key) {
                movement += step;
            }
        }

        self.position += movement * (self.move_speed * dt);
        self.rebuild_view();
    }

    /// Write camera uniforms the layout resolved; others are skipped
    pub fn upload_uniforms(&self, device: &mut dyn GraphicsDevice, layout: &BindingLayout) -> DeviceResult<()> {
        if let Some(location) = layout.camera_position {
            device.set_uniform_vec3(location, &self.position)?;
        }
        if let Some(location) = layout.camera_direction {
            device.set_uniform_vec3(location, &self.direction)?;
        }
        if let Some(location) = layout.projection {
            device.set_uniform_mat4(location, &self.projection)?;
        }
        if let Some(location) = layout.view {
            device.set_uniform_mat4(location, &self.view)?;
        }
        Ok(())
    }

    fn right(&self) -> Vec3 {
        let yaw = self.theta.x - constants::HALF_PI;
        Vec3::new(yaw.sin(), 0.0, yaw.cos())
    }

    fn rebuild_view(&mut self) {
        let up = self.right().cross(&self.direction);
        self.view = Mat4::look_at(self.position, self.position + self.direction, up);
    }
}

fn direction_from(theta: Vec2) -> Vec3 {
    Vec3::new(
        theta.y.cos() * theta.x.sin(),
        theta.y.sin(),
        theta.y.cos() * theta.x.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = FreeRoamCamera::default();
        assert_relative_eq!(camera.direction(), Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);

        // A point straight ahead lands on the view axis
        let p = camera.view().transform_point(&Point3::new(0.0, 0.0, -5.0));
        assert_relative_eq!(p, Point3::new(0.0, 0.0, -5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_forward_key_moves_along_direction() {
        let mut camera = FreeRoamCamera::new(1.0, 2.0);
        camera.update(Vec2::zeros(), MoveKeys::FORWARD, 0.5);
        assert_relative_eq!(camera.position(), Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut camera = FreeRoamCamera::default();
        camera.update(Vec2::zeros(), MoveKeys::LEFT | MoveKeys::RIGHT | MoveKeys::UP | MoveKeys::DOWN, 1.0);
        assert_relative_eq!(camera.position(), Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_set_direction_round_trips_through_angles() {
        let mut camera = FreeRoamCamera::default();
        let dir = Vec3::new(1.0, 0.5, -1.0).normalize();
        camera.set_direction(dir);
        camera.update(Vec2::zeros(), MoveKeys::empty(), 0.016);
        assert_relative_eq!(camera.direction(), dir, epsilon = EPSILON);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = FreeRoamCamera::default();
        camera.update(Vec2::new(0.0, 100.0), MoveKeys::empty(), 1.0);
        assert!(camera.direction().y < 1.0);
        assert!(camera.view().iter().all(|v| v.is_finite()));
    }
}
