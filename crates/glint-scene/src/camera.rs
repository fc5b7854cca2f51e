//! Camera projection and view matrices.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Holds the current projection and view matrices.
///
/// Projections are built for Vulkan conventions: depth range 0..1 and a
/// flipped Y axis.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    projection: Mat4,
    view: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        let mut proj = Mat4::perspective_rh(fov_y, aspect, near, far);
        proj.y_axis.y *= -1.0;
        self.projection = proj;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) {
        let mut proj = Mat4::orthographic_rh(left, right, bottom, top, near, far);
        proj.y_axis.y *= -1.0;
        self.projection = proj;
    }

    /// Look from `eye` toward `target`.
    pub fn set_view_target(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.view = Mat4::look_at_rh(eye, target, up);
    }

    /// View from a position and Y-X-Z Euler rotation, matching
    /// [`Transform`](crate::Transform) semantics.
    pub fn set_view_yxz(&mut self, position: Vec3, rotation: Vec3) {
        let orientation = Quat::from_euler(EulerRot::YXZ, rotation.y, rotation.x, rotation.z);
        self.view = Mat4::from_rotation_translation(orientation, position).inverse();
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Combined projection * view.
    pub fn projection_view(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn perspective_flips_y() {
        let mut camera = Camera::new();
        camera.set_perspective(60f32.to_radians(), 1.0, 0.1, 100.0);
        assert!(camera.projection().y_axis.y < 0.0);
    }

    #[test]
    fn identity_view_by_default() {
        let camera = Camera::new();
        assert_eq!(camera.view(), Mat4::IDENTITY);
        assert_eq!(camera.projection_view(), Mat4::IDENTITY);
    }

    #[test]
    fn view_yxz_with_zero_rotation_inverts_translation() {
        let mut camera = Camera::new();
        camera.set_view_yxz(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let origin_in_view = camera.view().transform_point3(Vec3::ZERO);
        assert_vec3_eq(origin_in_view, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn view_target_centers_the_target() {
        let mut camera = Camera::new();
        camera.set_view_target(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let target_in_view = camera.view().transform_point3(Vec3::ZERO);
        assert_vec3_eq(target_in_view, Vec3::new(0.0, 0.0, -3.0));
    }

    #[test]
    fn projection_view_applies_view_first() {
        let mut camera = Camera::new();
        camera.set_perspective(60f32.to_radians(), 1.0, 0.1, 100.0);
        camera.set_view_yxz(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO);
        // A point straight ahead of the camera projects to the center.
        let clip = camera.projection_view() * Vec3::ZERO.extend(1.0);
        assert!(clip.x.abs() < EPS);
        assert!(clip.y.abs() < EPS);
        assert!(clip.w > 0.0);
    }
}
