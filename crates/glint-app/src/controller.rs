//! Keyboard camera controller.

use glam::Vec3;

use glint_platform::{InputState, KeyCode};
use glint_scene::Transform;

const TWO_PI: f32 = std::f32::consts::TAU;

/// Moves a camera pose with WASD/QE and the arrow keys.
///
/// Movement stays in the horizontal plane defined by the current yaw;
/// pitch is clamped so the view cannot flip over.
pub struct CameraController {
    pub move_speed: f32,
    pub look_speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            look_speed: 1.5,
        }
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, input: &InputState, dt: f32, pose: &mut Transform) {
        let mut rotate = Vec3::ZERO;
        if input.is_pressed(KeyCode::ArrowLeft) {
            rotate.y += 1.0;
        }
        if input.is_pressed(KeyCode::ArrowRight) {
            rotate.y -= 1.0;
        }
        if input.is_pressed(KeyCode::ArrowUp) {
            rotate.x += 1.0;
        }
        if input.is_pressed(KeyCode::ArrowDown) {
            rotate.x -= 1.0;
        }

        if rotate.length_squared() > f32::EPSILON {
            pose.rotation += self.look_speed * dt * rotate.normalize();
        }
        pose.rotation.x = pose.rotation.x.clamp(-1.5, 1.5);
        pose.rotation.y = pose.rotation.y.rem_euclid(TWO_PI);

        let yaw = pose.rotation.y;
        let forward = Vec3::new(-yaw.sin(), 0.0, -yaw.cos());
        let right = Vec3::new(-forward.z, 0.0, forward.x);
        let up = Vec3::Y;

        let mut movement = Vec3::ZERO;
        if input.is_pressed(KeyCode::KeyW) {
            movement += forward;
        }
        if input.is_pressed(KeyCode::KeyS) {
            movement -= forward;
        }
        if input.is_pressed(KeyCode::KeyD) {
            movement += right;
        }
        if input.is_pressed(KeyCode::KeyA) {
            movement -= right;
        }
        if input.is_pressed(KeyCode::KeyE) {
            movement += up;
        }
        if input.is_pressed(KeyCode::KeyQ) {
            movement -= up;
        }

        if movement.length_squared() > f32::EPSILON {
            pose.translation += self.move_speed * dt * movement.normalize();
        }
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
    fn forward_at_zero_yaw_is_negative_z() {
        let controller = CameraController::new();
        let mut input = InputState::new();
        input.press(KeyCode::KeyW);

        let mut pose = Transform::default();
        controller.update(&input, 1.0, &mut pose);
        assert_vec3_eq(pose.translation, Vec3::new(0.0, 0.0, -controller.move_speed));
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let controller = CameraController::new();
        let mut input = InputState::new();
        input.press(KeyCode::KeyW);
        input.press(KeyCode::KeyD);

        let mut pose = Transform::default();
        controller.update(&input, 1.0, &mut pose);
        assert!((pose.translation.length() - controller.move_speed).abs() < EPS);
    }

    #[test]
    fn pitch_is_clamped() {
        let controller = CameraController::new();
        let mut input = InputState::new();
        input.press(KeyCode::ArrowUp);

        let mut pose = Transform::default();
        for _ in 0..100 {
            controller.update(&input, 0.1, &mut pose);
        }
        assert!(pose.rotation.x <= 1.5 + EPS);
    }

    #[test]
    fn yaw_wraps_into_one_turn() {
        let controller = CameraController::new();
        let mut input = InputState::new();
        input.press(KeyCode::ArrowLeft);

        let mut pose = Transform::default();
        for _ in 0..100 {
            controller.update(&input, 0.5, &mut pose);
        }
        assert!(pose.rotation.y >= 0.0);
        assert!(pose.rotation.y < TWO_PI);
    }

    #[test]
    fn no_input_leaves_pose_unchanged() {
        let controller = CameraController::new();
        let input = InputState::new();
        let mut pose = Transform::default().with_translation(Vec3::new(1.0, 2.0, 3.0));
        controller.update(&input, 0.5, &mut pose);
        assert_vec3_eq(pose.translation, Vec3::new(1.0, 2.0, 3.0));
    }
}
