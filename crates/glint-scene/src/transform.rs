//! Object transforms.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Translation, rotation, and scale of a scene object.
///
/// Rotation is stored as Tait-Bryan angles applied in Y-X-Z order
/// (yaw, then pitch, then roll).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub scale: Vec3,
    pub rotation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        )
    }

    /// Local-to-world matrix: translate * rotate(YXZ) * scale.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.translation)
    }

    /// Inverse-transpose of the upper 3x3, for transforming normals under
    /// non-uniform scale.
    pub fn normal_matrix(&self) -> Mat4 {
        let inv_scale = Vec3::ONE / self.scale;
        let normal = Mat3::from_quat(self.quat()) * Mat3::from_diagonal(inv_scale);
        Mat4::from_mat3(normal)
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
    fn identity_transform_is_identity_matrix() {
        let transform = Transform::new();
        let m = transform.matrix().to_cols_array();
        let id = Mat4::IDENTITY.to_cols_array();
        for (a, b) in m.iter().zip(id.iter()) {
            assert!((a - b).abs() < EPS);
        }
    }

    #[test]
    fn translation_lands_in_last_column() {
        let transform = Transform::new().with_translation(Vec3::new(1.0, 2.0, 3.0));
        let m = transform.matrix();
        assert_vec3_eq(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn yaw_rotates_x_toward_negative_z() {
        let transform = Transform::new().with_rotation(Vec3::new(
            0.0,
            std::f32::consts::FRAC_PI_2,
            0.0,
        ));
        let rotated = transform.matrix().transform_vector3(Vec3::X);
        assert_vec3_eq(rotated, Vec3::NEG_Z);
    }

    #[test]
    fn scale_is_applied_before_rotation() {
        let transform = Transform::new()
            .with_scale(Vec3::new(2.0, 1.0, 1.0))
            .with_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let rotated = transform.matrix().transform_vector3(Vec3::X);
        assert_vec3_eq(rotated, Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn normal_matrix_inverts_nonuniform_scale() {
        let transform = Transform::new().with_scale(Vec3::new(2.0, 4.0, 1.0));
        let n = transform.normal_matrix();
        assert_vec3_eq(n.transform_vector3(Vec3::X), Vec3::new(0.5, 0.0, 0.0));
        assert_vec3_eq(n.transform_vector3(Vec3::Y), Vec3::new(0.0, 0.25, 0.0));
    }

    #[test]
    fn normal_matrix_matches_rotation_for_uniform_scale() {
        let transform = Transform::new().with_rotation(Vec3::new(0.3, 0.7, 0.1));
        let m = transform.matrix();
        let n = transform.normal_matrix();
        let v = Vec3::new(0.2, -0.5, 0.8).normalize();
        assert_vec3_eq(n.transform_vector3(v), m.transform_vector3(v));
    }
}
