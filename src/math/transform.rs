use glam::{EulerRot, Mat4, Quat, Vec3};

/// Quaternion for Euler angles applied in XYZ order (intrinsic)
pub fn euler_to_quat(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
}

pub fn quat_to_euler(rotation: Quat) -> Vec3 {
    let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
    Vec3::new(x, y, z)
}

/// Local transform matrix: translation * rotation * scale
pub fn compose_trs(translation: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, euler_to_quat(rotation), translation)
}

/// Split a column-major matrix into translation, Euler XYZ rotation and scale
pub fn decompose_trs(matrix: &[[f32; 4]; 4]) -> (Vec3, Vec3, Vec3) {
    let (scale, rotation, translation) =
        Mat4::from_cols_array_2d(matrix).to_scale_rotation_translation();
    (translation, quat_to_euler(rotation), scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_identity() {
        let m = compose_trs(Vec3::ZERO, Vec3::ZERO, Vec3::ONE);
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_yaw_rotates_forward_axis() {
        let m = compose_trs(Vec3::ZERO, Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0), Vec3::ONE);
        let rotated = m.transform_vector3(Vec3::Z);
        assert!(rotated.abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_decompose_recovers_components() {
        let translation = Vec3::new(1.0, 2.0, 3.0);
        let rotation = Vec3::new(0.1, 0.4, -0.2);
        let scale = Vec3::new(2.0, 2.0, 2.0);
        let matrix = compose_trs(translation, rotation, scale).to_cols_array_2d();

        let (t, r, s) = decompose_trs(&matrix);
        assert!(t.abs_diff_eq(translation, 1e-5));
        assert!(r.abs_diff_eq(rotation, 1e-4));
        assert!(s.abs_diff_eq(scale, 1e-5));
    }
}
