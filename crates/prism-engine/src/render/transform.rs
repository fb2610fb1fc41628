use glam::{Mat4, Vec3};

/// Perspective camera looking down -Z at an object `distance` units away.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view, radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
            distance: 6.0,
        }
    }
}

impl Camera {
    /// Aspect ratio of a drawable; a zero-height drawable counts as square.
    pub fn aspect(width: u32, height: u32) -> f32 {
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    /// OpenGL-convention projection (clip depth in [-1, 1]).
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, aspect, self.near, self.far)
    }
}

/// Rotation rates per axis, as multiples of the base rotation angle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spin {
    pub z: f32,
    pub y: f32,
    pub x: f32,
}

impl Default for Spin {
    fn default() -> Self {
        Self {
            z: 1.0,
            y: 0.7,
            x: 0.3,
        }
    }
}

/// Object-to-camera transform for the given base rotation.
pub fn model_view(camera: &Camera, spin: &Spin, rotation: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -camera.distance))
        * Mat4::from_rotation_z(rotation * spin.z)
        * Mat4::from_rotation_y(rotation * spin.y)
        * Mat4::from_rotation_x(rotation * spin.x)
}

pub fn normal_matrix(model_view: &Mat4) -> Mat4 {
    model_view.inverse().transpose()
}

/// Per-renderer animation state.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RenderState {
    /// Base rotation angle, radians.
    pub rotation: f32,
}

impl RenderState {
    /// Advances the rotation at one radian per second.
    pub fn advance(&mut self, dt: f32) {
        self.rotation += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn square_projection_matches_focal_length() {
        let p = Camera::default().projection(1.0);
        let f = 1.0 / 22.5f32.to_radians().tan();
        assert!(close(p.col(0).x, f), "{}", p.col(0).x);
        assert!(close(p.col(1).y, f), "{}", p.col(1).y);
        assert!(close(f, 2.41421));
    }

    #[test]
    fn zero_height_is_square() {
        assert_eq!(Camera::aspect(800, 0), 1.0);
        assert_eq!(Camera::aspect(800, 400), 2.0);
    }

    #[test]
    fn rotation_accumulates_deltas() {
        let mut state = RenderState::default();
        for dt in [0.0, 0.016, 0.016] {
            state.advance(dt);
        }
        assert!(close(state.rotation, 0.032));
    }

    #[test]
    fn unrotated_model_view_is_a_translation() {
        let mv = model_view(&Camera::default(), &Spin::default(), 0.0);
        let origin = mv.transform_point3(Vec3::ZERO);
        assert!(close(origin.z, -6.0));
        assert_eq!(mv.col(0).x, 1.0);
    }

    #[test]
    fn normal_matrix_of_pure_rotation_is_the_rotation() {
        let mv = model_view(&Camera::default(), &Spin::default(), 1.2);
        let n = normal_matrix(&mv);
        let r = Mat4::from_mat3(glam::Mat3::from_mat4(mv));
        assert!(Mat4::from_mat3(glam::Mat3::from_mat4(n)).abs_diff_eq(r, 1e-5));
    }
}
