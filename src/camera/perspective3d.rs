use crate::camera::Camera3d;
use glamx::{Mat4, Quat, Vec3};

/// A perspective camera with an explicit position and orientation.
///
/// Moving the camera does not re-aim it: like a physical camera it keeps
/// looking in the same direction until [`look_at`](Self::look_at) is called.
/// A freshly created camera looks down the negative Z axis.
///
/// The projection is cached and only recomputed by
/// [`update_projection_matrix`](Self::update_projection_matrix), so changing
/// the aspect ratio or the field of view takes effect once that is called.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerspectiveCamera3d {
    fov_y: f32,
    aspect: f32,
    znear: f32,
    zfar: f32,
    position: Vec3,
    orientation: Quat,
    up: Vec3,
    proj: Mat4,
}

impl PerspectiveCamera3d {
    /// Creates a camera at the origin.
    ///
    /// # Arguments
    /// * `fov_y_degrees` - Vertical field of view, in degrees
    /// * `aspect` - Width over height of the viewport
    /// * `znear` - Distance of the near clipping plane
    /// * `zfar` - Distance of the far clipping plane
    pub fn new(fov_y_degrees: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        let mut camera = PerspectiveCamera3d {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            znear,
            zfar,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            up: Vec3::Y,
            proj: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// The vertical field of view, in degrees.
    pub fn fov_y_degrees(&self) -> f32 {
        self.fov_y.to_degrees()
    }

    /// Width over height of the viewport.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Sets the aspect ratio. Call
    /// [`update_projection_matrix`](Self::update_projection_matrix) afterwards.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Recomputes the cached projection from the field of view, aspect ratio
    /// and clipping planes.
    pub fn update_projection_matrix(&mut self) {
        let aspect = if self.aspect.is_finite() && self.aspect > 0.0 {
            self.aspect
        } else {
            1.0
        };
        self.proj = Mat4::perspective_rh(self.fov_y, aspect, self.znear, self.zfar);
    }

    /// The camera position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Moves the camera without changing where it looks.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// The camera orientation.
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// The direction the camera looks at.
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Rotates the camera so that it faces `target`.
    ///
    /// Does nothing if `target` is the camera position.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() <= f32::EPSILON {
            return;
        }

        // Pick another up vector when looking straight along it.
        let up = if dir.normalize().cross(self.up).length_squared() <= 1.0e-8 {
            Vec3::Z
        } else {
            self.up
        };

        let view = Mat4::look_at_rh(self.position, target, up);
        self.orientation = Quat::from_mat4(&view.inverse()).normalize();
    }
}

impl Camera3d for PerspectiveCamera3d {
    fn eye(&self) -> Vec3 {
        self.position
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    fn projection_matrix(&self) -> Mat4 {
        self.proj
    }

    fn clip_planes(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }
}
