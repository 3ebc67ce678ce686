use crate::camera::PerspectiveCamera3d;
use glamx::Vec3;

/// Places the camera on a plane facing the scene according to the cursor
/// position, and keeps it aimed at the origin.
///
/// Both cursor coordinates are normalized by the viewport **width**, so on a
/// landscape viewport the vertical range is narrower than `[-1, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CursorOrbit {
    target: Vec3,
}

impl CursorOrbit {
    /// A controller aiming at the world origin.
    pub fn new() -> Self {
        CursorOrbit { target: Vec3::ZERO }
    }

    /// The point the camera is re-aimed at after every move.
    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// The camera `(x, y)` for a cursor at `(x, y)` pixels on a viewport
    /// `viewport_width` pixels wide.
    pub fn camera_xy(x: f64, y: f64, viewport_width: u32) -> (f32, f32) {
        let w = viewport_width.max(1) as f64;
        let half = w / 2.0;
        (
            (((x - half) / w) * 2.0) as f32,
            (-((y - half) / w) * 2.0) as f32,
        )
    }

    /// Moves the camera for a cursor at `(x, y)` pixels.
    ///
    /// Positions with a negative coordinate are ignored. The camera keeps its
    /// depth. Returns whether the camera moved.
    pub fn cursor_moved(
        &self,
        x: f64,
        y: f64,
        viewport_width: u32,
        camera: &mut PerspectiveCamera3d,
    ) -> bool {
        if x < 0.0 || y < 0.0 {
            return false;
        }

        let (cx, cy) = Self::camera_xy(x, y, viewport_width);
        let z = camera.position().z;
        camera.set_position(Vec3::new(cx, cy, z));
        camera.look_at(self.target);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> PerspectiveCamera3d {
        let mut camera = PerspectiveCamera3d::new(75.0, 4.0 / 3.0, 0.1, 1000.0);
        camera.set_position(Vec3::new(0.0, 0.0, 5.0));
        camera
    }

    #[test]
    fn the_vertical_axis_is_normalized_by_the_width() {
        // Halfway down a 800x600 viewport is still above the center line.
        let (x, y) = CursorOrbit::camera_xy(400.0, 300.0, 800);
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 0.25);
    }

    #[test]
    fn negative_positions_leave_the_camera_alone() {
        let mut camera = camera();
        let before = camera;
        assert!(!CursorOrbit::new().cursor_moved(-1.0, 20.0, 800, &mut camera));
        assert!(!CursorOrbit::new().cursor_moved(20.0, -0.5, 800, &mut camera));
        assert_eq!(camera, before);
    }

    #[test]
    fn moved_cameras_keep_their_depth_and_face_the_origin() {
        let mut camera = camera();
        assert!(CursorOrbit::new().cursor_moved(800.0, 0.0, 800, &mut camera));

        let position = camera.position();
        assert_relative_eq!(position.x, 1.0);
        assert_relative_eq!(position.y, 1.0);
        assert_relative_eq!(position.z, 5.0);

        let expected = (-position).normalize();
        assert_relative_eq!(camera.forward().dot(expected), 1.0, epsilon = 1.0e-5);
    }
}
