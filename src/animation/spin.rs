//! The rotation applied to the showcased mesh every frame.

use crate::error::TurntableError;
use crate::scene::SceneNode3d;
use glamx::Vec3;
use std::f64::consts::{PI, TAU};

/// Rotation speed around each axis, in radians per millisecond: one full
/// turn every ten seconds.
pub const ANGULAR_SPEED: f64 = PI / 5000.0;

/// Fails on negative or non-finite elapsed times.
pub fn check_elapsed(diff_ms: f64) -> Result<(), TurntableError> {
    if !(diff_ms >= 0.0 && diff_ms.is_finite()) {
        return Err(TurntableError::InvariantViolation { diff_ms });
    }
    Ok(())
}

/// The x and y rotation angles of one mesh, in radians.
///
/// Angles accumulate without wrapping in `f64`. They are wrapped to
/// `[0, 2π)` before reaching the mesh, so the `f32` rotation keeps its
/// precision in long sessions.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spin {
    x: f64,
    y: f64,
}

impl Spin {
    pub fn new() -> Self {
        Spin::default()
    }

    /// The rotation around the x axis.
    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// The rotation around the y axis.
    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// The Euler angles to give to the mesh, wrapped to `[0, 2π)`.
    pub fn euler_angles(&self) -> Vec3 {
        Vec3::new(
            self.x.rem_euclid(TAU) as f32,
            self.y.rem_euclid(TAU) as f32,
            0.0,
        )
    }

    /// Turns both angles by `diff_ms` worth of rotation.
    pub fn advance(&mut self, diff_ms: f64) -> Result<(), TurntableError> {
        check_elapsed(diff_ms)?;
        let delta = diff_ms * ANGULAR_SPEED;
        self.x += delta;
        self.y += delta;
        Ok(())
    }

    /// Advances the rotation and applies it to `mesh`.
    ///
    /// Without a mesh nothing changes, not even the angles. Negative
    /// elapsed times fail whether or not there is a mesh.
    pub fn time_passed(
        &mut self,
        diff_ms: f64,
        mesh: Option<&mut SceneNode3d>,
    ) -> Result<(), TurntableError> {
        check_elapsed(diff_ms)?;
        let Some(mesh) = mesh else {
            return Ok(());
        };

        self.advance(diff_ms)?;
        mesh.set_rotation(self.euler_angles());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::resource::Material3d;
    use approx::assert_relative_eq;

    #[test]
    fn ten_seconds_is_a_full_turn() {
        let mut spin = Spin::new();
        spin.advance(10_000.0).unwrap();
        assert_relative_eq!(spin.x(), 2.0 * PI);
        assert_relative_eq!(spin.y(), 2.0 * PI);
    }

    #[test]
    fn both_angles_grow_by_the_same_amount() {
        let mut spin = Spin::new();
        for diff in [0.0, 16.6, 33.3, 1000.0] {
            let before = spin;
            spin.advance(diff).unwrap();
            assert_relative_eq!(spin.x() - before.x(), diff * ANGULAR_SPEED, epsilon = 1.0e-12);
            assert_relative_eq!(spin.y() - before.y(), diff * ANGULAR_SPEED, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn negative_elapsed_times_are_rejected_before_anything_else() {
        let mut spin = Spin::new();
        assert!(matches!(
            spin.time_passed(-1.0, None),
            Err(TurntableError::InvariantViolation { diff_ms }) if diff_ms == -1.0
        ));
        assert!(spin.advance(-0.5).is_err());
        assert!(spin.advance(f64::NAN).is_err());
        assert!(spin.advance(f64::INFINITY).is_err());
        assert_eq!(spin, Spin::new());
    }

    #[test]
    fn a_day_long_session_still_turns_smoothly() {
        let mut spin = Spin::new();
        spin.advance(86_400_000.0).unwrap();
        let before = spin.euler_angles();
        spin.advance(16.0).unwrap();
        let after = spin.euler_angles();

        assert!(after.x >= 0.0 && after.x < std::f32::consts::TAU);
        let step = (after.x - before.x).rem_euclid(std::f32::consts::TAU);
        assert_relative_eq!(step, (16.0 * ANGULAR_SPEED) as f32, epsilon = 1.0e-5);
        assert_relative_eq!(after.y, after.x);
    }

    #[test]
    fn the_mesh_follows_the_angles() {
        let mut spin = Spin::new();
        let mut cube = SceneNode3d::cube(1.0, 1.0, 1.0, Material3d::phong(color::WHITE));

        spin.time_passed(2500.0, Some(&mut cube)).unwrap();
        let rotation = cube.rotation();
        assert_relative_eq!(rotation.x, std::f32::consts::FRAC_PI_2, epsilon = 1.0e-6);
        assert_relative_eq!(rotation.y, std::f32::consts::FRAC_PI_2, epsilon = 1.0e-6);
        assert_relative_eq!(rotation.z, 0.0);
    }

    #[test]
    fn without_a_mesh_nothing_moves() {
        let mut spin = Spin::new();
        spin.time_passed(500.0, None).unwrap();
        assert_eq!(spin, Spin::new());
    }
}
