use glamx::{Mat4, Vec3};

/// Trait that all camera implementations must implement.
///
/// The render pass only reads a camera: input handlers move it between
/// frames and the next frame picks the new pose up.
pub trait Camera3d {
    /// The camera's position in world space.
    fn eye(&self) -> Vec3;

    /// The world to view space transformation.
    fn view_matrix(&self) -> Mat4;

    /// The view to clip space transformation, with wgpu's `[0, 1]` depth range.
    fn projection_matrix(&self) -> Mat4;

    /// The near and far clipping plane distances.
    fn clip_planes(&self) -> (f32, f32);

    /// The combined projection and view transformation.
    ///
    /// This matrix transforms points from world coordinates to normalized
    /// device coordinates.
    fn transformation(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The inverse of [`transformation()`](Self::transformation).
    fn inverse_transformation(&self) -> Mat4 {
        self.transformation().inverse()
    }
}
