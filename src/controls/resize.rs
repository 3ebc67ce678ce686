use crate::camera::PerspectiveCamera3d;

/// Something sized like the drawable area of the window.
pub trait Resizable {
    /// Adapts to a drawable area of `width`x`height` physical pixels.
    ///
    /// Implementations do nothing when the size did not change.
    fn resize(&mut self, width: u32, height: u32);
}

/// Keeps the camera aspect ratio and the render targets in sync with the
/// window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ResizeHandler {
    last_size: Option<(u32, u32)>,
}

impl ResizeHandler {
    pub fn new() -> Self {
        ResizeHandler::default()
    }

    /// The size of the last resize that went through.
    #[inline]
    pub fn last_size(&self) -> Option<(u32, u32)> {
        self.last_size
    }

    /// Updates `camera` and every target for a `width`x`height` window.
    ///
    /// Returns `false` without touching anything when the size is the one of
    /// the previous call. Zero-sized windows (minimized) are ignored as well.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        camera: &mut PerspectiveCamera3d,
        targets: &mut [&mut dyn Resizable],
    ) -> bool {
        if width == 0 || height == 0 || self.last_size == Some((width, height)) {
            return false;
        }

        log::debug!("resizing to {width}x{height}");
        self.last_size = Some((width, height));
        camera.set_aspect(width as f32 / height as f32);
        camera.update_projection_matrix();

        for target in targets.iter_mut() {
            target.resize(width, height);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Recorder(Vec<(u32, u32)>);

    impl Resizable for Recorder {
        fn resize(&mut self, width: u32, height: u32) {
            self.0.push((width, height));
        }
    }

    #[test]
    fn the_aspect_ratio_follows_the_window() {
        let mut camera = PerspectiveCamera3d::new(75.0, 1.0, 0.1, 1000.0);
        let mut surface = Recorder::default();

        let mut handler = ResizeHandler::new();
        assert!(handler.resize(
            1920,
            1080,
            &mut camera,
            &mut [&mut surface as &mut dyn Resizable]
        ));
        assert_relative_eq!(camera.aspect(), 16.0 / 9.0);
        assert_eq!(surface.0, vec![(1920, 1080)]);
    }

    #[test]
    fn minimized_windows_are_ignored() {
        let mut camera = PerspectiveCamera3d::new(75.0, 1.0, 0.1, 1000.0);
        let mut handler = ResizeHandler::new();
        assert!(!handler.resize(0, 600, &mut camera, &mut []));
        assert_eq!(handler.last_size(), None);
        assert_relative_eq!(camera.aspect(), 1.0);
    }
}
