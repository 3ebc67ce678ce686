//! The per-frame driver: elapsed time, update, render.

use crate::animation::FrameClock;
use crate::error::TurntableError;

/// Whether the platform can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Available,
    /// Rendering cannot happen, for the given reason.
    Unavailable(String),
}

impl<T> From<&Result<T, TurntableError>> for Capability {
    fn from(result: &Result<T, TurntableError>) -> Self {
        match result {
            Ok(_) => Capability::Available,
            Err(e) => Capability::Unavailable(e.to_string()),
        }
    }
}

/// The lifecycle of a [`RenderLoop`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoopState {
    /// [`RenderLoop::start`] was not called yet.
    #[default]
    Unstarted,
    /// Frames are being rendered.
    Running,
    /// Rendering is unavailable. Terminal.
    Degraded(String),
}

/// What a [`RenderLoop`] drives every frame.
pub trait FrameTarget {
    /// Advances the animation by `diff_ms` milliseconds.
    fn time_passed(&mut self, diff_ms: f64) -> Result<(), TurntableError>;

    /// Draws the current state.
    fn render_frame(&mut self);
}

/// Computes the time elapsed between frames and hands it to a
/// [`FrameTarget`] before each render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderLoop {
    state: LoopState,
    clock: FrameClock,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        RenderLoop::default()
    }

    #[inline]
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// The number of frames rendered so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Leaves the `Unstarted` state, for `Running` or, when the platform
    /// cannot render, the terminal `Degraded` state.
    ///
    /// Has no effect on a loop that already started.
    pub fn start(&mut self, capability: Capability) -> &LoopState {
        if self.state != LoopState::Unstarted {
            log::warn!("render loop started twice, staying {:?}", self.state);
            return &self.state;
        }

        self.state = match capability {
            Capability::Available => LoopState::Running,
            Capability::Unavailable(reason) => {
                log::error!("render loop degraded: {reason}");
                LoopState::Degraded(reason)
            }
        };
        &self.state
    }

    /// Renders the frame displayed at `now_ms`.
    ///
    /// The first frame only renders, as does a frame with no elapsed time or
    /// a NaN timestamp. A timestamp earlier than the previous frame fails
    /// with [`TurntableError::InvariantViolation`], in which case nothing is
    /// rendered and the previous timestamp is kept. Non-finite timestamps are
    /// never recorded.
    pub fn frame(&mut self, now_ms: f64, target: &mut dyn FrameTarget) -> Result<(), TurntableError> {
        if self.state != LoopState::Running {
            return Err(TurntableError::LoopNotRunning);
        }

        match self.clock.elapsed(now_ms) {
            Some(diff) if diff.is_nan() || diff == 0.0 => {}
            Some(diff) => target.time_passed(diff)?,
            None => {}
        }
        target.render_frame();

        if now_ms.is_finite() {
            self.clock.record(now_ms);
        }
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::check_elapsed;

    #[derive(Default)]
    struct Recorder {
        updates: Vec<f64>,
        renders: usize,
    }

    impl FrameTarget for Recorder {
        fn time_passed(&mut self, diff_ms: f64) -> Result<(), TurntableError> {
            check_elapsed(diff_ms)?;
            self.updates.push(diff_ms);
            Ok(())
        }

        fn render_frame(&mut self) {
            self.renders += 1;
        }
    }

    #[test]
    fn frames_need_a_started_loop() {
        let mut render_loop = RenderLoop::new();
        let mut target = Recorder::default();
        assert!(matches!(
            render_loop.frame(0.0, &mut target),
            Err(TurntableError::LoopNotRunning)
        ));
        assert_eq!(target.renders, 0);
    }

    #[test]
    fn degraded_loops_stay_degraded() {
        let mut render_loop = RenderLoop::new();
        render_loop.start(Capability::Unavailable("no adapter".to_string()));
        assert_eq!(
            render_loop.start(Capability::Available),
            &LoopState::Degraded("no adapter".to_string())
        );
        assert!(render_loop.frame(0.0, &mut Recorder::default()).is_err());
    }

    #[test]
    fn the_first_frame_skips_the_update() {
        let mut render_loop = RenderLoop::new();
        let mut target = Recorder::default();
        render_loop.start(Capability::Available);

        render_loop.frame(100.0, &mut target).unwrap();
        render_loop.frame(116.0, &mut target).unwrap();

        assert_eq!(target.updates, vec![16.0]);
        assert_eq!(target.renders, 2);
        assert_eq!(render_loop.frames(), 2);
    }

    #[test]
    fn going_back_in_time_renders_nothing() {
        let mut render_loop = RenderLoop::new();
        let mut target = Recorder::default();
        render_loop.start(Capability::Available);
        render_loop.frame(100.0, &mut target).unwrap();

        let result = render_loop.frame(90.0, &mut target);
        assert!(matches!(
            result,
            Err(TurntableError::InvariantViolation { diff_ms }) if diff_ms == -10.0
        ));
        assert_eq!(target.renders, 1);
        assert_eq!(render_loop.clock().last_frame_ms(), Some(100.0));
    }

    #[test]
    fn empty_or_nan_elapsed_times_only_render() {
        let mut render_loop = RenderLoop::new();
        let mut target = Recorder::default();
        render_loop.start(Capability::Available);

        render_loop.frame(0.0, &mut target).unwrap();
        render_loop.frame(0.0, &mut target).unwrap();
        render_loop.frame(f64::NAN, &mut target).unwrap();
        assert_eq!(render_loop.clock().last_frame_ms(), Some(0.0));
        render_loop.frame(100.0, &mut target).unwrap();

        assert_eq!(target.updates, vec![100.0]);
        assert_eq!(target.renders, 4);
    }

    #[test]
    fn capability_from_a_failed_setup() {
        let failed: Result<(), TurntableError> =
            Err(TurntableError::RenderingUnavailable("no device".to_string()));
        assert_eq!(
            Capability::from(&failed),
            Capability::Unavailable("rendering is unavailable: no device".to_string())
        );
    }
}
