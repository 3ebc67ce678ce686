/// The timestamp of the previously rendered frame.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    /// A clock that has not seen any frame.
    pub fn new() -> Self {
        FrameClock { last_ms: None }
    }

    /// When the last frame was rendered, in milliseconds.
    #[inline]
    pub fn last_frame_ms(&self) -> Option<f64> {
        self.last_ms
    }

    /// Milliseconds between the last frame and `now_ms`, or `None` on the
    /// first frame.
    pub fn elapsed(&self, now_ms: f64) -> Option<f64> {
        self.last_ms.map(|last| now_ms - last)
    }

    /// Marks `now_ms` as the time of the last frame.
    pub fn record(&mut self, now_ms: f64) {
        self.last_ms = Some(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_first_frame_has_no_elapsed_time() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.elapsed(16.0), None);

        clock.record(16.0);
        assert_eq!(clock.elapsed(48.5), Some(32.5));
        assert_eq!(clock.last_frame_ms(), Some(16.0));
    }
}
