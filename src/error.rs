//! Error types.

use std::path::PathBuf;

/// Errors raised by the render loop and the window layer.
#[derive(Debug, thiserror::Error)]
pub enum TurntableError {
    /// The elapsed time between two frames went backwards.
    ///
    /// This signals a misbehaving clock source and is never retried.
    #[error("invariant violation: elapsed time between frames is negative ({diff_ms} ms)")]
    InvariantViolation {
        /// The offending elapsed time, in milliseconds.
        diff_ms: f64,
    },
    /// No GPU adapter, device or surface could be obtained.
    #[error("rendering is unavailable: {0}")]
    RenderingUnavailable(String),
    /// A frame was requested from a render loop that is not running.
    #[error("the render loop is not running")]
    LoopNotRunning,
    /// The window could not be created.
    #[error("failed to open the window: {0}")]
    Window(String),
}

/// Errors raised while loading an asset.
///
/// They are logged and never recovered from: a failed load leaves the
/// scene without the asset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {path}: {message}")]
    Fetch { path: PathBuf, message: String },
    #[error("invalid OBJ data at line {line}: {message}")]
    Obj { line: usize, message: String },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("cubemap face {face} is {width}x{height}, expected {expected}x{expected}")]
    CubemapFace {
        face: usize,
        width: u32,
        height: u32,
        expected: u32,
    },
    #[error("a cubemap needs 6 faces, found {found}")]
    CubemapFaceCount { found: usize },
    #[error("the loader stopped before delivering its result")]
    Abandoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_violation_reports_the_elapsed_time() {
        let err = TurntableError::InvariantViolation { diff_ms: -16.5 };
        assert!(err.to_string().contains("-16.5"));
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;

        let err = LoadError::Io {
            path: PathBuf::from("assets/monkey.obj"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("assets/monkey.obj"));
        assert!(err.source().is_some());
    }
}
