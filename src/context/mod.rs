//! The wgpu device shared by everything that touches the GPU.

mod context;

pub use context::Context;
