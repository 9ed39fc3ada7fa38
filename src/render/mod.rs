//! Output path: frame diffing, color depth, and the render worker.

pub mod color;
pub mod diff;
pub mod pump;

pub use color::ColorMode;
pub use diff::{DiffRenderer, RenderStats};
pub use pump::RenderPump;
