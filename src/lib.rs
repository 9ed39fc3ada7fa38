//! muxterm - bidirectional terminal-protocol engine
//!
//! Three cooperating layers:
//!
//! - [`core`]: VT/ANSI interpretation over a wrap-aware scrollback. Bytes
//!   from an application go in, a composed cell grid comes out.
//! - [`render`]: diffing the composed grid against the last painted frame
//!   and emitting minimal ANSI to a sink, optionally on a worker thread.
//! - [`input`]: decoding the byte stream from the controlling terminal into
//!   key, mouse, focus, and resize events.
//!
//! The layers share only the cell-grid types; each can be used alone.

pub mod config;
pub mod core;
pub mod input;
pub mod render;

pub use crate::config::Config;
pub use crate::core::cell::{Brush, Cell, Color, StyleFlags, WidthClass};
pub use crate::core::grid::Grid;
pub use crate::core::term::{CursorStyle, ResetKind, Response, Terminal};
pub use crate::input::{InputDecoder, InputEvent};
pub use crate::render::{ColorMode, DiffRenderer, RenderPump, RenderStats};
