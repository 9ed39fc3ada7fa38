//! Core terminal model.
//!
//! The data path runs bottom-up:
//!
//! ```text
//! Terminal
//! ├── VtParser (escape-sequence grammar)
//! └── Interp (command dispatch)
//!     └── Store ×2 (primary + alternate screens)
//!         └── Line (logical lines, wrap-aware)
//!             └── Grid / Cell (dense cell runs)
//! ```

pub mod cell;
pub mod grid;
pub mod line;
pub mod scrollback;
pub mod term;
