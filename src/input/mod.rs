//! Inbound event stream: wire decoding and the event model.

pub mod decoder;
pub mod event;

pub use decoder::InputDecoder;
pub use event::{vk, Buttons, InputEvent, Mods};
