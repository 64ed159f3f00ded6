//! Front-panel input

pub mod buttons;

pub use buttons::{sample, ButtonChannel, ButtonController, ButtonEvent, ButtonEventKind, BUTTON_COUNT};
