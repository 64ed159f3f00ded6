//! Screen selection
//!
//! The controller decides which of the seven views is active and when it
//! is redrawn. Drawing itself is done by a display backend from a
//! [`View`].

pub mod controller;
pub mod view;

pub use controller::{MessageText, ScreenController};
pub use view::View;
pub use pillex_protocol::ScreenId;
