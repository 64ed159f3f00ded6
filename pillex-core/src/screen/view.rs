//! Render snapshots handed to the display

use crate::clock::TimeOfDay;

/// Everything a backend needs to draw the active screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum View<'a> {
    /// Animated busy indicator; `frame` advances on every redraw
    Loading { frame: u32 },
    /// Large clock
    Time(TimeOfDay),
    /// Host-provided text
    Message(&'a str),
    /// Error code
    Error(i32),
    TakePill,
    Success,
    PillStuck,
}
