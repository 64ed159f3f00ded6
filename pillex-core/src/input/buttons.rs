//! Button debouncing and press classification
//!
//! Buttons are active-low with pull-ups: a committed low level means
//! pressed. A raw change restarts the channel's debounce timer and the
//! level is committed once it has been stable for the debounce window.
//!
//! A long press is reported the first time a held button reaches the
//! long-press threshold. A release reports a short press if held less
//! than that, or a long press if one was not reported while held.

use heapless::Vec;
use pillex_hal::time::elapsed_ms;
use pillex_hal::{InputPin, Level};
use pillex_protocol::{ButtonId, PressKind};

use crate::config::TimingConfig;

/// Number of button channels
pub const BUTTON_COUNT: usize = 4;

/// What a channel reports after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEventKind {
    /// Committed falling edge
    Pressed,
    /// Classified press
    Press(PressKind),
}

/// A button event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub button: ButtonId,
    pub kind: ButtonEventKind,
}

/// State of one debounced button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonChannel {
    committed_level: Level,
    raw_level: Level,
    last_edge_at: u32,
    press_started_at: u32,
    long_press_fired: bool,
}

impl Default for ButtonChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonChannel {
    /// A released button
    pub const fn new() -> Self {
        Self {
            committed_level: Level::High,
            raw_level: Level::High,
            last_edge_at: 0,
            press_started_at: 0,
            long_press_fired: false,
        }
    }

    pub fn committed_level(&self) -> Level {
        self.committed_level
    }

    pub fn is_pressed(&self) -> bool {
        self.committed_level.is_low()
    }

    /// Feed one raw sample
    pub fn update(&mut self, now: u32, raw: Level, timing: &TimingConfig) -> Option<ButtonEventKind> {
        if raw != self.raw_level {
            self.raw_level = raw;
            self.last_edge_at = now;
        }

        if self.raw_level != self.committed_level
            && elapsed_ms(now, self.last_edge_at) >= timing.debounce_ms
        {
            self.committed_level = self.raw_level;
            return if self.committed_level.is_low() {
                self.press_started_at = now;
                self.long_press_fired = false;
                Some(ButtonEventKind::Pressed)
            } else if elapsed_ms(now, self.press_started_at) < timing.long_press_ms {
                Some(ButtonEventKind::Press(PressKind::Short))
            } else if !self.long_press_fired {
                self.long_press_fired = true;
                Some(ButtonEventKind::Press(PressKind::Long))
            } else {
                None
            };
        }

        if self.is_pressed()
            && !self.long_press_fired
            && elapsed_ms(now, self.press_started_at) >= timing.long_press_ms
        {
            self.long_press_fired = true;
            return Some(ButtonEventKind::Press(PressKind::Long));
        }

        None
    }
}

/// The four front-panel buttons
#[derive(Debug, Clone)]
pub struct ButtonController {
    timing: TimingConfig,
    channels: [ButtonChannel; BUTTON_COUNT],
}

impl ButtonController {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            channels: [ButtonChannel::new(); BUTTON_COUNT],
        }
    }

    pub fn channel(&self, button: ButtonId) -> &ButtonChannel {
        &self.channels[button.index()]
    }

    /// Sample every channel, in [`ButtonId::ALL`] order
    pub fn update(&mut self, now: u32, levels: [Level; BUTTON_COUNT]) -> Vec<ButtonEvent, BUTTON_COUNT> {
        let mut events = Vec::new();
        for (button, (channel, level)) in ButtonId::ALL
            .into_iter()
            .zip(self.channels.iter_mut().zip(levels))
        {
            if let Some(kind) = channel.update(now, level, &self.timing) {
                // One event per channel at most
                let _ = events.push(ButtonEvent { button, kind });
            }
        }
        events
    }
}

/// Sample a set of button pins
pub fn sample<P: InputPin>(pins: &[P; BUTTON_COUNT]) -> [Level; BUTTON_COUNT] {
    [pins[0].level(), pins[1].level(), pins[2].level(), pins[3].level()]
}
