//! Screen state machine
//!
//! Transitions are explicit (host command, drop outcome, heartbeat) or
//! timed: Success reverts to Time once its timeout expires. Every
//! transition produces a `$screen` event, even when the screen does not
//! change.
//!
//! Redraws are paced: immediately after a change, then every refresh
//! interval (faster while Loading is animated).

use heapless::String;
use pillex_hal::time::elapsed_ms;
use pillex_protocol::{DeviceEvent, ScreenId, MESSAGE_CAPACITY};

use super::view::View;
use crate::clock::TimeOfDay;
use crate::config::TimingConfig;

/// Message screen payload
pub type MessageText = String<MESSAGE_CAPACITY>;

/// Active screen and its payload
#[derive(Debug, Clone)]
pub struct ScreenController {
    timing: TimingConfig,
    current: ScreenId,
    message: MessageText,
    error_code: i32,
    success_armed_at: Option<u32>,
    last_render_at: u32,
    dirty: bool,
    frame: u32,
}

impl ScreenController {
    /// Start on the Time screen with a redraw pending
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            current: ScreenId::Time,
            message: MessageText::new(),
            error_code: 0,
            success_armed_at: None,
            last_render_at: 0,
            dirty: true,
            frame: 0,
        }
    }

    pub fn current(&self) -> ScreenId {
        self.current
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    /// Switch screens and return the event announcing it
    ///
    /// Entering Success (re)starts its timeout.
    pub fn set(&mut self, screen: ScreenId, now: u32) -> DeviceEvent {
        self.current = screen;
        self.dirty = true;
        if screen == ScreenId::Success {
            self.arm_success_timeout(now);
        }
        DeviceEvent::Screen(screen)
    }

    /// Show the error screen with a code
    pub fn show_error(&mut self, code: i32, now: u32) -> DeviceEvent {
        self.error_code = code;
        self.set(ScreenId::Error, now)
    }

    /// Start the Success timeout without changing screens
    pub fn arm_success_timeout(&mut self, now: u32) {
        self.success_armed_at = Some(now);
    }

    /// Replace the message payload
    ///
    /// Text beyond the capacity is dropped at a character boundary.
    /// Returns the stored text.
    pub fn set_message(&mut self, text: &str) -> &str {
        let mut end = text.len().min(MESSAGE_CAPACITY);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        self.message.clear();
        // Fits: end <= capacity
        let _ = self.message.push_str(&text[..end]);
        if self.current == ScreenId::Message {
            self.dirty = true;
        }
        &self.message
    }

    /// Run the Success timeout
    ///
    /// Returns the event if the screen reverted to Time. An expiry while
    /// another screen is showing only disarms the timer.
    pub fn tick(&mut self, now: u32) -> Option<DeviceEvent> {
        let armed_at = self.success_armed_at?;
        if elapsed_ms(now, armed_at) < self.timing.success_timeout_ms {
            return None;
        }
        self.success_armed_at = None;
        if self.current == ScreenId::Success {
            Some(self.set(ScreenId::Time, now))
        } else {
            None
        }
    }

    /// True if a redraw is due at `now`
    pub fn render_due(&self, now: u32) -> bool {
        let interval = if self.current == ScreenId::Loading {
            self.timing.loading_refresh_ms
        } else {
            self.timing.refresh_ms
        };
        self.dirty || elapsed_ms(now, self.last_render_at) >= interval
    }

    /// Build the view if a redraw is due and mark it drawn
    pub fn render(&mut self, now: u32, time: TimeOfDay) -> Option<View<'_>> {
        if !self.render_due(now) {
            return None;
        }
        self.dirty = false;
        self.last_render_at = now;
        if self.current == ScreenId::Loading {
            self.frame = self.frame.wrapping_add(1);
        }
        Some(self.view(time))
    }

    /// View of the current screen
    pub fn view(&self, time: TimeOfDay) -> View<'_> {
        match self.current {
            ScreenId::Loading => View::Loading { frame: self.frame },
            ScreenId::Time => View::Time(time),
            ScreenId::Message => View::Message(&self.message),
            ScreenId::Error => View::Error(self.error_code),
            ScreenId::TakePill => View::TakePill,
            ScreenId::Success => View::Success,
            ScreenId::PillStuck => View::PillStuck,
        }
    }
}
