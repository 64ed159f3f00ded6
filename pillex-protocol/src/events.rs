//! Asynchronous device events
//!
//! Events are sent without a request and always start with `$`. The host
//! treats this stream as its source of truth for drop, button and screen
//! status.

use crate::screen::ScreenId;
use core::fmt;

/// Line terminator for everything the device sends
pub const LINE_END: &str = "\r\n";

/// Physical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    Ok,
    Back,
    Up,
    Down,
}

impl ButtonId {
    /// All buttons in channel order
    pub const ALL: [ButtonId; 4] = [ButtonId::Ok, ButtonId::Back, ButtonId::Up, ButtonId::Down];

    /// Channel index of the button
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Button for a channel index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Name used in `$Button` events
    pub const fn name(self) -> &'static str {
        match self {
            ButtonId::Ok => "OK",
            ButtonId::Back => "BACK",
            ButtonId::Up => "UP",
            ButtonId::Down => "DOWN",
        }
    }
}

/// Press classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressKind {
    Short,
    Long,
}

/// Events emitted to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceEvent {
    /// Sent once at boot
    Init,
    /// The screen changed
    Screen(ScreenId),
    /// Liveness beacon with the monotonic time in milliseconds
    TimeBeacon(u32),
    /// A drop session confirmed a pill left the chamber
    DropOk,
    /// A drop session could not confirm the pill
    DropFail,
    /// A classified button press
    Button { button: ButtonId, press: PressKind },
}

impl fmt::Display for DeviceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceEvent::Init => f.write_str("$init"),
            DeviceEvent::Screen(screen) => write!(f, "$screen {}", screen),
            DeviceEvent::TimeBeacon(millis) => write!(f, "$time {}", millis),
            DeviceEvent::DropOk => f.write_str("$drp ok"),
            DeviceEvent::DropFail => f.write_str("$drp fail"),
            DeviceEvent::Button { button, press } => {
                let kind = match press {
                    PressKind::Short => "short",
                    PressKind::Long => "long",
                };
                write!(f, "$Button {} {} press", button.name(), kind)
            }
        }
    }
}

/// Write an event followed by the line terminator
pub fn emit<W: fmt::Write>(out: &mut W, event: DeviceEvent) -> fmt::Result {
    write!(out, "{}{}", event, LINE_END)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn render(event: DeviceEvent) -> String<64> {
        let mut out = String::new();
        emit(&mut out, event).unwrap();
        out
    }

    #[test]
    fn test_event_lines() {
        assert_eq!(render(DeviceEvent::Init).as_str(), "$init\r\n");
        assert_eq!(
            render(DeviceEvent::Screen(ScreenId::PillStuck)).as_str(),
            "$screen PILL_STUCK\r\n"
        );
        assert_eq!(render(DeviceEvent::TimeBeacon(10000)).as_str(), "$time 10000\r\n");
        assert_eq!(render(DeviceEvent::DropOk).as_str(), "$drp ok\r\n");
        assert_eq!(render(DeviceEvent::DropFail).as_str(), "$drp fail\r\n");
    }

    #[test]
    fn test_button_lines() {
        let short = DeviceEvent::Button {
            button: ButtonId::Ok,
            press: PressKind::Short,
        };
        let long = DeviceEvent::Button {
            button: ButtonId::Back,
            press: PressKind::Long,
        };
        assert_eq!(render(short).as_str(), "$Button OK short press\r\n");
        assert_eq!(render(long).as_str(), "$Button BACK long press\r\n");
    }

    #[test]
    fn test_button_index_round_trip() {
        for button in ButtonId::ALL {
            assert_eq!(ButtonId::from_index(button.index()), Some(button));
        }
        assert_eq!(ButtonId::from_index(4), None);
    }
}
