//! Screen identifiers shared by the wire protocol and the screen controller

use core::fmt;

/// One of the seven status views
///
/// The wire name is the upper-case form used by `screen <STATE>` and by
/// the `$screen <STATE>` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenId {
    Loading,
    #[default]
    Time,
    Message,
    Error,
    TakePill,
    Success,
    PillStuck,
}

impl ScreenId {
    /// Every screen, in wire-table order
    pub const ALL: [ScreenId; 7] = [
        ScreenId::Loading,
        ScreenId::Time,
        ScreenId::Message,
        ScreenId::Error,
        ScreenId::TakePill,
        ScreenId::Success,
        ScreenId::PillStuck,
    ];

    /// Wire name of the screen
    pub const fn as_str(self) -> &'static str {
        match self {
            ScreenId::Loading => "LOADING",
            ScreenId::Time => "TIME",
            ScreenId::Message => "MESSAGE",
            ScreenId::Error => "ERROR",
            ScreenId::TakePill => "TAKE_PILL",
            ScreenId::Success => "SUCCESS",
            ScreenId::PillStuck => "PILL_STUCK",
        }
    }

    /// Look up a screen by its exact (case-sensitive) wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }

    /// Screens during which the dispense queue is not serviced
    pub const fn blocks_dispensing(self) -> bool {
        matches!(self, ScreenId::Error | ScreenId::PillStuck)
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for screen in ScreenId::ALL {
            assert_eq!(ScreenId::from_name(screen.as_str()), Some(screen));
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(ScreenId::from_name("TAKE_PILL"), Some(ScreenId::TakePill));
        assert_eq!(ScreenId::from_name("take_pill"), None);
        assert_eq!(ScreenId::from_name("STUCK"), None);
    }

    #[test]
    fn test_fault_screens_block_dispensing() {
        assert!(ScreenId::Error.blocks_dispensing());
        assert!(ScreenId::PillStuck.blocks_dispensing());
        assert!(!ScreenId::Success.blocks_dispensing());
        assert!(!ScreenId::Loading.blocks_dispensing());
    }
}
