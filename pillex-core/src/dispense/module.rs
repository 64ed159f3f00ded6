//! Module identity and line mapping

/// Number of dispensing modules
pub const MODULE_COUNT: usize = pillex_protocol::MODULE_COUNT;

/// Index of a dispensing module (0..4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleId(u8);

impl ModuleId {
    /// Create a module id, rejecting indices past the last module
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < MODULE_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Zero-based index
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// One-based number used on the wire and on labels
    pub const fn number(self) -> u8 {
        self.0 + 1
    }

    /// All modules in service order
    pub fn all() -> impl Iterator<Item = ModuleId> {
        (0..MODULE_COUNT as u8).map(ModuleId)
    }

    /// Expander lines of this module
    pub const fn lines(self) -> ModuleLines {
        let base = self.0 * 4;
        ModuleLines {
            forward: base,
            reverse: base + 1,
            vibrator: base + 2,
            sensor: base + 3,
        }
    }
}

/// Expander lines belonging to one module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleLines {
    /// Slider motor forward (closes the slider)
    pub forward: u8,
    /// Slider motor reverse (opens the slider)
    pub reverse: u8,
    /// Vibrator motor
    pub vibrator: u8,
    /// Chamber sensor, active-low
    pub sensor: u8,
}
