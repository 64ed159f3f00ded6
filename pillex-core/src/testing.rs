//! In-memory collaborators for unit tests

use crate::dispense::ModuleId;
use crate::traits::{BusScanner, ExpanderPort, PersistentStore, STORE_SENTINEL};
use heapless::Vec;
use pillex_hal::{Direction, Level};

/// Expander that records line levels and flags close/open overlap
pub struct MockExpander {
    pub directions: [Direction; 16],
    pub levels: u16,
    pub polarity: Option<u16>,
    /// Raw sensor inputs, high = no pill
    pub inputs: u16,
    pub motor_conflict_seen: bool,
    pub fail_writes: bool,
    pub fail_reads: bool,
    pub writes: u32,
}

impl MockExpander {
    pub fn new() -> Self {
        Self {
            directions: [Direction::Input; 16],
            levels: 0,
            polarity: None,
            inputs: 0xFFFF,
            motor_conflict_seen: false,
            fail_writes: false,
            fail_reads: false,
            writes: 0,
        }
    }

    pub fn outputs_mask(&self) -> u16 {
        self.directions
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == Direction::Output)
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    pub fn set_pill(&mut self, module: ModuleId, present: bool) {
        let bit = 1u16 << module.lines().sensor;
        if present {
            self.inputs &= !bit;
        } else {
            self.inputs |= bit;
        }
    }

    pub fn line(&self, pin: u8) -> bool {
        self.levels & (1 << pin) != 0
    }
}

impl ExpanderPort for MockExpander {
    type Error = ();

    fn configure(&mut self, pin: u8, direction: Direction) -> Result<(), ()> {
        self.directions[pin as usize] = direction;
        Ok(())
    }

    fn set_polarity(&mut self, mask: u16) -> Result<(), ()> {
        self.polarity = Some(mask);
        Ok(())
    }

    fn write_all(&mut self, mask: u16) -> Result<(), ()> {
        self.levels = mask;
        Ok(())
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.writes += 1;
        if level.is_high() {
            self.levels |= 1 << pin;
        } else {
            self.levels &= !(1 << pin);
        }
        for module in ModuleId::all() {
            let lines = module.lines();
            if self.line(lines.forward) && self.line(lines.reverse) {
                self.motor_conflict_seen = true;
            }
        }
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<Level, ()> {
        if self.fail_reads {
            return Err(());
        }
        Ok(Level::from(self.inputs & (1 << pin) != 0))
    }
}

/// RAM-backed store
pub struct MockStore {
    pub bytes: [u8; 256],
    pub present: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            bytes: [0; 256],
            present: true,
        }
    }
}

impl PersistentStore for MockStore {
    fn capacity(&self) -> u16 {
        self.bytes.len() as u16
    }

    fn read_byte(&mut self, addr: u16) -> u8 {
        match self.bytes.get(addr as usize) {
            Some(b) if self.present => *b,
            _ => STORE_SENTINEL,
        }
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        if let Some(b) = self.bytes.get_mut(addr as usize) {
            *b = value;
        }
    }
}

/// Scanner answering for a fixed address list
pub struct MockScanner {
    pub devices: Vec<u8, 8>,
}

impl MockScanner {
    pub fn with(addrs: &[u8]) -> Self {
        let mut devices = Vec::new();
        let _ = devices.extend_from_slice(addrs);
        Self { devices }
    }
}

impl BusScanner for MockScanner {
    fn probe(&mut self, addr: u8) -> bool {
        self.devices.contains(&addr)
    }
}
