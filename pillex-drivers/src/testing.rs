//! Scripted I2C bus shared by the driver tests

use std::collections::VecDeque;
use std::vec::Vec;

use pillex_hal::I2cBus;

/// Records every write and answers reads from a queue
#[derive(Default)]
pub struct ScriptBus {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub reads: VecDeque<u8>,
    /// Addresses that acknowledge; empty means every address does
    pub present: Vec<u8>,
    pub fail: bool,
}

impl ScriptBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(addrs: &[u8]) -> Self {
        Self {
            present: addrs.to_vec(),
            ..Self::default()
        }
    }

    fn acks(&self, address: u8) -> bool {
        !self.fail && (self.present.is_empty() || self.present.contains(&address))
    }

    /// Last bytes written to `address`
    pub fn last_write(&self, address: u8) -> Option<&[u8]> {
        self.writes
            .iter()
            .rev()
            .find(|(a, _)| *a == address)
            .map(|(_, d)| d.as_slice())
    }
}

impl I2cBus for ScriptBus {
    type Error = ();

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
        if !self.acks(address) {
            return Err(());
        }
        self.writes.push((address, data.to_vec()));
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), ()> {
        if !self.acks(address) {
            return Err(());
        }
        for b in buf.iter_mut() {
            *b = self.reads.pop_front().unwrap_or(0);
        }
        Ok(())
    }

    fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> Result<(), ()> {
        self.write(address, data)?;
        self.read(address, buf)
    }
}
