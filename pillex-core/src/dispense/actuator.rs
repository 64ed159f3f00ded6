//! Actuator driver
//!
//! Maps a module to its four expander lines and issues the slider,
//! vibrator and sensor primitives. Closing drives the forward line and
//! opening the reverse line; the opposite line is always released first
//! so both are never high together.

use super::module::ModuleId;
use crate::traits::ExpanderPort;
use pillex_hal::{Direction, Level};

/// A single actuator write for the active module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorCommand {
    /// Reverse low, then forward high
    SliderClose,
    /// Forward low, then reverse high
    SliderOpen,
    /// Both motor lines low
    SliderStop,
    VibratorOn,
    VibratorOff,
}

/// Slider and vibrator driver on top of an [`ExpanderPort`]
pub struct Actuators<E> {
    port: E,
}

impl<E: ExpanderPort> Actuators<E> {
    pub fn new(port: E) -> Self {
        Self { port }
    }

    /// Configure motor and vibrator lines as outputs, sensors as inputs,
    /// no polarity inversion, every output low
    pub fn init(&mut self) -> Result<(), E::Error> {
        self.port.set_polarity(0)?;
        self.port.write_all(0)?;
        for module in ModuleId::all() {
            let lines = module.lines();
            self.port.configure(lines.forward, Direction::Output)?;
            self.port.configure(lines.reverse, Direction::Output)?;
            self.port.configure(lines.vibrator, Direction::Output)?;
            self.port.configure(lines.sensor, Direction::Input)?;
        }
        Ok(())
    }

    /// Apply one command to a module
    pub fn apply(&mut self, module: ModuleId, command: ActuatorCommand) -> Result<(), E::Error> {
        let lines = module.lines();
        match command {
            ActuatorCommand::SliderClose => {
                self.port.write(lines.reverse, Level::Low)?;
                self.port.write(lines.forward, Level::High)
            }
            ActuatorCommand::SliderOpen => {
                self.port.write(lines.forward, Level::Low)?;
                self.port.write(lines.reverse, Level::High)
            }
            ActuatorCommand::SliderStop => {
                self.port.write(lines.forward, Level::Low)?;
                self.port.write(lines.reverse, Level::Low)
            }
            ActuatorCommand::VibratorOn => self.port.write(lines.vibrator, Level::High),
            ActuatorCommand::VibratorOff => self.port.write(lines.vibrator, Level::Low),
        }
    }

    /// True if the module's chamber sensor sees a pill (line low)
    pub fn pill_present(&mut self, module: ModuleId) -> Result<bool, E::Error> {
        Ok(self.port.read(module.lines().sensor)?.is_low())
    }

    /// Access the underlying port
    pub fn port_mut(&mut self) -> &mut E {
        &mut self.port
    }
}
