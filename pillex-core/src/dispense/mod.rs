//! Pill dispensing
//!
//! - [`module`]: module identity and expander line mapping
//! - [`actuator`]: slider, vibrator and sensor primitives on the expander
//! - [`drop`]: the drop session state machine
//! - [`queue`]: per-module pending and dispensed counters

pub mod actuator;
pub mod drop;
pub mod module;
pub mod queue;

pub use actuator::{ActuatorCommand, Actuators};
pub use drop::{DropController, DropOutcome, DropPhase, DropStep};
pub use module::{ModuleId, ModuleLines, MODULE_COUNT};
pub use queue::{DispenseQueue, ModuleCounters};
