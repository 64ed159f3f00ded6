//! Collaborator traits
//!
//! These traits define the interface between the control plane and the
//! peripherals on the shared bus. Implementations live in
//! `pillex-drivers`; tests use in-memory mocks.

pub mod expander;
pub mod scanner;
pub mod store;

pub use expander::{ExpanderPort, EXPANDER_PINS};
pub use scanner::BusScanner;
pub use store::{PersistentStore, STORE_SENTINEL};
