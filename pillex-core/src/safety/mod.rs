//! Host liveness monitoring
//!
//! Sends the periodic time beacon and detects a silent host.

pub mod heartbeat;

pub use heartbeat::{HeartbeatMonitor, LivenessStatus};
