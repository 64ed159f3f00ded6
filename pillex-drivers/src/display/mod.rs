//! Display panel drivers

pub mod sh1106;

pub use sh1106::Sh1106;
