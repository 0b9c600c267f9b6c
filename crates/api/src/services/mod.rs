//! External service integrations.

pub mod gateway_probe;

pub use gateway_probe::HttpProbe;
