//! Port traits at the I/O seams of the engine.

pub mod config_port;
pub mod data_port;
pub mod result_port;
