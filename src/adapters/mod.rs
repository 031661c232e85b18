//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_result_adapter;
pub mod trades_csv_adapter;
