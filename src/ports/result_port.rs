//! Backtest result output port.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::OptraderError;

/// Writes a finished [`BacktestResult`] somewhere durable.
pub trait ResultPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), OptraderError>;
}
