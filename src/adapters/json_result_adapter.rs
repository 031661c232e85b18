//! JSON result writer.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::OptraderError;
use crate::ports::result_port::ResultPort;

/// Serialize the whole result (trades, equity curve, statistics) as pretty JSON.
pub fn write_json(result: &BacktestResult, path: &Path) -> Result<(), OptraderError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, result).map_err(|e| OptraderError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    })?;
    log::debug!("wrote result JSON to {}", path.display());
    Ok(())
}

pub struct JsonResultAdapter;

impl ResultPort for JsonResultAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), OptraderError> {
        write_json(result, output_path)
    }
}
