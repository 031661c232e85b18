//! Trade ledger CSV writer.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::OptraderError;
use crate::domain::position::Trade;
use crate::ports::result_port::ResultPort;

/// One row per ledger line; opening rows leave `exit_price` empty.
pub fn write_trades_csv(trades: &[Trade], path: &Path) -> Result<(), OptraderError> {
    let csv_err = |e: csv::Error| OptraderError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    };

    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    for trade in trades {
        wtr.serialize(trade).map_err(csv_err)?;
    }
    wtr.flush()?;
    log::debug!("wrote {} trades to {}", trades.len(), path.display());
    Ok(())
}

pub struct TradesCsvAdapter;

impl ResultPort for TradesCsvAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), OptraderError> {
        write_trades_csv(&result.trades, output_path)
    }
}
