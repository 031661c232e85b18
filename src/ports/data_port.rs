//! Historical bar source.

use crate::domain::error::OptraderError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

/// Upstream market-data collaborator. The engine never fetches on its own;
/// callers pull the full bar sequence through this port and hand it over.
pub trait DataPort {
    /// Daily bars for `symbol` with `start <= date <= end`, oldest first.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, OptraderError>;

    /// First date, last date and bar count available for `symbol`.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, OptraderError>;
}
