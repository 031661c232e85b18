//! CSV file data adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with header
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::OptraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs::File;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, OptraderError> {
        let path = self.csv_path(symbol);
        let file = File::open(&path).map_err(|e| OptraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
        let mut bars = Vec::new();
        for (line, record) in rdr.deserialize::<OhlcvBar>().enumerate() {
            let bar = record.map_err(|e| OptraderError::Data {
                // +2: one for the header, one for 1-based numbering
                reason: format!("{} line {}: {}", path.display(), line + 2, e),
            })?;
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, OptraderError> {
        let bars = self
            .read_all(symbol)?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect::<Vec<_>>();
        log::debug!(
            "{}: loaded {} bars between {} and {}",
            symbol,
            bars.len(),
            start_date,
            end_date
        );
        Ok(bars)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, OptraderError> {
        let bars = self.read_all(symbol)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
