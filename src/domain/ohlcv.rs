//! OHLCV bar representation and input sanitisation.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// A bar is usable when its close is a positive finite price.
    pub fn is_usable(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Drop unusable bars, order by date and keep the first bar for any repeated date.
pub fn sanitize_bars(bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
    let total = bars.len();
    let mut usable: Vec<OhlcvBar> = bars.into_iter().filter(OhlcvBar::is_usable).collect();
    // stable sort keeps source order among equal dates, so dedup keeps the first
    usable.sort_by_key(|b| b.date);
    usable.dedup_by_key(|b| b.date);

    if usable.len() < total {
        log::warn!(
            "dropped {} of {} bars (non-positive close or duplicate date)",
            total - usable.len(),
            total
        );
    }
    usable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn weekday_of_bar() {
        assert_eq!(bar("2024-01-01", 100.0).weekday(), Weekday::Mon);
        assert_eq!(bar("2024-01-04", 100.0).weekday(), Weekday::Thu);
    }

    #[test]
    fn sanitize_drops_non_positive_closes() {
        let bars = vec![
            bar("2024-01-01", 100.0),
            bar("2024-01-02", 0.0),
            bar("2024-01-03", -5.0),
            bar("2024-01-04", f64::NAN),
            bar("2024-01-05", 101.0),
        ];
        let clean = sanitize_bars(bars);
        assert_eq!(clean.len(), 2);
        assert!(clean.iter().all(|b| b.close > 0.0));
    }

    #[test]
    fn sanitize_sorts_by_date() {
        let bars = vec![
            bar("2024-01-03", 103.0),
            bar("2024-01-01", 101.0),
            bar("2024-01-02", 102.0),
        ];
        let clean = sanitize_bars(bars);
        let closes: Vec<f64> = clean.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![101.0, 102.0, 103.0]);
    }

    #[test]
    fn sanitize_keeps_first_duplicate() {
        let bars = vec![
            bar("2024-01-01", 100.0),
            bar("2024-01-02", 111.0),
            bar("2024-01-02", 222.0),
        ];
        let clean = sanitize_bars(bars);
        assert_eq!(clean.len(), 2);
        assert!((clean[1].close - 111.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sanitize_empty() {
        assert!(sanitize_bars(Vec::new()).is_empty());
    }
}
