//! Bar granularity and lookback window of the fetched history.
//!
//! Neither affects engine logic; they decide which bars reach it.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Daily => write!(f, "daily"),
            Timeframe::Weekly => write!(f, "weekly"),
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "1d" | "d" => Ok(Timeframe::Daily),
            "weekly" | "1w" | "w" => Ok(Timeframe::Weekly),
            other => Err(format!("unknown timeframe '{other}' (expected daily or weekly)")),
        }
    }
}

impl Timeframe {
    /// Convert daily bars to this granularity.
    pub fn apply(&self, bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
        match self {
            Timeframe::Daily => bars,
            Timeframe::Weekly => resample_weekly(&bars),
        }
    }
}

/// Aggregate sorted daily bars into ISO weeks. Each weekly bar is dated on
/// the first trading day of its week.
pub fn resample_weekly(bars: &[OhlcvBar]) -> Vec<OhlcvBar> {
    let mut weekly: Vec<OhlcvBar> = Vec::new();
    let mut current_week = None;

    for bar in bars {
        let week = bar.date.iso_week();
        let key = (week.year(), week.week());
        match weekly.last_mut() {
            Some(agg) if current_week == Some(key) => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => {
                weekly.push(bar.clone());
                current_week = Some(key);
            }
        }
    }

    weekly
}

/// How much history to fetch, measured back from the newest available bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookbackPeriod {
    Days(u32),
    Months(u32),
    Years(u32),
    Max,
}

impl Default for LookbackPeriod {
    fn default() -> Self {
        LookbackPeriod::Years(1)
    }
}

impl LookbackPeriod {
    /// First date inside the window ending at `end`.
    pub fn start_from(&self, end: NaiveDate) -> NaiveDate {
        let start = match *self {
            LookbackPeriod::Days(n) => end.checked_sub_days(chrono::Days::new(u64::from(n))),
            LookbackPeriod::Months(n) => end.checked_sub_months(Months::new(n)),
            LookbackPeriod::Years(n) => end.checked_sub_months(Months::new(n.saturating_mul(12))),
            LookbackPeriod::Max => None,
        };
        start.unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookbackPeriod::Days(n) => write!(f, "{n}d"),
            LookbackPeriod::Months(n) => write!(f, "{n}mo"),
            LookbackPeriod::Years(n) => write!(f, "{n}y"),
            LookbackPeriod::Max => write!(f, "max"),
        }
    }
}

impl FromStr for LookbackPeriod {
    type Err = String;

    /// Accepts `30d`, `6mo`, `6m`, `1y`, `5y` or `max`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "max" {
            return Ok(LookbackPeriod::Max);
        }
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("period '{s}' is missing a unit (d, mo, y)"))?;
        let (digits, unit) = s.split_at(split);
        let n: u32 = digits
            .parse()
            .map_err(|_| format!("period '{s}' must start with a number"))?;
        if n == 0 {
            return Err(format!("period '{s}' must be positive"));
        }
        match unit {
            "d" => Ok(LookbackPeriod::Days(n)),
            "m" | "mo" => Ok(LookbackPeriod::Months(n)),
            "y" => Ok(LookbackPeriod::Years(n)),
            other => Err(format!("unknown period unit '{other}' (expected d, mo, y)")),
        }
    }
}
