//! Synthetic option positions and the trade ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::pricing::{self, OptionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Call,
    Put,
    Straddle,
}

impl From<OptionType> for Side {
    fn from(option_type: OptionType) -> Self {
        match option_type {
            OptionType::Call => Side::Call,
            OptionType::Put => Side::Put,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Side::Call => "CALL",
            Side::Put => "PUT",
            Side::Straddle => "STRADDLE",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeKind {
    Entry,
    StraddleSell,
    Exit,
    StraddleExit,
    StopLoss,
    TakeProfit,
    ForcedExit,
}

impl TradeKind {
    /// Whether this record realizes P&L (everything but the opening records).
    pub fn is_closing(&self) -> bool {
        !matches!(self, TradeKind::Entry | TradeKind::StraddleSell)
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeKind::Entry => "ENTRY",
            TradeKind::StraddleSell => "STRADDLE_SELL",
            TradeKind::Exit => "EXIT",
            TradeKind::StraddleExit => "STRADDLE_EXIT",
            TradeKind::StopLoss => "STOP_LOSS",
            TradeKind::TakeProfit => "TAKE_PROFIT",
            TradeKind::ForcedExit => "FORCED_EXIT",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionKind {
    /// Long a single call or put.
    Directional {
        option_type: OptionType,
        premium: f64,
    },
    /// Short a call and a put at the same strike.
    ShortStraddle { call_premium: f64, put_premium: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticPosition {
    pub kind: PositionKind,
    pub entry_bar_index: usize,
    pub entry_date: NaiveDate,
    pub strike: f64,
    pub days_to_expiry_at_entry: u32,
    pub lot_size: u32,
}

impl SyntheticPosition {
    pub fn side(&self) -> Side {
        match self.kind {
            PositionKind::Directional { option_type, .. } => option_type.into(),
            PositionKind::ShortStraddle { .. } => Side::Straddle,
        }
    }

    pub fn is_straddle(&self) -> bool {
        matches!(self.kind, PositionKind::ShortStraddle { .. })
    }

    /// Per-unit premium at entry (both legs combined for a straddle).
    pub fn entry_value(&self) -> f64 {
        match self.kind {
            PositionKind::Directional { premium, .. } => premium,
            PositionKind::ShortStraddle {
                call_premium,
                put_premium,
            } => call_premium + put_premium,
        }
    }

    /// Days left at `index`, counting one day per elapsed bar, floored at zero.
    pub fn remaining_days(&self, index: usize) -> u32 {
        let elapsed = index.saturating_sub(self.entry_bar_index);
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        self.days_to_expiry_at_entry.saturating_sub(elapsed)
    }

    /// Per-unit value of the position at `spot` on bar `index`.
    ///
    /// Directional options are repriced with their remaining time; straddle
    /// legs are valued at expiry (intrinsic only).
    pub fn revalue(&self, spot: f64, index: usize, rate: f64, volatility: f64) -> f64 {
        match self.kind {
            PositionKind::Directional { option_type, .. } => pricing::price(
                spot,
                self.strike,
                pricing::years_from_days(self.remaining_days(index)),
                rate,
                volatility,
                option_type,
            ),
            PositionKind::ShortStraddle { .. } => {
                pricing::intrinsic_value(spot, self.strike, OptionType::Call)
                    + pricing::intrinsic_value(spot, self.strike, OptionType::Put)
            }
        }
    }

    /// Realized P&L for closing at `exit_value` per unit.
    pub fn realized_pnl(&self, exit_value: f64) -> f64 {
        let lots = self.lot_size as f64;
        if self.is_straddle() {
            (self.entry_value() - exit_value) * lots
        } else {
            (exit_value - self.entry_value()) * lots
        }
    }

    pub fn should_stop_loss(&self, value: f64, stop_loss_pct: f64) -> bool {
        if stop_loss_pct <= 0.0 || self.is_straddle() {
            return false;
        }
        value <= self.entry_value() * (1.0 - stop_loss_pct / 100.0)
    }

    pub fn should_take_profit(&self, value: f64, take_profit_pct: f64) -> bool {
        if take_profit_pct <= 0.0 || self.is_straddle() {
            return false;
        }
        value >= self.entry_value() * (1.0 + take_profit_pct / 100.0)
    }
}

/// One ledger line. Opening records carry no exit price and zero P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub bar_index: usize,
    pub kind: TradeKind,
    pub side: Side,
    pub strike: f64,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub realized_pnl: f64,
    pub capital_after: f64,
}

impl Trade {
    pub fn is_closing(&self) -> bool {
        self.kind.is_closing()
    }
}

/// Contract conventions derived from the underlying symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolProfile {
    pub strike_increment: f64,
    pub lot_size: u32,
}

impl SymbolProfile {
    pub fn for_symbol(symbol: &str) -> Self {
        if symbol.to_uppercase().contains("BANK") {
            SymbolProfile {
                strike_increment: 100.0,
                lot_size: 15,
            }
        } else {
            SymbolProfile {
                strike_increment: 50.0,
                lot_size: 50,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn long_call() -> SyntheticPosition {
        SyntheticPosition {
            kind: PositionKind::Directional {
                option_type: OptionType::Call,
                premium: 100.0,
            },
            entry_bar_index: 40,
            entry_date: date(),
            strike: 22050.0,
            days_to_expiry_at_entry: 7,
            lot_size: 50,
        }
    }

    fn short_straddle() -> SyntheticPosition {
        SyntheticPosition {
            kind: PositionKind::ShortStraddle {
                call_premium: 120.0,
                put_premium: 110.0,
            },
            entry_bar_index: 40,
            entry_date: date(),
            strike: 22000.0,
            days_to_expiry_at_entry: 4,
            lot_size: 50,
        }
    }

    #[test]
    fn sides() {
        assert_eq!(long_call().side(), Side::Call);
        assert_eq!(short_straddle().side(), Side::Straddle);
        assert!(short_straddle().is_straddle());
        assert!(!long_call().is_straddle());
    }

    #[test]
    fn entry_value_sums_straddle_legs() {
        assert_relative_eq!(long_call().entry_value(), 100.0);
        assert_relative_eq!(short_straddle().entry_value(), 230.0);
    }

    #[test]
    fn remaining_days_floors_at_zero() {
        let pos = long_call();
        assert_eq!(pos.remaining_days(40), 7);
        assert_eq!(pos.remaining_days(43), 4);
        assert_eq!(pos.remaining_days(47), 0);
        assert_eq!(pos.remaining_days(100), 0);
    }

    #[test]
    fn expired_directional_revalues_to_intrinsic() {
        let pos = long_call();
        assert_relative_eq!(pos.revalue(22150.0, 50, 0.065, 0.16), 100.0);
        assert_relative_eq!(pos.revalue(21000.0, 50, 0.065, 0.16), 0.0);
    }

    #[test]
    fn straddle_revalues_at_intrinsic_even_with_time_left() {
        let pos = short_straddle();
        assert_relative_eq!(pos.revalue(22000.0, 41, 0.065, 0.16), 0.0);
        assert_relative_eq!(pos.revalue(22300.0, 41, 0.065, 0.16), 300.0);
        assert_relative_eq!(pos.revalue(21800.0, 41, 0.065, 0.16), 200.0);
    }

    #[test]
    fn realized_pnl_directions() {
        assert_relative_eq!(long_call().realized_pnl(130.0), 1500.0);
        assert_relative_eq!(long_call().realized_pnl(40.0), -3000.0);
        assert_relative_eq!(short_straddle().realized_pnl(0.0), 230.0 * 50.0);
        assert_relative_eq!(short_straddle().realized_pnl(300.0), -70.0 * 50.0);
    }

    #[test]
    fn stop_loss_and_take_profit_on_premium() {
        let pos = long_call();
        assert!(pos.should_stop_loss(50.0, 50.0));
        assert!(!pos.should_stop_loss(51.0, 50.0));
        assert!(!pos.should_stop_loss(0.0, 0.0));
        assert!(pos.should_take_profit(200.0, 100.0));
        assert!(!pos.should_take_profit(199.0, 100.0));
        assert!(!pos.should_take_profit(1e9, 0.0));
    }

    #[test]
    fn straddles_ignore_premium_triggers() {
        let pos = short_straddle();
        assert!(!pos.should_stop_loss(0.0, 50.0));
        assert!(!pos.should_take_profit(1e9, 50.0));
    }

    #[test]
    fn trade_kind_closing() {
        assert!(!TradeKind::Entry.is_closing());
        assert!(!TradeKind::StraddleSell.is_closing());
        for kind in [
            TradeKind::Exit,
            TradeKind::StraddleExit,
            TradeKind::StopLoss,
            TradeKind::TakeProfit,
            TradeKind::ForcedExit,
        ] {
            assert!(kind.is_closing());
        }
        assert_eq!(TradeKind::StraddleSell.to_string(), "STRADDLE_SELL");
    }

    #[test]
    fn symbol_profiles() {
        let bank = SymbolProfile::for_symbol("BankNifty");
        assert_relative_eq!(bank.strike_increment, 100.0);
        assert_eq!(bank.lot_size, 15);
        let index = SymbolProfile::for_symbol("NIFTY");
        assert_relative_eq!(index.strike_increment, 50.0);
        assert_eq!(index.lot_size, 50);
    }
}
