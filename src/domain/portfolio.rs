//! Portfolio state: cash, the single open position, ledger and equity curve.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::{SyntheticPosition, Trade};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    InPosition(SyntheticPosition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub state: PositionState,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            state: PositionState::Flat,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.state, PositionState::Flat)
    }

    pub fn position(&self) -> Option<&SyntheticPosition> {
        match &self.state {
            PositionState::Flat => None,
            PositionState::InPosition(position) => Some(position),
        }
    }

    /// Open `position` if flat. Returns false (and drops it) otherwise.
    pub fn open_position(&mut self, position: SyntheticPosition) -> bool {
        if !self.is_flat() {
            return false;
        }
        self.state = PositionState::InPosition(position);
        true
    }

    pub fn take_position(&mut self) -> Option<SyntheticPosition> {
        match std::mem::take(&mut self.state) {
            PositionState::Flat => None,
            PositionState::InPosition(position) => Some(position),
        }
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Equity is realized cash; an open leg's unrealized P&L is not marked.
    pub fn record_equity(&mut self, date: NaiveDate) {
        self.equity_curve.push(EquityPoint {
            date,
            equity: self.cash,
        });
    }
}
