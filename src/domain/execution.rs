//! Synthetic option fills.
//!
//! Opens and closes the single position held by a [`Portfolio`], pricing
//! every leg with the closed-form model. Cash only moves when P&L is realized.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::portfolio::Portfolio;
use crate::domain::position::{PositionKind, Side, SyntheticPosition, Trade, TradeKind};
use crate::domain::pricing::{self, OptionType};

pub const DIRECTIONAL_DAYS_TO_EXPIRY: u32 = 7;
pub const STRADDLE_DAYS_TO_EXPIRY: u32 = 4;
pub const STRADDLE_STRIKE_STEP: f64 = 50.0;
/// Largest share of cash a debit entry may cost.
pub const MAX_PREMIUM_FRACTION: f64 = 0.15;

/// Parameters needed to price and size entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionParams {
    pub lot_size: u32,
    pub strike_increment: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        ExecutionParams {
            lot_size: 50,
            strike_increment: 50.0,
            risk_free_rate: pricing::DEFAULT_RISK_FREE_RATE,
            volatility: pricing::DEFAULT_VOLATILITY,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
        }
    }
}

/// Calls strike at or above spot, puts at or below.
pub fn select_strike(spot: f64, increment: f64, option_type: OptionType) -> f64 {
    let steps = spot / increment;
    match option_type {
        OptionType::Call => steps.ceil() * increment,
        OptionType::Put => steps.floor() * increment,
    }
}

pub fn nearest_strike(spot: f64, increment: f64) -> f64 {
    (spot / increment).round() * increment
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        side: Side,
        strike: f64,
        premium: f64,
    },
    RiskCapExceeded {
        cost: f64,
        limit: f64,
    },
    AlreadyInPosition,
}

fn record_entry(portfolio: &mut Portfolio, position: &SyntheticPosition, bar: &OhlcvBar, kind: TradeKind) {
    let trade = Trade {
        date: bar.date,
        bar_index: position.entry_bar_index,
        kind,
        side: position.side(),
        strike: position.strike,
        entry_price: position.entry_value(),
        exit_price: None,
        realized_pnl: 0.0,
        capital_after: portfolio.cash,
    };
    portfolio.record_trade(trade);
}

/// Buy a weekly call (`Long`) or put (`Short`).
///
/// Steps:
/// 1. Pick the strike on the far side of spot for the option type
/// 2. Price the option with 7 days to expiry
/// 3. Refuse if premium * lot size exceeds 15% of cash
/// 4. Open the position and record an entry line
pub fn enter_directional(
    portfolio: &mut Portfolio,
    bar: &OhlcvBar,
    index: usize,
    option_type: OptionType,
    params: &ExecutionParams,
) -> EntryResult {
    if !portfolio.is_flat() {
        return EntryResult::AlreadyInPosition;
    }

    let spot = bar.close;
    let strike = select_strike(spot, params.strike_increment, option_type);
    let premium = pricing::price(
        spot,
        strike,
        pricing::years_from_days(DIRECTIONAL_DAYS_TO_EXPIRY),
        params.risk_free_rate,
        params.volatility,
        option_type,
    );

    let cost = premium * params.lot_size as f64;
    let limit = portfolio.cash * MAX_PREMIUM_FRACTION;
    if cost > limit {
        log::info!(
            "{}: skipped {} entry, cost {:.2} exceeds risk cap {:.2}",
            bar.date,
            option_type,
            cost,
            limit
        );
        return EntryResult::RiskCapExceeded { cost, limit };
    }

    let position = SyntheticPosition {
        kind: PositionKind::Directional {
            option_type,
            premium,
        },
        entry_bar_index: index,
        entry_date: bar.date,
        strike,
        days_to_expiry_at_entry: DIRECTIONAL_DAYS_TO_EXPIRY,
        lot_size: params.lot_size,
    };
    record_entry(portfolio, &position, bar, TradeKind::Entry);
    log::debug!(
        "{}: bought {} {} @ {:.2} (spot {:.2})",
        bar.date,
        strike,
        option_type,
        premium,
        spot
    );
    portfolio.open_position(position);

    EntryResult::Entered {
        side: option_type.into(),
        strike,
        premium,
    }
}

/// Sell an at-the-money straddle with 4 days to expiry. Credit entries are
/// not subject to the premium risk cap.
pub fn enter_straddle(
    portfolio: &mut Portfolio,
    bar: &OhlcvBar,
    index: usize,
    params: &ExecutionParams,
) -> EntryResult {
    if !portfolio.is_flat() {
        return EntryResult::AlreadyInPosition;
    }

    let spot = bar.close;
    let strike = nearest_strike(spot, STRADDLE_STRIKE_STEP);
    let time = pricing::years_from_days(STRADDLE_DAYS_TO_EXPIRY);
    let leg = |option_type| {
        pricing::price(
            spot,
            strike,
            time,
            params.risk_free_rate,
            params.volatility,
            option_type,
        )
    };
    let call_premium = leg(OptionType::Call);
    let put_premium = leg(OptionType::Put);

    let position = SyntheticPosition {
        kind: PositionKind::ShortStraddle {
            call_premium,
            put_premium,
        },
        entry_bar_index: index,
        entry_date: bar.date,
        strike,
        days_to_expiry_at_entry: STRADDLE_DAYS_TO_EXPIRY,
        lot_size: params.lot_size,
    };
    record_entry(portfolio, &position, bar, TradeKind::StraddleSell);
    log::debug!(
        "{}: sold {} straddle for {:.2} + {:.2}",
        bar.date,
        strike,
        call_premium,
        put_premium
    );
    portfolio.open_position(position);

    EntryResult::Entered {
        side: Side::Straddle,
        strike,
        premium: call_premium + put_premium,
    }
}

/// Result of an exit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub kind: TradeKind,
    pub side: Side,
    pub exit_value: f64,
    pub pnl: f64,
}

/// Close the open position at `bar`'s close.
///
/// Steps:
/// 1. Take the position out of the portfolio
/// 2. Revalue it with the given rate and volatility
/// 3. Realize P&L into cash
/// 4. Record the closing line
pub fn exit_position(
    portfolio: &mut Portfolio,
    bar: &OhlcvBar,
    index: usize,
    kind: TradeKind,
    rate: f64,
    volatility: f64,
) -> Option<ExitResult> {
    let position = portfolio.take_position()?;

    let exit_value = position.revalue(bar.close, index, rate, volatility);
    let pnl = position.realized_pnl(exit_value);
    portfolio.cash += pnl;

    let trade = Trade {
        date: bar.date,
        bar_index: index,
        kind,
        side: position.side(),
        strike: position.strike,
        entry_price: position.entry_value(),
        exit_price: Some(exit_value),
        realized_pnl: pnl,
        capital_after: portfolio.cash,
    };
    portfolio.record_trade(trade);
    log::debug!(
        "{}: {} {} {} @ {:.2}, pnl {:.2}",
        bar.date,
        kind,
        position.strike,
        position.side(),
        exit_value,
        pnl
    );

    Some(ExitResult {
        kind,
        side: position.side(),
        exit_value,
        pnl,
    })
}

/// Close a directional position whose premium crossed its stop-loss or
/// take-profit level. Returns the exit if one happened.
pub fn check_triggers(
    portfolio: &mut Portfolio,
    bar: &OhlcvBar,
    index: usize,
    params: &ExecutionParams,
) -> Option<ExitResult> {
    let position = portfolio.position()?;
    let value = position.revalue(bar.close, index, params.risk_free_rate, params.volatility);

    let kind = if position.should_stop_loss(value, params.stop_loss_pct) {
        TradeKind::StopLoss
    } else if position.should_take_profit(value, params.take_profit_pct) {
        TradeKind::TakeProfit
    } else {
        return None;
    };

    exit_position(
        portfolio,
        bar,
        index,
        kind,
        params.risk_free_rate,
        params.volatility,
    )
}

/// Close whatever is still open after the last bar. Revaluation uses the
/// default rate and volatility, not the run's configured values.
pub fn force_close(portfolio: &mut Portfolio, bar: &OhlcvBar, index: usize) -> Option<ExitResult> {
    exit_position(
        portfolio,
        bar,
        index,
        TradeKind::ForcedExit,
        pricing::DEFAULT_RISK_FREE_RATE,
        pricing::DEFAULT_VOLATILITY,
    )
}
