//! End-to-end backtest scenarios over synthetic bars.
//!
//! Tests cover:
//! - MA crossover over a rally and a decline
//! - Insufficient data
//! - Weekly straddle from Monday to Thursday on flat prices
//! - Risk cap suppressing every debit entry
//! - Premium stop-loss and take-profit
//! - Equity curve length and single-position invariants

mod common;

use approx::assert_relative_eq;
use common::*;
use optrader::domain::backtest::{run_backtest, BacktestConfig, BacktestResult, MIN_BARS};
use optrader::domain::error::OptraderError;
use optrader::domain::position::{Side, TradeKind};
use optrader::domain::strategy::StrategyKind;
use optrader::domain::timeframe::Timeframe;
use proptest::prelude::*;

fn ma_config() -> BacktestConfig {
    let mut config = sample_config(StrategyKind::MaCrossover);
    config.params.fast_ma = 5;
    config.params.slow_ma = 20;
    config.strike_increment = 1.0;
    config
}

fn assert_alternating(result: &BacktestResult) {
    let mut open = false;
    for t in &result.trades {
        if t.is_closing() {
            assert!(open, "close without open at {}", t.date);
        } else {
            assert!(!open, "second entry while in position at {}", t.date);
        }
        open = !t.is_closing();
    }
    assert!(!open, "position left open after the run");
}

mod ma_crossover_scenario {
    use super::*;

    #[test]
    fn long_call_opened_on_rally_and_closed() {
        let closes = vee_then_fall();
        let bars = bars_from_closes(date(2024, 1, 1), &closes);
        let config = ma_config();

        let result = run_backtest(&bars, &config).unwrap();

        let entry = result
            .trades
            .iter()
            .find(|t| t.kind == TradeKind::Entry)
            .expect("an entry on the rally");
        assert_eq!(entry.side, Side::Call);
        assert!(
            (35..95).contains(&entry.bar_index),
            "entry at {} is outside the rally",
            entry.bar_index
        );
        assert!(entry.strike >= bars[entry.bar_index].close);

        let close = result
            .trades
            .iter()
            .find(|t| t.is_closing())
            .expect("the call is closed");
        assert!(close.bar_index > entry.bar_index);
        assert_eq!(close.side, Side::Call);
        assert!(close.realized_pnl > 0.0);

        assert_ne!(result.final_capital, config.starting_capital);
        assert_alternating(&result);
    }

    // 60 bars up 100 -> 160 then back to 100. The rise is over before the
    // 30-bar minimum, and the fast average is already above the slow one when
    // both exist, so no upward cross occurs. The fall yields a far OTM put.
    #[test]
    fn short_rise_fall_opens_put_on_decline() {
        let mut closes = linear(100.0, 160.0, 31);
        closes.extend(linear(158.0, 100.0, 29));
        assert_eq!(closes.len(), 60);
        let bars = bars_from_closes(date(2024, 1, 1), &closes);
        let mut config = sample_config(StrategyKind::MaCrossover);
        config.params.fast_ma = 5;
        config.params.slow_ma = 20;

        let result = run_backtest(&bars, &config).unwrap();

        assert!(result.trades.iter().all(|t| t.side != Side::Call));
        assert_eq!(result.trades.len(), 2);
        let entry = &result.trades[0];
        assert_eq!(entry.kind, TradeKind::Entry);
        assert_eq!(entry.side, Side::Put);
        assert!(entry.bar_index > 30, "entry at {}", entry.bar_index);

        let close = &result.trades[1];
        assert_eq!(close.kind, TradeKind::ForcedExit);
        assert_eq!(close.bar_index, 59);
        assert_relative_eq!(result.final_capital, config.starting_capital, epsilon = 1e-6);
        assert_eq!(result.equity_curve.len(), 60 - MIN_BARS);
    }

    #[test]
    fn opposing_signal_only_closes() {
        let bars = bars_from_closes(date(2024, 1, 1), &vee_then_fall());
        let result = run_backtest(&bars, &ma_config()).unwrap();

        let exit = result
            .trades
            .iter()
            .find(|t| t.kind == TradeKind::Exit)
            .expect("opposing cross closes the call");
        assert!(
            result
                .trades
                .iter()
                .all(|t| !(t.bar_index == exit.bar_index && t.kind == TradeKind::Entry)),
            "no reverse entry on the exit bar"
        );
    }

    #[test]
    fn capital_after_tracks_cash() {
        let bars = bars_from_closes(date(2024, 1, 1), &vee_then_fall());
        let config = ma_config();
        let result = run_backtest(&bars, &config).unwrap();

        let realized: f64 = result.trades.iter().map(|t| t.realized_pnl).sum();
        assert_relative_eq!(
            result.final_capital,
            config.starting_capital + realized,
            epsilon = 1e-6
        );
        let last = result.trades.last().unwrap();
        assert_relative_eq!(last.capital_after, result.final_capital, epsilon = 1e-9);
        assert_relative_eq!(
            result.statistics.final_capital,
            result.final_capital,
            epsilon = 1e-9
        );
    }
}

mod insufficient_data {
    use super::*;

    #[test]
    fn ten_bars_is_insufficient() {
        let bars = bars_from_closes(date(2024, 1, 1), &linear(100.0, 110.0, 10));
        for kind in StrategyKind::ALL {
            let err = run_backtest(&bars, &sample_config(kind)).unwrap_err();
            assert!(
                matches!(err, OptraderError::InsufficientData { bars: 10, minimum, .. } if minimum == MIN_BARS),
                "{kind}: {err}"
            );
        }
    }

    #[test]
    fn exactly_thirty_bars_runs_nothing() {
        let bars = bars_from_closes(date(2024, 1, 1), &[22000.0; 30]);
        let result = run_backtest(&bars, &sample_config(StrategyKind::Rsi)).unwrap();
        assert_eq!(result.bars_processed, 0);
        assert!(result.equity_curve.is_empty());
        assert!(result.trades.is_empty());
        assert_eq!(result.statistics.total_return, 0.0);
    }
}

mod weekly_straddle {
    use super::*;

    // 2024-01-06 + 30 days is Monday 2024-02-05; index 33 is Thursday 2024-02-08
    fn one_week() -> Vec<OhlcvBar> {
        bars_from_closes(date(2024, 1, 6), &[22000.0; 34])
    }

    #[test]
    fn monday_sell_thursday_buyback() {
        let config = sample_config(StrategyKind::StraddleSell);
        let result = run_backtest(&one_week(), &config).unwrap();

        assert_eq!(result.trades.len(), 2);
        let sell = &result.trades[0];
        let exit = &result.trades[1];

        assert_eq!(sell.kind, TradeKind::StraddleSell);
        assert_eq!(sell.side, Side::Straddle);
        assert_eq!(sell.date, date(2024, 2, 5));
        assert_relative_eq!(sell.strike, 22000.0);

        assert_eq!(exit.kind, TradeKind::StraddleExit);
        assert_eq!(exit.date, date(2024, 2, 8));
        assert_eq!(exit.exit_price, Some(0.0));

        let credit = sell.entry_price * config.lot_size as f64;
        assert!(credit > 0.0);
        assert_relative_eq!(exit.realized_pnl, credit, epsilon = 1e-6);
        assert_relative_eq!(
            result.final_capital,
            config.starting_capital + credit,
            epsilon = 1e-6
        );
    }

    #[test]
    fn straddle_ignores_risk_cap() {
        let mut config = sample_config(StrategyKind::StraddleSell);
        config.starting_capital = 10.0;
        let result = run_backtest(&one_week(), &config).unwrap();
        assert_eq!(result.trades[0].kind, TradeKind::StraddleSell);
    }

    #[test]
    fn weekly_bars_are_rejected() {
        let mut config = sample_config(StrategyKind::StraddleSell);
        config.timeframe = Timeframe::Weekly;
        let daily = bars_from_closes(date(2024, 1, 1), &[22000.0; 400]);
        let weekly = Timeframe::Weekly.apply(daily);

        let err = run_backtest(&weekly, &config).unwrap_err();
        assert!(
            matches!(err, OptraderError::ConfigInvalid { ref key, .. } if key == "timeframe"),
            "{err}"
        );
    }

    #[test]
    fn equity_only_moves_on_exit() {
        let config = sample_config(StrategyKind::StraddleSell);
        let result = run_backtest(&one_week(), &config).unwrap();
        let equity: Vec<f64> = result.equity_curve.iter().map(|p| p.equity).collect();
        assert_eq!(equity.len(), 4);
        assert_eq!(&equity[..3], &[config.starting_capital; 3]);
        assert!(equity[3] > config.starting_capital);
    }
}

mod risk_cap {
    use super::*;

    #[test]
    fn tiny_capital_never_opens_directional() {
        let bars = bars_from_closes(date(2024, 1, 1), &vee_then_fall());
        for kind in [StrategyKind::MaCrossover, StrategyKind::Breakout, StrategyKind::Rsi] {
            let mut config = ma_config();
            config.strategy = kind;
            config.starting_capital = 10.0;

            let result = run_backtest(&bars, &config).unwrap();
            assert!(result.trades.is_empty(), "{kind} opened a trade");
            assert_relative_eq!(result.final_capital, 10.0);
            assert_eq!(result.equity_curve.len(), bars.len() - MIN_BARS);
        }
    }
}

mod premium_triggers {
    use super::*;

    // flat, a one-bar breakout above the range, then `after` for a few bars
    fn breakout_then(after: f64) -> Vec<OhlcvBar> {
        let mut closes = vec![22000.0; 35];
        closes.push(22100.0);
        closes.extend([after; 5]);
        bars_from_closes(date(2024, 1, 1), &closes)
    }

    fn breakout_config() -> BacktestConfig {
        let mut config = sample_config(StrategyKind::Breakout);
        config.params.breakout_lookback = 5;
        config
    }

    #[test]
    fn stop_loss_closes_losing_call() {
        let mut config = breakout_config();
        config.stop_loss_pct = 50.0;

        let result = run_backtest(&breakout_then(21700.0), &config).unwrap();

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].kind, TradeKind::Entry);
        assert_eq!(result.trades[0].side, Side::Call);
        assert_eq!(result.trades[0].bar_index, 35);
        assert_eq!(result.trades[1].kind, TradeKind::StopLoss);
        assert_eq!(result.trades[1].bar_index, 36);
        assert!(result.trades[1].realized_pnl < 0.0);
    }

    #[test]
    fn take_profit_closes_winning_call() {
        let mut config = breakout_config();
        config.take_profit_pct = 100.0;

        let result = run_backtest(&breakout_then(22600.0), &config).unwrap();

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[1].kind, TradeKind::TakeProfit);
        assert!(result.trades[1].realized_pnl > 0.0);
    }

    #[test]
    fn without_triggers_downside_breakout_exits() {
        let result = run_backtest(&breakout_then(21700.0), &breakout_config()).unwrap();
        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[1].kind, TradeKind::Exit);
        assert_eq!(result.trades[1].bar_index, 36);
    }

    #[test]
    fn without_triggers_winner_is_force_closed() {
        let result = run_backtest(&breakout_then(22600.0), &breakout_config()).unwrap();
        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[1].kind, TradeKind::ForcedExit);
        assert_eq!(result.trades[1].bar_index, 40);
        assert!(result.trades[1].realized_pnl > 0.0);

        let last = result.equity_curve.last().unwrap();
        assert_relative_eq!(last.equity, result.final_capital);
    }
}

mod invariants {
    use super::*;

    fn walk(start: f64, steps: &[f64]) -> Vec<f64> {
        let mut closes = Vec::with_capacity(steps.len() + 1);
        let mut price = start;
        closes.push(price);
        for s in steps {
            price = (price * (1.0 + s)).max(1.0);
            closes.push(price);
        }
        closes
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn single_position_and_equity_length(
            steps in prop::collection::vec(-0.03f64..0.03, 40..160),
            kind_index in 0usize..4,
        ) {
            let closes = walk(22000.0, &steps);
            let bars = bars_from_closes(date(2024, 1, 1), &closes);
            let kind = StrategyKind::ALL[kind_index];
            let mut config = sample_config(kind);
            config.params.fast_ma = 5;
            config.params.slow_ma = 20;
            config.params.breakout_lookback = 10;

            let result = run_backtest(&bars, &config).unwrap();

            assert_alternating(&result);
            prop_assert_eq!(result.equity_curve.len(), bars.len() - MIN_BARS);
            prop_assert_eq!(result.bars_processed, result.equity_curve.len());
            prop_assert!(result.equity_curve.windows(2).all(|w| w[0].date < w[1].date));
        }
    }
}
