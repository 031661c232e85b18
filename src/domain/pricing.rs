//! Closed-form option valuation (Black-Scholes) and sensitivities.
//!
//! Inputs follow one convention throughout: volatility and rate are decimals
//! (0.16 = 16%) and time to expiry is in years. Inputs are not validated; a
//! zero volatility with positive time yields NaN rather than an error.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use std::f64::consts::{PI, SQRT_2};
use std::fmt;
use std::str::FromStr;

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.065;
pub const DEFAULT_VOLATILITY: f64 = 0.16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" | "ce" => Ok(OptionType::Call),
            "put" | "p" | "pe" => Ok(OptionType::Put),
            other => Err(format!("unknown option type '{}'", other)),
        }
    }
}

/// Sensitivities of a single option.
///
/// `theta` is per calendar day and `vega` is per one point of volatility
/// percentage (0.16 -> 0.17).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

/// Standard normal cumulative distribution.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

fn d1_d2(spot: f64, strike: f64, time: f64, rate: f64, volatility: f64) -> (f64, f64) {
    let vol_sqrt_t = volatility * time.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * volatility * volatility) * time) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

pub fn intrinsic_value(spot: f64, strike: f64, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => (spot - strike).max(0.0),
        OptionType::Put => (strike - spot).max(0.0),
    }
}

/// Fair value of a European option. Expired options (`time <= 0`) are worth
/// their intrinsic value.
pub fn price(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    volatility: f64,
    option_type: OptionType,
) -> f64 {
    if time <= 0.0 {
        return intrinsic_value(spot, strike, option_type);
    }

    let (d1, d2) = d1_d2(spot, strike, time, rate, volatility);
    let discounted_strike = strike * (-rate * time).exp();

    match option_type {
        OptionType::Call => spot * norm_cdf(d1) - discounted_strike * norm_cdf(d2),
        OptionType::Put => discounted_strike * norm_cdf(-d2) - spot * norm_cdf(-d1),
    }
}

pub fn greeks(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    volatility: f64,
    option_type: OptionType,
) -> Greeks {
    if time <= 0.0 {
        let delta = match option_type {
            OptionType::Call if spot > strike => 1.0,
            OptionType::Put if spot < strike => -1.0,
            _ => 0.0,
        };
        return Greeks {
            delta,
            gamma: 0.0,
            theta: 0.0,
            vega: 0.0,
        };
    }

    let (d1, d2) = d1_d2(spot, strike, time, rate, volatility);
    let sqrt_t = time.sqrt();
    let pdf_d1 = norm_pdf(d1);
    let discounted_strike = strike * (-rate * time).exp();

    let decay = -(spot * pdf_d1 * volatility) / (2.0 * sqrt_t);
    let (delta, theta_annual) = match option_type {
        OptionType::Call => (
            norm_cdf(d1),
            decay - rate * discounted_strike * norm_cdf(d2),
        ),
        OptionType::Put => (
            norm_cdf(d1) - 1.0,
            decay + rate * discounted_strike * norm_cdf(-d2),
        ),
    };

    Greeks {
        delta,
        gamma: pdf_d1 / (spot * volatility * sqrt_t),
        theta: theta_annual / DAYS_PER_YEAR,
        vega: spot * pdf_d1 * sqrt_t / 100.0,
    }
}

/// Convert a day count to the year fraction the pricer expects.
pub fn years_from_days(days: u32) -> f64 {
    days as f64 / DAYS_PER_YEAR
}
