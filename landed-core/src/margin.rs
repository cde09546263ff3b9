//! Conversions between cost, sell price and margin.
//!
//! Margin is profit as a share of the sell price. The marketplace fee is taken
//! off the sell price before profit, the fixed cost once per order.

use serde::{Deserialize, Serialize};

use crate::domain::MarginStatus;
use crate::error::{PricingError, Result};

/// Sell price at which `profit / price == margin`.
///
/// `S = (landed + fixed) / (1 - fee/100 - margin/100)`. Fails when fee and
/// margin together take the whole price.
pub fn required_sell_price(
    target_margin_pct: f64,
    landed_cost: f64,
    marketplace_fee_pct: f64,
    fixed_per_order_cost: f64,
) -> Result<f64> {
    let keep = 1.0 - marketplace_fee_pct / 100.0 - target_margin_pct / 100.0;
    if keep <= 0.0 || !keep.is_finite() {
        return Err(PricingError::MarginUnsatisfiable {
            margin_pct: target_margin_pct,
            fee_pct: marketplace_fee_pct,
        });
    }
    Ok((landed_cost + fixed_per_order_cost) / keep)
}

/// Profit left after fee, landed cost and fixed cost. Negative means a loss.
pub fn compute_profit(
    sell_price: f64,
    landed_cost: f64,
    marketplace_fee_pct: f64,
    fixed_per_order_cost: f64,
) -> f64 {
    sell_price * (1.0 - marketplace_fee_pct / 100.0) - landed_cost - fixed_per_order_cost
}

/// `None` when there is no positive price to measure against.
pub fn margin_pct(profit: f64, sell_price: f64) -> Option<f64> {
    if sell_price > 0.0 {
        Some(profit / sell_price * 100.0)
    } else {
        None
    }
}

/// Slack for margins that land a rounding error below their threshold.
const MARGIN_TOLERANCE_PCT: f64 = 1e-9;

pub fn classify(margin_pct: Option<f64>, target_pct: f64, review_floor_pct: f64) -> MarginStatus {
    match margin_pct {
        Some(m) if m + MARGIN_TOLERANCE_PCT >= target_pct => MarginStatus::Good,
        Some(m) if m + MARGIN_TOLERANCE_PCT >= review_floor_pct => MarginStatus::Review,
        _ => MarginStatus::Low,
    }
}

/// Retail price endings applied to a computed sell price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceEnding {
    Round,
    #[serde(rename = ".99")]
    NinetyNine,
    #[serde(rename = ".95")]
    NinetyFive,
    #[serde(rename = ".49")]
    FortyNine,
}

impl PriceEnding {
    pub fn apply(self, price: f64) -> f64 {
        match self {
            PriceEnding::Round => price.round(),
            PriceEnding::NinetyNine => price.floor() + 0.99,
            PriceEnding::NinetyFive => price.floor() + 0.95,
            PriceEnding::FortyNine => price.floor() + 0.49,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriceEnding::Round => "round",
            PriceEnding::NinetyNine => ".99",
            PriceEnding::NinetyFive => ".95",
            PriceEnding::FortyNine => ".49",
        }
    }
}

impl std::str::FromStr for PriceEnding {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "round" => Ok(PriceEnding::Round),
            ".99" | "99" => Ok(PriceEnding::NinetyNine),
            ".95" | "95" => Ok(PriceEnding::NinetyFive),
            ".49" | "49" => Ok(PriceEnding::FortyNine),
            other => Err(PricingError::InvalidValue {
                field: "price_ending",
                value: other.to_string(),
            }),
        }
    }
}
