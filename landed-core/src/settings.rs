use serde::{Deserialize, Serialize};

use crate::error::{PricingError, Result};
use crate::margin::PriceEnding;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Target profit as a percentage of sell price, in (0, 100).
    pub target_margin_pct: f64,
    /// Share of the sell price kept by the marketplace, in [0, 100).
    pub marketplace_fee_pct: f64,
    /// Pick, pack and postage overhead charged once per order.
    pub fixed_per_order_cost: f64,
    /// Foreign currency units per local unit.
    pub fx_rate: f64,
    pub price_ending: Option<PriceEnding>,
    /// Margins below target but at or above this floor classify as review.
    pub review_floor_pct: f64,
    pub currency_symbol: String,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            target_margin_pct: 25.0,
            marketplace_fee_pct: 15.3,
            fixed_per_order_cost: 2.70,
            fx_rate: 1.28,
            price_ending: None,
            review_floor_pct: 15.0,
            currency_symbol: "£".into(),
        }
    }
}

impl PricingSettings {
    pub fn validate(&self) -> Result<()> {
        let pct = self.target_margin_pct;
        if !pct.is_finite() || pct <= 0.0 || pct >= 100.0 {
            return Err(invalid("target_margin_pct", pct));
        }
        let fee = self.marketplace_fee_pct;
        if !fee.is_finite() || !(0.0..100.0).contains(&fee) {
            return Err(invalid("marketplace_fee_pct", fee));
        }
        let fixed = self.fixed_per_order_cost;
        if !fixed.is_finite() || fixed < 0.0 {
            return Err(invalid("fixed_per_order_cost", fixed));
        }
        if !self.fx_rate.is_finite() || self.fx_rate <= 0.0 {
            return Err(invalid("fx_rate", self.fx_rate));
        }
        if !self.review_floor_pct.is_finite() {
            return Err(invalid("review_floor_pct", self.review_floor_pct));
        }
        Ok(())
    }

    pub fn money(&self, amount: f64) -> String {
        if amount.is_finite() {
            if amount < 0.0 {
                format!("-{}{:.2}", self.currency_symbol, -amount)
            } else {
                format!("{}{:.2}", self.currency_symbol, amount)
            }
        } else {
            "—".into()
        }
    }
}

/// Usable capacity and cost of one sea container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerProfile {
    pub nominal_volume_cbm: f64,
    /// Packing efficiency derate applied to the nominal volume, in (0, 1].
    pub efficiency: f64,
    /// Total freight for one container, in local currency.
    pub shipment_cost: f64,
}

impl Default for ContainerProfile {
    // 40ft high cube
    fn default() -> Self {
        Self {
            nominal_volume_cbm: 76.0,
            efficiency: 0.895,
            shipment_cost: 2800.0,
        }
    }
}

impl ContainerProfile {
    pub fn effective_volume_cbm(&self) -> f64 {
        self.nominal_volume_cbm * self.efficiency
    }

    pub fn validate(&self) -> Result<()> {
        if !self.nominal_volume_cbm.is_finite() || self.nominal_volume_cbm <= 0.0 {
            return Err(invalid("nominal_volume_cbm", self.nominal_volume_cbm));
        }
        if !self.efficiency.is_finite() || self.efficiency <= 0.0 || self.efficiency > 1.0 {
            return Err(invalid("efficiency", self.efficiency));
        }
        if !self.shipment_cost.is_finite() || self.shipment_cost < 0.0 {
            return Err(invalid("shipment_cost", self.shipment_cost));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: f64) -> PricingError {
    PricingError::InvalidValue {
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        PricingSettings::default().validate().unwrap();
        ContainerProfile::default().validate().unwrap();
        let eff = ContainerProfile::default().effective_volume_cbm();
        assert!((eff - 68.02).abs() < 1e-9);
    }

    #[test]
    fn fee_of_one_hundred_rejected() {
        let s = PricingSettings {
            marketplace_fee_pct: 100.0,
            ..Default::default()
        };
        assert!(matches!(
            s.validate(),
            Err(PricingError::InvalidValue {
                field: "marketplace_fee_pct",
                ..
            })
        ));
    }

    #[test]
    fn margin_bounds_are_open() {
        for bad in [0.0, 100.0, -5.0, f64::NAN] {
            let s = PricingSettings {
                target_margin_pct: bad,
                ..Default::default()
            };
            assert!(s.validate().is_err(), "margin {bad} accepted");
        }
    }

    #[test]
    fn fx_must_be_positive() {
        let s = PricingSettings {
            fx_rate: 0.0,
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn money_formatting() {
        let s = PricingSettings::default();
        assert_eq!(s.money(16.978), "£16.98");
        assert_eq!(s.money(-1.5), "-£1.50");
        assert_eq!(s.money(f64::NAN), "—");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: PricingSettings = serde_json::from_str(r#"{"target_margin_pct": 30}"#).unwrap();
        assert_eq!(s.target_margin_pct, 30.0);
        assert_eq!(s.fx_rate, 1.28);
    }
}
