use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PricingError, Result};

/// How a rule's price grows with parcel count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingKind {
    /// One parcel at the base price.
    #[default]
    Flat,
    /// Split every 30kg of actual weight; extra parcels at `additional_parcel_price`.
    MultiParcel,
    /// Split by the greater of actual and volumetric weight, with a per-parcel
    /// surcharge once either passes the heavy threshold.
    BandedSurcharge,
    /// Split by the greater of actual and volumetric weight; every parcel at base price.
    LengthBanded,
}

/// One carrier service and the parcels it accepts. Unset limits are open.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourierRule {
    pub id: String,
    /// "Carrier / Service"
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_girth_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_volume_l: Option<f64>,
    /// Exclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_volume_l: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_volume_cm3: Option<f64>,
    pub base_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_parcel_price: Option<f64>,
    #[serde(default)]
    pub kind: PricingKind,
    #[serde(default = "default_transit_days")]
    pub transit_days: String,
}

fn default_transit_days() -> String {
    "2-3".into()
}

impl CourierRule {
    fn flat(id: &str, name: &str, base_price: f64, transit_days: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_length_cm: None,
            max_width_cm: None,
            max_height_cm: None,
            max_girth_cm: None,
            max_weight_kg: None,
            max_volume_l: None,
            min_volume_l: None,
            max_volume_cm3: None,
            base_price,
            additional_parcel_price: None,
            kind: PricingKind::Flat,
            transit_days: transit_days.into(),
        }
    }

    /// Splits "Carrier / Service" on the first slash.
    pub fn carrier_and_service(&self) -> (String, String) {
        match self.name.split_once('/') {
            Some((carrier, service)) => (carrier.trim().to_string(), service.trim().to_string()),
            None => (self.name.trim().to_string(), String::new()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PricingError::Config("courier rule with empty id".into()));
        }
        let prices = [Some(self.base_price), self.additional_parcel_price];
        if prices.iter().flatten().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(PricingError::Config(format!(
                "courier rule {}: prices must be non-negative",
                self.id
            )));
        }
        let limits = [
            self.max_length_cm,
            self.max_width_cm,
            self.max_height_cm,
            self.max_girth_cm,
            self.max_weight_kg,
            self.max_volume_l,
            self.min_volume_l,
            self.max_volume_cm3,
        ];
        if limits.iter().flatten().any(|l| l.is_nan() || *l < 0.0) {
            return Err(PricingError::Config(format!(
                "courier rule {}: limits must be non-negative",
                self.id
            )));
        }
        Ok(())
    }
}

/// Immutable snapshot of the courier table. Edits produce a new snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleTable(Arc<[CourierRule]>);

impl RuleTable {
    pub fn new(rules: Vec<CourierRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for r in &rules {
            r.validate()?;
            if !seen.insert(r.id.as_str()) {
                return Err(PricingError::Config(format!(
                    "duplicate courier rule id: {}",
                    r.id
                )));
            }
        }
        Ok(Self(rules.into()))
    }

    pub fn rules(&self) -> &[CourierRule] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CourierRule> {
        self.0.iter().find(|r| r.id == id)
    }

    /// New snapshot with the rule of the same id replaced, or appended if absent.
    pub fn with_rule(&self, rule: CourierRule) -> Result<Self> {
        let mut rules = self.0.to_vec();
        match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(slot) => *slot = rule,
            None => rules.push(rule),
        }
        Self::new(rules)
    }

    pub fn without_rule(&self, id: &str) -> Self {
        Self(self.0.iter().filter(|r| r.id != id).cloned().collect())
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self(default_rules().into())
    }
}

/// UK domestic services the calculator ships with.
pub fn default_rules() -> Vec<CourierRule> {
    vec![
        CourierRule {
            max_length_cm: Some(120.0),
            max_girth_cm: Some(225.0),
            max_weight_kg: Some(2.0),
            max_volume_l: Some(40.0),
            ..CourierRule::flat("evri_packet", "Evri / Packet", 1.85, "2-3")
        },
        CourierRule {
            max_length_cm: Some(120.0),
            max_girth_cm: Some(225.0),
            max_weight_kg: Some(2.0),
            min_volume_l: Some(40.0),
            ..CourierRule::flat("evri_packet_large", "Evri / Packet over 40L", 2.25, "2-3")
        },
        CourierRule {
            max_length_cm: Some(120.0),
            max_girth_cm: Some(225.0),
            max_weight_kg: Some(15.0),
            ..CourierRule::flat("evri_parcel", "Evri / Parcel", 2.33, "2-3")
        },
        CourierRule {
            max_length_cm: Some(90.0),
            max_volume_cm3: Some(110_000.0),
            max_weight_kg: Some(17.0),
            ..CourierRule::flat("yodel_express", "Yodel / Express", 2.30, "1-2")
        },
        CourierRule {
            max_length_cm: Some(120.0),
            max_width_cm: Some(70.0),
            max_height_cm: Some(60.0),
            max_weight_kg: Some(30.0),
            ..CourierRule::flat("dpd_48", "DPD / 48 Hour", 4.51, "1-2")
        },
        CourierRule {
            max_length_cm: Some(150.0),
            max_girth_cm: Some(300.0),
            max_weight_kg: Some(30.0),
            additional_parcel_price: Some(2.70),
            kind: PricingKind::MultiParcel,
            ..CourierRule::flat("pf_48", "Parcelforce / 48 Hour", 5.40, "1-2")
        },
        CourierRule {
            max_length_cm: Some(180.0),
            max_girth_cm: Some(380.0),
            max_weight_kg: Some(30.0),
            ..CourierRule::flat("evri_ll", "Evri / L&L", 8.00, "3-5")
        },
        CourierRule {
            max_length_cm: Some(150.0),
            max_weight_kg: Some(30.0),
            additional_parcel_price: Some(3.30),
            kind: PricingKind::BandedSurcharge,
            ..CourierRule::flat("dx_std", "DX / Standard", 5.40, "2-3")
        },
        CourierRule {
            max_length_cm: Some(200.0),
            max_weight_kg: Some(30.0),
            kind: PricingKind::LengthBanded,
            ..CourierRule::flat("dx_len", "DX / Lengths", 12.21, "2-3")
        },
    ]
}
