// landed_core/src/domain.rs
use serde::{Deserialize, Serialize};

use crate::error::{PricingError, Result, check_dimension};

/// One product row: foreign unit cost plus the carton it ships in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub sku: Option<String>,
    pub unit_cost_foreign: f64,
    pub pack: u32,
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl ProductInput {
    pub fn validate(&self) -> Result<()> {
        if !self.unit_cost_foreign.is_finite() || self.unit_cost_foreign < 0.0 {
            return Err(PricingError::InvalidValue {
                field: "unit_cost_foreign",
                value: self.unit_cost_foreign.to_string(),
            });
        }
        if self.pack == 0 {
            return Err(PricingError::InvalidValue {
                field: "pack",
                value: "0".into(),
            });
        }
        self.parcel().map(|_| ())
    }

    /// The shipping carton as a courier parcel.
    pub fn parcel(&self) -> Result<Parcel> {
        Parcel::new(self.length_cm, self.width_cm, self.height_cm, self.weight_kg)
    }

    pub fn dims_label(&self) -> String {
        format!("{}x{}x{}", self.length_cm, self.width_cm, self.height_cm)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl Parcel {
    pub fn new(length_cm: f64, width_cm: f64, height_cm: f64, weight_kg: f64) -> Result<Self> {
        Ok(Self {
            length_cm: check_dimension("length_cm", length_cm)?,
            width_cm: check_dimension("width_cm", width_cm)?,
            height_cm: check_dimension("height_cm", height_cm)?,
            weight_kg: check_dimension("weight_kg", weight_kg)?,
        })
    }

    /// length + 2 * (width + height)
    pub fn girth_cm(&self) -> f64 {
        self.length_cm + 2.0 * (self.width_cm + self.height_cm)
    }

    pub fn volume_cm3(&self) -> f64 {
        self.length_cm * self.width_cm * self.height_cm
    }

    pub fn volume_l(&self) -> f64 {
        self.volume_cm3() / 1000.0
    }

    pub fn volumetric_weight_kg(&self, divisor: f64) -> f64 {
        self.volume_cm3() / divisor
    }

    pub fn has_all_dimensions(&self) -> bool {
        self.length_cm > 0.0 && self.width_cm > 0.0 && self.height_cm > 0.0
    }
}

/// One carrier service that can take a parcel, with its computed cost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourierOption {
    pub rule_id: String,
    pub carrier_name: String,
    pub service_name: String,
    pub cost: f64,
    pub parcel_count: u32,
    pub transit_days: String,
    pub match_reasons: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarginStatus {
    Good,
    Review,
    Low,
}

impl MarginStatus {
    pub fn label(self) -> &'static str {
        match self {
            MarginStatus::Good => "GOOD",
            MarginStatus::Review => "CHECK",
            MarginStatus::Low => "LOW",
        }
    }
}

/// Soft conditions on an otherwise priced row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowFlag {
    /// No freight could be allocated: zero volume or nothing fits the container.
    InsufficientData,
    /// No courier rule accepts the carton.
    Unshippable,
}

/// Result of pricing one product. Always rebuilt, never patched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricedResult {
    pub sku: Option<String>,
    pub unit_cost_foreign: f64,
    pub pack: u32,
    pub dims: String,
    pub cartons_per_container: u64,
    pub units_per_container: u64,
    pub freight_per_unit: f64,
    pub landed_unit_cost: f64,
    pub landed_pack_cost: f64,
    pub raw_sell_price: f64,
    pub required_sell_price: f64,
    pub profit: f64,
    pub margin_pct: Option<f64>,
    pub status: MarginStatus,
    pub chosen_courier: Option<CourierOption>,
    pub courier_options: Vec<CourierOption>,
    pub flags: Vec<RowFlag>,
}

impl PricedResult {
    pub fn has_flag(&self, flag: RowFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Promotes soft flags to errors, for callers that want every row complete.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.has_flag(RowFlag::InsufficientData) {
            return Err(PricingError::DegenerateVolume);
        }
        if self.has_flag(RowFlag::Unshippable) {
            return Err(PricingError::NoCourierMatch);
        }
        Ok(())
    }
}
