//! Courier rule table and parcel matching.

pub mod rules;
pub mod select;

pub use rules::{CourierRule, PricingKind, RuleTable, default_rules};
pub use select::{cheapest, rank_couriers};
