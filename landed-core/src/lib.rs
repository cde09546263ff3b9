#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;
pub mod settings;

pub mod margin;
pub mod packing;

pub mod courier;

pub mod ingest;
pub mod pricing;
pub mod report;

// Re-exports: stable API surface
pub use config::CalcConfig;
pub use courier::{CourierRule, PricingKind, RuleTable, rank_couriers};
pub use domain::{CourierOption, MarginStatus, Parcel, PricedResult, ProductInput, RowFlag};
pub use margin::{PriceEnding, compute_profit, margin_pct, required_sell_price};
pub use pricing::{Calculator, RowOutcome, compute_bulk, compute_pricing};
pub use settings::{ContainerProfile, PricingSettings};
