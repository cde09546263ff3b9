// landed_core/src/pricing.rs
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::courier::rules::{CourierRule, RuleTable};
use crate::courier::select::rank_couriers;
use crate::domain::{PricedResult, ProductInput, RowFlag};
use crate::error::Result;
use crate::ingest::ParsedRow;
use crate::margin::{classify, compute_profit, margin_pct, required_sell_price};
use crate::packing::estimate;
use crate::settings::{ContainerProfile, PricingSettings};

/// Landed cost, sell price, profit and courier for one product.
///
/// Fails on invalid input, invalid settings or when the margin cannot be
/// reached. Missing freight data and unshippable cartons are reported as
/// flags instead.
pub fn compute_pricing(
    product: &ProductInput,
    settings: &PricingSettings,
    container: &ContainerProfile,
    rules: &[CourierRule],
) -> Result<PricedResult> {
    settings.validate()?;
    container.validate()?;
    price_checked(product, settings, container, rules)
}

// settings and container already validated
fn price_checked(
    product: &ProductInput,
    settings: &PricingSettings,
    container: &ContainerProfile,
    rules: &[CourierRule],
) -> Result<PricedResult> {
    product.validate()?;
    let parcel = product.parcel()?;

    let packing = estimate(
        product.length_cm,
        product.width_cm,
        product.height_cm,
        product.pack,
        product.unit_cost_foreign,
        settings.fx_rate,
        container,
    );

    // priced per pack; identical to unit cost when pack == 1
    let purchase = packing.landed_pack_cost;
    let raw_sell_price = required_sell_price(
        settings.target_margin_pct,
        purchase,
        settings.marketplace_fee_pct,
        settings.fixed_per_order_cost,
    )?;
    let required_sell_price = settings
        .price_ending
        .map_or(raw_sell_price, |ending| ending.apply(raw_sell_price));

    let profit = compute_profit(
        required_sell_price,
        purchase,
        settings.marketplace_fee_pct,
        settings.fixed_per_order_cost,
    );
    let margin = margin_pct(profit, required_sell_price);

    let courier_options = if parcel.has_all_dimensions() {
        rank_couriers(&parcel, rules)
    } else {
        Vec::new()
    };

    let mut flags = Vec::new();
    if packing.is_degenerate() {
        flags.push(RowFlag::InsufficientData);
    }
    if courier_options.is_empty() {
        flags.push(RowFlag::Unshippable);
    }

    debug!(
        sku = product.sku.as_deref().unwrap_or(""),
        landed = packing.landed_unit_cost,
        sell = required_sell_price,
        couriers = courier_options.len(),
        "priced product"
    );

    Ok(PricedResult {
        sku: product.sku.clone(),
        unit_cost_foreign: product.unit_cost_foreign,
        pack: product.pack,
        dims: product.dims_label(),
        cartons_per_container: packing.cartons_per_container,
        units_per_container: packing.units_per_container,
        freight_per_unit: packing.freight_per_unit,
        landed_unit_cost: packing.landed_unit_cost,
        landed_pack_cost: packing.landed_pack_cost,
        raw_sell_price,
        required_sell_price,
        profit,
        margin_pct: margin,
        status: classify(margin, settings.target_margin_pct, settings.review_floor_pct),
        chosen_courier: courier_options.first().cloned(),
        courier_options,
        flags,
    })
}

/// One input row and what became of it.
#[derive(Debug)]
pub struct RowOutcome {
    /// 1-based position in the source (line number for text input).
    pub line: usize,
    pub result: Result<PricedResult>,
}

/// Settings, container and courier snapshot shared by every row of a batch.
#[derive(Clone, Debug, Default)]
pub struct Calculator {
    settings: PricingSettings,
    container: ContainerProfile,
    rules: RuleTable,
}

impl Calculator {
    pub fn new(
        settings: PricingSettings,
        container: ContainerProfile,
        rules: RuleTable,
    ) -> Result<Self> {
        settings.validate()?;
        container.validate()?;
        Ok(Self {
            settings,
            container,
            rules,
        })
    }

    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    pub fn container(&self) -> &ContainerProfile {
        &self.container
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn price(&self, product: &ProductInput) -> Result<PricedResult> {
        price_checked(product, &self.settings, &self.container, self.rules.rules())
    }

    /// Prices every product in parallel. Output is one-to-one with input, in input order.
    pub fn price_bulk(&self, products: &[ProductInput]) -> Vec<Result<PricedResult>> {
        let out: Vec<_> = products.par_iter().map(|p| self.price(p)).collect();
        let mut failed = 0usize;
        for (idx, r) in out.iter().enumerate() {
            if let Err(e) = r {
                failed += 1;
                warn!(row = idx + 1, error = %e, "row not priced");
            }
        }
        info!(rows = out.len(), failed, "bulk pricing finished");
        out
    }

    /// Prices parsed text rows; rows that failed to parse keep their parse error.
    pub fn price_rows(&self, rows: Vec<ParsedRow>) -> Vec<RowOutcome> {
        let out: Vec<RowOutcome> = rows
            .into_par_iter()
            .map(|row| RowOutcome {
                line: row.line,
                result: row.outcome.and_then(|p| self.price(&p)),
            })
            .collect();
        for row in &out {
            if let Err(e) = &row.result {
                warn!(line = row.line, error = %e, "row not priced");
            }
        }
        info!(rows = out.len(), "bulk pricing finished");
        out
    }
}

/// Free-function form of [`Calculator::price_bulk`].
pub fn compute_bulk(
    products: &[ProductInput],
    settings: &PricingSettings,
    container: &ContainerProfile,
    rules: &[CourierRule],
) -> Vec<Result<PricedResult>> {
    if let Err(e) = settings.validate().and_then(|_| container.validate()) {
        warn!(error = %e, "bulk pricing rejected settings");
        return products
            .iter()
            .map(|p| compute_pricing(p, settings, container, rules))
            .collect();
    }
    products
        .par_iter()
        .map(|p| price_checked(p, settings, container, rules))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courier::rules::default_rules;
    use crate::domain::MarginStatus;
    use crate::error::PricingError;
    use crate::margin::PriceEnding;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn product(cost: f64, pack: u32, l: f64, w: f64, h: f64, kg: f64) -> ProductInput {
        ProductInput {
            sku: Some("SKU-1".into()),
            unit_cost_foreign: cost,
            pack,
            length_cm: l,
            width_cm: w,
            height_cm: h,
            weight_kg: kg,
        }
    }

    fn half_cube_container() -> ContainerProfile {
        ContainerProfile {
            nominal_volume_cbm: 250.0,
            efficiency: 1.0,
            shipment_cost: 2800.0,
        }
    }

    #[test]
    fn reference_scenario() {
        let settings = PricingSettings::default();
        let r = compute_pricing(
            &product(2.35, 1, 100.0, 100.0, 50.0, 10.0),
            &settings,
            &half_cube_container(),
            &default_rules(),
        )
        .unwrap();
        assert_eq!(r.units_per_container, 500);
        assert!((r.freight_per_unit - 5.60).abs() < 1e-9);
        assert!((r.landed_unit_cost - 7.4359375).abs() < 1e-9);
        assert!((r.required_sell_price - 16.98).abs() < 0.01);
        let m = r.margin_pct.unwrap();
        assert!((m - 25.0).abs() < 1e-9);
        assert_eq!(r.status, MarginStatus::Good);
        assert!(r.flags.is_empty());
        // 100 volumetric kg: four DX parcels beat four length-banded ones
        let chosen = r.chosen_courier.as_ref().unwrap();
        assert_eq!(chosen.rule_id, "dx_std");
        assert_eq!(chosen.parcel_count, 4);
        assert_eq!(r.courier_options.len(), 2);
    }

    #[test]
    fn zero_dimension_flags_insufficient_data_and_unshippable() {
        let r = compute_pricing(
            &product(10.0, 1, 0.0, 20.0, 20.0, 1.0),
            &PricingSettings::default(),
            &ContainerProfile::default(),
            &default_rules(),
        )
        .unwrap();
        assert_eq!(r.units_per_container, 0);
        assert_eq!(r.freight_per_unit, 0.0);
        assert!(r.has_flag(RowFlag::InsufficientData));
        assert!(r.has_flag(RowFlag::Unshippable));
        assert!(r.chosen_courier.is_none());
        assert!(matches!(r.ensure_complete(), Err(PricingError::DegenerateVolume)));
    }

    #[test]
    fn unsatisfiable_margin_is_an_error() {
        let settings = PricingSettings {
            target_margin_pct: 90.0,
            marketplace_fee_pct: 15.0,
            ..Default::default()
        };
        let err = compute_pricing(
            &product(10.0, 1, 30.0, 20.0, 10.0, 1.0),
            &settings,
            &ContainerProfile::default(),
            &default_rules(),
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::MarginUnsatisfiable { .. }));
    }

    #[test]
    fn negative_dimension_rejected() {
        let err = compute_pricing(
            &product(10.0, 1, 30.0, -20.0, 10.0, 1.0),
            &PricingSettings::default(),
            &ContainerProfile::default(),
            &default_rules(),
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::InvalidDimension { .. }));
    }

    #[test]
    fn ending_applied_before_profit() {
        let settings = PricingSettings {
            price_ending: Some(PriceEnding::NinetyNine),
            ..Default::default()
        };
        let r = compute_pricing(
            &product(2.35, 1, 100.0, 100.0, 50.0, 10.0),
            &settings,
            &half_cube_container(),
            &default_rules(),
        )
        .unwrap();
        assert!((r.raw_sell_price - 16.978).abs() < 0.01);
        assert!((r.required_sell_price - 16.99).abs() < 1e-9);
        let expected = compute_profit(16.99, r.landed_pack_cost, 15.3, 2.70);
        assert!((r.profit - expected).abs() < 1e-9);
        assert!(r.margin_pct.unwrap() > 25.0);
    }

    #[test]
    fn pack_priced_as_a_whole() {
        let r = compute_pricing(
            &product(1.28, 4, 40.0, 30.0, 20.0, 3.0),
            &PricingSettings::default(),
            &ContainerProfile::default(),
            &default_rules(),
        )
        .unwrap();
        assert!((r.landed_pack_cost - r.landed_unit_cost * 4.0).abs() < 1e-9);
        let expected = required_sell_price(25.0, r.landed_pack_cost, 15.3, 2.70).unwrap();
        assert!((r.required_sell_price - expected).abs() < 1e-9);
        assert_eq!(r.units_per_container, r.cartons_per_container * 4);
        assert!(r.chosen_courier.is_some());
    }

    #[test]
    fn calculator_rejects_bad_settings() {
        let settings = PricingSettings {
            fx_rate: -1.0,
            ..Default::default()
        };
        assert!(
            Calculator::new(settings, ContainerProfile::default(), RuleTable::default()).is_err()
        );
    }

    #[test]
    fn unended_prices_at_target_margin_are_good() {
        let products: Vec<ProductInput> = (1..2000)
            .map(|i| product(i as f64 * 0.37, 1, 30.0, 20.0, 10.0, 1.0))
            .collect();
        for r in Calculator::default().price_bulk(&products) {
            let r = r.unwrap();
            assert_eq!(r.status, MarginStatus::Good, "cost {}", r.unit_cost_foreign);
        }
    }

    #[test]
    fn zero_fx_rate_is_a_typed_error() {
        let settings = PricingSettings {
            fx_rate: 0.0,
            ..Default::default()
        };
        let err = compute_pricing(
            &product(2.35, 1, 30.0, 20.0, 10.0, 1.0),
            &settings,
            &ContainerProfile::default(),
            &default_rules(),
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::InvalidValue { field: "fx_rate", .. }));
    }

    #[test]
    fn bad_container_fails_every_bulk_row() {
        let container = ContainerProfile {
            efficiency: -1.0,
            ..Default::default()
        };
        let products = vec![
            product(2.35, 1, 30.0, 20.0, 10.0, 1.0),
            product(4.00, 2, 40.0, 30.0, 20.0, 3.0),
        ];
        let out = compute_bulk(
            &products,
            &PricingSettings::default(),
            &container,
            &default_rules(),
        );
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| matches!(
            r,
            Err(PricingError::InvalidValue { field: "efficiency", .. })
        )));
    }

    #[derive(Clone, Default)]
    struct LogBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuf {
        type Writer = LogBuf;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn bulk_warns_once_per_failed_row() {
        let mut products: Vec<ProductInput> = (0..5)
            .map(|i| product(1.0 + i as f64, 1, 30.0, 20.0, 10.0, 1.0))
            .collect();
        products[1].weight_kg = -1.0;
        products[3].unit_cost_foreign = f64::NAN;

        let logs = LogBuf::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let out = tracing::subscriber::with_default(subscriber, || {
            Calculator::default().price_bulk(&products)
        });

        assert_eq!(out.iter().filter(|r| r.is_err()).count(), 2);
        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.matches("row not priced").count(), 2);
        assert!(text.contains("row=2"));
        assert!(text.contains("row=4"));
    }

    #[test]
    fn bulk_preserves_order_and_isolates_failures() {
        let calc = Calculator::default();
        let products: Vec<ProductInput> = (0..64)
            .map(|i| {
                let mut p = product(1.0 + i as f64, 1, 30.0, 20.0, 10.0, 1.0);
                p.sku = Some(format!("P{i}"));
                if i % 10 == 3 {
                    p.weight_kg = -1.0;
                }
                p
            })
            .collect();
        let out = calc.price_bulk(&products);
        assert_eq!(out.len(), products.len());
        for (i, r) in out.iter().enumerate() {
            if i % 10 == 3 {
                assert!(r.is_err());
            } else {
                assert_eq!(r.as_ref().unwrap().sku.as_deref(), Some(format!("P{i}").as_str()));
            }
        }
        let free = compute_bulk(
            &products,
            calc.settings(),
            calc.container(),
            calc.rules().rules(),
        );
        assert_eq!(free.len(), out.len());
        assert_eq!(free[0].as_ref().unwrap(), out[0].as_ref().unwrap());
    }
}
