use landed_core::error::PricingError;
use landed_core::ingest::parse_rows;
use landed_core::report::{SortKey, price_list, sorted_view, summarize, to_csv};
use landed_core::{
    CalcConfig, Calculator, ContainerProfile, Parcel, PriceEnding, PricingSettings, ProductInput,
    RowFlag, RuleTable, compute_profit, rank_couriers, required_sell_price,
};

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn reference_margin_chain() {
    // 2.35 foreign at 1.28, 500 units sharing 2800 of freight
    let container = ContainerProfile {
        nominal_volume_cbm: 250.0,
        efficiency: 1.0,
        shipment_cost: 2800.0,
    };
    let calc = Calculator::new(PricingSettings::default(), container, RuleTable::default()).unwrap();
    let r = calc
        .price(&ProductInput {
            sku: Some("REF".into()),
            unit_cost_foreign: 2.35,
            pack: 1,
            length_cm: 100.0,
            width_cm: 100.0,
            height_cm: 50.0,
            weight_kg: 10.0,
        })
        .unwrap();

    assert_eq!(r.units_per_container, 500);
    assert!(close(r.freight_per_unit, 5.60, 1e-9));
    assert!(close(r.landed_unit_cost, 2.35 / 1.28 + 5.60, 1e-9));
    assert!(close(r.required_sell_price, 16.98, 0.005));
}

#[test]
fn round_trip_margin_property() {
    let mut landed = 0.25;
    while landed < 500.0 {
        for fee in [0.0, 5.0, 15.3, 33.3, 70.0] {
            let mut margin = 0.5;
            while margin < 100.0 - fee {
                let s = required_sell_price(margin, landed, fee, 0.0).unwrap();
                let p = compute_profit(s, landed, fee, 0.0);
                assert!(close(p / s, margin / 100.0, 1e-9));
                margin += 4.75;
            }
        }
        landed *= 3.1;
    }
}

#[test]
fn default_table_bulky_carton() {
    let parcel = Parcel::new(76.0, 43.0, 47.0, 10.0).unwrap();
    let ranked = rank_couriers(&parcel, RuleTable::default().rules());
    let ids: Vec<&str> = ranked.iter().map(|o| o.rule_id.as_str()).collect();
    for expected in ["dpd_48", "pf_48", "evri_ll", "dx_std", "dx_len"] {
        assert!(ids.contains(&expected), "{expected} missing from {ids:?}");
    }
    assert!(!ids.contains(&"evri_packet"));
    assert!(ranked.windows(2).all(|w| w[0].cost <= w[1].cost));
}

#[test]
fn bulk_text_end_to_end() {
    let text = "\
sku,unit_cost,pack,length,width,height,weight
A,2.35,1,76,43,47,10
B,oops,1,10,10,10,1
C,1.10,1,0,20,20,1
D,8.00,2,40,30,20,4
E,3.00,1,60,60,60,45
";
    let calc = CalcConfig::default().calculator().unwrap();
    let rows = calc.price_rows(parse_rows(text));
    assert_eq!(rows.iter().map(|r| r.line).collect::<Vec<_>>(), [2, 3, 4, 5, 6]);

    assert!(rows[0].result.as_ref().unwrap().chosen_courier.is_some());
    assert!(matches!(rows[1].result, Err(PricingError::Parse { line: 3, .. })));
    let c = rows[2].result.as_ref().unwrap();
    assert!(c.has_flag(RowFlag::InsufficientData));
    assert!(c.has_flag(RowFlag::Unshippable));
    let e = rows[4].result.as_ref().unwrap();
    assert!(e.has_flag(RowFlag::Unshippable));
    assert!(e.chosen_courier.is_none());

    let s = summarize(&rows);
    assert_eq!((s.total, s.priced, s.failed), (5, 4, 1));
    assert_eq!(s.unshippable, 2);
    assert_eq!(s.insufficient_data, 1);

    assert_eq!(price_list(&rows).lines().count(), 4);
    assert_eq!(to_csv(&rows).lines().count(), 5);

    let by_price = sorted_view(&rows, SortKey::PriceDesc);
    assert_eq!(by_price.last().unwrap().line, 3);
}

#[test]
fn unsatisfiable_margin_only_fails_affected_batch_rows() {
    let settings = PricingSettings {
        target_margin_pct: 60.0,
        marketplace_fee_pct: 45.0,
        price_ending: Some(PriceEnding::Round),
        ..Default::default()
    };
    let calc = Calculator::new(settings, ContainerProfile::default(), RuleTable::default()).unwrap();
    let rows = calc.price_rows(parse_rows("a,1,1,10,10,10,1\nb,x,1,1,1,1,1\n"));
    assert!(matches!(
        rows[0].result,
        Err(PricingError::MarginUnsatisfiable { .. })
    ));
    assert!(matches!(rows[1].result, Err(PricingError::Parse { .. })));
}

#[test]
fn live_rule_edit_does_not_touch_running_snapshot() {
    let calc = Calculator::default();
    let before = calc.rules().clone();
    let edited = before.without_rule("dpd_48");
    let next = Calculator::new(
        calc.settings().clone(),
        calc.container().clone(),
        edited,
    )
    .unwrap();

    let parcel = Parcel::new(76.0, 43.0, 47.0, 10.0).unwrap();
    assert_eq!(rank_couriers(&parcel, calc.rules().rules())[0].rule_id, "dpd_48");
    assert_eq!(rank_couriers(&parcel, next.rules().rules())[0].rule_id, "pf_48");
}
