use crate::courier::rules::{CourierRule, PricingKind};
use crate::domain::{CourierOption, Parcel};

/// Heaviest single parcel before a consignment is split.
pub const PARCEL_WEIGHT_CAP_KG: f64 = 30.0;
/// cm³ per volumetric kg.
pub const VOLUMETRIC_DIVISOR: f64 = 5000.0;
pub const SURCHARGE_THRESHOLD_KG: f64 = 25.0;
pub const SURCHARGE_PER_PARCEL: f64 = 1.75;

// A zero limit is stored by older configs to mean "no limit".
fn active_limit(limit: Option<f64>) -> Option<f64> {
    limit.filter(|l| *l > 0.0)
}

/// True when every limit the rule sets holds for the parcel.
pub fn accepts(rule: &CourierRule, parcel: &Parcel) -> bool {
    let within =
        |limit: Option<f64>, value: f64| active_limit(limit).is_none_or(|max| value <= max);

    within(rule.max_length_cm, parcel.length_cm)
        && within(rule.max_width_cm, parcel.width_cm)
        && within(rule.max_height_cm, parcel.height_cm)
        && within(rule.max_girth_cm, parcel.girth_cm())
        && within(rule.max_weight_kg, parcel.weight_kg)
        && within(rule.max_volume_l, parcel.volume_l())
        && active_limit(rule.min_volume_l).is_none_or(|min| parcel.volume_l() > min)
        && within(rule.max_volume_cm3, parcel.volume_cm3())
}

/// Cost and parcel count for a parcel the rule accepts.
pub fn quote(rule: &CourierRule, parcel: &Parcel) -> (f64, u32) {
    let extra = rule.additional_parcel_price.unwrap_or(0.0);
    let volumetric = parcel.volumetric_weight_kg(VOLUMETRIC_DIVISOR);
    let chargeable = parcel.weight_kg.max(volumetric);

    match rule.kind {
        PricingKind::Flat => (rule.base_price, 1),
        PricingKind::MultiParcel => {
            let parcels = parcels_for(parcel.weight_kg);
            let cost = rule.base_price + parcels.saturating_sub(1) as f64 * extra;
            (cost, parcels)
        }
        PricingKind::BandedSurcharge => {
            let parcels = parcels_for(chargeable);
            let heavy = parcel.weight_kg > SURCHARGE_THRESHOLD_KG
                || volumetric > SURCHARGE_THRESHOLD_KG;
            let surcharge = if heavy {
                SURCHARGE_PER_PARCEL * parcels as f64
            } else {
                0.0
            };
            let cost = rule.base_price + (parcels - 1) as f64 * extra + surcharge;
            (cost, parcels)
        }
        PricingKind::LengthBanded => {
            let parcels = parcels_for(chargeable);
            (rule.base_price * parcels as f64, parcels)
        }
    }
}

fn parcels_for(weight_kg: f64) -> u32 {
    ((weight_kg.max(0.0) / PARCEL_WEIGHT_CAP_KG).ceil() as u32).max(1)
}

fn match_reasons(rule: &CourierRule) -> Vec<String> {
    let mut reasons = Vec::new();
    if let Some(max) = active_limit(rule.max_weight_kg) {
        reasons.push(format!("Under {max}kg"));
    }
    if let Some(max) = active_limit(rule.max_volume_l) {
        reasons.push(format!("Under {max}L"));
    }
    if let Some(max) = active_limit(rule.max_length_cm) {
        reasons.push(format!("Fits {max}cm max"));
    }
    reasons
}

/// Every rule that takes the parcel, cheapest first. Equal costs keep table order.
/// Empty means the parcel cannot be shipped with these rules.
pub fn rank_couriers(parcel: &Parcel, rules: &[CourierRule]) -> Vec<CourierOption> {
    let mut options: Vec<CourierOption> = rules
        .iter()
        .filter(|rule| accepts(rule, parcel))
        .map(|rule| {
            let (cost, parcel_count) = quote(rule, parcel);
            let (carrier_name, service_name) = rule.carrier_and_service();
            CourierOption {
                rule_id: rule.id.clone(),
                carrier_name,
                service_name,
                cost,
                parcel_count,
                transit_days: rule.transit_days.clone(),
                match_reasons: match_reasons(rule),
            }
        })
        .collect();

    // stable: ties stay in table order
    options.sort_by(|a, b| a.cost.total_cmp(&b.cost));
    options
}

pub fn cheapest(parcel: &Parcel, rules: &[CourierRule]) -> Option<CourierOption> {
    rank_couriers(parcel, rules).into_iter().next()
}
