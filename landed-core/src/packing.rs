use serde::{Deserialize, Serialize};

use crate::settings::ContainerProfile;

// Absorbs representation error when the volume ratio lands on a whole number.
const FLOOR_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackingEstimate {
    pub carton_volume_cbm: f64,
    pub cartons_per_container: u64,
    pub units_per_container: u64,
    pub freight_per_unit: f64,
    pub landed_unit_cost: f64,
    pub landed_pack_cost: f64,
}

impl PackingEstimate {
    /// True when no freight could be allocated. Callers must treat this as
    /// missing data, not as free freight.
    pub fn is_degenerate(&self) -> bool {
        self.units_per_container == 0
    }
}

/// Spreads one container's freight over the units that fit in it.
///
/// Dimensions are assumed validated (finite, non-negative) and `units_per_pack >= 1`.
pub fn estimate(
    length_cm: f64,
    width_cm: f64,
    height_cm: f64,
    units_per_pack: u32,
    unit_cost_foreign: f64,
    fx_rate: f64,
    container: &ContainerProfile,
) -> PackingEstimate {
    let carton_volume_cbm = (length_cm / 100.0) * (width_cm / 100.0) * (height_cm / 100.0);
    let cartons_per_container = if carton_volume_cbm > 0.0 {
        let ratio = container.effective_volume_cbm() / carton_volume_cbm;
        (ratio + FLOOR_EPSILON).floor().max(0.0) as u64
    } else {
        0
    };
    let units_per_container = cartons_per_container.saturating_mul(units_per_pack as u64);
    let freight_per_unit = if units_per_container > 0 {
        container.shipment_cost / units_per_container as f64
    } else {
        0.0
    };
    let landed_unit_cost = unit_cost_foreign / fx_rate + freight_per_unit;

    PackingEstimate {
        carton_volume_cbm,
        cartons_per_container,
        units_per_container,
        freight_per_unit,
        landed_unit_cost,
        landed_pack_cost: landed_unit_cost * units_per_pack as f64,
    }
}
