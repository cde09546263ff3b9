//! Presentation helpers over priced rows: summary counts, sorted views,
//! price lists, a quote summary and CSV export.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::domain::{MarginStatus, PricedResult, RowFlag};
use crate::error::{PricingError, Result};
use crate::pricing::RowOutcome;
use crate::settings::PricingSettings;

pub const CSV_HEADERS: [&str; 12] = [
    "#",
    "SKU",
    "Unit cost",
    "Dims (cm)",
    "Pack",
    "Landed",
    "Sell",
    "Margin %",
    "Profit",
    "Units/container",
    "Courier",
    "Courier cost",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkSummary {
    pub total: usize,
    pub priced: usize,
    pub failed: usize,
    pub good: usize,
    pub review: usize,
    pub low: usize,
    pub unshippable: usize,
    pub insufficient_data: usize,
    pub avg_margin_pct: f64,
    pub total_profit: f64,
    pub total_revenue: f64,
}

pub fn summarize(rows: &[RowOutcome]) -> BulkSummary {
    let mut s = BulkSummary {
        total: rows.len(),
        ..Default::default()
    };
    let mut margin_sum = 0.0;
    let mut margin_count = 0usize;

    for r in priced(rows) {
        s.priced += 1;
        match r.status {
            MarginStatus::Good => s.good += 1,
            MarginStatus::Review => s.review += 1,
            MarginStatus::Low => s.low += 1,
        }
        if r.has_flag(RowFlag::Unshippable) {
            s.unshippable += 1;
        }
        if r.has_flag(RowFlag::InsufficientData) {
            s.insufficient_data += 1;
        }
        if let Some(m) = r.margin_pct {
            margin_sum += m;
            margin_count += 1;
        }
        s.total_profit += r.profit;
        s.total_revenue += r.required_sell_price;
    }
    s.failed = s.total - s.priced;
    s.avg_margin_pct = if margin_count == 0 {
        0.0
    } else {
        margin_sum / margin_count as f64
    };
    s
}

fn priced(rows: &[RowOutcome]) -> impl Iterator<Item = &PricedResult> {
    rows.iter().filter_map(|r| r.result.as_ref().ok())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Input,
    MarginAsc,
    MarginDesc,
    PriceDesc,
}

impl std::str::FromStr for SortKey {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "order" | "input" => Ok(SortKey::Input),
            "margin-asc" => Ok(SortKey::MarginAsc),
            "margin-desc" => Ok(SortKey::MarginDesc),
            "price" | "price-desc" => Ok(SortKey::PriceDesc),
            other => Err(PricingError::InvalidValue {
                field: "sort",
                value: other.to_string(),
            }),
        }
    }
}

/// Sorted view over the rows. The rows themselves keep input order; failed
/// rows sort after priced ones.
pub fn sorted_view(rows: &[RowOutcome], key: SortKey) -> Vec<&RowOutcome> {
    let mut view: Vec<&RowOutcome> = rows.iter().collect();
    let margin = |r: &RowOutcome| r.result.as_ref().ok().and_then(|p| p.margin_pct);
    let price = |r: &RowOutcome| r.result.as_ref().ok().map(|p| p.required_sell_price);

    match key {
        SortKey::Input => {}
        SortKey::MarginAsc => view.sort_by(|a, b| cmp_present_first(margin(*a), margin(*b), false)),
        SortKey::MarginDesc => view.sort_by(|a, b| cmp_present_first(margin(*a), margin(*b), true)),
        SortKey::PriceDesc => view.sort_by(|a, b| cmp_present_first(price(*a), price(*b), true)),
    }
    view
}

fn cmp_present_first(a: Option<f64>, b: Option<f64>, descending: bool) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(x), Some(y)) if descending => y.total_cmp(&x),
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sell prices, one per priced row, two decimals.
pub fn price_list(rows: &[RowOutcome]) -> String {
    priced(rows)
        .map(|r| format!("{:.2}", r.required_sell_price))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Short plain-text summary of one quote.
pub fn quote_summary(r: &PricedResult, settings: &PricingSettings) -> String {
    let mut lines = vec![
        format!("Target Sell: {}", settings.money(r.required_sell_price)),
        match r.margin_pct {
            Some(m) => format!("Margin: {m:.1}%"),
            None => "Margin: n/a".to_string(),
        },
        format!("Profit: {}", settings.money(r.profit)),
        format!("Landed (Unit): {}", settings.money(r.landed_unit_cost)),
    ];
    if r.pack > 1 {
        lines.push(format!("Landed (Pack): {}", settings.money(r.landed_pack_cost)));
    }
    lines.push(format!("Units/container: {}", r.units_per_container));
    lines.push(format!("Cartons: {}", r.cartons_per_container));
    lines.join("\n")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Comma-separated table of the priced rows, ranked by input position.
pub fn to_csv(rows: &[RowOutcome]) -> String {
    let mut out = CSV_HEADERS.join(",");
    out.push('\n');
    for (rank, r) in priced(rows).enumerate() {
        let courier = r.chosen_courier.as_ref();
        let cells = [
            (rank + 1).to_string(),
            r.sku.clone().unwrap_or_default(),
            format!("{:.2}", r.unit_cost_foreign),
            r.dims.clone(),
            r.pack.to_string(),
            format!("{:.2}", r.landed_unit_cost),
            format!("{:.2}", r.required_sell_price),
            r.margin_pct.map(|m| format!("{m:.1}")).unwrap_or_default(),
            format!("{:.2}", r.profit),
            r.units_per_container.to_string(),
            courier.map(|c| c.carrier_name.clone()).unwrap_or_default(),
            courier.map(|c| format!("{:.2}", c.cost)).unwrap_or_default(),
        ];
        let line: Vec<String> = cells.iter().map(|c| csv_field(c)).collect();
        let _ = writeln!(out, "{}", line.join(","));
    }
    out
}

pub fn default_export_name(now: OffsetDateTime) -> String {
    let date = now
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "undated".into());
    format!("bulk_pricing_{date}.csv")
}

/// Writes the CSV to `out`, or to the dated default name inside `dir`.
pub fn export_csv(rows: &[RowOutcome], out: Option<&Path>, dir: &Path) -> Result<PathBuf> {
    let path = match out {
        Some(p) => p.to_path_buf(),
        None => dir.join(default_export_name(OffsetDateTime::now_utc())),
    };
    fs::write(&path, to_csv(rows))?;
    Ok(path)
}
