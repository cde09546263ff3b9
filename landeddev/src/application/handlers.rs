use std::path::{Path, PathBuf};

use landed_core::error::Result;
use landed_core::ingest::parse_file;
use landed_core::report::{SortKey, export_csv, price_list, quote_summary, sorted_view, summarize};
use landed_core::{
    CalcConfig, Calculator, CourierOption, Parcel, PriceEnding, PricedResult, ProductInput,
    RowFlag, rank_couriers,
};
use tracing::{error, info};

use crate::presentation::cli::{ParcelArgs, SettingsArgs};

pub fn load_calculator(config: Option<&Path>, overrides: &SettingsArgs) -> Result<Calculator> {
    let mut cfg = match config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            CalcConfig::load(path)?
        }
        None => CalcConfig::default(),
    };
    let s = &mut cfg.settings;
    if let Some(v) = overrides.margin {
        s.target_margin_pct = v;
    }
    if let Some(v) = overrides.fee {
        s.marketplace_fee_pct = v;
    }
    if let Some(v) = overrides.fixed_cost {
        s.fixed_per_order_cost = v;
    }
    if let Some(v) = overrides.fx {
        s.fx_rate = v;
    }
    if let Some(e) = &overrides.ending {
        s.price_ending = Some(e.parse::<PriceEnding>()?);
    }
    if let Some(v) = overrides.container_cost {
        cfg.container.shipment_cost = v;
    }
    cfg.calculator()
}

fn print_option(o: &CourierOption, calc: &Calculator) {
    println!(
        "{:<12} {:<18} {:>9}  parcels={:<2} days={:<4} {}",
        o.carrier_name,
        o.service_name,
        calc.settings().money(o.cost),
        o.parcel_count,
        o.transit_days,
        o.match_reasons.join(", ")
    );
}

fn describe_flags(r: &PricedResult) -> String {
    r.flags
        .iter()
        .map(|f| match f {
            RowFlag::InsufficientData => "no freight data",
            RowFlag::Unshippable => "no courier",
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn handle_quote(
    calc: &Calculator,
    cost: f64,
    pack: u32,
    parcel: &ParcelArgs,
    sku: Option<String>,
    alternatives: usize,
) -> Result<()> {
    let product = ProductInput {
        sku,
        unit_cost_foreign: cost,
        pack,
        length_cm: parcel.length,
        width_cm: parcel.width,
        height_cm: parcel.height,
        weight_kg: parcel.weight,
    };
    let r = calc.price(&product)?;
    println!("{}", quote_summary(&r, calc.settings()));
    println!("Status: {}", r.status.label());
    if !r.flags.is_empty() {
        println!("Warnings: {}", describe_flags(&r));
    }
    if let Some(best) = &r.chosen_courier {
        println!();
        println!("Recommended courier:");
        print_option(best, calc);
        let alts: Vec<_> = r.courier_options.iter().skip(1).take(alternatives).collect();
        if !alts.is_empty() {
            println!("Alternatives:");
            for o in alts {
                print_option(o, calc);
            }
        }
    }
    Ok(())
}

pub fn handle_couriers(calc: &Calculator, parcel: &ParcelArgs) -> Result<()> {
    let parcel = Parcel::new(parcel.length, parcel.width, parcel.height, parcel.weight)?;
    let ranked = rank_couriers(&parcel, calc.rules().rules());
    if ranked.is_empty() {
        eprintln!("couriers: no rule fits {}kg at girth {}cm", parcel.weight_kg, parcel.girth_cm());
        return Ok(());
    }
    for o in &ranked {
        print_option(o, calc);
    }
    Ok(())
}

pub fn handle_bulk(
    calc: &Calculator,
    input: PathBuf,
    out: Option<PathBuf>,
    export: bool,
    sort: &str,
    prices: bool,
    strict: bool,
) -> Result<()> {
    let key: SortKey = sort.parse()?;
    let rows = calc.price_rows(parse_file(&input)?);

    if prices {
        println!("{}", price_list(&rows));
    } else {
        let money = |v: f64| calc.settings().money(v);
        println!(
            "{:<5} {:<14} {:>10} {:>10} {:>8} {:>10} {:>7} {:<12} {}",
            "line", "sku", "landed", "sell", "margin", "profit", "units", "courier", "status"
        );
        for row in sorted_view(&rows, key) {
            match &row.result {
                Ok(r) => {
                    let margin = r
                        .margin_pct
                        .map(|m| format!("{m:.1}%"))
                        .unwrap_or_else(|| "n/a".into());
                    let courier = r
                        .chosen_courier
                        .as_ref()
                        .map(|c| format!("{} {}", c.carrier_name, money(c.cost)))
                        .unwrap_or_else(|| "-".into());
                    let mut status = r.status.label().to_string();
                    if !r.flags.is_empty() {
                        status = format!("{status} ({})", describe_flags(r));
                    }
                    println!(
                        "{:<5} {:<14} {:>10} {:>10} {:>8} {:>10} {:>7} {:<12} {}",
                        row.line,
                        r.sku.as_deref().unwrap_or(""),
                        money(r.landed_unit_cost),
                        money(r.required_sell_price),
                        margin,
                        money(r.profit),
                        r.units_per_container,
                        courier,
                        status
                    );
                }
                Err(e) => println!("{:<5} could not price: {e}", row.line),
            }
        }

        let s = summarize(&rows);
        println!();
        println!(
            "rows={} priced={} failed={} good={} review={} low={} unshippable={} no_freight_data={}",
            s.total,
            s.priced,
            s.failed,
            s.good,
            s.review,
            s.low,
            s.unshippable,
            s.insufficient_data
        );
        println!(
            "avg margin={:.1}% profit={} revenue={}",
            s.avg_margin_pct,
            money(s.total_profit),
            money(s.total_revenue)
        );
    }

    if out.is_some() || export {
        let path = export_csv(&rows, out.as_deref(), Path::new("."))?;
        eprintln!("bulk: wrote {}", path.display());
    }

    if strict {
        for row in rows {
            let line = row.line;
            row.result
                .and_then(|r| r.ensure_complete())
                .inspect_err(|e| error!(line, error = %e, "strict: row incomplete"))?;
        }
    }
    Ok(())
}

pub fn handle_rules(calc: &Calculator) -> Result<()> {
    let limit = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_else(|| "-".into());
    println!(
        "{:<18} {:<26} {:>6} {:>6} {:>6} {:>7} {:>5} {:>9} {:<16} {}",
        "id", "name", "maxL", "maxW", "maxH", "girth", "kg", "price", "kind", "days"
    );
    for r in calc.rules().rules() {
        println!(
            "{:<18} {:<26} {:>6} {:>6} {:>6} {:>7} {:>5} {:>9} {:<16} {}",
            r.id,
            r.name,
            limit(r.max_length_cm),
            limit(r.max_width_cm),
            limit(r.max_height_cm),
            limit(r.max_girth_cm),
            limit(r.max_weight_kg),
            calc.settings().money(r.base_price),
            format!("{:?}", r.kind),
            r.transit_days
        );
    }
    Ok(())
}

pub fn handle_init_config(out: PathBuf) -> Result<()> {
    CalcConfig::default().save(&out)?;
    eprintln!("init-config: wrote {}", out.display());
    Ok(())
}
