//! Delimited text rows into [`ProductInput`]s.
//!
//! Columns, comma or tab separated:
//! `sku, unit_cost, pack, length_cm, width_cm, height_cm, weight_kg`.
//! Blank lines and `#` comments are skipped, as is a leading header row whose
//! first cell is `sku`. Every other line yields exactly one [`ParsedRow`].

use std::fs;
use std::path::Path;

use crate::domain::ProductInput;
use crate::error::{PricingError, Result};

pub const COLUMNS: [&str; 7] = [
    "sku",
    "unit_cost",
    "pack",
    "length_cm",
    "width_cm",
    "height_cm",
    "weight_kg",
];

#[derive(Debug)]
pub struct ParsedRow {
    /// 1-based line number in the source text.
    pub line: usize,
    pub outcome: Result<ProductInput>,
}

pub fn parse_rows(text: &str) -> Vec<ParsedRow> {
    let mut rows = Vec::new();
    let mut seen_data = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split([',', '\t']).map(str::trim).collect();
        if !seen_data && fields[0].eq_ignore_ascii_case("sku") {
            seen_data = true;
            continue;
        }
        seen_data = true;
        rows.push(ParsedRow {
            line,
            outcome: parse_fields(line, &fields),
        });
    }
    rows
}

pub fn parse_file(path: &Path) -> Result<Vec<ParsedRow>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_rows(&text))
}

fn parse_fields(line: usize, fields: &[&str]) -> Result<ProductInput> {
    if fields.len() != COLUMNS.len() {
        return Err(PricingError::Parse {
            line,
            reason: format!(
                "expected {} fields, found {}",
                COLUMNS.len(),
                fields.len()
            ),
        });
    }

    let number = |i: usize| -> Result<f64> {
        fields[i].parse::<f64>().map_err(|_| PricingError::Parse {
            line,
            reason: format!("{} is not a number: {:?}", COLUMNS[i], fields[i]),
        })
    };

    let pack = fields[2].parse::<u32>().map_err(|_| PricingError::Parse {
        line,
        reason: format!("pack is not a whole number: {:?}", fields[2]),
    })?;

    let product = ProductInput {
        sku: Some(fields[0]).filter(|s| !s.is_empty()).map(String::from),
        unit_cost_foreign: number(1)?,
        pack,
        length_cm: number(3)?,
        width_cm: number(4)?,
        height_cm: number(5)?,
        weight_kg: number(6)?,
    };
    product.validate()?;
    Ok(product)
}
