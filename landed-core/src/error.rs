use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("invalid dimension: {field} = {value}")]
    InvalidDimension { field: &'static str, value: f64 },

    #[error("invalid value: {field} = {value}")]
    InvalidValue { field: &'static str, value: String },

    /// Carton volume is zero or no carton fits the container.
    #[error("insufficient data: no cartons fit the container")]
    DegenerateVolume,

    #[error("margin unsatisfiable: margin {margin_pct}% + fee {fee_pct}% leaves nothing of the sell price")]
    MarginUnsatisfiable { margin_pct: f64, fee_pct: f64 },

    #[error("no courier rule fits the parcel")]
    NoCourierMatch,

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, PricingError>;

/// Rejects negative, NaN and infinite physical measurements.
pub(crate) fn check_dimension(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PricingError::InvalidDimension { field, value })
    }
}
