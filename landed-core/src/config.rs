use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::courier::rules::{CourierRule, RuleTable, default_rules};
use crate::error::{PricingError, Result};
use crate::pricing::Calculator;
use crate::settings::{ContainerProfile, PricingSettings};

/// Everything a calculation needs, as stored on disk. Missing sections take defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    pub settings: PricingSettings,
    pub container: ContainerProfile,
    pub couriers: Vec<CourierRule>,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            settings: PricingSettings::default(),
            container: ContainerProfile::default(),
            couriers: default_rules(),
        }
    }
}

impl CalcConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| PricingError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| PricingError::Config(format!("encode: {e}")))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Validates every section and freezes the courier list into a snapshot.
    pub fn calculator(self) -> Result<Calculator> {
        let rules = RuleTable::new(self.couriers)?;
        Calculator::new(self.settings, self.container, rules)
    }
}
