//! Plan configuration: benefit constants and reference data locations
//!
//! Every field has a default, so a JSON file only needs the values it changes:
//!
//! ```json
//! { "benefit": { "accrual_rate": 0.02 }, "data": { "deferred_factors": "tables/df.xlsx" } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assumptions::DataPaths;
use crate::benefit::BenefitConfig;
use crate::error::{PensionError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub benefit: BenefitConfig,
    pub data: DataPaths,
}

impl PlanConfig {
    /// Read a plan configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| PensionError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&text).map_err(|e| match e {
            PensionError::Config { reason, .. } => PensionError::Config {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PensionError::Config {
            path: "<inline>".into(),
            reason: e.to_string(),
        })
    }
}
