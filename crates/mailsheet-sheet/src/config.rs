//! Renderer configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the workbook is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Output file; overwritten on every run
    pub output_path: PathBuf,
}

impl SheetConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        match self.output_path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Ok(()),
            _ => Err(format!(
                "output_path must end in .xlsx: {}",
                self.output_path.display()
            )),
        }
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output.xlsx"),
        }
    }
}
