//! Types for pipeline results

use crate::config::ExtractionStrategy;
use mailsheet_domain::ProjectRecord;

/// Result of running the extraction pipeline on one message
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    /// Normalized records, in source order
    pub records: Vec<ProjectRecord>,
    /// Configured strategy
    pub strategy: ExtractionStrategy,
    /// Name of the extractor whose records were kept, if any produced one
    pub source: Option<&'static str>,
    /// Records produced before normalization, summed over every extractor run
    pub candidates: usize,
}

impl ExtractionOutcome {
    /// True if nothing meaningful was found
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
