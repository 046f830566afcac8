//! Dump parameters and results.

use strum_macros::{Display, EnumString};

use crate::error_handling::DumpError;
use crate::models::RecordId;

/// How each record is serialized into the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Line format, one field per line, `$` terminated.
    #[default]
    Line,
    /// One JSON exchange document per line.
    Json,
}

/// Which content each record contributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DumpMode {
    /// The agency's own stored content.
    #[default]
    Raw,
    /// The agency's record merged onto common content.
    Merged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpParams {
    pub output_format: OutputFormat,
    pub mode: DumpMode,
}

/// One record ready for the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordItem {
    pub id: RecordId,
    /// Serialized bytes of the record.
    pub local: Vec<u8>,
}

/// What one worker achieved.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub worker: usize,
    pub written: usize,
    pub skipped: usize,
    /// The error that ended the worker's sub-batch early.
    pub error: Option<DumpError>,
}

impl WorkerOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one dump run. Outcomes are ordered by worker index.
#[derive(Debug, Default)]
pub struct DumpReport {
    pub outcomes: Vec<WorkerOutcome>,
}

impl DumpReport {
    pub fn written(&self) -> usize {
        self.outcomes.iter().map(|o| o.written).sum()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().map(|o| o.skipped).sum()
    }

    pub fn failed_workers(&self) -> impl Iterator<Item = &WorkerOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(WorkerOutcome::is_success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_params_default_to_raw_line() {
        let params = DumpParams::default();
        assert_eq!(params.output_format, OutputFormat::Line);
        assert_eq!(params.mode, DumpMode::Raw);
    }

    #[test]
    fn test_parse_from_strings() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(DumpMode::from_str("merged").unwrap(), DumpMode::Merged);
        assert!(DumpMode::from_str("expanded").is_err());
        assert_eq!(OutputFormat::Line.to_string(), "line");
    }

    #[test]
    fn test_report_aggregates() {
        let report = DumpReport {
            outcomes: vec![
                WorkerOutcome { worker: 0, written: 2, skipped: 1, error: None },
                WorkerOutcome {
                    worker: 1,
                    written: 1,
                    skipped: 0,
                    error: Some(DumpError::Panicked(1)),
                },
            ],
        };
        assert_eq!(report.written(), 3);
        assert_eq!(report.skipped(), 1);
        assert!(!report.is_complete());
        let failed: Vec<usize> = report.failed_workers().map(|o| o.worker).collect();
        assert_eq!(failed, vec![1]);
    }
}
