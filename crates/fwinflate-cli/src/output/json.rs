//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use fwinflate_core::ExtractionReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

#[derive(Serialize)]
struct ExtractionOutput {
    destination: String,
    entries_total: usize,
    files_extracted: usize,
    directories_created: usize,
    bytes_written: u64,
    duration_ms: u128,
}

impl ExtractionOutput {
    fn new(destination: &Path, report: &ExtractionReport) -> Self {
        Self {
            destination: destination.display().to_string(),
            entries_total: report.entries_total,
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    /// Warnings go to stderr so stdout stays a single JSON document.
    fn output_stderr<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        writeln!(io::stderr(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(
        &self,
        destination: &Path,
        report: &ExtractionReport,
    ) -> Result<()> {
        let output = JsonOutput::success("extract", ExtractionOutput::new(destination, report));
        Self::output(&output)
    }

    fn format_default_dir(&self, path: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct DefaultDirOutput {
            path: String,
        }

        let output = JsonOutput::success(
            "default-dir",
            DefaultDirOutput {
                path: path.display().to_string(),
            },
        );
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("fwinflate", format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output_stderr(&output);
    }
}
