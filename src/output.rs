use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;

use crate::batch::{BatchOutcome, BatchReport};
use crate::collect::{CollectReport, DocumentStatus};
use crate::coordinates::{CoordinateReport, SequenceReport};
use crate::domain::TableKind;
use crate::search::SearchOutcome;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractSummary {
    pub input_dir: String,
    pub output_dir: String,
    pub generated_at: String,
    pub report: BatchReport,
    pub rows: BTreeMap<TableKind, usize>,
    pub files: Vec<String>,
}

impl ExtractSummary {
    pub fn new(input_dir: String, output_dir: String, outcome: &BatchOutcome, files: Vec<String>) -> Self {
        Self {
            input_dir,
            output_dir,
            generated_at: chrono::Utc::now().to_rfc3339(),
            report: outcome.report.clone(),
            rows: outcome.tables.row_counts(),
            files,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinatesSummary {
    pub results_dir: String,
    pub generated_at: String,
    pub coordinates: CoordinateReport,
    pub sequences: Option<SequenceReport>,
    pub files: Vec<String>,
}

impl CoordinatesSummary {
    pub fn new(
        results_dir: String,
        coordinates: CoordinateReport,
        sequences: Option<SequenceReport>,
        files: Vec<String>,
    ) -> Self {
        Self {
            results_dir,
            generated_at: chrono::Utc::now().to_rfc3339(),
            coordinates,
            sequences,
            files,
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_extract(summary: &ExtractSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    pub fn print_status(status: &DocumentStatus) -> io::Result<()> {
        Self::print_json(status)
    }

    pub fn print_collect(report: &CollectReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_coordinates(summary: &CoordinatesSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    pub fn print_search(outcome: &SearchOutcome) -> io::Result<()> {
        Self::print_json(outcome)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
