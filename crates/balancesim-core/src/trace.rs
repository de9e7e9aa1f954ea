//! Load-sequence ingestion for BalanceSim.
//!
//! Supports two on-disk formats for a pre-generated sequence of load values:
//! - **Text**: one number per line. Blank lines and `#` comments are skipped.
//! - **JSON**: a single array of numbers.
//!
//! Sequences are kept in file order, which is the arrival order the driver
//! replays them in.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read load sequence: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON load sequence: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Invalid load value at line {line}: {value:?}")]
    ParseFloat { line: usize, value: String },
    #[error("Unsupported load sequence format: {0}")]
    UnsupportedFormat(String),
}

/// On-disk encoding of a load sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceFormat {
    Text,
    Json,
}

impl FromStr for SequenceFormat {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(TraceError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Load a sequence from a file in the named format.
pub fn load_sequence(path: &Path, format: &str) -> Result<Vec<f64>, TraceError> {
    match format.parse::<SequenceFormat>()? {
        SequenceFormat::Text => {
            let file = std::fs::File::open(path)?;
            parse_text(BufReader::new(file))
        }
        SequenceFormat::Json => {
            let content = std::fs::read_to_string(path)?;
            parse_json(&content)
        }
    }
}

/// Parse the text format from any reader.
pub fn parse_text<R: Read>(reader: BufReader<R>) -> Result<Vec<f64>, TraceError> {
    let mut loads = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let value = trimmed
            .parse::<f64>()
            .map_err(|_| TraceError::ParseFloat {
                line: line_num + 1,
                value: trimmed.to_string(),
            })?;
        loads.push(value);
    }
    Ok(loads)
}

/// Parse the JSON array format.
pub fn parse_json(content: &str) -> Result<Vec<f64>, TraceError> {
    Ok(serde_json::from_str(content)?)
}

/// Write a sequence to `path` in the given format.
pub fn write_sequence(
    loads: &[f64],
    path: &Path,
    format: SequenceFormat,
) -> Result<(), TraceError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);

    match format {
        SequenceFormat::Text => {
            for load in loads {
                writeln!(writer, "{}", load)?;
            }
        }
        SequenceFormat::Json => {
            serde_json::to_writer(&mut writer, loads)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}
