// src/utils/error.rs
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// Define specific error types for different parts of the application

/// Failures loading the layout configuration. Fatal for the whole run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read layout config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse layout config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate section name in layout config: {0}")]
    DuplicateSection(String),

    #[error("Invalid adjustment flag '{flag}' for section {section} (expected a subset of t, b, l, r)")]
    InvalidAdjustment { section: String, flag: char },

    #[error("Invalid bounds for section {0}")]
    InvalidBounds(String),

    #[error("Invalid base page dimensions {height}x{width}")]
    InvalidBaseDimensions { height: f64, width: f64 },
}

/// Failures talking to the extraction tool, or locating a section for it.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Page geometry probe failed for {document}: {reason}")]
    PageProbe { document: PathBuf, reason: String },

    #[error("Extraction of section {section} failed: {reason}")]
    Extraction { section: String, reason: String },

    #[error("Extraction of section {section} timed out after {after:?}")]
    Timeout { section: String, after: Duration },

    #[error("Section not found: {0}")]
    SectionNotFound(String),
}

impl ExtractError {
    /// Subprocess faults that may succeed on a second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, ExtractError::Extraction { .. } | ExtractError::Timeout { .. })
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed tabular output for section {section}: {detail}")]
    Malformed { section: String, detail: String },

    #[error("Section {section} has no cell at row {row}, column {column}")]
    MissingCell {
        section: String,
        row: usize,
        column: usize,
    },
}

#[derive(Error, Debug, PartialEq)]
pub enum FormatError {
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),

    #[error("Invalid date '{value}' (expected {format})")]
    InvalidDate { value: String, format: &'static str },
}

/// One broken arithmetic invariant of a payslip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mismatch {
    Gross { reported: f64, computed: f64 },
    Deductions { reported: f64, computed: f64 },
    Taxes { reported: f64, computed: f64 },
    NetPay { reported: f64, computed: f64 },
}

impl Mismatch {
    fn parts(&self) -> (&'static str, &'static str, f64, f64) {
        match *self {
            Mismatch::Gross { reported, computed } => ("gross income", "sum of income heads", reported, computed),
            Mismatch::Deductions { reported, computed } => {
                ("total deductions", "sum of deduction heads", reported, computed)
            }
            Mismatch::Taxes { reported, computed } => ("total taxes", "sum of tax heads", reported, computed),
            Mismatch::NetPay { reported, computed } => {
                ("net pay", "income - deductions - taxes", reported, computed)
            }
        }
    }
}

// Full precision: a difference just past the tolerance must stay visible.
impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (reported_label, computed_label, reported, computed) = self.parts();
        write!(
            f,
            "{reported_label} {reported} != {computed_label} {computed} (off by {})",
            reported - computed
        )
    }
}

#[derive(Error, Debug)]
#[error("Payslip {document_id} failed validation: {}", join_mismatches(.mismatches))]
pub struct ValidationError {
    pub document_id: String,
    pub mismatches: Vec<Mismatch>,
}

fn join_mismatches(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Everything that can reject a single document. Never aborts the batch.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Section {section}: {source}")]
    Format {
        section: String,
        #[source]
        source: FormatError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layout configuration error: {0}")]
    Layout(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
