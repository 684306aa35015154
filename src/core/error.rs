//! Error types for CircStats
//!
//! Defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for CircStats operations
#[derive(Debug, Error)]
pub enum CircStatsError {
    /// Annotation table loading errors
    #[error("Table parse error: {0}")]
    TableParse(#[from] TableParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while loading an annotation table
#[derive(Debug, Error)]
pub enum TableParseError {
    /// Input file not found
    #[error("Annotation table not found: {0}")]
    FileNotFound(PathBuf),

    /// Input has no header row
    #[error("Annotation table is empty: missing header row")]
    EmptyTable,

    /// A required column is absent from the header
    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },

    /// A data row does not match the header width
    #[error("Row at line {line} has {found} fields, header has {expected}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Failed to parse an integer column
    #[error("Failed to parse integer '{value}' in column '{column}' at line {line}")]
    ParseInt {
        line: usize,
        column: &'static str,
        value: String,
    },

    /// Strand must be '+' or '-'
    #[error("Strand must be '+' or '-', got '{value}' at line {line}")]
    InvalidStrand { line: usize, value: String },

    /// I/O error during parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CircStats operations
pub type Result<T> = std::result::Result<T, CircStatsError>;

/// Result type alias for table loading operations
pub type TableResult<T> = std::result::Result<T, TableParseError>;
