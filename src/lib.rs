//! CircStats - Structural classification of circRNA annotation tables
//!
//! A Rust reimplementation of the annotation-statistics step of a circRNA
//! detection pipeline, focusing on the per-record classification rules.
//!
//! # Features
//!
//! - Single-pass, deterministic classification of annotated circRNA records
//! - Strand-aware junction matching and intron coordinate-tolerance windows
//! - Per-sample summary row plus a filtered table of start-end exonic records
//! - Transparent reading of gzip/bzip2 compressed tables
//!
//! # Example
//!
//! ```ignore
//! use circ_stats::{classify, sample_name, AnnotationTable};
//! use std::path::Path;
//!
//! let input = Path::new("results_pig_testis_31/annotation_circRNAs.out");
//! let table = AnnotationTable::from_path(input)?;
//! let classification = classify(table.records());
//! print!("{}", classification.stats.summary_line(&sample_name(input)));
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use self::core::{
    classify, intron_anchored, AnnotationStats, CircRnaRecord, CircStatsError, Classification,
    Result, Strand, TableParseError, MIN_READ_SUPPORT,
};
pub use formats::table::{
    sample_name, write_summary, write_true_exonic, AnnotationTable, TRUE_EXONIC_FILENAME,
};
