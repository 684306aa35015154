//! File format adapters
//!
//! Adapters for the tab-separated annotation table: compression-aware
//! loading, summary writing, and the filtered start-end exonic table.

pub mod table;

pub use table::{
    detect_compression, sample_name, write_summary, write_true_exonic, AnnotationTable,
    CompressionFormat, TRUE_EXONIC_FILENAME,
};
