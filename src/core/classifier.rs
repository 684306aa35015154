//! circRNA classification engine
//!
//! A single sequential pass over the record sequence. Each record is
//! evaluated against every category rule independently; categories are not
//! mutually exclusive, except that mono-exonic records are excluded from
//! infra-exonic counting by name.
//!
//! # Categories
//!
//! - **Exonic**: at least one junction has an exon annotation and no intron
//!   annotation is present. Split further into start-end exonic (both
//!   junctions annotated in the called orientation), single annotated
//!   junction (one side annotated, the other completely empty), and
//!   antisense exonic (both junctions annotated on the opposite strand).
//! - **Mono-exonic**: start-end exonic with both junction ends resolving to
//!   the same single exon.
//! - **Infra-exonic**: overlaps a gene without matching an annotated intron;
//!   sense or antisense by comparing the gene sign with the called strand.
//! - **True intronic**: the circRNA boundaries sit inside the paired intron
//!   within strand-aware tolerance windows.

use std::collections::HashSet;

use crate::core::record::{marks_junction, CircRnaRecord, ExonEnd, Strand};

/// Minimum circular-read support for a record to participate in
/// classification. Lower-support records still count toward the total row
/// count.
pub const MIN_READ_SUPPORT: i64 = 5;

/// Category counters accumulated over one classification pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationStats {
    /// All input rows, including those below the read-support threshold
    pub total_records: usize,
    /// Rows with `nb_ccr >= MIN_READ_SUPPORT`
    pub total_qualifying: usize,
    pub total_exonic: usize,
    pub start_end_exonic: usize,
    pub single_annotated_junction: usize,
    pub antisense_exonic: usize,
    pub mono_exonic: usize,
    pub infra_exonic_total: usize,
    pub infra_exonic_sense: usize,
    pub infra_exonic_antisense: usize,
    pub true_intronic: usize,
}

impl AnnotationStats {
    /// Records with a fully annotated structure: both junctions exonic, or
    /// consistent with the paired intron.
    pub fn annotated(&self) -> usize {
        self.start_end_exonic + self.true_intronic
    }

    /// Qualifying records with no annotation verdict. Signed: pathological
    /// inputs can drive this negative and it is emitted as-is.
    pub fn non_annotated(&self) -> i64 {
        self.total_qualifying as i64
            - (self.annotated() + self.antisense_exonic + self.infra_exonic_antisense) as i64
    }

    /// Format the per-sample summary row: tab-separated, newline-terminated,
    /// no header.
    pub fn summary_line(&self, sample: &str) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            sample,
            self.total_records,
            self.total_exonic,
            self.start_end_exonic,
            self.single_annotated_junction,
            self.antisense_exonic,
            self.mono_exonic,
            self.infra_exonic_total,
            self.infra_exonic_sense,
            self.infra_exonic_antisense,
            self.true_intronic,
            self.annotated(),
            self.non_annotated(),
        )
    }
}

/// Outcome of a classification pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub stats: AnnotationStats,
    /// Indices into the input sequence of the start-end exonic records, in
    /// encounter order. The filtered-table writer replays these against the
    /// loaded rows.
    pub true_exonic: Vec<usize>,
}

/// Strand-aware tolerance check: are the circRNA boundaries consistent with
/// lying inside the paired intron?
///
/// The boundary nearer the intron's three-prime end may sit at or slightly
/// inside the intron boundary (within annotation slop), while the other
/// boundary must be anchored near the intron start. A boundary exactly
/// anchored at the intron start allows unrestricted extension at the other
/// end.
pub fn intron_anchored(strand: Strand, start: i64, start_i: i64, end: i64, end_i: i64) -> bool {
    match strand {
        Strand::Plus => {
            let tail = end_i - end;
            if (-5..=31).contains(&tail) {
                (-5..=4).contains(&(start - start_i)) || start == start_i
            } else {
                start == start_i && tail > 32
            }
        }
        Strand::Minus => {
            let tail = start - start_i;
            if (-5..=31).contains(&tail) {
                (-5..=4).contains(&(end - end_i)) || end == end_i
            } else {
                end == end_i && tail > 32
            }
        }
    }
}

/// Classify a record sequence in one pass.
///
/// Records below [`MIN_READ_SUPPORT`] contribute to `total_records` only.
/// All accumulators are owned by this pass; repeated runs over the same
/// input yield identical results.
pub fn classify(records: &[CircRnaRecord]) -> Classification {
    let mut stats = AnnotationStats {
        total_records: records.len(),
        ..AnnotationStats::default()
    };
    let mut true_exonic = Vec::new();
    let mut mono_exonic_names: HashSet<&str> = HashSet::new();

    for (idx, rec) in records.iter().enumerate() {
        if rec.nb_ccr < MIN_READ_SUPPORT {
            continue;
        }
        stats.total_qualifying += 1;

        let start_field = rec.exons_id_start.as_str();
        let end_field = rec.exons_id_end.as_str();

        // Exonic circRNAs
        if (!start_field.is_empty() || !end_field.is_empty()) && rec.intron_name.is_empty() {
            stats.total_exonic += 1;
            match rec.strand {
                Strand::Plus => {
                    if marks_junction(start_field, ExonEnd::FivePrime, Strand::Plus) {
                        if end_field.is_empty() {
                            stats.single_annotated_junction += 1;
                        }
                        if marks_junction(end_field, ExonEnd::ThreePrime, Strand::Plus) {
                            stats.start_end_exonic += 1;
                            true_exonic.push(idx);
                            if rec.single_shared_exon() {
                                stats.mono_exonic += 1;
                                mono_exonic_names.insert(rec.circ_rna_name.as_str());
                            }
                        }
                    }
                    if marks_junction(end_field, ExonEnd::ThreePrime, Strand::Plus)
                        && start_field.is_empty()
                    {
                        stats.single_annotated_junction += 1;
                    }
                    if marks_junction(start_field, ExonEnd::ThreePrime, Strand::Minus)
                        && marks_junction(end_field, ExonEnd::FivePrime, Strand::Minus)
                    {
                        stats.antisense_exonic += 1;
                    }
                }
                Strand::Minus => {
                    if marks_junction(end_field, ExonEnd::FivePrime, Strand::Minus) {
                        if start_field.is_empty() {
                            stats.single_annotated_junction += 1;
                        }
                        if marks_junction(start_field, ExonEnd::ThreePrime, Strand::Minus) {
                            stats.start_end_exonic += 1;
                            true_exonic.push(idx);
                            if rec.single_shared_exon() {
                                stats.mono_exonic += 1;
                                mono_exonic_names.insert(rec.circ_rna_name.as_str());
                            }
                        }
                    }
                    if marks_junction(start_field, ExonEnd::ThreePrime, Strand::Minus)
                        && end_field.is_empty()
                    {
                        stats.single_annotated_junction += 1;
                    }
                    if marks_junction(start_field, ExonEnd::FivePrime, Strand::Plus)
                        && marks_junction(end_field, ExonEnd::ThreePrime, Strand::Plus)
                    {
                        stats.antisense_exonic += 1;
                    }
                }
            }
        }

        // Infra-exonic circRNAs; mono-exonic names recorded so far are
        // excluded, including by the same record earlier in this iteration
        if !rec.gene_id_ife.is_empty() && !mono_exonic_names.contains(rec.circ_rna_name.as_str()) {
            stats.infra_exonic_total += 1;
            // own sign wins when the field carries both
            if rec.gene_id_ife.contains(rec.strand.to_char()) {
                stats.infra_exonic_sense += 1;
            } else if rec.gene_id_ife.contains(rec.strand.complement().to_char()) {
                stats.infra_exonic_antisense += 1;
            }
        }

        // True intronic circRNAs
        if !rec.intron_name.is_empty() {
            if let (Some(start_i), Some(end_i)) = (rec.start_i, rec.end_i) {
                if intron_anchored(rec.strand, rec.start, start_i, rec.end, end_i) {
                    stats.true_intronic += 1;
                }
            }
        }
    }

    log::debug!(
        "classified {} records: {} qualifying, {} exonic, {} start-end, {} true intronic",
        stats.total_records,
        stats.total_qualifying,
        stats.total_exonic,
        stats.start_end_exonic,
        stats.true_intronic,
    );

    Classification { stats, true_exonic }
}
