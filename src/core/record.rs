//! circRNA record model
//!
//! Typed representation of one annotation-table row, plus the strand and
//! exon-boundary marker vocabulary the classifier matches against.

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    /// Get the complement strand
    ///
    /// # Examples
    /// ```
    /// use circ_stats::core::Strand;
    /// assert_eq!(Strand::Plus.complement(), Strand::Minus);
    /// assert_eq!(Strand::Minus.complement(), Strand::Plus);
    /// ```
    pub fn complement(&self) -> Self {
        match self {
            Strand::Plus => Strand::Minus,
            Strand::Minus => Strand::Plus,
        }
    }

    /// Parse strand from char
    ///
    /// # Examples
    /// ```
    /// use circ_stats::core::Strand;
    /// assert_eq!(Strand::from_char('+'), Some(Strand::Plus));
    /// assert_eq!(Strand::from_char('-'), Some(Strand::Minus));
    /// assert_eq!(Strand::from_char('.'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Plus),
            '-' => Some(Strand::Minus),
            _ => None,
        }
    }

    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Annotated exon boundary marker
///
/// Upstream annotation tags each exon token with the boundary it matched:
/// `5` for the five-prime exon end, `3` for the three-prime exon end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExonEnd {
    FivePrime,
    ThreePrime,
}

impl ExonEnd {
    /// The marker character carried inside exon tokens
    pub fn marker(&self) -> char {
        match self {
            ExonEnd::FivePrime => '5',
            ExonEnd::ThreePrime => '3',
        }
    }
}

/// Whether an exon-token field carries a boundary marker and a strand sign.
///
/// The two containment tests run against the whole comma-joined field and
/// are independent of token boundaries: the marker and the sign may come
/// from different tokens. Upstream annotation output is noisy enough that
/// a stricter per-token parse rejects real matches.
pub fn marks_junction(field: &str, end: ExonEnd, sign: Strand) -> bool {
    field.contains(end.marker()) && field.contains(sign.to_char())
}

/// Identifier of the first exon token in a field: the prefix before the
/// first `_` of the first comma-separated token.
pub fn exon_identifier(field: &str) -> &str {
    let token = field.split(',').next().unwrap_or(field);
    token.split('_').next().unwrap_or(token)
}

/// One row of a circRNA annotation table.
///
/// String fields use the empty string as the absent-value sentinel; the
/// loader normalizes NA-like tokens at parse time so length and membership
/// tests behave the same regardless of how the source marked absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircRnaRecord {
    /// circRNA identifier; not necessarily unique across the table
    pub circ_rna_name: String,
    /// Called strand of the circRNA junction
    pub strand: Strand,
    /// Circular-read support count
    pub nb_ccr: i64,
    /// circRNA start boundary
    pub start: i64,
    /// circRNA end boundary
    pub end: i64,
    /// Paired intron start; `None` when no intron annotation was emitted
    pub start_i: Option<i64>,
    /// Paired intron end; `None` when no intron annotation was emitted
    pub end_i: Option<i64>,
    /// Comma-separated exon tokens matching the start junction
    pub exons_id_start: String,
    /// Comma-separated exon tokens matching the end junction
    pub exons_id_end: String,
    /// Paired intron name; empty = no intronic annotation
    pub intron_name: String,
    /// Overlapping gene for infra-exonic records; embeds the gene's strand sign
    pub gene_id_ife: String,
}

impl CircRnaRecord {
    /// True when both junction ends resolve to exactly one exon token and
    /// those tokens share the same exon identifier.
    pub fn single_shared_exon(&self) -> bool {
        self.exons_id_start.split(',').count() == 1
            && self.exons_id_end.split(',').count() == 1
            && exon_identifier(&self.exons_id_start) == exon_identifier(&self.exons_id_end)
    }
}
