//! Annotation table adapter
//!
//! Loads the tab-separated circRNA annotation table into typed records and
//! writes the two outputs: the one-line summary and the filtered table of
//! start-end exonic records.
//!
//! The loader keeps the original header and the normalized raw fields of
//! every row so the filtered-table writer can replay records verbatim, in
//! the input's column order.

use memchr::memchr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::{CircRnaRecord, Strand, TableParseError, TableResult};

/// Fixed relative filename for the filtered start-end exonic table
pub const TRUE_EXONIC_FILENAME: &str = "true_exonic_circ.tsv";

/// Tokens treated as an absent value and normalized to the empty string
const NA_TOKENS: [&str; 8] = ["NA", "N/A", "NaN", "nan", "n/a", "null", "NULL", "None"];

/// Compression format for annotation tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain text (uncompressed)
    Plain,
    /// Gzip compressed (.gz)
    Gzip,
    /// Bzip2 compressed (.bz2)
    Bzip2,
}

/// Detect compression format from file path and/or content
pub fn detect_compression(path: &Path) -> TableResult<CompressionFormat> {
    use std::io::Read;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    // First check by extension
    if extension == "gz" {
        return Ok(CompressionFormat::Gzip);
    }
    if extension == "bz2" {
        return Ok(CompressionFormat::Bzip2);
    }

    // Then check by magic bytes
    let mut file = open_file(path)?;
    let mut magic = [0u8; 3];
    let bytes_read = file.read(&mut magic)?;

    if bytes_read >= 2 && magic[0] == 0x1f && magic[1] == 0x8b {
        return Ok(CompressionFormat::Gzip);
    }
    if bytes_read >= 3 && magic[0] == 0x42 && magic[1] == 0x5a && magic[2] == 0x68 {
        return Ok(CompressionFormat::Bzip2);
    }

    Ok(CompressionFormat::Plain)
}

fn open_file(path: &Path) -> TableResult<File> {
    File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            TableParseError::FileNotFound(path.to_path_buf())
        } else {
            TableParseError::Io(e)
        }
    })
}

fn open_reader(path: &Path) -> TableResult<Box<dyn BufRead>> {
    let format = detect_compression(path)?;
    let file = open_file(path)?;
    let reader: Box<dyn BufRead> = match format {
        CompressionFormat::Gzip => {
            let decoder = flate2::read::GzDecoder::new(file);
            Box::new(BufReader::with_capacity(128 * 1024, decoder))
        }
        CompressionFormat::Bzip2 => {
            let decoder = bzip2::read::BzDecoder::new(file);
            Box::new(BufReader::with_capacity(128 * 1024, decoder))
        }
        CompressionFormat::Plain => Box::new(BufReader::with_capacity(128 * 1024, file)),
    };
    Ok(reader)
}

/// Split a line into tab-separated fields
fn split_fields(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::with_capacity(16);
    let mut start = 0;
    while let Some(tab) = memchr(b'\t', &bytes[start..]) {
        fields.push(&line[start..start + tab]);
        start += tab + 1;
    }
    fields.push(&line[start..]);
    fields
}

fn normalize_missing(field: &str) -> &str {
    if NA_TOKENS.contains(&field) {
        ""
    } else {
        field
    }
}

/// Indices of the required columns, located by header name
struct ColumnMap {
    circ_rna_name: usize,
    strand: usize,
    nb_ccr: usize,
    start: usize,
    end: usize,
    start_i: usize,
    end_i: usize,
    exons_id_start: usize,
    exons_id_end: usize,
    intron_name: usize,
    gene_id_ife: usize,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> TableResult<Self> {
        let find = |column: &str| {
            header
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| TableParseError::MissingColumn {
                    column: column.to_string(),
                })
        };
        Ok(Self {
            circ_rna_name: find("circ_rna_name")?,
            strand: find("strand")?,
            nb_ccr: find("nb_ccr")?,
            start: find("start")?,
            end: find("end")?,
            start_i: find("start_i")?,
            end_i: find("end_i")?,
            exons_id_start: find("exons_id_start")?,
            exons_id_end: find("exons_id_end")?,
            intron_name: find("intron_name")?,
            gene_id_ife: find("gene_id_ife")?,
        })
    }
}

fn parse_int(value: &str, column: &'static str, line: usize) -> TableResult<i64> {
    value.parse().map_err(|_| TableParseError::ParseInt {
        line,
        column,
        value: value.to_string(),
    })
}

/// Empty means no annotation; non-empty must parse
fn parse_opt_int(value: &str, column: &'static str, line: usize) -> TableResult<Option<i64>> {
    if value.is_empty() {
        Ok(None)
    } else {
        parse_int(value, column, line).map(Some)
    }
}

fn parse_record(fields: &[String], columns: &ColumnMap, line: usize) -> TableResult<CircRnaRecord> {
    let strand_field = fields[columns.strand].as_str();
    let strand = match strand_field {
        "+" => Strand::Plus,
        "-" => Strand::Minus,
        other => {
            return Err(TableParseError::InvalidStrand {
                line,
                value: other.to_string(),
            })
        }
    };

    Ok(CircRnaRecord {
        circ_rna_name: fields[columns.circ_rna_name].clone(),
        strand,
        nb_ccr: parse_int(&fields[columns.nb_ccr], "nb_ccr", line)?,
        start: parse_int(&fields[columns.start], "start", line)?,
        end: parse_int(&fields[columns.end], "end", line)?,
        start_i: parse_opt_int(&fields[columns.start_i], "start_i", line)?,
        end_i: parse_opt_int(&fields[columns.end_i], "end_i", line)?,
        exons_id_start: fields[columns.exons_id_start].clone(),
        exons_id_end: fields[columns.exons_id_end].clone(),
        intron_name: fields[columns.intron_name].clone(),
        gene_id_ife: fields[columns.gene_id_ife].clone(),
    })
}

/// A loaded annotation table: header, normalized raw rows, typed records
#[derive(Debug, Clone)]
pub struct AnnotationTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    records: Vec<CircRnaRecord>,
}

impl AnnotationTable {
    /// Load an annotation table from a path
    ///
    /// Automatically detects and handles compression:
    /// - .gz extension or gzip magic bytes (1f 8b)
    /// - .bz2 extension or bzip2 magic bytes (42 5a 68)
    /// - Plain text otherwise
    pub fn from_path<P: AsRef<Path>>(path: P) -> TableResult<Self> {
        let reader = open_reader(path.as_ref())?;
        Self::from_reader(reader)
    }

    /// Load an annotation table from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> TableResult<Self> {
        let mut lines = reader.lines();

        let header_line = match lines.next() {
            Some(line) => line?,
            None => return Err(TableParseError::EmptyTable),
        };
        let header: Vec<String> = split_fields(trim_line_end(&header_line))
            .into_iter()
            .map(|f| f.to_string())
            .collect();
        let columns = ColumnMap::from_header(&header)?;

        let mut rows = Vec::new();
        let mut records = Vec::new();
        for (index, line) in lines.enumerate() {
            let line = line?;
            let line = trim_line_end(&line);
            if line.is_empty() {
                continue;
            }
            // 1-based, counting the header
            let line_number = index + 2;

            let fields: Vec<String> = split_fields(line)
                .into_iter()
                .map(|f| normalize_missing(f).to_string())
                .collect();
            if fields.len() != header.len() {
                return Err(TableParseError::FieldCount {
                    line: line_number,
                    expected: header.len(),
                    found: fields.len(),
                });
            }

            records.push(parse_record(&fields, &columns, line_number)?);
            rows.push(fields);
        }

        log::debug!("loaded {} annotation rows", records.len());

        Ok(Self {
            header,
            rows,
            records,
        })
    }

    /// Column names in original input order
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Typed records in input row order
    pub fn records(&self) -> &[CircRnaRecord] {
        &self.records
    }

    /// Normalized raw fields of one row, in original column order
    pub fn row(&self, index: usize) -> &[String] {
        &self.rows[index]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn trim_line_end(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Sample identifier for a summary row: the name of the directory holding
/// the input file. The upstream pipeline writes one result directory per
/// sample, so the directory name is the sample name.
pub fn sample_name(path: &Path) -> String {
    path.parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Write the one-line summary table, overwriting any previous run
pub fn write_summary<P: AsRef<Path>>(path: P, line: &str) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(line.as_bytes())?;
    writer.flush()
}

/// Write the filtered table of start-end exonic records: the input header
/// followed by the selected rows in encounter order
pub fn write_true_exonic<P: AsRef<Path>>(
    path: P,
    table: &AnnotationTable,
    rows: &[usize],
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", table.header().join("\t"))?;
    for &index in rows {
        writeln!(writer, "{}", table.row(index).join("\t"))?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "circ_rna_name\tstrand\tnb_ccr\tstart\tend\tstart_i\tend_i\texons_id_start\texons_id_end\tintron_name\tgene_id_ife";

    fn load(text: &str) -> TableResult<AnnotationTable> {
        AnnotationTable::from_reader(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn test_load_basic_row() {
        let text = format!(
            "{}\ncirc_1\t+\t10\t100\t200\t\t\tEX1_5_+\tEX1_3_+\t\t\n",
            HEADER
        );
        let table = load(&text).unwrap();
        assert_eq!(table.len(), 1);

        let rec = &table.records()[0];
        assert_eq!(rec.circ_rna_name, "circ_1");
        assert_eq!(rec.strand, Strand::Plus);
        assert_eq!(rec.nb_ccr, 10);
        assert_eq!(rec.start, 100);
        assert_eq!(rec.end, 200);
        assert_eq!(rec.start_i, None);
        assert_eq!(rec.end_i, None);
        assert_eq!(rec.exons_id_start, "EX1_5_+");
        assert_eq!(rec.intron_name, "");
    }

    #[test]
    fn test_na_normalization() {
        let text = format!(
            "{}\ncirc_1\t+\t10\t100\t200\tNA\tNaN\tnan\tnull\tN/A\tNone\n",
            HEADER
        );
        let table = load(&text).unwrap();
        let rec = &table.records()[0];
        assert_eq!(rec.start_i, None);
        assert_eq!(rec.end_i, None);
        assert_eq!(rec.exons_id_start, "");
        assert_eq!(rec.exons_id_end, "");
        assert_eq!(rec.intron_name, "");
        assert_eq!(rec.gene_id_ife, "");
        // the stored raw row is normalized too
        assert_eq!(table.row(0)[5], "");
        assert_eq!(table.row(0)[10], "");
    }

    #[test]
    fn test_columns_located_by_name() {
        // reordered header with an extra leading column
        let text = "chrom\tstrand\tcirc_rna_name\tnb_ccr\tstart\tend\tstart_i\tend_i\texons_id_start\texons_id_end\tintron_name\tgene_id_ife\n\
                    chr1\t-\tcirc_9\t7\t5\t60\t5\t70\t\t\tINT9\t\n";
        let table = load(text).unwrap();
        let rec = &table.records()[0];
        assert_eq!(rec.circ_rna_name, "circ_9");
        assert_eq!(rec.strand, Strand::Minus);
        assert_eq!(rec.start_i, Some(5));
        assert_eq!(rec.intron_name, "INT9");
    }

    #[test]
    fn test_missing_column() {
        let text = "circ_rna_name\tstrand\tnb_ccr\ncirc_1\t+\t10\n";
        match load(text) {
            Err(TableParseError::MissingColumn { column }) => assert_eq!(column, "start"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(load(""), Err(TableParseError::EmptyTable)));
    }

    #[test]
    fn test_invalid_integer() {
        let text = format!("{}\ncirc_1\t+\tmany\t100\t200\t\t\t\t\t\t\n", HEADER);
        match load(&text) {
            Err(TableParseError::ParseInt { line, column, value }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "nb_ccr");
                assert_eq!(value, "many");
            }
            other => panic!("expected ParseInt, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_strand() {
        let text = format!("{}\ncirc_1\t.\t10\t100\t200\t\t\t\t\t\t\n", HEADER);
        assert!(matches!(
            load(&text),
            Err(TableParseError::InvalidStrand { line: 2, .. })
        ));
    }

    #[test]
    fn test_field_count_mismatch() {
        let text = format!("{}\ncirc_1\t+\t10\n", HEADER);
        assert!(matches!(
            load(&text),
            Err(TableParseError::FieldCount {
                line: 2,
                expected: 11,
                found: 3
            })
        ));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let text = format!(
            "{}\n\ncirc_1\t+\t10\t100\t200\t\t\t\t\t\t\n\n",
            HEADER
        );
        let table = load(&text).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = format!(
            "{}\r\ncirc_1\t+\t10\t100\t200\t\t\t\t\t\t\r\n",
            HEADER
        );
        let table = load(&text).unwrap();
        assert_eq!(table.header().len(), 11);
        assert_eq!(table.records()[0].gene_id_ife, "");
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields("a\tb\tc"), vec!["a", "b", "c"]);
        assert_eq!(split_fields("a\t\tc"), vec!["a", "", "c"]);
        assert_eq!(split_fields(""), vec![""]);
    }

    #[test]
    fn test_sample_name() {
        assert_eq!(
            sample_name(Path::new("results_pig_testis_31/annotation_circRNAs.out")),
            "results_pig_testis_31"
        );
        assert_eq!(sample_name(Path::new("annotation_circRNAs.out")), "");
    }
}
