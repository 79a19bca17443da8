//! Gene coordinates of each query region and the matching nucleotide
//! sequences, used as the query file of the `search` command.
//!
//! The annotation tool writes one `<record>_c<N>.txt` file per region under
//! `<run>/clusterblast/`. Its query gene table starts at the first line
//! beginning with `ctg` and ends at the first blank or non-alphanumeric line.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use bio::alphabets::dna;
use bio::io::fasta;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::batch::{IgnoreSet, SkippedEntry, list_candidate_entries};
use crate::error::BgcError;
use crate::table::{Table, TableRow};

pub const CLUSTERBLAST_DIR: &str = "clusterblast";
pub const COORDINATES_FILE: &str = "ctg_coordinates.csv";
pub const SEQUENCES_FILE: &str = "ctg_sequences.fasta";

const GENE_TABLE_PREFIX: &str = "ctg";
const FASTA_EXTENSIONS: [&str; 3] = ["fasta", "fa", "fna"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

/// One query gene. `start` is 1-based, `end` inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneCoordinate {
    pub gene: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub sequence: String,
}

impl GeneCoordinate {
    /// FASTA header `sequence/gene/start/end/strand`.
    pub fn header(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.sequence, self.gene, self.start, self.end, self.strand
        )
    }
}

impl TableRow for GeneCoordinate {
    const COLUMNS: &'static [&'static str] = &["gene", "start", "end", "strand", "sequence"];

    fn into_cells(self) -> Vec<Value> {
        vec![
            Value::String(self.gene),
            Value::from(self.start),
            Value::from(self.end),
            Value::String(self.strand.to_string()),
            Value::String(self.sequence),
        ]
    }
}

/// Record name of a `<record>_c<N>.txt` file.
pub fn sequence_from_file_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".txt").unwrap_or(file_name);
    match stem.rsplit_once("_c") {
        Some((record, region))
            if !region.is_empty() && region.bytes().all(|b| b.is_ascii_digit()) =>
        {
            record.to_string()
        }
        _ => stem.to_string(),
    }
}

/// Parses the query gene table of one clusterblast file. The tool writes
/// 0-based starts; they are shifted to 1-based here. Columns past the fourth
/// (annotations) are ignored.
pub fn parse_gene_table(text: &str, sequence: &str) -> Result<Vec<GeneCoordinate>, BgcError> {
    let mut genes = Vec::new();
    let mut in_table = false;
    for line in text.lines() {
        if line.starts_with(GENE_TABLE_PREFIX) {
            in_table = true;
        }
        if !in_table {
            continue;
        }
        let starts_alphanumeric = line.chars().next().is_some_and(char::is_alphanumeric);
        if line.trim().is_empty() || !starts_alphanumeric {
            break;
        }
        genes.push(parse_gene_line(line.trim(), sequence)?);
    }
    Ok(genes)
}

fn parse_gene_line(line: &str, sequence: &str) -> Result<GeneCoordinate, BgcError> {
    let invalid = || BgcError::InvalidGeneLine(line.to_string());
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [gene, start, end, strand, ..] = fields.as_slice() else {
        return Err(invalid());
    };
    let start: u64 = start.parse().map_err(|_| invalid())?;
    let end: u64 = end.parse().map_err(|_| invalid())?;
    let strand = Strand::parse(strand).ok_or_else(invalid)?;
    Ok(GeneCoordinate {
        gene: gene.to_string(),
        start: start + 1,
        end,
        strand,
        sequence: sequence.to_string(),
    })
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CoordinateReport {
    pub runs_seen: usize,
    pub files_parsed: usize,
    pub genes: usize,
    pub missing: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone)]
pub struct CoordinateOutcome {
    pub genes: Vec<GeneCoordinate>,
    pub report: CoordinateReport,
}

impl CoordinateOutcome {
    pub fn table(&self) -> Table {
        Table::from_rows(self.genes.iter().cloned())
    }
}

/// Reads every `<run>/clusterblast/*.txt` gene table under `results_dir`,
/// runs and files both in name order. Unreadable files are skipped.
pub fn collect_coordinates(
    results_dir: &Path,
    ignore: &IgnoreSet,
) -> Result<CoordinateOutcome, BgcError> {
    let mut genes = Vec::new();
    let mut report = CoordinateReport::default();

    for run in list_candidate_entries(results_dir, ignore)? {
        if !run.is_dir() {
            continue;
        }
        report.runs_seen += 1;
        let run_name = run
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let table_dir = run.join(CLUSTERBLAST_DIR);
        if !table_dir.is_dir() {
            warn!("directory not found: {}", table_dir.display());
            report.missing.push(run_name);
            continue;
        }

        for file in list_candidate_entries(&table_dir, ignore)? {
            if !file.is_file() {
                continue;
            }
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            let parsed = fs::read_to_string(&file)
                .map_err(|err| BgcError::Filesystem(err.to_string()))
                .and_then(|text| parse_gene_table(&text, &sequence_from_file_name(&file_name)));
            match parsed {
                Ok(found) => {
                    debug!(file = %file.display(), genes = found.len(), "gene table read");
                    report.files_parsed += 1;
                    genes.extend(found);
                }
                Err(err) => {
                    warn!("error processing file {}: {err}", file.display());
                    report.skipped.push(SkippedEntry {
                        path: file.display().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    report.genes = genes.len();
    info!(genes = report.genes, files = report.files_parsed, "coordinates collected");
    Ok(CoordinateOutcome { genes, report })
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SequenceReport {
    pub written: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Genome FASTA files of one directory, parsed on first use.
pub struct GenomeLibrary {
    root: PathBuf,
    loaded: BTreeMap<PathBuf, Vec<fasta::Record>>,
}

impl GenomeLibrary {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            loaded: BTreeMap::new(),
        }
    }

    /// The FASTA file of a record name `<genome>_..._<n>`: the longest
    /// `_`-separated prefix with a `.fasta`, `.fa` or `.fna` file.
    pub fn genome_file(&self, sequence: &str) -> Option<PathBuf> {
        let mut prefix = sequence;
        loop {
            for extension in FASTA_EXTENSIONS {
                let candidate = self.root.join(format!("{prefix}.{extension}"));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
            prefix = prefix.rsplit_once('_')?.0;
        }
    }

    fn records(&mut self, path: &Path) -> Result<&[fasta::Record], BgcError> {
        if !self.loaded.contains_key(path) {
            let file = File::open(path).map_err(|err| BgcError::Filesystem(err.to_string()))?;
            let records = fasta::Reader::new(file)
                .records()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| BgcError::Filesystem(format!("{}: {err}", path.display())))?;
            self.loaded.insert(path.to_path_buf(), records);
        }
        Ok(self.loaded.get(path).map(Vec::as_slice).unwrap_or_default())
    }

    /// Nucleotides of one gene, reverse-complemented on the minus strand.
    ///
    /// The contig is the record whose id equals the gene's record name, or
    /// else the 1-based record given by the trailing `_<n>` of that name.
    pub fn gene_sequence(&mut self, gene: &GeneCoordinate) -> Result<Vec<u8>, String> {
        let path = self
            .genome_file(&gene.sequence)
            .ok_or_else(|| format!("no genome FASTA for {}", gene.sequence))?;
        let records = self.records(&path).map_err(|err| err.to_string())?;

        let contig = match records.iter().find(|record| record.id() == gene.sequence) {
            Some(record) => record,
            None => {
                let index: usize = gene
                    .sequence
                    .rsplit_once('_')
                    .and_then(|(_, index)| index.parse().ok())
                    .ok_or_else(|| format!("no contig named {}", gene.sequence))?;
                index
                    .checked_sub(1)
                    .and_then(|index| records.get(index))
                    .ok_or_else(|| {
                        format!(
                            "invalid sequence index {index}, {} sequences in {}",
                            records.len(),
                            path.display()
                        )
                    })?
            }
        };

        let bases = contig.seq();
        let (start, end) = (gene.start as usize, gene.end as usize);
        if start == 0 || start > end || end > bases.len() {
            return Err(format!(
                "{}..{} outside contig {} of length {}",
                gene.start,
                gene.end,
                contig.id(),
                bases.len()
            ));
        }
        let slice = &bases[start - 1..end];
        Ok(match gene.strand {
            Strand::Forward => slice.to_vec(),
            Strand::Reverse => dna::revcomp(slice),
        })
    }
}

/// Writes one FASTA entry per gene, headed by [`GeneCoordinate::header`].
/// Genes whose contig or range cannot be resolved are skipped.
pub fn write_gene_sequences<W: io::Write>(
    genes: &[GeneCoordinate],
    library: &mut GenomeLibrary,
    writer: W,
) -> Result<SequenceReport, BgcError> {
    let mut writer = fasta::Writer::new(writer);
    let mut report = SequenceReport::default();
    for gene in genes {
        match library.gene_sequence(gene) {
            Ok(bases) => {
                writer
                    .write(&gene.header(), None, &bases)
                    .map_err(|err| BgcError::Filesystem(err.to_string()))?;
                report.written += 1;
            }
            Err(reason) => {
                warn!(gene = %gene.header(), "{reason}");
                report.skipped.push(SkippedEntry {
                    path: gene.header(),
                    reason,
                });
            }
        }
    }
    writer
        .flush()
        .map_err(|err| BgcError::Filesystem(err.to_string()))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_name_drops_region_suffix() {
        assert_eq!(sequence_from_file_name("MAG00001_12_c1.txt"), "MAG00001_12");
        assert_eq!(sequence_from_file_name("MAG00001_12_c10.txt"), "MAG00001_12");
        assert_eq!(sequence_from_file_name("notes.txt"), "notes");
    }

    #[test]
    fn header_layout() {
        let gene = GeneCoordinate {
            gene: "ctg1_3".to_string(),
            start: 11,
            end: 40,
            strand: Strand::Reverse,
            sequence: "MAG00001_1".to_string(),
        };
        assert_eq!(gene.header(), "MAG00001_1/ctg1_3/11/40/-");
    }
}
