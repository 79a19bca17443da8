use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::BgcError;

/// Composite region identifier `"{record}.{region}"`, both components 1-based.
///
/// Every output table carries this string so that tables built from the same
/// document stay joinable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId {
    record: usize,
    region: String,
}

impl RegionId {
    /// Region addressed by its position in a list (`"{idx+1}.{pos+1}"`).
    pub fn from_positions(record_index: usize, region_index: usize) -> Self {
        Self {
            record: record_index + 1,
            region: (region_index + 1).to_string(),
        }
    }

    /// Region addressed by a module-native key, kept verbatim (`"{idx+1}.{key}"`).
    pub fn from_region_key(record_index: usize, key: &str) -> Self {
        Self {
            record: record_index + 1,
            region: key.to_string(),
        }
    }

    /// Region addressed by a module-native key that must be an integer.
    pub fn from_numeric_key(record_index: usize, key: &str) -> Result<Self, BgcError> {
        let number = key
            .trim()
            .parse::<i64>()
            .map_err(|_| BgcError::InvalidRegionId(key.to_string()))?;
        Ok(Self {
            record: record_index + 1,
            region: number.to_string(),
        })
    }

    pub fn record(&self) -> usize {
        self.record
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.record, self.region)
    }
}

impl FromStr for RegionId {
    type Err = BgcError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (record, region) = value
            .trim()
            .split_once('.')
            .ok_or_else(|| BgcError::InvalidRegionId(value.to_string()))?;
        let record = record
            .parse::<usize>()
            .ok()
            .filter(|record| *record > 0)
            .ok_or_else(|| BgcError::InvalidRegionId(value.to_string()))?;
        if region.is_empty() {
            return Err(BgcError::InvalidRegionId(value.to_string()));
        }
        Ok(Self {
            record,
            region: region.to_string(),
        })
    }
}

/// Analysis modules the extractors read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKey {
    ClusterBlast,
    ClusterCompare,
}

impl ModuleKey {
    pub fn qualified_name(&self) -> &'static str {
        match self {
            ModuleKey::ClusterBlast => "antismash.modules.clusterblast",
            ModuleKey::ClusterCompare => "antismash.modules.cluster_compare",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            ModuleKey::ClusterBlast => "clusterblast",
            ModuleKey::ClusterCompare => "cluster_compare",
        }
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Which score snapshot of a record the similarity join uses.
///
/// Annotations are pooled across every analysis kind of a record, while the
/// score half is a single snapshot. `LastNonEmpty` keeps the most recent
/// non-empty snapshot; `LastSeen` lets an empty analysis kind clear it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreSelectionPolicy {
    #[default]
    LastNonEmpty,
    LastSeen,
}

impl fmt::Display for ScoreSelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreSelectionPolicy::LastNonEmpty => write!(f, "last-non-empty"),
            ScoreSelectionPolicy::LastSeen => write!(f, "last-seen"),
        }
    }
}

/// The six output tables, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    RegionSummary,
    QueryToReference,
    SimilarityScore,
    BlastScore,
    MibigEntries,
    ClusterBlast,
}

impl TableKind {
    pub const ALL: [TableKind; 6] = [
        TableKind::RegionSummary,
        TableKind::QueryToReference,
        TableKind::SimilarityScore,
        TableKind::BlastScore,
        TableKind::MibigEntries,
        TableKind::ClusterBlast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::RegionSummary => "region_summary",
            TableKind::QueryToReference => "query_to_reference",
            TableKind::SimilarityScore => "similarity_score",
            TableKind::BlastScore => "blast_score",
            TableKind::MibigEntries => "mibig_entries",
            TableKind::ClusterBlast => "cluster_blast",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }

    /// Header written when a table ends up without any column. Tables whose
    /// columns come from upstream data only list the synthesized ones.
    pub fn fallback_columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::RegionSummary => &[
                "sequence",
                "region",
                "type",
                "most_similar_known_cluster",
                "most_similar_known_cluster_type",
                "similarity",
            ],
            TableKind::QueryToReference => &["protein", "reference", "region", "sequence"],
            TableKind::SimilarityScore => &[
                "reference",
                "analysis",
                "similarity_score",
                "position",
                "region",
                "sequence",
                "type",
                "compound",
                "organism",
            ],
            TableKind::BlastScore => &["coordinate", "sequence", "region", "ctg"],
            TableKind::MibigEntries => &[
                "mibig_protein",
                "description",
                "mibig_cluster",
                "mibig_product",
                "percentage_id",
                "blast_score",
                "percentage_coverage",
                "evalue",
                "sequence",
                "region",
                "ctg",
            ],
            TableKind::ClusterBlast => &[
                "accession",
                "cluster_label",
                "description",
                "cluster_type",
                "number_of_genes_in_ref",
                "hits",
                "core_gene_hits",
                "synteny_score",
                "core_bonus",
                "similarity",
                "sequence",
            ],
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchProgram {
    #[default]
    Blastn,
    Blastp,
}

impl SearchProgram {
    pub fn executable_name(&self) -> &'static str {
        match self {
            SearchProgram::Blastn => "blastn",
            SearchProgram::Blastp => "blastp",
        }
    }
}

impl fmt::Display for SearchProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_ids_format_and_parse() {
        assert_eq!(RegionId::from_positions(0, 2).to_string(), "1.3");
        assert_eq!(RegionId::from_region_key(1, "r2c1").to_string(), "2.r2c1");
        assert_eq!(RegionId::from_numeric_key(0, "4").unwrap().to_string(), "1.4");
        assert!(RegionId::from_numeric_key(0, "four").is_err());

        let parsed: RegionId = "3.r1c2".parse().unwrap();
        assert_eq!(parsed.record(), 3);
        assert_eq!(parsed.region(), "r1c2");
        assert!("0.1".parse::<RegionId>().is_err());
        assert!("7".parse::<RegionId>().is_err());
    }

    #[test]
    fn table_files_follow_kind_names() {
        assert_eq!(TableKind::MibigEntries.file_name(), "mibig_entries.csv");
        assert_eq!(TableKind::ALL.len(), 6);
    }
}
