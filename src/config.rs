use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::batch::IgnoreSet;
use crate::domain::{ScoreSelectionPolicy, SearchProgram};
use crate::error::BgcError;

pub const DEFAULT_CONFIG_FILE: &str = "bgc-tables.json";
pub const DEFAULT_OUTPUT_DIR: &str = "temp_file";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub score_selection: Option<ScoreSelectionPolicy>,
    #[serde(default)]
    pub search: Option<SearchEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SearchEntry {
    #[serde(default)]
    pub program: Option<SearchProgram>,
    #[serde(default)]
    pub executable: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub program: SearchProgram,
    pub executable: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub ignore: IgnoreSet,
    pub output_dir: PathBuf,
    pub score_selection: ScoreSelectionPolicy,
    pub search: SearchSettings,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ConfigLoader::resolve_config(Config::default())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path`, or `bgc-tables.json` when present. Without either the
    /// defaults apply.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, BgcError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| BgcError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| BgcError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        let search = config.search.unwrap_or_default();
        ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(1),
            ignore: IgnoreSet::new(config.ignore),
            output_dir: config
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            score_selection: config.score_selection.unwrap_or_default(),
            search: SearchSettings {
                program: search.program.unwrap_or_default(),
                executable: search.executable,
            },
        }
    }
}
