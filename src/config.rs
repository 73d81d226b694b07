//! TOML + environment configuration.
//!
//! Precedence: CLI > env > config file > defaults. Only the first config file found is read:
//! `--config`, then `$MARKLITE_CONFIG`, then `./marklite.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::DbError;
use crate::students::SCORE_BEST_STUDENT;

pub const DEFAULT_DATA_FILE: &str = "students.ndjson";
pub const DEFAULT_COLLECTION: &str = "students";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_RETENTION: usize = 7;
pub const LOCAL_CONFIG_FILE: &str = "marklite.toml";

/// One configuration layer; every key is optional so layers can be stacked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub data_file: Option<PathBuf>,
    pub collection: Option<String>,
    pub best_student_score: Option<i32>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_retention: Option<usize>,
    pub log_config: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_file: PathBuf,
    pub collection: String,
    pub best_student_score: i32,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub log_retention: usize,
    pub log_config: Option<PathBuf>,
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>, DbError> {
    raw.map(|s| s.trim().parse::<T>().map_err(|_| DbError::Config(format!("{key}: cannot parse {s:?}"))))
        .transpose()
}

impl AppConfig {
    /// # Errors
    /// `Config` when the text is not valid TOML or carries an unknown key.
    pub fn from_toml_str(s: &str) -> Result<Self, DbError> {
        toml::from_str(s).map_err(|e| DbError::Config(e.to_string()))
    }

    /// # Errors
    /// `Io` when the file cannot be read, `Config` when it does not parse.
    pub fn from_file(path: &Path) -> Result<Self, DbError> {
        let s = std::fs::read_to_string(path).map_err(|e| DbError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    /// Reads the `MARKLITE_*` variables through `lookup`.
    ///
    /// # Errors
    /// `Config` when a numeric variable does not parse.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DbError> {
        Ok(Self {
            data_file: lookup("MARKLITE_DATA").map(PathBuf::from),
            collection: None,
            best_student_score: parse_env("MARKLITE_BEST_SCORE", lookup("MARKLITE_BEST_SCORE"))?,
            log_dir: lookup("MARKLITE_LOG_DIR").map(PathBuf::from),
            log_level: lookup("MARKLITE_LOG_LEVEL"),
            log_retention: parse_env("MARKLITE_LOG_RETENTION", lookup("MARKLITE_LOG_RETENTION"))?,
            log_config: None,
        })
    }

    /// Fills every unset key from `lower`.
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            data_file: self.data_file.or(lower.data_file),
            collection: self.collection.or(lower.collection),
            best_student_score: self.best_student_score.or(lower.best_student_score),
            log_dir: self.log_dir.or(lower.log_dir),
            log_level: self.log_level.or(lower.log_level),
            log_retention: self.log_retention.or(lower.log_retention),
            log_config: self.log_config.or(lower.log_config),
        }
    }

    #[must_use]
    pub fn resolve(self) -> Settings {
        Settings {
            data_file: self.data_file.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            collection: self.collection.unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            best_student_score: self.best_student_score.unwrap_or(SCORE_BEST_STUDENT),
            log_dir: self.log_dir,
            log_level: self.log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_retention: self.log_retention.unwrap_or(DEFAULT_LOG_RETENTION),
            log_config: self.log_config,
        }
    }
}

/// Candidate config files in lookup order.
pub fn config_paths(cli_cfg: Option<&Path>, lookup: &impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    if let Some(p) = cli_cfg {
        paths.push(p.to_path_buf());
    }
    if let Some(p) = lookup("MARKLITE_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
    paths
}

/// Stacks `cli` over the environment over the first config file found, then applies defaults.
///
/// # Errors
/// `Config` when an explicit `--config` file is missing or any layer fails to parse.
pub fn load_with(
    cli_cfg: Option<&Path>,
    cli: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Settings, DbError> {
    if let Some(p) = cli_cfg
        && !p.exists()
    {
        return Err(DbError::Config(format!("config file not found: {}", p.display())));
    }
    let file = match config_paths(cli_cfg, &lookup).into_iter().find(|p| p.is_file()) {
        Some(p) => {
            log::debug!("config file: {}", p.display());
            AppConfig::from_file(&p)?
        }
        None => AppConfig::default(),
    };
    let env = AppConfig::from_env_with(&lookup)?;
    Ok(cli.or(env).or(file).resolve())
}

/// [`load_with`] over the process environment.
///
/// # Errors
/// See [`load_with`].
pub fn load(cli_cfg: Option<&Path>, cli: AppConfig) -> Result<Settings, DbError> {
    load_with(cli_cfg, cli, |k| std::env::var(k).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(AppConfig::from_toml_str("colour = 1"), Err(DbError::Config(_))));
    }

    #[test]
    fn defaults_fill_an_empty_layer() {
        let s = AppConfig::default().resolve();
        assert_eq!(s.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(s.best_student_score, 80);
        assert_eq!(s.log_retention, 7);
    }
}
