use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "harvest.toml";

/// Failure to read or parse a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarvestConfig {
    pub ledger_path: PathBuf,
    pub codes_dir: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(hvl_store::file::DEFAULT_LEDGER_FILE),
            codes_dir: PathBuf::from("."),
        }
    }
}

impl HarvestConfig {
    /// Load from `explicit` if given (it must exist), otherwise from
    /// `harvest.toml` if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Command-line values win over file values.
    pub fn with_overrides(mut self, ledger: Option<PathBuf>, codes_dir: Option<PathBuf>) -> Self {
        if let Some(path) = ledger {
            self.ledger_path = path;
        }
        if let Some(dir) = codes_dir {
            self.codes_dir = dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_layout() {
        let config = HarvestConfig::default();
        assert_eq!(config.ledger_path, PathBuf::from("blockchain.json"));
        assert_eq!(config.codes_dir, PathBuf::from("."));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvest.toml");
        std::fs::write(&path, "codes_dir = \"qr\"\n").unwrap();

        let config = HarvestConfig::load(Some(&path)).unwrap();
        assert_eq!(config.codes_dir, PathBuf::from("qr"));
        assert_eq!(config.ledger_path, PathBuf::from("blockchain.json"));
    }

    #[test]
    fn flags_override_file() {
        let config = HarvestConfig {
            ledger_path: "from-file.json".into(),
            codes_dir: "file-codes".into(),
        }
        .with_overrides(Some("flag.json".into()), None);
        assert_eq!(config.ledger_path, PathBuf::from("flag.json"));
        assert_eq!(config.codes_dir, PathBuf::from("file-codes"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HarvestConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvest.toml");
        std::fs::write(&path, "ledger = \"typo.json\"\n").unwrap();
        let err = HarvestConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
