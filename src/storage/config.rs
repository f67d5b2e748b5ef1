//! Peer list configuration
//!
//! File names and capacities for every list the node keeps. A JSON file
//! may override any subset of the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::persistence::ListError;

/// Default data directory
pub const DEFAULT_DATA_DIR: &str = ".peerlist_data";

/// Name of the optional JSON configuration file inside the data directory
pub const CONFIG_FILE: &str = "peerlist.json";

/// Capacity of each bounded list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacities {
    pub recent: usize,
    pub trusted: usize,
    pub current_pink: usize,
    pub last_pink: usize,
    pub epoch_pink: usize,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            recent: 64,
            trusted: 32,
            current_pink: 100,
            last_pink: 100,
            epoch_pink: 100,
        }
    }
}

impl Capacities {
    pub fn all_nonzero(&self) -> bool {
        [
            self.recent,
            self.trusted,
            self.current_pink,
            self.last_pink,
            self.epoch_pink,
        ]
        .iter()
        .all(|&n| n > 0)
    }
}

/// Which on-disk list a path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListFile {
    Recent,
    Trusted,
    /// Epoch pink list
    Epoch,
    /// Read-only core peer list, used to seed the trusted list
    Core,
}

/// Peer list storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub data_dir: PathBuf,
    pub recent_file: String,
    pub trusted_file: String,
    pub epoch_file: String,
    pub core_file: String,
    pub capacities: Capacities,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            recent_file: "recent.lst".to_string(),
            trusted_file: "trusted.lst".to_string(),
            epoch_file: "epink.lst".to_string(),
            core_file: "coreip.lst".to_string(),
            capacities: Capacities::default(),
        }
    }
}

impl ListConfig {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Load overrides from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ListError> {
        let text = fs::read_to_string(path).map_err(|source| ListError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| ListError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !config.capacities.all_nonzero() {
            return Err(ListError::InvalidConfig {
                path: path.to_path_buf(),
                reason: "list capacities must be non-zero".to_string(),
            });
        }
        Ok(config)
    }

    /// Full path of a list file
    pub fn path_for(&self, file: ListFile) -> PathBuf {
        let name = match file {
            ListFile::Recent => &self.recent_file,
            ListFile::Trusted => &self.trusted_file,
            ListFile::Epoch => &self.epoch_file,
            ListFile::Core => &self.core_file,
        };
        self.data_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = ListConfig::with_data_dir("/var/node");
        assert_eq!(config.path_for(ListFile::Recent), PathBuf::from("/var/node/recent.lst"));
        assert_eq!(config.path_for(ListFile::Epoch), PathBuf::from("/var/node/epink.lst"));
        assert_eq!(config.path_for(ListFile::Core), PathBuf::from("/var/node/coreip.lst"));
    }

    #[test]
    fn test_partial_json_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "recent_file": "peers.txt", "capacities": { "recent": 8 } }"#)
            .unwrap();

        let config = ListConfig::from_file(&path).unwrap();
        assert_eq!(config.recent_file, "peers.txt");
        assert_eq!(config.trusted_file, "trusted.lst");
        assert_eq!(config.capacities.recent, 8);
        assert_eq!(config.capacities.trusted, 32);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            ListConfig::from_file(&path),
            Err(ListError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "capacities": { "epoch_pink": 0 } }"#).unwrap();

        assert!(matches!(
            ListConfig::from_file(&path),
            Err(ListError::InvalidConfig { .. })
        ));
    }
}
