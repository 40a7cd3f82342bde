//! YAML run configuration: the output catalog key and the load order.
//!
//! ```yaml
//! output: Patch.esp
//! load_order:
//!   - key: Skyrim.esm
//!   - key: Update.esm
//!   - key: Unofficial Patch.esp
//!     enabled: false
//! ```
//!
//! Saves use the same `.tmp` + rename pattern everywhere: the target file is
//! never observed half-written.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, StoreError};
use crate::types::ProviderKey;

/// One configured load order entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub key: ProviderKey,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Root of the patchwork YAML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchworkConfig {
    /// Catalog that receives every override.
    pub output: ProviderKey,
    #[serde(default)]
    pub load_order: Vec<ListingEntry>,
}

/// Load a configuration file.
///
/// Returns `StoreError::ConfigNotFound` if absent,
/// `StoreError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<PatchworkConfig, StoreError> {
    if !path.exists() {
        return Err(StoreError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Atomically save a configuration file: serialize → `.yaml.tmp` sibling → `rename`.
pub fn save_at(path: &Path, config: &PatchworkConfig) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let yaml = serde_yaml::to_string(config)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}
