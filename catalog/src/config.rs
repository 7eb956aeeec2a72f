//! Configuration for the catalog.
//!
//! JUKEBOX_ROOT resolution order:
//! 1. Explicit path passed to Config::with_root()
//! 2. JUKEBOX_ROOT environment variable
//! 3. Platform data directory (via ProjectDirs)
//! 4. Fallback: ~/.local/share/jukebox

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for all catalog data.
    pub root: PathBuf,

    /// Root address of the filter namespace.
    #[serde(default = "default_filter_prefix")]
    pub filter_prefix: String,

    /// Cap on the number of songs printed per search (None = unlimited).
    #[serde(default)]
    pub result_limit: Option<usize>,
}

fn default_filter_prefix() -> String {
    "k".to_string()
}

impl Config {
    /// Create a new config with the given root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter_prefix: default_filter_prefix(),
            result_limit: None,
        }
    }

    /// Load config from JUKEBOX_ROOT/config.toml, or create default.
    pub fn load() -> Result<Self> {
        let root = resolve_root()?;
        Self::load_from(&root)
    }

    /// Load config from a specific root.
    pub fn load_from(root: &Path) -> Result<Self> {
        let config_path = root.join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
            // Ensure root matches the actual location
            config.root = root.to_path_buf();
            Ok(config)
        } else {
            Ok(Self::with_root(root))
        }
    }

    /// Save config to JUKEBOX_ROOT/config.toml.
    pub fn save(&self) -> Result<()> {
        let config_path = self.root.join("config.toml");
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(config_path, contents)?;
        Ok(())
    }

    /// Path to the DuckDB database file.
    pub fn db_path(&self) -> PathBuf {
        self.root.join("db/catalog.duckdb")
    }

    /// Path to the database directory.
    pub fn db_dir(&self) -> PathBuf {
        self.root.join("db")
    }
}

/// Resolve JUKEBOX_ROOT using the standard resolution order.
fn resolve_root() -> Result<PathBuf> {
    // 1. Environment variable
    if let Ok(path) = std::env::var("JUKEBOX_ROOT") {
        return Ok(PathBuf::from(path));
    }

    // 2. XDG data directory (via directories crate)
    if let Some(proj_dirs) = ProjectDirs::from("", "", "jukebox") {
        return Ok(proj_dirs.data_dir().to_path_buf());
    }

    // 3. Fallback to ~/.local/share/jukebox
    let home = std::env::var("HOME")
        .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;
    Ok(PathBuf::from(home).join(".local/share/jukebox"))
}
