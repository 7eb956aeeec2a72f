//! Store - handles writing and reading songs.
//!
//! Uses a single DuckDB database with one `songs` table.

mod songs;

use duckdb::Connection;

use crate::{Config, Error, Result};

/// A catalog store for reading and writing songs.
pub struct Store {
    config: Config,
}

impl Store {
    /// Open an existing catalog store.
    pub fn open(config: Config) -> Result<Self> {
        if !config.db_path().exists() {
            return Err(Error::NotInitialized(config.root.clone()));
        }
        Ok(Self { config })
    }

    /// Get a DuckDB connection to the store.
    pub fn connection(&self) -> Result<Connection> {
        Ok(Connection::open(self.config.db_path())?)
    }

    /// Get config reference.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
