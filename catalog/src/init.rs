//! Catalog initialization - creates directory structure and database.

use std::fs;

use crate::{Config, Error, Result};

/// Initialize a new catalog.
///
/// Creates the directory structure, the DuckDB database with the `songs`
/// table, and writes the config file.
pub fn initialize(config: &Config) -> Result<()> {
    if config.db_path().exists() {
        return Err(Error::AlreadyInitialized(config.root.clone()));
    }

    fs::create_dir_all(config.db_dir())?;
    init_database(config)?;
    config.save()?;

    Ok(())
}

fn init_database(config: &Config) -> Result<()> {
    let conn = duckdb::Connection::open(config.db_path())?;
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id UUID PRIMARY KEY,
            title VARCHAR NOT NULL,
            album VARCHAR NOT NULL,
            artist VARCHAR NOT NULL,
            track BIGINT NOT NULL DEFAULT 0,
            time BIGINT NOT NULL DEFAULT 0,
            play_count BIGINT NOT NULL DEFAULT 0,
            date_added TIMESTAMP NOT NULL,
            last_queued TIMESTAMP,
            visible BOOLEAN NOT NULL DEFAULT true
        );
        "#,
    )?;
    Ok(())
}

/// Check if a catalog is initialized at the given location.
pub fn is_initialized(config: &Config) -> bool {
    config.db_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_structure() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());

        initialize(&config).unwrap();

        assert!(config.db_path().exists());
        assert!(config.root.join("config.toml").exists());
    }

    #[test]
    fn test_initialize_twice_fails() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());

        initialize(&config).unwrap();

        let result = initialize(&config);
        assert!(matches!(result, Err(Error::AlreadyInitialized(_))));
    }

    #[test]
    fn test_is_initialized() {
        let tmp = TempDir::new().unwrap();
        let config = Config::with_root(tmp.path());

        assert!(!is_initialized(&config));
        initialize(&config).unwrap();
        assert!(is_initialized(&config));
    }
}
