/*!
 * Common test utilities for the platecheck test suite
 */

use anyhow::Result;
use std::path::Path;
use tempfile::TempDir;

use platecheck::Config;
use platecheck::app_config::StorageConfig;

pub mod canned_server;

/// Route library logs through the test harness; safe to call repeatedly
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Default configuration with the database placed in the given directory
pub fn config_in(dir: &Path) -> Config {
    Config {
        storage: StorageConfig {
            database_path: Some(dir.join("platecheck.db")),
        },
        ..Config::default()
    }
}
