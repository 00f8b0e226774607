//! Store and runtime configuration.

use std::path::{Path, PathBuf};

/// Storage slot holding the serialized board.
pub const DEFAULT_STORAGE_KEY: &str = "mytrello_board_state";
/// Database file name used when no path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "kanban_board.sqlite3";
/// Environment variable overriding the board database path.
pub const DB_PATH_ENV: &str = "KANBAN_DB_PATH";

/// Board store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Slot key the board snapshot is persisted under.
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn with_storage_key(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
        }
    }
}

/// Resolves the board database path.
///
/// Precedence: explicit path, then `KANBAN_DB_PATH` (when non-blank), then a
/// file in the system temp directory.
pub fn resolve_db_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{resolve_db_path, StoreConfig, DEFAULT_STORAGE_KEY};
    use std::path::Path;

    #[test]
    fn default_config_uses_canonical_key() {
        assert_eq!(StoreConfig::default().storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn explicit_path_wins() {
        let path = Path::new("/var/lib/kanban/board.sqlite3");
        assert_eq!(resolve_db_path(Some(path)), path);
    }
}
