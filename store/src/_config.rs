use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use crate::{RelationalStore, StoreError, StoreResult, DEFAULT_STORE};

/// Where the database of a [`RelationalStore`] lives.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Location {
    /// A private in-memory database, lost when the store is dropped.
    #[default]
    Memory,
    /// A database file, created if needed.
    File(PathBuf),
}

/// Holds the configuration options for opening a [`RelationalStore`].
#[derive(Clone, Debug)]
pub struct StoreConfig {
    location: Location,
    identifier: String,
    wal: bool,
    busy_timeout: Duration,
}

impl StoreConfig {
    /// Where the database lives
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The identifier of the store
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Whether a database file uses write-ahead logging
    pub fn wal(&self) -> bool {
        self.wal
    }

    /// How long to wait for a locked database
    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }

    /// Build a new default [`StoreConfig`]:
    /// an in-memory database for the default store.
    pub fn new() -> Self {
        StoreConfig {
            location: Location::Memory,
            identifier: DEFAULT_STORE.to_string(),
            wal: false,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Transform a [`StoreConfig`] by using a database file.
    #[must_use]
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.location = Location::File(path.as_ref().to_path_buf());
        self
    }

    /// Transform a [`StoreConfig`] by using a private in-memory database.
    #[must_use]
    pub fn with_memory(mut self) -> Self {
        self.location = Location::Memory;
        self
    }

    /// Transform a [`StoreConfig`] by changing the store identifier.
    ///
    /// NB: only [`DEFAULT_STORE`] can actually be opened.
    #[must_use]
    pub fn with_identifier<T: ToString>(mut self, identifier: T) -> Self {
        self.identifier = identifier.to_string();
        self
    }

    /// Transform a [`StoreConfig`] by enabling or disabling write-ahead logging.
    #[must_use]
    pub fn with_wal(mut self, wal: bool) -> Self {
        self.wal = wal;
        self
    }

    /// Transform a [`StoreConfig`] by changing the busy timeout.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Open the store described by this configuration,
    /// creating and migrating its schema if needed.
    pub fn open(&self) -> StoreResult<RelationalStore> {
        if self.identifier != DEFAULT_STORE {
            return Err(StoreError::MultipleStores(self.identifier.clone()));
        }
        let conn = match &self.location {
            Location::Memory => Connection::open_in_memory()?,
            Location::File(path) => {
                log::debug!("opening database {}", path.display());
                let conn = Connection::open(path)?;
                if self.wal {
                    let mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                    log::debug!("journal mode: {mode}");
                }
                conn
            }
        };
        conn.busy_timeout(self.busy_timeout)?;
        RelationalStore::from_connection(conn)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
