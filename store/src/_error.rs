use relrdf_model::ModelError;
use thiserror::Error;

/// Error type produced by [`RelationalStore`](crate::RelationalStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object layer reported an error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The store was opened with an identifier other than [`DEFAULT_STORE`](crate::DEFAULT_STORE).
    #[error("multiple stores are not allowed (requested {0:?})")]
    MultipleStores(String),

    /// A namespace prefix is not a valid Turtle prefix.
    #[error("invalid namespace prefix {0:?}")]
    InvalidPrefix(String),

    /// A namespace IRI is not a valid absolute IRI.
    #[error("invalid namespace IRI {0:?}")]
    InvalidNamespace(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Model(ModelError::Database(value))
    }
}

/// Type alias for results produced by [`RelationalStore`](crate::RelationalStore).
pub type StoreResult<T> = Result<T, StoreError>;
