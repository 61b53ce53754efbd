use sophia_api::term::TermKind;
use thiserror::Error;

/// The position a term takes in a quad.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Position {
    Subject,
    Predicate,
    Object,
    GraphName,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let txt = match self {
            Position::Subject => "subject",
            Position::Predicate => "predicate",
            Position::Object => "object",
            Position::GraphName => "graph name",
        };
        f.write_str(txt)
    }
}

/// Error type produced by the object layer.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The relational engine reported an error.
    #[error("database error: {0}")]
    Database(
        #[source]
        #[from]
        rusqlite::Error,
    ),

    /// A term of this kind has no column representation in this position.
    #[error("{kind:?} term can not be stored as {position}")]
    UnsupportedTerm { kind: TermKind, position: Position },

    /// The database was created by an incompatible version of the schema.
    #[error("unsupported schema version {found:?} (expected {expected:?})")]
    SchemaVersion {
        found: String,
        expected: &'static str,
    },
}

/// Type alias for results produced by the object layer.
pub type ModelResult<T> = Result<T, ModelError>;
