//! The relational schema, and its migration.
use rusqlite::{params, Connection, OptionalExtension};

use crate::{ModelError, ModelResult};

/// Version label written in the `meta` table.
pub const SCHEMA_VERSION: &str = "1";

/// Namespaces that are always bound, and can not be rebound.
pub const FIXED_NAMESPACES: [(&str, &str); 3] = [
    ("xml", "http://www.w3.org/XML/1998/namespace"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
];

const TABLES: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS meta (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS named_graph (
      id INTEGER PRIMARY KEY,
      identifier TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS resource (
      id INTEGER PRIMARY KEY,
      identifier TEXT NOT NULL,
      context_id INTEGER REFERENCES named_graph(id) ON DELETE CASCADE,
      UNIQUE (identifier, context_id)
    );

    CREATE TABLE IF NOT EXISTS uri_statement (
      id INTEGER PRIMARY KEY,
      subject_id INTEGER NOT NULL REFERENCES resource(id) ON DELETE CASCADE,
      predicate TEXT NOT NULL,
      object TEXT NOT NULL,
      UNIQUE (subject_id, predicate, object)
    );

    CREATE TABLE IF NOT EXISTS literal_statement (
      id INTEGER PRIMARY KEY,
      subject_id INTEGER NOT NULL REFERENCES resource(id) ON DELETE CASCADE,
      predicate TEXT NOT NULL,
      lexical TEXT NOT NULL,
      datatype TEXT NOT NULL,
      language TEXT NOT NULL DEFAULT '',
      UNIQUE (subject_id, predicate, lexical, datatype, language)
    );

    CREATE TABLE IF NOT EXISTS namespace (
      id INTEGER PRIMARY KEY,
      prefix TEXT NOT NULL UNIQUE,
      uri TEXT NOT NULL UNIQUE,
      fixed INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_resource_identifier ON resource(identifier);
    CREATE INDEX IF NOT EXISTS idx_uri_statement_predicate ON uri_statement(predicate);
    CREATE INDEX IF NOT EXISTS idx_uri_statement_object ON uri_statement(object);
    CREATE INDEX IF NOT EXISTS idx_literal_statement_predicate ON literal_statement(predicate);
    CREATE INDEX IF NOT EXISTS idx_literal_statement_lexical ON literal_statement(lexical);
"#;

/// Create the tables if needed, check the schema version,
/// and make sure that the [fixed namespaces](FIXED_NAMESPACES) are present.
///
/// Migrating an up-to-date database is a no-op.
pub fn migrate(conn: &Connection) -> ModelResult<()> {
    conn.execute_batch(TABLES)?;
    let found: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    match found {
        None => {
            log::debug!("initializing schema version {SCHEMA_VERSION}");
            conn.execute(
                "INSERT INTO meta(key, value) VALUES ('schema_version', ?1)",
                params![SCHEMA_VERSION],
            )?;
        }
        Some(v) if v == SCHEMA_VERSION => {}
        Some(found) => {
            return Err(ModelError::SchemaVersion {
                found,
                expected: SCHEMA_VERSION,
            })
        }
    }
    for (prefix, uri) in FIXED_NAMESPACES {
        conn.execute(
            "INSERT OR IGNORE INTO namespace(prefix, uri, fixed) VALUES (?1, ?2, 1)",
            params![prefix, uri],
        )?;
    }
    Ok(())
}
