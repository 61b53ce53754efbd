//! Row models, and the manager functions reading and writing them.
//!
//! All functions take a [`Connection`],
//! so that they can run either on a plain connection or inside a transaction
//! (which dereferences to a connection).
use rusqlite::{params, Connection, OptionalExtension};
use sophia_api::quad::Gspo;
use sophia_api::term::SimpleTerm;

use crate::fields::{Identifier, ObjectValue};
use crate::ModelResult;

/// A context, i.e. a named graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamedGraph {
    pub id: i64,
    pub identifier: Identifier,
}

impl NamedGraph {
    pub fn get(conn: &Connection, identifier: &Identifier) -> ModelResult<Option<Self>> {
        let id = conn
            .query_row(
                "SELECT id FROM named_graph WHERE identifier = ?1",
                params![identifier.to_column()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.map(|id| NamedGraph {
            id,
            identifier: identifier.clone(),
        }))
    }

    pub fn get_or_create(conn: &Connection, identifier: &Identifier) -> ModelResult<Self> {
        let key = identifier.to_column();
        if conn.execute(
            "INSERT OR IGNORE INTO named_graph(identifier) VALUES (?1)",
            params![key],
        )? > 0
        {
            log::debug!("created context {key}");
        }
        let id = conn.query_row(
            "SELECT id FROM named_graph WHERE identifier = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(NamedGraph {
            id,
            identifier: identifier.clone(),
        })
    }

    /// All contexts, in creation order.
    pub fn all(conn: &Connection) -> ModelResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT id, identifier FROM named_graph ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(NamedGraph {
                id: row.get(0)?,
                identifier: Identifier::from_column(&row.get::<_, String>(1)?),
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Delete a context, together with all its statements.
    ///
    /// Return `false` if no such context existed.
    pub fn delete(conn: &Connection, identifier: &Identifier) -> ModelResult<bool> {
        let n = conn.execute(
            "DELETE FROM named_graph WHERE identifier = ?1",
            params![identifier.to_column()],
        )?;
        Ok(n > 0)
    }

    pub fn delete_all(conn: &Connection) -> ModelResult<usize> {
        Ok(conn.execute("DELETE FROM named_graph", [])?)
    }

    /// Number of statements in this context.
    pub fn triple_count(&self, conn: &Connection) -> ModelResult<usize> {
        let mut n = 0;
        for table in ["uri_statement", "literal_statement"] {
            let c: i64 = conn.query_row(
                &format!(
                    "SELECT COUNT(*) FROM {table} s JOIN resource r ON r.id = s.subject_id \
                     WHERE r.context_id = ?1"
                ),
                params![self.id],
                |row| row.get(0),
            )?;
            n += c as usize;
        }
        Ok(n)
    }
}

/// The subject part of a triple, scoped by its context.
///
/// `context_id` is `None` for the default graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resource {
    pub id: i64,
    pub identifier: Identifier,
    pub context_id: Option<i64>,
}

impl Resource {
    pub fn get(
        conn: &Connection,
        identifier: &Identifier,
        context_id: Option<i64>,
    ) -> ModelResult<Option<Self>> {
        // NULL never compares equal with `=`, hence `IS`
        let id = conn
            .query_row(
                "SELECT id FROM resource WHERE identifier = ?1 AND context_id IS ?2",
                params![identifier.to_column(), context_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.map(|id| Resource {
            id,
            identifier: identifier.clone(),
            context_id,
        }))
    }

    pub fn get_or_create(
        conn: &Connection,
        identifier: &Identifier,
        context_id: Option<i64>,
    ) -> ModelResult<Self> {
        if let Some(resource) = Self::get(conn, identifier, context_id)? {
            return Ok(resource);
        }
        conn.execute(
            "INSERT INTO resource(identifier, context_id) VALUES (?1, ?2)",
            params![identifier.to_column(), context_id],
        )?;
        Ok(Resource {
            id: conn.last_insert_rowid(),
            identifier: identifier.clone(),
            context_id,
        })
    }

    pub fn delete_all(conn: &Connection) -> ModelResult<usize> {
        Ok(conn.execute("DELETE FROM resource", [])?)
    }
}

/// The two statement tables.
///
/// Which one holds a given statement depends on the kind of its object.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatementTable {
    /// Statements whose object is an IRI or a blank node.
    Uri,
    /// Statements whose object is a literal.
    Literal,
}

impl StatementTable {
    pub const ALL: &'static [StatementTable] = &[StatementTable::Uri, StatementTable::Literal];

    /// The tables to look into for the given object;
    /// both of them if the object is unknown.
    pub fn for_object(object: Option<&ObjectValue>) -> &'static [StatementTable] {
        match object {
            None => Self::ALL,
            Some(ObjectValue::Resource(_)) => &[StatementTable::Uri],
            Some(ObjectValue::Literal(_)) => &[StatementTable::Literal],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StatementTable::Uri => "uri_statement",
            StatementTable::Literal => "literal_statement",
        }
    }

    /// Insert a statement unless it already exists.
    ///
    /// Return `true` iff a row was actually created.
    pub fn get_or_create(
        conn: &Connection,
        subject: &Resource,
        predicate: &Identifier,
        object: &ObjectValue,
    ) -> ModelResult<bool> {
        let n = match object {
            ObjectValue::Resource(o) => conn.execute(
                "INSERT OR IGNORE INTO uri_statement(subject_id, predicate, object) \
                 VALUES (?1, ?2, ?3)",
                params![subject.id, predicate.to_column(), o.to_column()],
            )?,
            ObjectValue::Literal(lit) => conn.execute(
                "INSERT OR IGNORE INTO literal_statement(subject_id, predicate, lexical, datatype, language) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    subject.id,
                    predicate.to_column(),
                    &lit.lexical[..],
                    &lit.datatype[..],
                    lit.language_column()
                ],
            )?,
        };
        Ok(n > 0)
    }
}

/// A statement read back from either statement table.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StatementRow {
    pub subject: Identifier,
    pub predicate: Identifier,
    pub object: ObjectValue,
    /// `None` for the default graph.
    pub context: Option<Identifier>,
}

impl StatementRow {
    pub fn to_quad(&self) -> Gspo<SimpleTerm<'static>> {
        (
            self.context.as_ref().map(Identifier::to_term),
            [
                self.subject.to_term(),
                self.predicate.to_term(),
                self.object.to_term(),
            ],
        )
    }

    pub fn to_triple(&self) -> [SimpleTerm<'static>; 3] {
        self.to_quad().1
    }
}

/// A namespace binding.
///
/// Fixed namespaces (`xml`, `rdf`, `rdfs`) can not be rebound.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamespaceRecord {
    pub prefix: String,
    pub uri: String,
    pub fixed: bool,
}

impl NamespaceRecord {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(NamespaceRecord {
            prefix: row.get(0)?,
            uri: row.get(1)?,
            fixed: row.get(2)?,
        })
    }

    /// All namespaces, fixed ones first.
    pub fn all(conn: &Connection) -> ModelResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT prefix, uri, fixed FROM namespace ORDER BY fixed DESC, id")?;
        let rows = stmt.query_map([], Self::from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn by_prefix(conn: &Connection, prefix: &str) -> ModelResult<Option<Self>> {
        Ok(conn
            .query_row(
                "SELECT prefix, uri, fixed FROM namespace WHERE prefix = ?1",
                params![prefix],
                Self::from_row,
            )
            .optional()?)
    }

    pub fn by_uri(conn: &Connection, uri: &str) -> ModelResult<Option<Self>> {
        Ok(conn
            .query_row(
                "SELECT prefix, uri, fixed FROM namespace WHERE uri = ?1",
                params![uri],
                Self::from_row,
            )
            .optional()?)
    }

    /// Insert a (non-fixed) binding.
    ///
    /// Fails if the prefix or the URI is already bound.
    pub fn insert(conn: &Connection, prefix: &str, uri: &str) -> ModelResult<()> {
        conn.execute(
            "INSERT INTO namespace(prefix, uri, fixed) VALUES (?1, ?2, 0)",
            params![prefix, uri],
        )?;
        Ok(())
    }

    pub fn delete_prefix(conn: &Connection, prefix: &str) -> ModelResult<usize> {
        Ok(conn.execute(
            "DELETE FROM namespace WHERE prefix = ?1 AND fixed = 0",
            params![prefix],
        )?)
    }

    pub fn delete_uri(conn: &Connection, uri: &str) -> ModelResult<usize> {
        Ok(conn.execute(
            "DELETE FROM namespace WHERE uri = ?1 AND fixed = 0",
            params![uri],
        )?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fields::LiteralValue;
    use crate::schema::migrate;
    use std::error::Error;

    fn conn() -> Result<Connection, Box<dyn Error>> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(conn)
    }

    fn iri(txt: &str) -> Identifier {
        Identifier::Iri(txt.into())
    }

    #[test]
    fn named_graph_get_or_create() -> Result<(), Box<dyn Error>> {
        let conn = conn()?;
        let g = iri("http://example.org/g");
        assert_eq!(NamedGraph::get(&conn, &g)?, None);
        let g1 = NamedGraph::get_or_create(&conn, &g)?;
        let g2 = NamedGraph::get_or_create(&conn, &g)?;
        assert_eq!(g1, g2);
        assert_eq!(NamedGraph::all(&conn)?, vec![g1]);
        assert!(NamedGraph::delete(&conn, &g)?);
        assert!(!NamedGraph::delete(&conn, &g)?);
        Ok(())
    }

    #[test]
    fn resource_in_default_graph_is_unique() -> Result<(), Box<dyn Error>> {
        let conn = conn()?;
        let s = iri("http://zoowizard.eu/resource/Artis");
        let r1 = Resource::get_or_create(&conn, &s, None)?;
        let r2 = Resource::get_or_create(&conn, &s, None)?;
        assert_eq!(r1.id, r2.id);

        let g = NamedGraph::get_or_create(&conn, &iri("http://example.org/g"))?;
        let r3 = Resource::get_or_create(&conn, &s, Some(g.id))?;
        assert_ne!(r1.id, r3.id);
        Ok(())
    }

    #[test]
    fn statement_get_or_create() -> Result<(), Box<dyn Error>> {
        let conn = conn()?;
        let s = Resource::get_or_create(&conn, &iri("http://example.org/s"), None)?;
        let p = iri("http://example.org/p");
        let o = ObjectValue::Resource(iri("http://example.org/o"));
        let lit = ObjectValue::Literal(LiteralValue::from_columns(
            "x".into(),
            crate::fields::XSD_STRING.into(),
            String::new(),
        ));
        assert!(StatementTable::get_or_create(&conn, &s, &p, &o)?);
        assert!(!StatementTable::get_or_create(&conn, &s, &p, &o)?);
        assert!(StatementTable::get_or_create(&conn, &s, &p, &lit)?);
        assert!(!StatementTable::get_or_create(&conn, &s, &p, &lit)?);
        Ok(())
    }

    #[test]
    fn deleting_context_cascades() -> Result<(), Box<dyn Error>> {
        let conn = conn()?;
        let g = NamedGraph::get_or_create(&conn, &iri("http://example.org/g"))?;
        let s = Resource::get_or_create(&conn, &iri("http://example.org/s"), Some(g.id))?;
        let p = iri("http://example.org/p");
        let o = ObjectValue::Resource(iri("http://example.org/o"));
        StatementTable::get_or_create(&conn, &s, &p, &o)?;
        assert_eq!(g.triple_count(&conn)?, 1);

        NamedGraph::delete(&conn, &g.identifier)?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM uri_statement", [], |r| r.get(0))?;
        assert_eq!(n, 0);
        Ok(())
    }

    #[test]
    fn namespaces() -> Result<(), Box<dyn Error>> {
        let conn = conn()?;
        assert_eq!(NamespaceRecord::all(&conn)?.len(), 3);
        NamespaceRecord::insert(&conn, "ex", "http://example.org/")?;
        assert!(NamespaceRecord::insert(&conn, "ex", "http://example.com/").is_err());
        let ns = NamespaceRecord::by_uri(&conn, "http://example.org/")?.unwrap();
        assert_eq!(ns.prefix, "ex");
        assert!(!ns.fixed);
        assert!(NamespaceRecord::by_prefix(&conn, "rdf")?.unwrap().fixed);

        // fixed namespaces survive deletion attempts
        assert_eq!(NamespaceRecord::delete_prefix(&conn, "rdf")?, 0);
        assert_eq!(NamespaceRecord::delete_uri(&conn, "http://example.org/")?, 1);
        Ok(())
    }
}
