//! Statement query sets.
//!
//! A [`StatementFilter`] holds the optional constraints of a lookup
//! (context, subject, predicate, object),
//! and translates them into SQL over one or both [statement tables](StatementTable).
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::fields::{Identifier, LiteralValue, ObjectValue};
use crate::models::{StatementRow, StatementTable};
use crate::ModelResult;

/// Which contexts a [`StatementFilter`] looks into.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextFilter {
    /// All contexts, including the default graph.
    #[default]
    Any,
    /// Only the default graph.
    DefaultGraph,
    /// Only the given named graph.
    Named(Identifier),
}

/// A set of constraints on statements.
///
/// Unset constraints match anything.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StatementFilter {
    pub context: ContextFilter,
    pub subject: Option<Identifier>,
    pub predicate: Option<Identifier>,
    pub object: Option<ObjectValue>,
}

impl StatementFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter matching exactly the given statement.
    pub fn exact(row: &StatementRow) -> Self {
        StatementFilter {
            context: match &row.context {
                None => ContextFilter::DefaultGraph,
                Some(g) => ContextFilter::Named(g.clone()),
            },
            subject: Some(row.subject.clone()),
            predicate: Some(row.predicate.clone()),
            object: Some(row.object.clone()),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: ContextFilter) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: Identifier) -> Self {
        self.subject = Some(subject);
        self
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: Identifier) -> Self {
        self.predicate = Some(predicate);
        self
    }

    #[must_use]
    pub fn with_object(mut self, object: ObjectValue) -> Self {
        self.object = Some(object);
        self
    }

    /// The statement tables this filter needs to look into.
    pub fn tables(&self) -> &'static [StatementTable] {
        StatementTable::for_object(self.object.as_ref())
    }

    /// All statements matching this filter.
    pub fn select(&self, conn: &Connection) -> ModelResult<Vec<StatementRow>> {
        let mut rows = Vec::new();
        for table in self.tables() {
            let (conditions, values) = self.conditions(*table);
            let sql = format!(
                "SELECT r.identifier, s.predicate, {}, g.identifier {} {}",
                object_columns(*table),
                joined(*table),
                conditions
            );
            log::trace!("{sql}");
            let mut stmt = conn.prepare(&sql)?;
            let found = stmt.query_map(params_from_iter(values.iter()), |row| {
                let subject = Identifier::from_column(&row.get::<_, String>(0)?);
                let predicate = Identifier::from_column(&row.get::<_, String>(1)?);
                let (object, gi) = match table {
                    StatementTable::Uri => (
                        ObjectValue::Resource(Identifier::from_column(&row.get::<_, String>(2)?)),
                        3,
                    ),
                    StatementTable::Literal => (
                        ObjectValue::Literal(LiteralValue::from_columns(
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                        )),
                        5,
                    ),
                };
                let context = row
                    .get::<_, Option<String>>(gi)?
                    .map(|g| Identifier::from_column(&g));
                Ok(StatementRow {
                    subject,
                    predicate,
                    object,
                    context,
                })
            })?;
            for row in found {
                rows.push(row?);
            }
        }
        Ok(rows)
    }

    /// Delete all statements matching this filter.
    ///
    /// Subjects and contexts are kept, even if they end up with no statement.
    /// Return the number of deleted statements.
    pub fn delete(&self, conn: &Connection) -> ModelResult<usize> {
        let mut n = 0;
        for table in self.tables() {
            let (conditions, values) = self.conditions(*table);
            let sql = format!(
                "DELETE FROM {0} WHERE id IN (SELECT s.id {1} {2})",
                table.name(),
                joined(*table),
                conditions
            );
            log::trace!("{sql}");
            n += conn.execute(&sql, params_from_iter(values.iter()))?;
        }
        Ok(n)
    }

    /// Number of statements matching this filter.
    pub fn count(&self, conn: &Connection) -> ModelResult<usize> {
        let mut n = 0;
        for table in self.tables() {
            let (conditions, values) = self.conditions(*table);
            let sql = format!("SELECT COUNT(*) {} {}", joined(*table), conditions);
            log::trace!("{sql}");
            let c: i64 =
                conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
            n += c as usize;
        }
        Ok(n)
    }

    /// Number of distinct triples matching this filter,
    /// a triple asserted in several contexts being counted once.
    pub fn count_distinct(&self, conn: &Connection) -> ModelResult<usize> {
        let mut n = 0;
        for table in self.tables() {
            let (conditions, values) = self.conditions(*table);
            let sql = format!(
                "SELECT COUNT(*) FROM (SELECT DISTINCT r.identifier, s.predicate, {} {} {})",
                object_columns(*table),
                joined(*table),
                conditions
            );
            log::trace!("{sql}");
            let c: i64 =
                conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
            n += c as usize;
        }
        Ok(n)
    }

    fn conditions(&self, table: StatementTable) -> (String, Vec<Value>) {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values = Vec::new();
        match &self.context {
            ContextFilter::Any => {}
            ContextFilter::DefaultGraph => clauses.push("r.context_id IS NULL"),
            ContextFilter::Named(g) => {
                clauses.push("g.identifier = ?");
                values.push(Value::Text(g.to_column()));
            }
        }
        if let Some(s) = &self.subject {
            clauses.push("r.identifier = ?");
            values.push(Value::Text(s.to_column()));
        }
        if let Some(p) = &self.predicate {
            clauses.push("s.predicate = ?");
            values.push(Value::Text(p.to_column()));
        }
        match (&self.object, table) {
            (Some(ObjectValue::Resource(o)), StatementTable::Uri) => {
                clauses.push("s.object = ?");
                values.push(Value::Text(o.to_column()));
            }
            (Some(ObjectValue::Literal(lit)), StatementTable::Literal) => {
                clauses.push("s.lexical = ? AND s.datatype = ? AND s.language = ?");
                values.push(Value::Text(lit.lexical.to_string()));
                values.push(Value::Text(lit.datatype.to_string()));
                values.push(Value::Text(lit.language_column().to_string()));
            }
            _ => {}
        }
        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

fn object_columns(table: StatementTable) -> &'static str {
    match table {
        StatementTable::Uri => "s.object",
        StatementTable::Literal => "s.lexical, s.datatype, s.language",
    }
}

fn joined(table: StatementTable) -> String {
    format!(
        "FROM {} s JOIN resource r ON r.id = s.subject_id \
         LEFT JOIN named_graph g ON g.id = r.context_id",
        table.name()
    )
}
