use std::iter::{empty, once};

use relrdf_model::fields::{Identifier, ObjectValue};
use relrdf_model::models::{NamedGraph, NamespaceRecord, Resource, StatementRow, StatementTable};
use relrdf_model::query::{ContextFilter, StatementFilter};
use relrdf_model::schema::{migrate, FIXED_NAMESPACES};
use relrdf_model::{ModelResult, Position};
use rusqlite::Connection;
use sophia_api::dataset::{
    CollectibleDataset, DQuadSource, Dataset, MdResult, MutableDataset, SetDataset,
};
use sophia_api::prefix::{Prefix, PrefixMapPair};
use sophia_api::quad::{Gspo, Quad};
use sophia_api::source::{QuadSource, StreamError, StreamResult, TripleSource};
use sophia_api::term::matcher::{GraphNameMatcher, TermMatcher};
use sophia_api::term::{GraphName, SimpleTerm, Term};
use sophia_api::triple::Triple;
use sophia_iri::Iri;

use crate::{BnodeScope, StoreConfig, StoreError, StoreResult};

/// The only store identifier that can be opened.
pub const DEFAULT_STORE: &str = "Default Store";

pub(crate) type StoredQuad = Gspo<SimpleTerm<'static>>;

/// A [`Dataset`] persisted in a relational database.
///
/// Quads are stored through the object layer of [`relrdf_model`]:
/// each named graph is a context row,
/// each subject a resource row scoped by its context,
/// and each triple a row in the URI or literal statement table,
/// depending on the kind of its object.
///
/// A quad is present in the dataset iff the corresponding rows are present in the database.
/// [`RelationalStore`] is a [`SetDataset`]: inserting a quad twice has no effect.
#[derive(Debug)]
pub struct RelationalStore {
    conn: Connection,
}

impl RelationalStore {
    /// Named graphs are supported.
    pub const CONTEXT_AWARE: bool = true;
    /// Formulae (quoted graphs) are not supported.
    pub const FORMULA_AWARE: bool = false;
    /// Transactions are delegated to the database, see [`RelationalStore::in_transaction`].
    pub const TRANSACTION_AWARE: bool = false;

    /// Open an in-memory store.
    ///
    /// See [`StoreConfig`] for other options.
    pub fn new() -> StoreResult<Self> {
        StoreConfig::new().open()
    }

    /// Wrap an open connection, migrating its schema if needed.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        migrate(&conn)?;
        Ok(RelationalStore { conn })
    }

    /// The underlying database connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the store, releasing its connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Run `f` inside a single database transaction,
    /// committed if `f` succeeds, and rolled back otherwise.
    ///
    /// If a transaction is already running, `f` simply joins it.
    pub fn in_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<StoreError>,
    {
        if !self.conn.is_autocommit() {
            return f(self);
        }
        self.conn.execute_batch("BEGIN").map_err(StoreError::from)?;
        match f(self) {
            Ok(value) => match self.conn.execute_batch("COMMIT") {
                Ok(()) => Ok(value),
                Err(err) => {
                    // a failed COMMIT leaves the transaction open
                    self.rollback();
                    Err(StoreError::from(err).into())
                }
            },
            Err(err) => {
                self.rollback();
                Err(err)
            }
        }
    }

    fn rollback(&self) {
        if self.conn.is_autocommit() {
            return;
        }
        if let Err(err) = self.conn.execute_batch("ROLLBACK") {
            log::warn!("could not roll back transaction: {err}");
        }
    }

    /// Insert all the quads of one document,
    /// returning the number of quads that were not already present.
    ///
    /// Unlike [`MutableDataset::insert_all`],
    /// the blank nodes of `quads` are relabelled in a fresh [`BnodeScope`],
    /// so they never merge with blank nodes already in the store.
    pub fn load_quads<QS: QuadSource>(
        &mut self,
        mut quads: QS,
    ) -> StreamResult<usize, QS::Error, StoreError> {
        let scope = BnodeScope::new();
        let mut count = 0;
        quads.try_for_each_quad(|q| -> StoreResult<()> {
            let ([s, p, o], g) = q.to_spog();
            let g = g.map(|g| scope.term(g));
            if self.insert(scope.term(s), p, scope.term(o), g)? {
                count += 1;
            }
            Ok(())
        })?;
        log::debug!("loaded {count} quads with blank node prefix {}", scope.prefix());
        Ok(count)
    }

    /// Insert all the triples of one document into `context`,
    /// returning the number of triples that were not already present.
    ///
    /// The blank nodes of `triples` are relabelled as in [`RelationalStore::load_quads`];
    /// `context` itself is kept as is.
    pub fn load_triples<TS, T>(
        &mut self,
        mut triples: TS,
        context: GraphName<T>,
    ) -> StreamResult<usize, TS::Error, StoreError>
    where
        TS: TripleSource,
        T: Term,
    {
        let scope = BnodeScope::new();
        let context: GraphName<SimpleTerm<'static>> = context.map(|g| g.into_term());
        let mut count = 0;
        triples.try_for_each_triple(|t| -> StoreResult<()> {
            let [s, p, o] = t.to_spo();
            let g = context.as_ref().map(|g| g.borrow_term());
            if self.insert(scope.term(s), p, scope.term(o), g)? {
                count += 1;
            }
            Ok(())
        })?;
        log::debug!("loaded {count} triples with blank node prefix {}", scope.prefix());
        Ok(count)
    }

    /// The names of all registered contexts, in creation order,
    /// including those that are currently empty.
    pub fn contexts(&self) -> StoreResult<Vec<SimpleTerm<'static>>> {
        Ok(NamedGraph::all(&self.conn)?
            .iter()
            .map(|g| g.identifier.to_term())
            .collect())
    }

    /// Register a context, even if it contains no triple.
    ///
    /// Return `false` if it was already registered.
    pub fn add_context<T: Term>(&mut self, context: T) -> StoreResult<bool> {
        let id = Identifier::from_term(context, Position::GraphName)?;
        let existed = NamedGraph::get(&self.conn, &id)?.is_some();
        NamedGraph::get_or_create(&self.conn, &id)?;
        Ok(!existed)
    }

    /// Delete a context and all the triples it contains.
    ///
    /// Return `false` if no such context was registered.
    pub fn remove_context<T: Term>(&mut self, context: T) -> StoreResult<bool> {
        let id = Identifier::from_term(context, Position::GraphName)?;
        let removed = NamedGraph::delete(&self.conn, &id)?;
        if removed {
            log::info!("removed context {}", id.to_column());
        }
        Ok(removed)
    }

    /// Number of triples in the given context,
    /// or number of distinct triples across all contexts if `context` is `None`.
    pub fn len<T: Term>(&self, context: Option<T>) -> StoreResult<usize> {
        let Some(context) = context else {
            return Ok(StatementFilter::new().count_distinct(&self.conn)?);
        };
        let id = Identifier::from_term(context, Position::GraphName)?;
        match NamedGraph::get(&self.conn, &id)? {
            Some(g) => Ok(g.triple_count(&self.conn)?),
            None => Ok(0),
        }
    }

    /// Number of quads in the store.
    pub fn quad_count(&self) -> StoreResult<usize> {
        Ok(StatementFilter::new().count(&self.conn)?)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.quad_count()? == 0)
    }

    /// Delete all contexts and all triples.
    ///
    /// Namespace bindings are kept, and the store remains usable.
    pub fn destroy(&mut self) -> StoreResult<()> {
        self.in_transaction(|store| -> StoreResult<()> {
            let contexts = NamedGraph::delete_all(&store.conn)?;
            let resources = Resource::delete_all(&store.conn)?;
            log::info!("destroyed store ({contexts} contexts, {resources} remaining resources)");
            Ok(())
        })
    }

    /// Bind `prefix` to the namespace `uri`,
    /// replacing any binding of the same prefix or the same namespace.
    ///
    /// Binding the prefix or the namespace of a fixed namespace
    /// (`xml`, `rdf`, `rdfs`) is silently ignored.
    pub fn bind(&mut self, prefix: &str, uri: &str) -> StoreResult<()> {
        if FIXED_NAMESPACES
            .iter()
            .any(|(p, u)| *p == prefix || *u == uri)
        {
            log::debug!("ignoring binding {prefix}: <{uri}> of a fixed namespace");
            return Ok(());
        }
        if Prefix::new(prefix).is_err() {
            return Err(StoreError::InvalidPrefix(prefix.to_string()));
        }
        if Iri::new(uri).is_err() {
            return Err(StoreError::InvalidNamespace(uri.to_string()));
        }
        self.in_transaction(|store| -> StoreResult<()> {
            if let Some(ns) = NamespaceRecord::by_prefix(&store.conn, prefix)? {
                if ns.uri == uri {
                    return Ok(());
                }
            }
            NamespaceRecord::delete_prefix(&store.conn, prefix)?;
            NamespaceRecord::delete_uri(&store.conn, uri)?;
            NamespaceRecord::insert(&store.conn, prefix, uri)?;
            log::debug!("bound {prefix}: <{uri}>");
            Ok(())
        })
    }

    /// The prefix bound to the namespace `uri`, if any.
    pub fn prefix(&self, uri: &str) -> StoreResult<Option<String>> {
        Ok(NamespaceRecord::by_uri(&self.conn, uri)?.map(|ns| ns.prefix))
    }

    /// The namespace bound to `prefix`, if any.
    pub fn namespace(&self, prefix: &str) -> StoreResult<Option<String>> {
        Ok(NamespaceRecord::by_prefix(&self.conn, prefix)?.map(|ns| ns.uri))
    }

    /// All `(prefix, namespace)` bindings, fixed ones first.
    pub fn namespaces(&self) -> StoreResult<Vec<(String, String)>> {
        Ok(NamespaceRecord::all(&self.conn)?
            .into_iter()
            .map(|ns| (ns.prefix, ns.uri))
            .collect())
    }

    /// The namespace bindings as a prefix map, suitable for serializers.
    ///
    /// Bindings that do not form a valid prefix map entry are skipped.
    pub fn prefix_map(&self) -> StoreResult<Vec<PrefixMapPair>> {
        Ok(NamespaceRecord::all(&self.conn)?
            .into_iter()
            .filter_map(|ns| {
                let prefix = Prefix::new(Box::<str>::from(ns.prefix)).ok()?;
                let iri = Iri::new(Box::<str>::from(ns.uri)).ok()?;
                Some((prefix, iri))
            })
            .collect())
    }

    fn add(
        &mut self,
        subject: &Identifier,
        predicate: &Identifier,
        object: &ObjectValue,
        context: Option<&Identifier>,
    ) -> StoreResult<bool> {
        self.in_transaction(|store| -> StoreResult<bool> {
            let context_id = match context {
                Some(g) => Some(NamedGraph::get_or_create(&store.conn, g)?.id),
                None => None,
            };
            let resource = Resource::get_or_create(&store.conn, subject, context_id)?;
            Ok(StatementTable::get_or_create(
                &store.conn,
                &resource,
                predicate,
                object,
            )?)
        })
    }
}

impl Dataset for RelationalStore {
    type Quad<'x> = StoredQuad where Self: 'x;
    type Error = StoreError;

    fn quads(&self) -> DQuadSource<Self> {
        rows_to_quads(StatementFilter::new().select(&self.conn))
    }

    fn quads_matching<'s, S, P, O, G>(&'s self, sm: S, pm: P, om: O, gm: G) -> DQuadSource<'s, Self>
    where
        S: TermMatcher + 's,
        P: TermMatcher + 's,
        O: TermMatcher + 's,
        G: GraphNameMatcher + 's,
    {
        let Some(mut filter) = triple_filter(&sm, &pm, &om) else {
            return Box::new(empty());
        };
        match gm.constant() {
            None => {}
            Some(None) => filter.context = ContextFilter::DefaultGraph,
            Some(Some(g)) => {
                let Ok(g) = Identifier::from_term(g.borrow_term(), Position::GraphName) else {
                    return Box::new(empty());
                };
                filter.context = ContextFilter::Named(g);
            }
        }
        Box::new(
            rows_to_quads(filter.select(&self.conn)).filter(move |r| match r {
                Ok((g, spo)) => triple_matched(spo, &sm, &pm, &om) && gm.matches(g.as_ref()),
                Err(_) => true,
            }),
        )
    }
}

impl MutableDataset for RelationalStore {
    type MutationError = StoreError;

    fn insert<TS, TP, TO, TG>(
        &mut self,
        s: TS,
        p: TP,
        o: TO,
        g: GraphName<TG>,
    ) -> MdResult<Self, bool>
    where
        TS: Term,
        TP: Term,
        TO: Term,
        TG: Term,
    {
        let subject = Identifier::from_term(s, Position::Subject)?;
        let predicate = Identifier::from_term(p, Position::Predicate)?;
        let object = ObjectValue::from_term(o)?;
        let context = g
            .map(|g| Identifier::from_term(g, Position::GraphName))
            .transpose()?;
        self.add(&subject, &predicate, &object, context.as_ref())
    }

    fn remove<TS, TP, TO, TG>(
        &mut self,
        s: TS,
        p: TP,
        o: TO,
        g: GraphName<TG>,
    ) -> MdResult<Self, bool>
    where
        TS: Term,
        TP: Term,
        TO: Term,
        TG: Term,
    {
        // terms that can not be stored are never present
        let Ok(subject) = Identifier::from_term(s, Position::Subject) else {
            return Ok(false);
        };
        let Ok(predicate) = Identifier::from_term(p, Position::Predicate) else {
            return Ok(false);
        };
        let Ok(object) = ObjectValue::from_term(o) else {
            return Ok(false);
        };
        let Ok(context) = g
            .map(|g| Identifier::from_term(g, Position::GraphName))
            .transpose()
        else {
            return Ok(false);
        };
        let row = StatementRow {
            subject,
            predicate,
            object,
            context,
        };
        Ok(StatementFilter::exact(&row).delete(&self.conn)? > 0)
    }
}

impl SetDataset for RelationalStore {}

impl CollectibleDataset for RelationalStore {
    fn from_quad_source<TS: QuadSource>(
        quads: TS,
    ) -> StreamResult<Self, TS::Error, Self::Error> {
        let mut store = RelationalStore::new().map_err(StreamError::SinkError)?;
        store.insert_all(quads)?;
        Ok(store)
    }
}

/// Translate the constant matchers into a [`StatementFilter`].
///
/// Return `None` if a constant can not be stored in its position,
/// in which case nothing can match.
pub(crate) fn triple_filter<S, P, O>(sm: &S, pm: &P, om: &O) -> Option<StatementFilter>
where
    S: TermMatcher,
    P: TermMatcher,
    O: TermMatcher,
{
    let mut filter = StatementFilter::new();
    if let Some(s) = sm.constant() {
        filter.subject = Some(Identifier::from_term(s.borrow_term(), Position::Subject).ok()?);
    }
    if let Some(p) = pm.constant() {
        filter.predicate = Some(Identifier::from_term(p.borrow_term(), Position::Predicate).ok()?);
    }
    if let Some(o) = om.constant() {
        filter.object = Some(ObjectValue::from_term(o.borrow_term()).ok()?);
    }
    Some(filter)
}

pub(crate) fn triple_matched<S, P, O>(spo: &[SimpleTerm<'static>; 3], sm: &S, pm: &P, om: &O) -> bool
where
    S: TermMatcher,
    P: TermMatcher,
    O: TermMatcher,
{
    sm.matches(&spo[0]) && pm.matches(&spo[1]) && om.matches(&spo[2])
}

fn rows_to_quads(
    rows: ModelResult<Vec<StatementRow>>,
) -> Box<dyn Iterator<Item = StoreResult<StoredQuad>>> {
    match rows {
        Ok(rows) => Box::new(rows.into_iter().map(|row| Ok(row.to_quad()))),
        Err(err) => Box::new(once(Err(err.into()))),
    }
}

#[cfg(test)]
sophia_api::test_dataset_impl!(test_relational_store, RelationalStore, true, false);
