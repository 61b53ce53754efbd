//! [`Graph`] views over a [`RelationalStore`].
//!
//! * [`conjunctive_graph`] merges all the contexts of the store;
//! * [`named_graph`] and [`default_graph`] are bound to a single context,
//!   and are mutable when they hold a mutable reference to the store.
use std::collections::BTreeSet;
use std::iter::{empty, once};
use std::ops::{Deref, DerefMut};

use relrdf_model::fields::Identifier;
use relrdf_model::models::NamedGraph;
use relrdf_model::query::ContextFilter;
use relrdf_model::Position;
use sophia_api::dataset::MutableDataset;
use sophia_api::graph::{GTripleSource, Graph, MgResult, MutableGraph, SetGraph};
use sophia_api::term::matcher::{Any, TermMatcher};
use sophia_api::term::{GraphName, SimpleTerm, Term};

use crate::_store::{triple_filter, triple_matched};
use crate::{RelationalStore, StoreResult};

/// The union of all the contexts of a [`RelationalStore`].
///
/// A triple asserted in several contexts is yielded only once.
#[derive(Clone, Copy, Debug)]
pub struct ConjunctiveGraph<'a> {
    store: &'a RelationalStore,
}

/// View `store` as a [`ConjunctiveGraph`].
pub fn conjunctive_graph(store: &RelationalStore) -> ConjunctiveGraph<'_> {
    ConjunctiveGraph { store }
}

impl Graph for ConjunctiveGraph<'_> {
    type Triple<'x> = [SimpleTerm<'static>; 3] where Self: 'x;
    type Error = crate::StoreError;

    fn triples(&self) -> GTripleSource<Self> {
        self.triples_matching(Any, Any, Any)
    }

    fn triples_matching<'s, S, P, O>(&'s self, sm: S, pm: P, om: O) -> GTripleSource<'s, Self>
    where
        S: TermMatcher + 's,
        P: TermMatcher + 's,
        O: TermMatcher + 's,
    {
        let Some(filter) = triple_filter(&sm, &pm, &om) else {
            return Box::new(empty());
        };
        let rows = match filter.select(self.store.connection()) {
            Ok(rows) => rows,
            Err(err) => return Box::new(once(Err(err.into()))),
        };
        let distinct: BTreeSet<_> = rows
            .into_iter()
            .map(|row| (row.subject, row.predicate, row.object))
            .collect();
        Box::new(
            distinct
                .into_iter()
                .map(|(s, p, o)| [s.to_term(), p.to_term(), o.to_term()])
                .filter(move |spo| triple_matched(spo, &sm, &pm, &om))
                .map(Ok),
        )
    }
}

/// A single context of a [`RelationalStore`], viewed as a [`Graph`].
///
/// `D` is either a shared or a mutable reference to the store
/// (or anything dereferencing to it);
/// in the latter case, the graph is also a [`MutableGraph`],
/// inserting into and removing from its context.
#[derive(Debug)]
pub struct ContextGraph<D> {
    store: D,
    context: Option<Identifier>,
}

/// Bind a [`ContextGraph`] to the named graph `context` of `store`.
///
/// If `create` is true, the context is registered immediately,
/// so that it is listed by [`RelationalStore::contexts`] even while empty.
pub fn named_graph<D, T>(store: D, context: T, create: bool) -> StoreResult<ContextGraph<D>>
where
    D: Deref<Target = RelationalStore>,
    T: Term,
{
    let id = Identifier::from_term(context, Position::GraphName)?;
    if create {
        NamedGraph::get_or_create(store.connection(), &id)?;
    }
    Ok(ContextGraph {
        store,
        context: Some(id),
    })
}

/// Bind a [`ContextGraph`] to the default graph of `store`.
pub fn default_graph<D>(store: D) -> ContextGraph<D>
where
    D: Deref<Target = RelationalStore>,
{
    ContextGraph {
        store,
        context: None,
    }
}

impl<D> ContextGraph<D>
where
    D: Deref<Target = RelationalStore>,
{
    /// The name of this graph (`None` for the default graph).
    pub fn name(&self) -> GraphName<SimpleTerm<'static>> {
        self.context.as_ref().map(Identifier::to_term)
    }

    pub fn store(&self) -> &RelationalStore {
        &self.store
    }

    /// Release the underlying store.
    pub fn into_store(self) -> D {
        self.store
    }

    fn context_filter(&self) -> ContextFilter {
        match &self.context {
            Some(id) => ContextFilter::Named(id.clone()),
            None => ContextFilter::DefaultGraph,
        }
    }
}

impl<D> Graph for ContextGraph<D>
where
    D: Deref<Target = RelationalStore>,
{
    type Triple<'x> = [SimpleTerm<'static>; 3] where Self: 'x;
    type Error = crate::StoreError;

    fn triples(&self) -> GTripleSource<Self> {
        self.triples_matching(Any, Any, Any)
    }

    fn triples_matching<'s, S, P, O>(&'s self, sm: S, pm: P, om: O) -> GTripleSource<'s, Self>
    where
        S: TermMatcher + 's,
        P: TermMatcher + 's,
        O: TermMatcher + 's,
    {
        let Some(filter) = triple_filter(&sm, &pm, &om) else {
            return Box::new(empty());
        };
        let filter = filter.with_context(self.context_filter());
        let rows = match filter.select(self.store.connection()) {
            Ok(rows) => rows,
            Err(err) => return Box::new(once(Err(err.into()))),
        };
        Box::new(
            rows.into_iter()
                .map(|row| row.to_triple())
                .filter(move |spo| triple_matched(spo, &sm, &pm, &om))
                .map(Ok),
        )
    }
}

impl<D> MutableGraph for ContextGraph<D>
where
    D: DerefMut<Target = RelationalStore>,
{
    type MutationError = crate::StoreError;

    fn insert<TS, TP, TO>(&mut self, s: TS, p: TP, o: TO) -> MgResult<Self, bool>
    where
        TS: Term,
        TP: Term,
        TO: Term,
    {
        let g = self.name();
        MutableDataset::insert(&mut *self.store, s, p, o, g)
    }

    fn remove<TS, TP, TO>(&mut self, s: TS, p: TP, o: TO) -> MgResult<Self, bool>
    where
        TS: Term,
        TP: Term,
        TO: Term,
    {
        let g = self.name();
        MutableDataset::remove(&mut *self.store, s, p, o, g)
    }
}

impl<D> SetGraph for ContextGraph<D> where D: Deref<Target = RelationalStore> {}
