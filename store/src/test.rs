use std::error::Error;

use sophia_api::dataset::{CollectibleDataset, Dataset, MutableDataset};
use sophia_api::ns::{rdf, rdfs, xsd};
use sophia_api::quad::Quad;
use sophia_api::source::QuadSource;
use sophia_api::term::matcher::Any;
use sophia_api::term::{
    BnodeId, FromTerm, GraphName, IriRef, LanguageTag, SimpleTerm, Term, TermKind,
};
use sophia_inmem::dataset::LightDataset;
use sophia_isomorphism::isomorphic_datasets;
use sophia_turtle::parser::trig;
use test_case::test_case;

use crate::*;

const ARTIS: IriRef<&str> = IriRef::new_unchecked_const("http://zoowizard.eu/resource/Artis");
const BERLIN_ZOO: IriRef<&str> =
    IriRef::new_unchecked_const("http://zoowizard.eu/resource/Berlin_Zoo");
const ZOO: IriRef<&str> = IriRef::new_unchecked_const("http://schema.org/Zoo");
const ORG: IriRef<&str> = IriRef::new_unchecked_const("http://schema.org/Organisation");
const EX_DATE: IriRef<&str> = IriRef::new_unchecked_const("http://www.example.com/date");
const EX_BOOL: IriRef<&str> = IriRef::new_unchecked_const("http://www.example.com/bool");
const EX_NUMBER: IriRef<&str> = IriRef::new_unchecked_const("http://www.example.com/number");
const CTX1: IriRef<&str> = IriRef::new_unchecked_const("http://www.example.com/graph-context");
const CTX2: IriRef<&str> = IriRef::new_unchecked_const("http://www.example.com/other-context");
const DG: GraphName<&SimpleTerm> = None;
/// No context, for counting distinct triples across all contexts.
const ALL: Option<&SimpleTerm> = None;

type TestResult = Result<(), Box<dyn Error>>;

fn store() -> Result<RelationalStore, Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    Ok(RelationalStore::new()?)
}

fn zoos() -> Result<RelationalStore, Box<dyn Error>> {
    let mut store = store()?;
    store.insert(ARTIS, rdf::type_, ZOO, DG)?;
    store.insert(ARTIS, rdf::type_, ORG, DG)?;
    store.insert(BERLIN_ZOO, rdf::type_, ZOO, DG)?;
    Ok(store)
}

#[test]
fn capabilities() {
    assert!(RelationalStore::CONTEXT_AWARE);
    assert!(!RelationalStore::FORMULA_AWARE);
    assert!(!RelationalStore::TRANSACTION_AWARE);
}

#[test]
fn add_uri_statements() -> TestResult {
    let mut store = store()?;
    assert!(store.insert(ARTIS, rdf::type_, ZOO, DG)?);
    assert_eq!(store.len(ALL)?, 1);
    assert!(store.insert(ARTIS, rdf::type_, ORG, DG)?);
    assert_eq!(store.len(ALL)?, 2);
    assert!(!store.insert(ARTIS, rdf::type_, ZOO, DG)?);
    assert_eq!(store.len(ALL)?, 2);
    Ok(())
}

#[test]
fn single_quad() -> TestResult {
    let mut store = store()?;
    store.insert(ARTIS, rdf::type_, ZOO, DG)?;
    let quads: Vec<_> = store.quads().collect::<Result<_, _>>()?;
    assert_eq!(quads.len(), 1);
    let q = &quads[0];
    assert!(Term::eq(q.s(), ARTIS));
    assert!(Term::eq(q.p(), rdf::type_));
    assert!(Term::eq(q.o(), ZOO));
    assert!(q.g().is_none());
    Ok(())
}

#[test]
fn matching_quads() -> TestResult {
    let store = zoos()?;
    assert_eq!(store.quads_matching(Any, Any, Any, Any).count(), 3);
    assert_eq!(store.quads_matching([ARTIS], Any, Any, Any).count(), 2);
    assert_eq!(store.quads_matching(Any, [rdf::type_], Any, Any).count(), 3);
    assert_eq!(store.quads_matching(Any, Any, [ZOO], Any).count(), 2);
    assert_eq!(store.quads_matching(Any, Any, [ORG], Any).count(), 1);
    assert_eq!(store.quads_matching([BERLIN_ZOO], Any, [ORG], Any).count(), 0);
    assert_eq!(store.quads_matching(Any, Any, Any, [DG]).count(), 3);
    assert_eq!(store.quads_matching(Any, Any, Any, [Some(CTX1)]).count(), 0);
    // non-constant matchers are applied after the query
    assert_eq!(
        store.quads_matching([ARTIS, BERLIN_ZOO], Any, [ZOO], Any).count(),
        2
    );
    assert_eq!(
        store
            .quads_matching(TermKind::BlankNode, Any, Any, Any)
            .count(),
        0
    );
    Ok(())
}

#[test]
fn literal_constant_in_subject_matches_nothing() -> TestResult {
    let store = zoos()?;
    assert_eq!(store.quads_matching(["Artis"], Any, Any, Any).count(), 0);
    Ok(())
}

#[test]
fn blank_nodes() -> TestResult {
    let mut store = store()?;
    let anonymous = BnodeId::new_unchecked("zoo1");
    store.insert(ARTIS, rdfs::seeAlso, anonymous, DG)?;
    store.insert(anonymous, rdf::type_, ZOO, DG)?;

    let quads: Vec<_> = store
        .quads_matching(Any, Any, [ZOO], Any)
        .collect::<Result<_, _>>()?;
    assert_eq!(quads.len(), 1);
    assert!(Term::eq(quads[0].s(), anonymous));
    assert_eq!(store.quads_matching(Any, Any, [anonymous], Any).count(), 1);
    Ok(())
}

#[test_case(SimpleTerm::from_term("Artis"); "plain")]
#[test_case(SimpleTerm::from_term("2012-03-04" * xsd::date); "date")]
#[test_case(SimpleTerm::from_term("true" * xsd::boolean); "boolean")]
#[test_case(SimpleTerm::from_term(14); "integer")]
#[test_case(SimpleTerm::from_term("dierentuin" * LanguageTag::new_unchecked("nl")); "language")]
fn literals(lit: SimpleTerm<'static>) -> TestResult {
    let mut store = store()?;
    store.insert(ARTIS, rdfs::label, &lit, DG)?;
    store.insert(ARTIS, EX_DATE, "not the same", DG)?;
    let quads: Vec<_> = store
        .quads_matching([ARTIS], [rdfs::label], Any, Any)
        .collect::<Result<_, _>>()?;
    assert_eq!(quads.len(), 1);
    assert!(Term::eq(quads[0].o(), &lit));
    assert_eq!(store.quads_matching(Any, Any, [&lit], Any).count(), 1);
    Ok(())
}

#[test]
fn literal_kinds_are_distinct() -> TestResult {
    let mut store = store()?;
    store.insert(ARTIS, EX_NUMBER, 14, DG)?;
    store.insert(ARTIS, EX_NUMBER, "14", DG)?;
    store.insert(ARTIS, EX_BOOL, "true" * xsd::boolean, DG)?;
    store.insert(ARTIS, EX_BOOL, "true", DG)?;
    store.insert(ARTIS, EX_BOOL, "true" * xsd::boolean, DG)?;
    assert_eq!(store.len(ALL)?, 4);
    Ok(())
}

#[test]
fn unsupported_terms_are_rejected() -> TestResult {
    let mut store = store()?;
    let err = store.insert("Artis", rdf::type_, ZOO, DG).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Model(relrdf_model::ModelError::UnsupportedTerm { .. })
    ));
    let err = store.insert(ARTIS, rdf::type_, ZOO, Some("g")).unwrap_err();
    assert!(matches!(err, StoreError::Model(_)));
    // removing what can not be stored is a no-op
    assert!(!store.remove("Artis", rdf::type_, ZOO, DG)?);
    assert!(store.is_empty()?);
    Ok(())
}

#[test]
fn contexts() -> TestResult {
    let mut store = store()?;
    assert!(store.contexts()?.is_empty());
    store.insert(ARTIS, rdf::type_, ZOO, Some(CTX1))?;
    store.insert(ARTIS, rdf::type_, ORG, Some(CTX2))?;
    store.insert(BERLIN_ZOO, rdf::type_, ZOO, Some(CTX2))?;
    store.insert(BERLIN_ZOO, rdf::type_, ZOO, DG)?;

    let contexts = store.contexts()?;
    assert_eq!(contexts.len(), 2);
    assert!(Term::eq(&contexts[0], CTX1));
    assert!(Term::eq(&contexts[1], CTX2));

    assert_eq!(store.len(Some(CTX1))?, 1);
    assert_eq!(store.len(Some(CTX2))?, 2);
    assert_eq!(store.len(ALL)?, 3);
    assert_eq!(store.quad_count()?, 4);

    assert_eq!(store.quads_matching(Any, Any, Any, [Some(CTX2)]).count(), 2);
    assert_eq!(store.quads_matching(Any, Any, Any, [DG]).count(), 1);
    Ok(())
}

#[test]
fn empty_contexts_are_listed() -> TestResult {
    let mut store = store()?;
    store.insert(ARTIS, rdf::type_, ZOO, Some(CTX1))?;
    store.remove(ARTIS, rdf::type_, ZOO, Some(CTX1))?;
    assert!(store.is_empty()?);
    assert_eq!(store.contexts()?.len(), 1);
    assert!(store.add_context(CTX2)?);
    assert!(!store.add_context(CTX2)?);
    assert_eq!(store.contexts()?.len(), 2);
    Ok(())
}

#[test]
fn remove_in_one_context() -> TestResult {
    let mut store = store()?;
    store.insert(ARTIS, rdf::type_, ZOO, Some(CTX1))?;
    store.insert(ARTIS, rdf::type_, ZOO, Some(CTX2))?;
    assert!(store.remove(ARTIS, rdf::type_, ZOO, Some(CTX1))?);
    assert!(!store.remove(ARTIS, rdf::type_, ZOO, Some(CTX1))?);
    assert_eq!(store.len(Some(CTX2))?, 1);
    Ok(())
}

#[test]
fn remove_matching_any_context() -> TestResult {
    let mut store = zoos()?;
    store.insert(ARTIS, rdf::type_, ZOO, Some(CTX1))?;
    store.insert(ARTIS, rdf::type_, ZOO, Some(CTX2))?;
    let removed = store.remove_matching([ARTIS], Any, [ZOO], Any)?;
    assert_eq!(removed, 3);
    assert_eq!(store.quad_count()?, 2);
    // contexts outlive their triples
    assert_eq!(store.contexts()?.len(), 2);
    Ok(())
}

#[test]
fn remove_context() -> TestResult {
    let mut store = zoos()?;
    store.insert(ARTIS, rdf::type_, ZOO, Some(CTX1))?;
    assert!(store.remove_context(CTX1)?);
    assert!(!store.remove_context(CTX1)?);
    assert!(store.contexts()?.is_empty());
    assert_eq!(store.quad_count()?, 3);
    Ok(())
}

#[test]
fn destroy() -> TestResult {
    let mut store = zoos()?;
    store.insert(ARTIS, rdf::type_, ZOO, Some(CTX1))?;
    store.bind("schema", "http://schema.org/")?;
    store.destroy()?;
    assert!(store.is_empty()?);
    assert!(store.contexts()?.is_empty());
    assert_eq!(
        store.namespace("schema")?.as_deref(),
        Some("http://schema.org/")
    );
    // the store remains usable
    assert!(store.insert(ARTIS, rdf::type_, ZOO, DG)?);
    Ok(())
}

#[test]
fn default_namespaces() -> TestResult {
    let store = store()?;
    let namespaces = store.namespaces()?;
    for (prefix, uri) in relrdf_model::schema::FIXED_NAMESPACES {
        assert!(namespaces.contains(&(prefix.to_string(), uri.to_string())));
    }
    // opening again does not duplicate them
    let store = RelationalStore::from_connection(store.into_connection())?;
    assert_eq!(store.namespaces()?.len(), 3);
    Ok(())
}

#[test_case("hello-world", "http://www.w3.org/XML/1998/namespace"; "fixed uri")]
#[test_case("xml", "http://example.com/xml"; "fixed prefix")]
fn cannot_rebind_default_namespaces(prefix: &str, uri: &str) -> TestResult {
    let mut store = store()?;
    store.bind(prefix, uri)?;
    assert_eq!(
        store.namespace("xml")?.as_deref(),
        Some("http://www.w3.org/XML/1998/namespace")
    );
    assert_eq!(store.namespaces()?.len(), 3);
    Ok(())
}

#[test]
fn binding_namespaces() -> TestResult {
    let mut store = store()?;
    assert_eq!(store.namespace("prefix")?, None);
    store.bind("prefix", "http://example.com/prefix")?;
    assert_eq!(
        store.namespace("prefix")?.as_deref(),
        Some("http://example.com/prefix")
    );
    assert_eq!(
        store.prefix("http://example.com/prefix")?.as_deref(),
        Some("prefix")
    );

    // same prefix, other namespace
    store.bind("prefix", "http://example.com/other")?;
    assert_eq!(store.prefix("http://example.com/prefix")?, None);
    // same namespace, other prefix
    store.bind("other", "http://example.com/other")?;
    assert_eq!(store.namespace("prefix")?, None);
    assert_eq!(store.namespaces()?.len(), 4);
    assert_eq!(store.prefix_map()?.len(), 4);
    Ok(())
}

#[test_case("not a prefix"; "space")]
#[test_case("1abc"; "leading digit")]
fn invalid_prefix(prefix: &str) -> TestResult {
    let mut store = store()?;
    assert!(matches!(
        store.bind(prefix, "http://example.com/"),
        Err(StoreError::InvalidPrefix(_))
    ));
    Ok(())
}

#[test]
fn invalid_namespace() -> TestResult {
    let mut store = store()?;
    assert!(matches!(
        store.bind("ex", "not an iri"),
        Err(StoreError::InvalidNamespace(_))
    ));
    Ok(())
}

#[test]
fn transaction_rolls_back() -> TestResult {
    let mut store = zoos()?;
    let res: StoreResult<()> = store.in_transaction(|store| {
        store.insert(ARTIS, rdfs::label, "Artis", Some(CTX1))?;
        assert_eq!(store.quad_count()?, 4);
        Err(StoreError::InvalidPrefix("abort".into()))
    });
    assert!(res.is_err());
    assert_eq!(store.quad_count()?, 3);
    assert!(store.contexts()?.is_empty());

    store.in_transaction(|store| -> StoreResult<()> {
        store.insert(ARTIS, rdfs::label, "Artis", Some(CTX1))?;
        Ok(())
    })?;
    assert_eq!(store.quad_count()?, 4);
    Ok(())
}

#[test]
fn failed_commit_closes_transaction() -> TestResult {
    let mut store = zoos()?;
    let res: StoreResult<()> = store.in_transaction(|store| {
        // the dangling context is only detected on COMMIT
        store.connection().execute_batch(
            "PRAGMA defer_foreign_keys = ON;
             INSERT INTO resource (identifier, context_id) VALUES ('dangling', 999);",
        )?;
        Ok(())
    });
    assert!(matches!(res, Err(StoreError::Model(_))));
    assert!(store.connection().is_autocommit());

    store.in_transaction(|store| -> StoreResult<()> {
        store.insert(ARTIS, rdfs::label, "Artis", Some(CTX1))?;
        Ok(())
    })?;
    assert!(store.connection().is_autocommit());
    assert_eq!(store.quad_count()?, 4);
    Ok(())
}

const TRIG: &str = r#"
    @prefix : <http://example.org/> .
    @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .

    :Seq a rdf:Seq ;
        rdf:_1 :one ; rdf:_2 :two ; rdf:_3 :three .
    :g1 { :Seq :label "sequence"@en, "Reihe"@de . }
    :g2 { _:b :count 3 ; :in :Seq . }
"#;

#[test]
fn collect_from_parser() -> TestResult {
    let store = RelationalStore::from_quad_source(trig::parse_str(TRIG))?;
    let expected = LightDataset::from_quad_source(trig::parse_str(TRIG))?;
    assert_eq!(store.quad_count()?, 8);
    assert!(isomorphic_datasets(&store, &expected)?);
    Ok(())
}

const DOC1: &str = r#"
    @prefix : <http://example.org/> .
    _:b :value "1" .
    [] :other "x" .
"#;
const DOC2: &str = r#"
    @prefix : <http://example.org/> .
    _:b :value "2" .
    [] :other "y" .
"#;

fn distinct_subjects(store: &RelationalStore) -> Result<usize, Box<dyn Error>> {
    let subjects: std::collections::BTreeSet<String> = store
        .quads()
        .map(|q| q.map(|q| format!("{:?}", q.s())))
        .collect::<Result<_, _>>()?;
    Ok(subjects.len())
}

#[test]
fn loads_keep_blank_nodes_apart() -> TestResult {
    let mut store = store()?;
    assert_eq!(store.load_quads(trig::parse_str(DOC1))?, 2);
    assert_eq!(store.load_quads(trig::parse_str(DOC2))?, 2);
    assert_eq!(store.quad_count()?, 4);
    assert_eq!(distinct_subjects(&store)?, 4);

    // loading the same document twice describes other nodes
    assert_eq!(store.load_quads(trig::parse_str(DOC1))?, 2);
    assert_eq!(distinct_subjects(&store)?, 6);
    Ok(())
}

#[test]
fn loaded_triples_go_to_their_context() -> TestResult {
    let mut store = store()?;
    let doc1 = trig::parse_str(DOC1).to_triples();
    let doc2 = trig::parse_str(DOC2).to_triples();
    assert_eq!(store.load_triples(doc1, Some(CTX1))?, 2);
    assert_eq!(store.load_triples(doc2, Some(CTX1))?, 2);
    assert_eq!(store.len(Some(CTX1))?, 4);
    assert_eq!(distinct_subjects(&store)?, 4);
    // a blank node context is not relabelled
    let ctx = BnodeId::new_unchecked("ctx");
    let doc = trig::parse_str(DOC1).to_triples();
    store.load_triples(doc, Some(ctx))?;
    assert_eq!(store.len(Some(ctx))?, 2);
    Ok(())
}

#[test]
fn insert_all_keeps_labels() -> TestResult {
    let mut store = store()?;
    store.insert_all(trig::parse_str(DOC1))?;
    store.insert_all(trig::parse_str(DOC2))?;
    let b = BnodeId::new_unchecked("b");
    assert_eq!(store.quads_matching([b], Any, Any, Any).count(), 2);
    Ok(())
}

#[test]
fn file_store_persists() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("relrdf.db");
    {
        let mut store = StoreConfig::new().with_file(&path).with_wal(true).open()?;
        store.insert(ARTIS, rdf::type_, ZOO, Some(CTX1))?;
        store.bind("schema", "http://schema.org/")?;
    }
    {
        let store = StoreConfig::new().with_file(&path).open()?;
        assert_eq!(store.len(Some(CTX1))?, 1);
        assert_eq!(store.prefix("http://schema.org/")?.as_deref(), Some("schema"));
    }
    Ok(())
}
