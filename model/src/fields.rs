//! Column representations of RDF terms.
//!
//! IRIs and blank nodes share a single text column ([`Identifier`]):
//! IRIs are stored as themselves, blank nodes as their N-Triples form (`_:id`).
//! Literals are spread over three columns ([`LiteralValue`]).
use sophia_api::term::{BnodeId, IriRef, LanguageTag, SimpleTerm, Term, TermKind};

use crate::{ModelError, ModelResult, Position};

/// Datatype IRI of plain literals.
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
/// Datatype IRI of language-tagged literals.
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

const BNODE_PREFIX: &str = "_:";

/// An IRI or a blank node, as stored in a single text column.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Identifier {
    Iri(Box<str>),
    BlankNode(Box<str>),
}

impl Identifier {
    /// Extract an [`Identifier`] from `term`,
    /// failing if `term` is neither an IRI nor a blank node.
    pub fn from_term<T: Term>(term: T, position: Position) -> ModelResult<Self> {
        if let Some(iri) = term.iri() {
            Ok(Identifier::Iri(iri.as_str().into()))
        } else if let Some(bnid) = term.bnode_id() {
            Ok(Identifier::BlankNode(bnid.as_str().into()))
        } else {
            Err(ModelError::UnsupportedTerm {
                kind: term.kind(),
                position,
            })
        }
    }

    /// Parse the column value produced by [`Identifier::to_column`].
    pub fn from_column(value: &str) -> Self {
        match value.strip_prefix(BNODE_PREFIX) {
            Some(id) => Identifier::BlankNode(id.into()),
            None => Identifier::Iri(value.into()),
        }
    }

    /// The text stored in the database for this identifier.
    pub fn to_column(&self) -> String {
        match self {
            Identifier::Iri(iri) => iri.to_string(),
            Identifier::BlankNode(id) => format!("{BNODE_PREFIX}{id}"),
        }
    }

    pub fn to_term(&self) -> SimpleTerm<'static> {
        match self {
            Identifier::Iri(iri) => IriRef::new_unchecked(&iri[..]).into_term(),
            Identifier::BlankNode(id) => BnodeId::new_unchecked(&id[..]).into_term(),
        }
    }
}

/// A literal, as stored in the lexical, datatype and language columns.
///
/// The language column holds the empty string for literals without a language tag,
/// so that the unique constraint of the literal table applies to all of them.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LiteralValue {
    pub lexical: Box<str>,
    pub datatype: Box<str>,
    pub language: Option<Box<str>>,
}

impl LiteralValue {
    pub fn from_term<T: Term>(term: T) -> ModelResult<Self> {
        let Some(lex) = term.lexical_form() else {
            return Err(ModelError::UnsupportedTerm {
                kind: term.kind(),
                position: Position::Object,
            });
        };
        let lexical: &str = &lex;
        let language = term.language_tag().map(|tag| Box::from(tag.as_str()));
        let datatype = match (term.datatype(), &language) {
            (_, Some(_)) => Box::from(RDF_LANG_STRING),
            (Some(dt), None) => Box::from(dt.as_str()),
            (None, None) => Box::from(XSD_STRING),
        };
        Ok(LiteralValue {
            lexical: lexical.into(),
            datatype,
            language,
        })
    }

    /// Rebuild a literal from its three columns.
    pub fn from_columns(lexical: String, datatype: String, language: String) -> Self {
        LiteralValue {
            lexical: lexical.into(),
            datatype: datatype.into(),
            language: (!language.is_empty()).then(|| language.into()),
        }
    }

    /// The value of the language column.
    pub fn language_column(&self) -> &str {
        self.language.as_deref().unwrap_or("")
    }

    pub fn to_term(&self) -> SimpleTerm<'static> {
        match &self.language {
            Some(tag) => (&self.lexical[..] * LanguageTag::new_unchecked(&tag[..])).into_term(),
            None => SimpleTerm::LiteralDatatype(
                self.lexical.to_string().into(),
                IriRef::new_unchecked(self.datatype.to_string().into()),
            ),
        }
    }
}

/// The object of a statement, which decides the table it is stored in.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ObjectValue {
    Resource(Identifier),
    Literal(LiteralValue),
}

impl ObjectValue {
    pub fn from_term<T: Term>(term: T) -> ModelResult<Self> {
        match term.kind() {
            TermKind::Literal => LiteralValue::from_term(term).map(ObjectValue::Literal),
            _ => Identifier::from_term(term, Position::Object).map(ObjectValue::Resource),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, ObjectValue::Literal(_))
    }

    pub fn to_term(&self) -> SimpleTerm<'static> {
        match self {
            ObjectValue::Resource(id) => id.to_term(),
            ObjectValue::Literal(lit) => lit.to_term(),
        }
    }
}
