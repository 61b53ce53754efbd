//! This crate is part of relrdf,
//! a relational storage backend for the [Sophia] RDF toolkit.
//!
//! It provides the object layer that RDF quads are persisted through:
//! the relational [schema], the [fields] converting RDF terms to column values,
//! the row [models] and the statement [query] sets.
//!
//! [Sophia]: https://docs.rs/sophia/latest/sophia/

mod error;
pub use error::*;
pub mod fields;
pub mod models;
pub mod query;
pub mod schema;
