//! This crate is part of relrdf,
//! a relational storage backend for the [Sophia] RDF toolkit.
//!
//! It provides [`RelationalStore`],
//! an implementation of Sophia's [`Dataset`](sophia_api::dataset::Dataset)
//! and [`MutableDataset`](sophia_api::dataset::MutableDataset) traits
//! persisting quads through the object layer of [`relrdf_model`].
//!
//! ```
//! use relrdf_store::StoreConfig;
//! use sophia_api::dataset::{Dataset, MutableDataset};
//! use sophia_api::ns::{rdf, rdfs};
//! use sophia_api::term::SimpleTerm;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = StoreConfig::new().open()?;
//! store.insert(rdfs::Class, rdf::type_, rdfs::Class, None as Option<&SimpleTerm>)?;
//! assert_eq!(store.quads().count(), 1);
//! # Ok(()) }
//! ```
//!
//! [Sophia]: https://docs.rs/sophia/latest/sophia/

mod _config;
pub use _config::*;
mod _error;
pub use _error::*;
mod _scope;
pub use _scope::*;
mod _store;
pub use _store::*;
pub mod graph;

#[cfg(test)]
mod test;
