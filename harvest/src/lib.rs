//! This crate is part of relrdf,
//! a relational storage backend for the [Sophia] RDF toolkit.
//!
//! It generates a small [VoID] description of the dataset published by a web page:
//! the page is [fetched](fetch), [scraped](Page::parse) for its title, description and links,
//! and a fixed set of triples is [emitted](DatasetGenerator::emit)
//! into any [`MutableDataset`](sophia_api::dataset::MutableDataset).
//!
//! [Sophia]: https://docs.rs/sophia/latest/sophia/
//! [VoID]: https://www.w3.org/TR/void/

mod _config;
pub use _config::*;
mod _error;
pub use _error::*;
mod _fetch;
pub use _fetch::*;
mod _generator;
pub use _generator::*;
pub mod page;
pub use page::Page;
pub mod vocab;
