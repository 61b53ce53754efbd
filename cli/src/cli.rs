use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::format::Format;

#[derive(Parser)]
#[command(about, version, name = "relrdf")]
/// Manage an RDF store persisted in a SQLite database
pub struct Args {
    /// The database file of the store
    #[arg(
        long,
        global = true,
        env = "RELRDF_DATABASE",
        default_value = "relrdf.db",
        value_hint = ValueHint::FilePath
    )]
    pub database: PathBuf,
    /// The identifier of the store (only the default store is supported)
    #[arg(long, global = true, default_value = relrdf_store::DEFAULT_STORE)]
    pub store: String,
    /// Report progress messages
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load a file or a web resource into a context, in a single transaction
    Import {
        /// File path or http(s) URL to load
        #[arg(value_hint = ValueHint::AnyPath)]
        source: String,
        /// The context receiving the triples
        ///
        /// By default, a fresh blank node is used.
        #[arg(long, value_hint = ValueHint::Url)]
        context: Option<String>,
        /// The format of the source
        ///
        /// By default the format is guessed from the source extension.
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Stream a file into the store
    Parse {
        /// File to load
        #[arg(value_hint = ValueHint::FilePath)]
        source: PathBuf,
        /// The context receiving the triples (triple formats only)
        ///
        /// By default, a fresh blank node is used, and printed.
        #[arg(long, value_hint = ValueHint::Url)]
        context: Option<String>,
        /// The format of the file
        ///
        /// By default the format is guessed from the file extension.
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Serialize a context, or the whole store
    Export {
        /// File to write
        ///
        /// If no file is given, stdout is written.
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// The context to export
        ///
        /// By default, the whole store is exported
        /// (or the union of all contexts, for triple formats).
        #[arg(long, value_hint = ValueHint::Url)]
        context: Option<String>,
        /// The format of the output
        ///
        /// By default the format is guessed from the file extension.
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// List the contexts of the store, with their number of triples
    Contexts,
    /// Remove a context and all its triples
    RemoveContext {
        /// The context to remove
        #[arg(value_hint = ValueHint::Url)]
        context: String,
    },
    /// Remove every triple and context from the store (namespaces are kept)
    Destroy,
    /// Bind a prefix to a namespace
    Bind {
        prefix: String,
        #[arg(value_hint = ValueHint::Url)]
        uri: String,
    },
    /// List the namespace bindings of the store
    Namespaces,
    /// Describe the dataset published by a web page
    Generate {
        /// URL of the page (http, https or file)
        #[arg(value_hint = ValueHint::Url)]
        url: String,
        /// The IRI of the generated dataset
        ///
        /// By default, the page URL with the fragment `dataset`.
        #[arg(long, value_hint = ValueHint::Url)]
        dataset: Option<String>,
        /// The context receiving the description
        ///
        /// By default the default graph is used.
        #[arg(long, value_hint = ValueHint::Url)]
        context: Option<String>,
        /// Only keep the links matching this regular expression
        #[arg(long)]
        link_pattern: Option<String>,
        /// Write the description to this file instead of the store
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Serialize the description in this format instead of storing it
        ///
        /// Without --output, stdout is written.
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
}
