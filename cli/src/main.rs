use crate::cli::{Args, Command};
use crate::format::Format;
use anyhow::{anyhow, bail, Context};
use clap::Parser;
use relrdf_harvest::vocab::{dcterms, foaf, void};
use relrdf_harvest::{harvest, DatasetGenerator, HarvestConfig};
use relrdf_store::graph::{conjunctive_graph, named_graph};
use relrdf_store::{RelationalStore, StoreConfig};
use sophia_api::dataset::Dataset;
use sophia_api::graph::Graph;
use sophia_api::ns::{rdf, rdfs};
use sophia_api::prefix::{Prefix, PrefixMapPair};
use sophia_api::source::QuadSource;
use sophia_api::term::matcher::Any;
use sophia_api::term::{BnodeId, SimpleTerm, Term};
use sophia_inmem::dataset::LightDataset;
use sophia_iri::Iri;
use std::fs::File;
use std::io::{self, stdout, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;
use uuid::Uuid;

mod cli;
mod format;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Command::Generate {
        url,
        dataset,
        context,
        link_pattern,
        output,
        format,
    } = &args.command
    {
        if output.is_some() || format.is_some() {
            return generate_to_file(
                url,
                dataset.as_deref(),
                context.as_deref(),
                link_pattern.as_deref(),
                output.as_deref(),
                *format,
            );
        }
    }

    let mut store = StoreConfig::new()
        .with_file(&args.database)
        .with_identifier(&args.store)
        .open()
        .with_context(|| format!("Could not open store {}", args.database.display()))?;

    match args.command {
        Command::Import {
            source,
            context,
            format,
        } => {
            let context = match context {
                Some(context) => parse_context(&context)?,
                None => fresh_context(),
            };
            let (text, base) = read_source(&source)?;
            let format = Format::or_guess(format, Some(source_path(&source)));
            if format.is_quads() {
                bail!("Could not import {source}: {format} is a quad format, use the parse command");
            }
            let count = store
                .in_transaction(|store| -> anyhow::Result<usize> {
                    store.add_context(&context)?;
                    format.load_triples(text.as_bytes(), Some(base), store, Some(&context))
                })
                .with_context(|| format!("Could not import {source}"))?;
            log::info!("imported {count} triples into {}", show_context(&context));
            println!("{}", show_context(&context));
            Ok(())
        }
        Command::Parse {
            source,
            context,
            format,
        } => {
            let format = Format::or_guess(format, Some(&source));
            let base = file_iri(&source)?;
            let input = BufReader::new(
                File::open(&source)
                    .with_context(|| format!("Could not open {}", source.display()))?,
            );
            if format.is_quads() {
                if context.is_some() {
                    log::warn!("--context is ignored for {format}");
                }
                let count = store.in_transaction(|store| format.load_quads(input, store))?;
                log::info!("parsed {count} quads from {}", source.display());
                return Ok(());
            }
            let context = match context {
                Some(context) => parse_context(&context)?,
                None => fresh_context(),
            };
            let count = store.in_transaction(|store| -> anyhow::Result<usize> {
                store.add_context(&context)?;
                format.load_triples(input, Some(base), store, Some(&context))
            })?;
            log::info!(
                "parsed {count} triples from {} into {}",
                source.display(),
                show_context(&context)
            );
            println!("{}", show_context(&context));
            Ok(())
        }
        Command::Export {
            file,
            context,
            format,
        } => {
            let format = Format::or_guess(format, file.as_ref());
            let context = context.as_deref().map(parse_context).transpose()?;
            match file {
                Some(path) => {
                    let mut out = BufWriter::new(
                        File::create(&path)
                            .with_context(|| format!("Could not create {}", path.display()))?,
                    );
                    export(&store, context, format, &mut out)?;
                    close_file_writer(out)?;
                }
                None => {
                    let mut out = stdout().lock();
                    export(&store, context, format, &mut out)?;
                    out.flush()?;
                }
            }
            Ok(())
        }
        Command::Contexts => {
            let mut out = stdout().lock();
            for context in store.contexts()? {
                let count = store.len(Some(&context))?;
                writeln!(out, "{}\t{count}", show_context(&context))?;
            }
            Ok(())
        }
        Command::RemoveContext { context } => {
            let context = parse_context(&context)?;
            if store.remove_context(&context)? {
                log::info!("removed context {}", show_context(&context));
            } else {
                log::warn!("unknown context {}", show_context(&context));
            }
            Ok(())
        }
        Command::Destroy => {
            store.destroy()?;
            log::info!("store destroyed");
            Ok(())
        }
        Command::Bind { prefix, uri } => {
            store
                .bind(&prefix, &uri)
                .with_context(|| format!("Could not bind {prefix}: to <{uri}>"))?;
            Ok(())
        }
        Command::Namespaces => {
            let mut out = stdout().lock();
            for (prefix, uri) in store.namespaces()? {
                writeln!(out, "{prefix}\t{uri}")?;
            }
            Ok(())
        }
        Command::Generate {
            url,
            dataset,
            context,
            link_pattern,
            ..
        } => {
            let config = harvest_config(dataset.as_deref(), link_pattern.as_deref())?;
            let page = harvest(&url, &config).with_context(|| format!("Could not harvest {url}"))?;
            let context = context.as_deref().map(parse_context).transpose()?;
            let generator = DatasetGenerator::from_config(&config);
            let count = store.in_transaction(|store| generator.emit(&page, store, context.as_ref()))?;
            log::info!("stored {count} new statements about {}", page.url);
            Ok(())
        }
    }
}

fn export<W: Write>(
    store: &RelationalStore,
    context: Option<SimpleTerm<'static>>,
    format: Format,
    out: &mut W,
) -> anyhow::Result<()> {
    let prefixes = store.prefix_map()?;
    match (context, format.is_quads()) {
        (Some(context), false) => {
            let graph = named_graph(store, &context, false)?;
            format.write_triples(graph.triples(), prefixes, out)
        }
        (Some(context), true) => {
            let quads = store.quads_matching(Any, Any, Any, [Some(&context)]);
            format.write_quads(quads, prefixes, out)
        }
        (None, false) => format.write_triples(conjunctive_graph(store).triples(), prefixes, out),
        (None, true) => format.write_quads(store.quads(), prefixes, out),
    }
}

fn generate_to_file(
    url: &str,
    dataset: Option<&str>,
    context: Option<&str>,
    link_pattern: Option<&str>,
    output: Option<&Path>,
    format: Option<Format>,
) -> anyhow::Result<()> {
    let config = harvest_config(dataset, link_pattern)?;
    let page = harvest(url, &config).with_context(|| format!("Could not harvest {url}"))?;
    let context = context.map(parse_context).transpose()?;
    let mut description = LightDataset::new();
    DatasetGenerator::from_config(&config).emit(&page, &mut description, context.as_ref())?;

    let format = Format::or_guess(format, output);
    let write = |mut out: &mut dyn Write| -> anyhow::Result<()> {
        let prefixes = vocab_prefixes();
        if format.is_quads() {
            format.write_quads(description.quads(), prefixes, &mut out)
        } else {
            format.write_triples(description.quads().to_triples(), prefixes, &mut out)
        }
    };
    match output {
        Some(path) => {
            let mut out = BufWriter::new(
                File::create(path)
                    .with_context(|| format!("Could not create {}", path.display()))?,
            );
            write(&mut out)?;
            close_file_writer(out)?;
        }
        None => {
            let mut out = stdout().lock();
            write(&mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn harvest_config(dataset: Option<&str>, link_pattern: Option<&str>) -> anyhow::Result<HarvestConfig> {
    let mut config = HarvestConfig::new();
    if let Some(iri) = dataset {
        config = config
            .with_dataset_iri(iri)
            .with_context(|| format!("Invalid dataset IRI {iri}"))?;
    }
    if let Some(pattern) = link_pattern {
        config = config
            .with_link_pattern(pattern)
            .with_context(|| format!("Invalid link pattern {pattern}"))?;
    }
    Ok(config)
}

fn vocab_prefixes() -> Vec<PrefixMapPair> {
    [
        ("rdf", rdf::PREFIX.as_str()),
        ("rdfs", rdfs::PREFIX.as_str()),
        ("void", void::PREFIX.as_str()),
        ("dcterms", dcterms::PREFIX.as_str()),
        ("foaf", foaf::PREFIX.as_str()),
    ]
    .into_iter()
    .map(|(p, ns)| (Prefix::new_unchecked(Box::from(p)), Iri::new_unchecked(Box::from(ns))))
    .collect()
}

/// Parse a context given on the command line:
/// an absolute IRI, or a blank node label prefixed with `_:`.
fn parse_context(txt: &str) -> anyhow::Result<SimpleTerm<'static>> {
    if let Some(label) = txt.strip_prefix("_:") {
        if label.is_empty()
            || !label
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            bail!("Invalid blank node label {txt}");
        }
        Ok(BnodeId::new_unchecked(label.to_string()).into_term())
    } else {
        let iri = Iri::new(txt.to_string()).with_context(|| format!("Invalid context IRI {txt}"))?;
        Ok(iri.into_term())
    }
}

fn show_context<T: Term>(context: T) -> String {
    if let Some(id) = context.bnode_id() {
        format!("_:{}", id.as_str())
    } else if let Some(iri) = context.iri() {
        iri.as_str().to_string()
    } else {
        format!("{:?}", context.kind())
    }
}

/// A blank node context that is not used yet.
fn fresh_context() -> SimpleTerm<'static> {
    BnodeId::new_unchecked(format!("N{}", Uuid::new_v4().simple())).into_term()
}

/// Read `source`, either an http(s)/file URL or a local path,
/// and return its content with its base IRI.
fn read_source(source: &str) -> anyhow::Result<(String, Iri<String>)> {
    let url = match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https" | "file") => url,
        _ => {
            let path = PathBuf::from(source);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Could not read {source}"))?;
            return Ok((text, file_iri(&path)?));
        }
    };
    let text = relrdf_harvest::fetch(&url, &HarvestConfig::new())
        .with_context(|| format!("Could not fetch {url}"))?;
    Ok((text, Iri::new(url.to_string())?))
}

/// The part of `source` used to guess its format.
fn source_path(source: &str) -> PathBuf {
    match Url::parse(source) {
        Ok(url) if url.scheme() != "file" && url.scheme().len() > 1 => PathBuf::from(url.path()),
        _ => PathBuf::from(source),
    }
}

fn file_iri(path: &Path) -> anyhow::Result<Iri<String>> {
    let path = std::path::absolute(path)?;
    let url = Url::from_file_path(&path)
        .map_err(|()| anyhow!("Invalid file path {}", path.display()))?;
    Ok(Iri::new(url.to_string())?)
}

fn close_file_writer(writer: BufWriter<File>) -> io::Result<()> {
    let mut file = writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?;
    file.flush()?;
    file.sync_all()
}
