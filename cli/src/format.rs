//! RDF concrete syntaxes supported by the command line tool.
use std::error::Error;
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{anyhow, bail};
use clap::ValueEnum;
use relrdf_store::RelationalStore;
use sophia_api::parser::TripleParser;
use sophia_api::prefix::PrefixMapPair;
use sophia_api::serializer::{QuadSerializer, TripleSerializer};
use sophia_api::source::{QuadSource, StreamError, TripleSource};
use sophia_api::term::{GraphName, Term};
use sophia_iri::Iri;
use sophia_turtle::parser::{nq, nt, trig, turtle::TurtleParser};
use sophia_turtle::serializer::{
    nq::NqSerializer,
    nt::NtSerializer,
    trig::{TrigConfig, TrigSerializer},
    turtle::{TurtleConfig, TurtleSerializer},
};
use sophia_xml::parser::RdfXmlParser;
use sophia_xml::serializer::RdfXmlSerializer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[value(name = "ntriples", alias = "nt")]
    NTriples,
    #[value(name = "turtle", alias = "ttl")]
    Turtle,
    #[value(name = "nquads", alias = "nq")]
    NQuads,
    #[value(name = "trig")]
    TriG,
    #[value(name = "rdfxml", aliases = ["rdf", "xml"])]
    RdfXml,
}

impl Format {
    /// Guess the format of a file from its extension, defaulting to RDF/XML.
    pub fn guess<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("nt") => Format::NTriples,
            Some("ttl") => Format::Turtle,
            Some("nq") => Format::NQuads,
            Some("trig") => Format::TriG,
            _ => Format::RdfXml,
        }
    }

    /// Use `format` if any, or guess it from `path`.
    pub fn or_guess<P: AsRef<Path>>(format: Option<Format>, path: Option<P>) -> Self {
        format
            .or_else(|| path.map(Format::guess))
            .unwrap_or(Format::RdfXml)
    }

    /// Whether this format can hold named graphs.
    pub fn is_quads(self) -> bool {
        matches!(self, Format::NQuads | Format::TriG)
    }

    /// Parse `input` into `context` of `store`,
    /// returning the number of inserted triples.
    ///
    /// Blank nodes of `input` never merge with those already in `store`.
    pub fn load_triples<B, T>(
        self,
        input: B,
        base: Option<Iri<String>>,
        store: &mut RelationalStore,
        context: GraphName<T>,
    ) -> anyhow::Result<usize>
    where
        B: BufRead,
        T: Term,
    {
        match self {
            Format::NTriples => store
                .load_triples(nt::parse_bufread(input), context)
                .map_err(storing),
            Format::Turtle => store
                .load_triples(TurtleParser { base }.parse(input), context)
                .map_err(storing),
            Format::RdfXml => store
                .load_triples(RdfXmlParser { base }.parse(input), context)
                .map_err(storing),
            Format::NQuads | Format::TriG => {
                bail!("{self} is a quad format, it can not be loaded into a single context")
            }
        }
    }

    /// Parse `input` into `store`, keeping the graph names of the quads,
    /// and returning the number of inserted quads.
    ///
    /// Relative IRIs are not resolved in quad formats.
    pub fn load_quads<B: BufRead>(self, input: B, store: &mut RelationalStore) -> anyhow::Result<usize> {
        match self {
            Format::NQuads => store
                .load_quads(nq::parse_bufread(input))
                .map_err(storing),
            Format::TriG => store
                .load_quads(trig::parse_bufread(input))
                .map_err(storing),
            _ => bail!("{self} is a triple format"),
        }
    }

    /// Serialize `triples` to `out`, using `prefixes` when the format supports them.
    pub fn write_triples<TS, W>(
        self,
        triples: TS,
        prefixes: Vec<PrefixMapPair>,
        out: &mut W,
    ) -> anyhow::Result<()>
    where
        TS: TripleSource,
        W: Write,
    {
        match self {
            Format::NTriples => {
                let mut ser = NtSerializer::new(out);
                ser.serialize_triples(triples).map_err(serializing)?;
            }
            Format::Turtle => {
                let config = TurtleConfig::new()
                    .with_pretty(true)
                    .with_own_prefix_map(prefixes);
                let mut ser = TurtleSerializer::new_with_config(out, config);
                ser.serialize_triples(triples).map_err(serializing)?;
            }
            Format::RdfXml => {
                let mut ser = RdfXmlSerializer::new(out);
                ser.serialize_triples(triples).map_err(serializing)?;
            }
            Format::NQuads | Format::TriG => bail!("{self} is a quad format"),
        }
        Ok(())
    }

    /// Serialize `quads` to `out`, using `prefixes` when the format supports them.
    pub fn write_quads<QS, W>(
        self,
        quads: QS,
        prefixes: Vec<PrefixMapPair>,
        out: &mut W,
    ) -> anyhow::Result<()>
    where
        QS: QuadSource,
        W: Write,
    {
        match self {
            Format::NQuads => {
                let mut ser = NqSerializer::new(out);
                ser.serialize_quads(quads).map_err(serializing)?;
            }
            Format::TriG => {
                let config = TrigConfig::new()
                    .with_pretty(true)
                    .with_own_prefix_map(prefixes);
                let mut ser = TrigSerializer::new_with_config(out, config);
                ser.serialize_quads(quads).map_err(serializing)?;
            }
            _ => bail!("{self} is a triple format"),
        }
        Ok(())
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Format::NTriples => "N-Triples",
            Format::Turtle => "Turtle",
            Format::NQuads => "N-Quads",
            Format::TriG => "TriG",
            Format::RdfXml => "RDF/XML",
        };
        f.write_str(name)
    }
}

fn storing<E1: Error, E2: Error>(err: StreamError<E1, E2>) -> anyhow::Error {
    match err {
        StreamError::SourceError(e) => anyhow!("error while parsing input: {e}"),
        StreamError::SinkError(e) => anyhow!("error while storing triples: {e}"),
    }
}

fn serializing<E1: Error, E2: Error>(err: StreamError<E1, E2>) -> anyhow::Error {
    match err {
        StreamError::SourceError(e) => anyhow!("error while reading store: {e}"),
        StreamError::SinkError(e) => anyhow!("error while serializing: {e}"),
    }
}
