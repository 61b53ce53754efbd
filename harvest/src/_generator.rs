use sophia_api::dataset::{MdResult, MutableDataset};
use sophia_api::ns::{rdf, rdfs};
use sophia_api::term::{GraphName, IriRef, Term};
use sophia_iri::Iri;
use url::Url;

use crate::vocab::{dcterms, foaf, void};
use crate::{HarvestConfig, Page};

/// Generates the description of the dataset published by a [`Page`].
#[derive(Clone, Debug, Default)]
pub struct DatasetGenerator {
    dataset_iri: Option<Iri<Box<str>>>,
}

impl DatasetGenerator {
    /// Build a generator naming each dataset after its page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a generator using the dataset IRI of `config` (if any).
    pub fn from_config(config: &HarvestConfig) -> Self {
        DatasetGenerator {
            dataset_iri: config.dataset_iri().cloned(),
        }
    }

    /// Transform a [`DatasetGenerator`] by fixing the IRI of the dataset.
    #[must_use]
    pub fn with_dataset_iri(mut self, iri: Iri<Box<str>>) -> Self {
        self.dataset_iri = Some(iri);
        self
    }

    /// The IRI of the dataset described by `page`:
    /// the configured one, or the page URL with the `dataset` fragment.
    pub fn dataset_iri(&self, page: &Page) -> IriRef<String> {
        match &self.dataset_iri {
            Some(iri) => IriRef::new_unchecked(iri.as_str().to_string()),
            None => {
                let mut url = page.url.clone();
                url.set_fragment(Some("dataset"));
                url_iri(&url)
            }
        }
    }

    /// Describe the dataset of `page` into `graph` of `dataset`.
    ///
    /// Return the number of quads actually inserted
    /// (quads already present in `dataset` are not counted).
    pub fn emit<D, G>(
        &self,
        page: &Page,
        dataset: &mut D,
        graph: GraphName<G>,
    ) -> MdResult<D, usize>
    where
        D: MutableDataset,
        G: Term,
    {
        let mut out = Emitter {
            dataset,
            graph: graph.as_ref(),
            count: 0,
        };
        let ds = self.dataset_iri(page);
        let doc = url_iri(&page.url);

        out.put(&ds, rdf::type_, void::Dataset)?;
        out.put(&ds, dcterms::source, &doc)?;
        if let Some(title) = &page.title {
            out.put(&ds, dcterms::title, title.as_str())?;
        }
        if let Some(description) = &page.description {
            out.put(&ds, dcterms::description, description.as_str())?;
        }
        out.put(&doc, rdf::type_, foaf::Document)?;
        for link in &page.links {
            let target = url_iri(&link.url);
            out.put(&doc, dcterms::references, &target)?;
            out.put(&target, rdf::type_, foaf::Document)?;
            if !link.text.is_empty() {
                out.put(&target, rdfs::label, link.text.as_str())?;
            }
            out.put(&ds, void::rootResource, &target)?;
        }
        log::info!("generated {} quads for {}", out.count, page.url);
        Ok(out.count)
    }
}

struct Emitter<'a, D, G> {
    dataset: &'a mut D,
    graph: GraphName<&'a G>,
    count: usize,
}

impl<D, G> Emitter<'_, D, G>
where
    D: MutableDataset,
    G: Term,
{
    fn put<TS, TP, TO>(&mut self, s: TS, p: TP, o: TO) -> MdResult<D, ()>
    where
        TS: Term,
        TP: Term,
        TO: Term,
    {
        if self.dataset.insert(s, p, o, self.graph.map(Term::borrow_term))? {
            self.count += 1;
        }
        Ok(())
    }
}

// URLs are always valid IRIs
fn url_iri(url: &Url) -> IriRef<String> {
    IriRef::new_unchecked(url.to_string())
}
