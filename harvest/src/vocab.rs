//! Namespaces of the terms emitted by the [`DatasetGenerator`](crate::DatasetGenerator).
//!
//! `rdf:` and `rdfs:` terms come from [`sophia_api::ns`].

/// The [VoID](https://www.w3.org/TR/void/) vocabulary.
pub mod void {
    use sophia_api::namespace;
    namespace!(
        "http://rdfs.org/ns/void#",
        // classes
        Dataset,
        // properties
        rootResource
    );
}

/// The [DCMI Metadata Terms](https://www.dublincore.org/specifications/dublin-core/dcmi-terms/).
pub mod dcterms {
    use sophia_api::namespace;
    namespace!(
        "http://purl.org/dc/terms/",
        description,
        references,
        source,
        title
    );
}

/// The [FOAF](http://xmlns.com/foaf/spec/) vocabulary.
pub mod foaf {
    use sophia_api::namespace;
    namespace!("http://xmlns.com/foaf/0.1/", Document);
}
