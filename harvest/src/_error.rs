use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error type produced while harvesting a web page.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("i/o error: {0}")]
    /// An [`std::io::Error`] occurred while reading a local page.
    Io(
        #[source]
        #[from]
        std::io::Error,
    ),

    #[error("http error: {0}")]
    /// A [`ReqwestError`] occurred while downloading a page.
    Http(#[source] Box<ReqwestError>),

    #[error("invalid url: {0}")]
    /// The page URL could not be parsed.
    Url(
        #[source]
        #[from]
        url::ParseError,
    ),

    #[error("unsupported url scheme {0:?}")]
    /// Only `http`, `https` and `file` URLs can be fetched.
    UnsupportedScheme(String),

    #[error("invalid iri: {0}")]
    /// An invalid IRI was given for the dataset.
    Iri(
        #[source]
        #[from]
        sophia_iri::InvalidIri,
    ),

    #[error("invalid link pattern: {0}")]
    /// The link pattern is not a valid regular expression.
    Pattern(
        #[source]
        #[from]
        regex::Error,
    ),
}

impl From<ReqwestError> for HarvestError {
    fn from(other: ReqwestError) -> HarvestError {
        HarvestError::Http(Box::new(other))
    }
}
