use std::time::Duration;

use regex::Regex;
use sophia_iri::Iri;

use crate::HarvestError;

/// Holds the configuration options of the harvester.
#[derive(Clone, Debug)]
pub struct HarvestConfig {
    user_agent: String,
    timeout: Duration,
    link_pattern: Option<Regex>,
    dataset_iri: Option<Iri<Box<str>>>,
}

impl HarvestConfig {
    /// The User-Agent header sent when fetching pages
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// How long to wait for a page
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Only links whose URL matches this pattern are kept (if any)
    pub fn link_pattern(&self) -> Option<&Regex> {
        self.link_pattern.as_ref()
    }

    /// The IRI of the generated dataset (if not set, derived from the page URL)
    pub fn dataset_iri(&self) -> Option<&Iri<Box<str>>> {
        self.dataset_iri.as_ref()
    }

    /// Build a new default [`HarvestConfig`].
    pub fn new() -> Self {
        HarvestConfig {
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            link_pattern: None,
            dataset_iri: None,
        }
    }

    /// The User-Agent header used by default.
    pub const DEFAULT_USER_AGENT: &'static str = concat!("relrdf/", env!("CARGO_PKG_VERSION"));

    /// Transform a [`HarvestConfig`] by changing the User-Agent header.
    #[must_use]
    pub fn with_user_agent<T: ToString>(mut self, user_agent: T) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Transform a [`HarvestConfig`] by changing the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Transform a [`HarvestConfig`] by setting a link pattern.
    ///
    /// Fails if `pattern` is not a valid regular expression.
    pub fn with_link_pattern(mut self, pattern: &str) -> Result<Self, HarvestError> {
        self.link_pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Transform a [`HarvestConfig`] by setting the IRI of the generated dataset.
    ///
    /// Fails if `iri` is not a valid absolute IRI.
    pub fn with_dataset_iri(mut self, iri: &str) -> Result<Self, HarvestError> {
        self.dataset_iri = Some(Iri::new(Box::from(iri))?);
        Ok(self)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self::new()
    }
}
