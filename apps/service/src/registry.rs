use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// A monitored endpoint, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Unique slug
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Endpoint to probe. Observations are joined to targets on this field.
    pub url: String,
}

impl Target {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), name: name.into(), description: description.into(), url: url.into() }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no targets configured")]
    Empty,
    #[error("target id must not be empty (url: {0})")]
    MissingId(String),
    #[error("duplicate target id `{0}`")]
    DuplicateId(String),
    #[error("duplicate target url `{0}`")]
    DuplicateUrl(String),
    #[error("target `{id}` has an invalid url `{url}`: {reason}")]
    InvalidUrl { id: String, url: String, reason: String },
}

/// Ordered, read-only list of targets.
///
/// Order is significant: the prober writes and the aggregator reports in
/// registry order.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Vec<Target>,
}

impl TargetRegistry {
    /// Build a registry, rejecting duplicate ids/urls and non-HTTP urls.
    pub fn new(targets: Vec<Target>) -> Result<Self, RegistryError> {
        if targets.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut ids = HashSet::new();
        let mut urls = HashSet::new();

        for target in &targets {
            if target.id.trim().is_empty() {
                return Err(RegistryError::MissingId(target.url.clone()));
            }
            validate_url(target)?;
            if !ids.insert(target.id.as_str()) {
                return Err(RegistryError::DuplicateId(target.id.clone()));
            }
            if !urls.insert(target.url.as_str()) {
                return Err(RegistryError::DuplicateUrl(target.url.clone()));
            }
        }

        Ok(Self { targets })
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

fn validate_url(target: &Target) -> Result<(), RegistryError> {
    let invalid = |reason: String| RegistryError::InvalidUrl {
        id: target.id.clone(),
        url: target.url.clone(),
        reason,
    };

    let parsed = Url::parse(&target.url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}
