//! Error types for the search backend

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),
}

/// Problems with the search configuration.
///
/// At start-up these abort loading. At query time the unknown-name variants
/// are logged and the offending field, facet or sort key is skipped.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown search field: {0}")]
    UnknownField(String),

    #[error("Unknown facet: {0}")]
    UnknownFacet(String),

    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("Nested field has no parent path: {0}")]
    InvalidNestedField(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search engine request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Search engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Search engine returned an undefined response")]
    UndefinedResponse,

    #[error("Search engine returned a malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

/// Failures while shaping a raw engine response. No partial results are
/// returned when one of these occurs.
#[derive(Error, Debug)]
pub enum NormalizationError {
    #[error("Search hit {index} is missing `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("Search hit {index} has an unexpected `{field}` value: {value}")]
    UnexpectedShape {
        index: usize,
        field: &'static str,
        value: serde_json::Value,
    },

    #[error("Invalid bucket key in facet {facet}: {key}")]
    InvalidFacetKey { facet: String, key: serde_json::Value },
}
