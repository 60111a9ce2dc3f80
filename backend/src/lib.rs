//! Search backend: turns UI-agnostic search requests into search-engine queries
//! and engine responses into normalized result sets.

pub mod api;
pub mod config;
pub mod db_utils;
pub mod error;
pub mod logging;
pub mod query;

pub use api::search::SearchService;
pub use config::SearchConfig;
pub use error::{ConfigError, Error, NormalizationError, Result, SearchError};
