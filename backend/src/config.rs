//! Search configuration, loaded once at start-up and read-only afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE_ENV: &str = "SEARCH_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "search-config.json";

/// A searchable index field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(alias = "field")]
    pub path: String,
    #[serde(default)]
    pub boost: Option<f64>,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub is_nested_type: bool,
    /// Only count a match in `path` when this sibling field equals `match_term`.
    #[serde(default)]
    pub match_field: Option<String>,
    #[serde(default)]
    pub match_term: Option<String>,
}

impl FieldDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), boost: None, is_nested_type: false, match_field: None, match_term: None }
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn nested(mut self) -> Self {
        self.is_nested_type = true;
        self
    }

    pub fn with_match(mut self, match_field: impl Into<String>, match_term: impl Into<String>) -> Self {
        self.match_field = Some(match_field.into());
        self.match_term = Some(match_term.into());
        self
    }

    /// Parent document path used for nested queries, `names.namePart` -> `names`.
    pub fn nested_path(&self) -> Option<&str> {
        parent_path(&self.path)
    }

    /// The required sibling field and value, when both are set and non-empty.
    pub fn co_occurrence(&self) -> Option<(&str, &str)> {
        co_occurrence(self.match_field.as_deref(), self.match_term.as_deref())
    }
}

/// One descriptor or a group of descriptors under a single logical field id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSelection {
    One(FieldDescriptor),
    Many(Vec<FieldDescriptor>),
}

impl FieldSelection {
    pub fn as_slice(&self) -> &[FieldDescriptor] {
        match self {
            FieldSelection::One(field) => std::slice::from_ref(field),
            FieldSelection::Many(fields) => fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortField {
    pub path: String,
    #[serde(default)]
    pub match_field: Option<String>,
    #[serde(default)]
    pub match_term: Option<String>,
}

impl SortField {
    pub fn nested_path(&self) -> Option<&str> {
        parent_path(&self.path)
    }
}

/// Edit-distance tolerance for token matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fuzziness {
    Edits(u8),
    Named(String),
}

impl Default for Fuzziness {
    fn default() -> Self {
        Fuzziness::Named("AUTO".to_string())
    }
}

/// How selected facet values turn into filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FacetFilterMode {
    /// Every selected value is its own filter; a record must carry all of them.
    #[default]
    AllValues,
    /// Values of one facet are alternatives; distinct facets are still combined.
    AnyValueWithinFacet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_elasticsearch_url")]
    pub elasticsearch_url: String,
    pub public_index: String,
    #[serde(default)]
    pub index_type: Option<String>,
    #[serde(default)]
    pub root_url: String,

    #[serde(default)]
    pub search_all_fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub search_fields: BTreeMap<String, FieldSelection>,
    #[serde(default)]
    pub search_term_fuzziness: Fuzziness,

    /// Facet name to index field.
    #[serde(default)]
    pub facets: BTreeMap<String, String>,
    #[serde(default = "default_facet_limit")]
    pub facet_limit: u32,
    #[serde(default)]
    pub facet_filter_mode: FacetFilterMode,

    #[serde(default)]
    pub search_sort_fields: BTreeMap<String, SortField>,

    #[serde(default = "default_date_range_field")]
    pub date_range_field: String,
    #[serde(default = "default_collection_field")]
    pub collection_field: String,
    #[serde(default)]
    pub show_collection_objects_in_search_results: bool,

    #[serde(default = "default_display_record_field")]
    pub display_record_field: String,
    #[serde(default = "default_pid_separator")]
    pub pid_separator: char,
    #[serde(default = "default_no_title_placeholder")]
    pub no_title_placeholder: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_elasticsearch_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_facet_limit() -> u32 {
    200
}

fn default_date_range_field() -> String {
    "date".to_string()
}

fn default_collection_field() -> String {
    "is_member_of_collection".to_string()
}

fn default_display_record_field() -> String {
    "display_record".to_string()
}

fn default_pid_separator() -> char {
    ':'
}

fn default_no_title_placeholder() -> String {
    common::search_const::NO_TITLE_PLACEHOLDER.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl SearchConfig {
    /// A configuration with defaults everywhere except the index name.
    pub fn new(public_index: impl Into<String>) -> Self {
        Self {
            elasticsearch_url: default_elasticsearch_url(),
            public_index: public_index.into(),
            index_type: None,
            root_url: String::new(),
            search_all_fields: Vec::new(),
            search_fields: BTreeMap::new(),
            search_term_fuzziness: Fuzziness::default(),
            facets: BTreeMap::new(),
            facet_limit: default_facet_limit(),
            facet_filter_mode: FacetFilterMode::default(),
            search_sort_fields: BTreeMap::new(),
            date_range_field: default_date_range_field(),
            collection_field: default_collection_field(),
            show_collection_objects_in_search_results: false,
            display_record_field: default_display_record_field(),
            pid_separator: default_pid_separator(),
            no_title_placeholder: default_no_title_placeholder(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Loads the file named by `SEARCH_CONFIG_FILE` and applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_FILE_ENV).unwrap_or(DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::load_from_path(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ELASTICSEARCH_URL") {
            self.elasticsearch_url = url;
        }
        if let Ok(index) = std::env::var("ELASTICSEARCH_INDEX") {
            self.public_index = index;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.public_index.trim().is_empty() {
            return Err(ConfigError::Invalid("public_index must not be empty".to_string()));
        }
        if self.facet_limit == 0 {
            return Err(ConfigError::Invalid("facet_limit must be greater than zero".to_string()));
        }
        let configured = self
            .search_all_fields
            .iter()
            .chain(self.search_fields.values().flat_map(|selection| selection.as_slice()));
        for field in configured {
            if field.is_nested_type && field.nested_path().is_none() {
                return Err(ConfigError::InvalidNestedField(field.path.clone()));
            }
        }
        for (key, field) in &self.search_sort_fields {
            if field.match_field.as_deref().is_some_and(|f| !f.is_empty()) && field.nested_path().is_none() {
                return Err(ConfigError::InvalidNestedField(format!("{key}: {}", field.path)));
            }
        }
        Ok(())
    }
}

pub(crate) fn parent_path(path: &str) -> Option<&str> {
    path.rsplit_once('.').map(|(parent, _)| parent).filter(|parent| !parent.is_empty())
}

pub(crate) fn co_occurrence<'a>(field: Option<&'a str>, term: Option<&'a str>) -> Option<(&'a str, &'a str)> {
    match (field, term) {
        (Some(field), Some(term)) if !field.is_empty() && !term.is_empty() => Some((field, term)),
        _ => None,
    }
}

/// Older configuration files spell booleans as `"true"` / `"false"`.
fn bool_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }
    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => Ok(text.trim().eq_ignore_ascii_case("true")),
    }
}
