//! Logical search field resolution.

use common::search_const::DEFAULT_SEARCH_FIELD;

use crate::config::{FieldDescriptor, SearchConfig};
use crate::error::ConfigError;

/// Returns the index fields a logical field searches, in configuration order.
///
/// `"all"` expands to every configured search field. An id missing from
/// `search_fields` may still name the path of one of the `all` fields.
pub fn resolve_fields<'a>(config: &'a SearchConfig, logical_field: &str) -> Result<&'a [FieldDescriptor], ConfigError> {
    let logical_field = logical_field.trim();
    if logical_field.is_empty() || logical_field == DEFAULT_SEARCH_FIELD {
        return Ok(config.search_all_fields.as_slice());
    }
    if let Some(selection) = config.search_fields.get(logical_field) {
        return Ok(selection.as_slice());
    }
    config
        .search_all_fields
        .iter()
        .position(|field| field.path == logical_field)
        .map(|index| std::slice::from_ref(&config.search_all_fields[index]))
        .ok_or_else(|| ConfigError::UnknownField(logical_field.to_string()))
}
