//! Search API: the search service and response shaping.

mod search_index;
pub use search_index::SearchService;

mod search_for_results;
pub use search_for_results::{normalize_response, thumbnail_uri};

mod search_facets;
pub use search_facets::clean_facets;
