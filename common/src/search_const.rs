//! Defaults shared by request parsing and the backend.

pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub const DEFAULT_SEARCH_FIELD: &str = "all";

pub const NO_TITLE_PLACEHOLDER: &str = "No Title";
