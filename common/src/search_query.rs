//! Shared search query models and helpers.

use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::search_const::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_FIELD};


/// How the terms of a sub-query are matched against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    Contains,
    Is,
}

impl MatchType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "contains" => Some(Self::Contains),
            "is" => Some(Self::Is),
            _ => None,
        }
    }
}

/// How a sub-query is combined with the rest of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    Or,
    And,
    Not,
}

impl Combinator {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "or" => Some(Self::Or),
            "and" => Some(Self::And),
            "not" => Some(Self::Not),
            _ => None,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubQuery {
    pub terms: String,
    /// `"all"` or a logical field id from the search configuration.
    pub field: String,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    #[serde(rename = "bool")]
    pub combinator: Combinator,
}

impl Default for SubQuery {
    fn default() -> Self {
        Self {
            terms: String::new(),
            field: DEFAULT_SEARCH_FIELD.to_string(),
            match_type: MatchType::default(),
            combinator: Combinator::default(),
        }
    }
}

impl SubQuery {
    pub fn new(terms: impl Into<String>, field: impl Into<String>, match_type: MatchType, combinator: Combinator) -> Self {
        Self { terms: terms.into(), field: field.into(), match_type, combinator }
    }

    /// Zips the repeated `q`, `field`, `type` and `bool` request parameters into sub-queries.
    ///
    /// The `terms` list drives the count; missing or unparseable entries in the other
    /// lists fall back to the defaults. No terms at all yields one empty sub-query.
    pub fn from_params(terms: &[String], fields: &[String], types: &[String], bools: &[String]) -> Vec<SubQuery> {
        if terms.is_empty() {
            return vec![SubQuery::default()];
        }
        terms
            .iter()
            .enumerate()
            .map(|(i, terms)| SubQuery {
                terms: terms.clone(),
                field: fields
                    .get(i)
                    .filter(|f| !f.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_SEARCH_FIELD.to_string()),
                match_type: types.get(i).and_then(|t| MatchType::parse(t)).unwrap_or_default(),
                combinator: bools.get(i).and_then(|b| Combinator::parse(b)).unwrap_or_default(),
            })
            .collect()
    }

    pub fn has_terms(&self) -> bool {
        !self.terms.trim().is_empty()
    }
}


/// Selected facet values, keyed by facet name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct FacetSelection(BTreeMap<String, BTreeSet<String>>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBreadcrumb {
    pub facet: String,
    pub value: String,
}

impl FacetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, facet: impl Into<String>, value: impl Into<String>) {
        self.0.entry(facet.into()).or_default().insert(value.into());
    }

    pub fn with(mut self, facet: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(facet, value);
        self
    }

    pub fn get(&self, facet: &str) -> Option<&BTreeSet<String>> {
        self.0.get(facet)
    }

    pub fn contains(&self, facet: &str, value: &str) -> bool {
        self.0.get(facet).is_some_and(|values| values.contains(value))
    }

    /// True when no facet carries a selected value.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|values| values.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.0.iter().filter(|(_, values)| !values.is_empty())
    }

    pub fn breadcrumbs(&self) -> Vec<FacetBreadcrumb> {
        self.iter()
            .flat_map(|(facet, values)| {
                values.iter().map(move |value| FacetBreadcrumb { facet: facet.clone(), value: value.clone() })
            })
            .collect()
    }
}

impl FromIterator<(String, String)> for FacetSelection {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut selection = FacetSelection::new();
        for (facet, value) in iter {
            selection.insert(facet, value);
        }
        selection
    }
}


/// Year range limiter. Only meaningful when `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: i32,
    pub to: i32,
}

impl DateRange {
    pub fn new(from: i32, to: i32) -> Option<Self> {
        let range = Self { from, to };
        range.is_valid().then_some(range)
    }

    pub fn is_valid(&self) -> bool {
        self.from < self.to
    }

    /// Builds a range from the `from` / `to` request parameters.
    ///
    /// A missing `from` means year 0 and a missing `to` means `current_year`,
    /// but at least one of them has to be present.
    pub fn from_params(from: Option<&str>, to: Option<&str>, current_year: i32) -> Option<Self> {
        if from.is_none() && to.is_none() {
            return None;
        }
        let from = match from {
            Some(value) => leading_year(value)?,
            None => 0,
        };
        let to = match to {
            Some(value) => leading_year(value)?,
            None => current_year,
        };
        Self::new(from, to)
    }
}

fn leading_year(value: &str) -> Option<i32> {
    let value = value.trim();
    let digits = value.find(|c: char| !c.is_ascii_digit()).unwrap_or(value.len());
    value[..digits].parse().ok()
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Logical sort key from the search configuration.
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    /// Parses `field` or `field:order`.
    pub fn parse(value: &str) -> Option<Self> {
        let (field, order) = match value.split_once(':') {
            Some((field, "asc")) => (field, SortOrder::Asc),
            Some((field, "desc")) => (field, SortOrder::Desc),
            Some(_) => return None,
            None => (value, SortOrder::Asc),
        };
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some(Self { field: field.to_string(), order })
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: NonZeroU32,
    pub page_size: NonZeroU32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: NonZeroU32::MIN,
            page_size: NonZeroU32::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Option<Self> {
        Some(Self { page: NonZeroU32::new(page)?, page_size: NonZeroU32::new(page_size)? })
    }

    /// Parses the `page` / `resultsPerPage` parameters; anything missing,
    /// non-numeric or zero falls back to the default.
    pub fn from_params(page: Option<&str>, page_size: Option<&str>) -> Self {
        let default = Self::default();
        let parse = |value: Option<&str>| value.and_then(|v| v.trim().parse::<NonZeroU32>().ok());
        Self {
            page: parse(page).unwrap_or(default.page),
            page_size: parse(page_size).unwrap_or(default.page_size),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page.get() as u64 - 1) * self.page_size.get() as u64
    }

    pub fn size(&self) -> u64 {
        self.page_size.get() as u64
    }
}


/// A complete inbound search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchQuery {
    pub sub_queries: Vec<SubQuery>,
    pub facets: FacetSelection,
    /// Collection pid to scope results to.
    pub collection: Option<String>,
    pub pagination: Pagination,
    pub date_range: Option<DateRange>,
    pub sort: Option<SortSpec>,
    /// Advanced searches match exactly, without fuzziness.
    pub is_advanced: bool,
}

impl SearchQuery {
    pub fn simple(terms: impl Into<String>) -> Self {
        Self {
            sub_queries: vec![SubQuery { terms: terms.into(), ..SubQuery::default() }],
            ..Self::default()
        }
    }

    pub fn has_terms(&self) -> bool {
        self.sub_queries.iter().any(SubQuery::has_terms)
    }

    /// The date range, if it is usable as a filter.
    pub fn valid_date_range(&self) -> Option<DateRange> {
        self.date_range.filter(DateRange::is_valid)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn sub_queries_from_params_apply_defaults_per_index() {
        let queries = SubQuery::from_params(
            &strings(&["smith", "jazz", "blues"]),
            &strings(&["creator"]),
            &strings(&["is", "bogus"]),
            &strings(&["or", "and", "not"]),
        );
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], SubQuery::new("smith", "creator", MatchType::Is, Combinator::Or));
        assert_eq!(queries[1], SubQuery::new("jazz", "all", MatchType::Contains, Combinator::And));
        assert_eq!(queries[2], SubQuery::new("blues", "all", MatchType::Contains, Combinator::Not));
    }

    #[test]
    fn no_terms_yields_one_empty_sub_query() {
        let queries = SubQuery::from_params(&[], &[], &[], &[]);
        assert_eq!(queries, vec![SubQuery::default()]);
        assert!(!queries[0].has_terms());
    }

    #[test]
    fn sub_query_deserializes_with_request_names() {
        let query: SubQuery = serde_json::from_str(r#"{"terms":"x","type":"is","bool":"not"}"#).unwrap();
        assert_eq!(query, SubQuery::new("x", "all", MatchType::Is, Combinator::Not));
    }

    #[test]
    fn date_range_requires_from_before_to() {
        assert_eq!(DateRange::new(1900, 1950), Some(DateRange { from: 1900, to: 1950 }));
        assert_eq!(DateRange::new(1950, 1950), None);
        assert_eq!(DateRange::new(1960, 1950), None);
    }

    #[test]
    fn date_range_from_params_uses_year_component() {
        assert_eq!(
            DateRange::from_params(Some("1901-05-01"), Some("1920"), 2026),
            Some(DateRange { from: 1901, to: 1920 })
        );
        assert_eq!(DateRange::from_params(None, Some("1920"), 2026), Some(DateRange { from: 0, to: 1920 }));
        assert_eq!(DateRange::from_params(Some("1990"), None, 2026), Some(DateRange { from: 1990, to: 2026 }));
        assert_eq!(DateRange::from_params(None, None, 2026), None);
        assert_eq!(DateRange::from_params(Some("abc"), Some("1920"), 2026), None);
        assert_eq!(DateRange::from_params(Some("1990"), Some("1980"), 2026), None);
    }

    #[test]
    fn pagination_offset() {
        for (page, size, offset) in [(1, 10, 0), (2, 10, 10), (5, 25, 100), (3, 1, 2)] {
            assert_eq!(Pagination::new(page, size).unwrap().offset(), offset);
        }
        assert_eq!(Pagination::new(0, 10), None);
        assert_eq!(Pagination::new(1, 0), None);
    }

    #[test]
    fn pagination_from_params_falls_back_to_defaults() {
        let pagination = Pagination::from_params(Some("abc"), Some("0"));
        assert_eq!(pagination, Pagination::default());
        assert_eq!(pagination.size(), DEFAULT_PAGE_SIZE as u64);

        let pagination = Pagination::from_params(Some("3"), Some("20"));
        assert_eq!(pagination.offset(), 40);
    }

    #[test]
    fn sort_spec_parse() {
        assert_eq!(SortSpec::parse("title"), Some(SortSpec { field: "title".into(), order: SortOrder::Asc }));
        assert_eq!(SortSpec::parse("date:desc"), Some(SortSpec { field: "date".into(), order: SortOrder::Desc }));
        assert_eq!(SortSpec::parse("date:sideways"), None);
        assert_eq!(SortSpec::parse(":desc"), None);
    }

    #[test]
    fn facet_breadcrumbs_follow_facet_order() {
        let selection = FacetSelection::new()
            .with("type", "image")
            .with("creator", "Smith")
            .with("type", "audio");
        let crumbs = selection.breadcrumbs();
        let pairs: Vec<_> = crumbs.iter().map(|c| (c.facet.as_str(), c.value.as_str())).collect();
        assert_eq!(pairs, vec![("creator", "Smith"), ("type", "audio"), ("type", "image")]);
        assert!(selection.contains("type", "image"));
        assert!(!selection.contains("type", "text"));
    }

    #[test]
    fn facet_selection_with_only_empty_sets_is_empty() {
        let selection: FacetSelection = serde_json::from_str(r#"{"type": []}"#).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.iter().count(), 0);
    }
}
