//! Composition of sub-queries, facet filters and visibility rules into one query.

use common::search_query::{Combinator, DateRange, SearchQuery};
use tracing::warn;

use crate::config::SearchConfig;
use crate::query::clause::ClauseBuilder;
use crate::query::dsl::{BoolQuery, Clause, MatchClause, Operator};
use crate::query::facet_filter::{FacetFilterStrategy, facet_filters, strategy_for};

pub const OBJECT_TYPE_FIELD: &str = "object_type";
pub const COLLECTION_OBJECT_TYPE: &str = "collection";
/// Present on records that are parts of a compound object.
pub const CHILD_OF_COMPOUND_FIELD: &str = "is_child_of";

pub struct QueryComposer<'a> {
    config: &'a SearchConfig,
    facet_strategy: &'a dyn FacetFilterStrategy,
}

impl<'a> QueryComposer<'a> {
    /// Uses the facet filter strategy selected in the configuration.
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config, facet_strategy: strategy_for(config.facet_filter_mode) }
    }

    pub fn with_facet_strategy(config: &'a SearchConfig, facet_strategy: &'a dyn FacetFilterStrategy) -> Self {
        Self { config, facet_strategy }
    }

    pub fn compose(&self, query: &SearchQuery) -> Clause {
        let terms = self.compose_terms(query);
        let has_terms = !terms.is_empty();

        let mut filters = facet_filters(self.config, &query.facets, self.facet_strategy);
        if let Some(range) = query.valid_date_range() {
            filters.push(self.date_range_filter(range));
        }
        if let Some(collection) = query.collection.as_deref().filter(|c| !c.is_empty()) {
            filters.push(Clause::phrase(&self.config.collection_field, collection));
        }

        let mut restrictions = Vec::new();
        if !self.config.show_collection_objects_in_search_results {
            restrictions.push(collection_objects());
        }
        restrictions.push(Clause::exists(CHILD_OF_COMPOUND_FIELD));

        if has_terms || !query.facets.is_empty() {
            return BoolQuery { must: vec![terms.into_clause()], must_not: restrictions, filter: filters, ..BoolQuery::default() }
                .into_clause();
        }

        // Nothing to match on: every item that is not a collection.
        if self.config.show_collection_objects_in_search_results {
            restrictions.push(collection_objects());
        }
        BoolQuery { must: vec![Clause::MatchAll], must_not: restrictions, filter: filters, ..BoolQuery::default() }
            .into_clause()
    }

    /// The free-text part of the query. Sub-queries are applied in input order.
    ///
    /// `or` clauses are all alternatives of the top level. `and` sub-queries are
    /// collected into one conjunction that is itself a top-level alternative,
    /// with a multi-field sub-query contributing a single any-field entry.
    /// `not` clauses exclude matching records.
    pub fn compose_terms(&self, query: &SearchQuery) -> BoolQuery {
        let builder = ClauseBuilder::new(self.config, query.is_advanced);
        let mut should = Vec::new();
        let mut conjunction = Vec::new();
        let mut must_not = Vec::new();

        for sub_query in &query.sub_queries {
            let mut clauses = match builder.build_sub_query(sub_query) {
                Ok(clauses) => clauses,
                Err(e) => {
                    warn!("skipping sub-query {:?}: {}", sub_query.terms, e);
                    continue;
                }
            };
            if clauses.is_empty() {
                continue;
            }
            match sub_query.combinator {
                Combinator::Or => should.append(&mut clauses),
                Combinator::And => {
                    if clauses.len() > 1 {
                        conjunction.push(Clause::should(clauses));
                    } else {
                        conjunction.append(&mut clauses);
                    }
                }
                Combinator::Not => must_not.append(&mut clauses),
            }
        }

        if !conjunction.is_empty() {
            should.push(Clause::must(conjunction));
        }
        BoolQuery { should, must_not, ..BoolQuery::default() }
    }

    pub fn date_range_filter(&self, range: DateRange) -> Clause {
        Clause::YearRange { field: self.config.date_range_field.clone(), from: range.from, to: range.to }
    }
}

fn collection_objects() -> Clause {
    Clause::Match(MatchClause {
        field: OBJECT_TYPE_FIELD.to_string(),
        query: COLLECTION_OBJECT_TYPE.to_string(),
        operator: Operator::Or,
        fuzziness: None,
        boost: None,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use common::search_query::{FacetSelection, MatchType, SubQuery};
    use serde_json::{Value, json};

    use crate::config::{FacetFilterMode, FieldDescriptor, FieldSelection};
    use crate::query::facet_filter::AnyValueWithinFacet;

    fn config() -> SearchConfig {
        let mut config = SearchConfig::new("repo");
        config.search_all_fields = vec![FieldDescriptor::new("title"), FieldDescriptor::new("creator")];
        config.search_fields.insert("title".into(), FieldSelection::One(FieldDescriptor::new("title")));
        config.search_fields.insert("creator".into(), FieldSelection::One(FieldDescriptor::new("creator")));
        config.facets.insert("Type".into(), "type".into());
        config.facets.insert("Creator".into(), "creator".into());
        config
    }

    fn query(sub_queries: Vec<SubQuery>) -> SearchQuery {
        SearchQuery { sub_queries, is_advanced: true, ..SearchQuery::default() }
    }

    fn phrase(terms: &str, field: &str, combinator: Combinator) -> SubQuery {
        SubQuery::new(format!("\"{terms}\""), field, MatchType::Contains, combinator)
    }

    fn must_not(composed: &Value) -> &Vec<Value> {
        composed["bool"]["must_not"].as_array().unwrap()
    }

    #[test]
    fn or_sub_queries_are_flattened_into_should() {
        let config = config();
        let terms = QueryComposer::new(&config).compose_terms(&query(vec![
            phrase("smith", "all", Combinator::Or),
            phrase("jones", "title", Combinator::Or),
        ]));
        assert_eq!(
            terms.should,
            vec![
                Clause::phrase("title", "smith"),
                Clause::phrase("creator", "smith"),
                Clause::phrase("title", "jones"),
            ]
        );
        assert!(terms.must.is_empty() && terms.must_not.is_empty());
    }

    #[test]
    fn and_sub_queries_form_one_conjunction_alternative() {
        let config = config();
        let terms = QueryComposer::new(&config).compose_terms(&query(vec![
            phrase("jazz", "title", Combinator::Or),
            phrase("smith", "all", Combinator::And),
            phrase("1920s", "title", Combinator::And),
        ]));
        assert_eq!(
            terms.should,
            vec![
                Clause::phrase("title", "jazz"),
                Clause::must(vec![
                    Clause::should(vec![Clause::phrase("title", "smith"), Clause::phrase("creator", "smith")]),
                    Clause::phrase("title", "1920s"),
                ]),
            ]
        );
    }

    #[test]
    fn conjunction_entries_follow_input_order() {
        let config = config();
        let terms = QueryComposer::new(&config).compose_terms(&query(vec![
            phrase("first", "title", Combinator::And),
            phrase("second", "creator", Combinator::And),
        ]));
        assert_eq!(
            terms.should,
            vec![Clause::must(vec![Clause::phrase("title", "first"), Clause::phrase("creator", "second")])]
        );
    }

    #[test]
    fn not_sub_queries_go_to_must_not() {
        let config = config();
        let terms = QueryComposer::new(&config).compose_terms(&query(vec![
            phrase("jazz", "title", Combinator::Or),
            phrase("blues", "all", Combinator::Not),
        ]));
        assert_eq!(terms.should, vec![Clause::phrase("title", "jazz")]);
        assert_eq!(terms.must_not, vec![Clause::phrase("title", "blues"), Clause::phrase("creator", "blues")]);
    }

    #[test]
    fn unknown_field_sub_query_is_skipped() {
        let config = config();
        let terms = QueryComposer::new(&config).compose_terms(&query(vec![
            phrase("x", "shoe_size", Combinator::Or),
            phrase("jazz", "title", Combinator::Or),
        ]));
        assert_eq!(terms.should, vec![Clause::phrase("title", "jazz")]);
    }

    #[test]
    fn restrictions_exclude_collections_and_compound_children() {
        let config = config();
        let composed = QueryComposer::new(&config).compose(&query(vec![phrase("smith", "all", Combinator::Or)])).to_json();
        assert_eq!(
            must_not(&composed),
            &vec![
                json!({ "match": { "object_type": { "query": "collection", "operator": "or" } } }),
                json!({ "exists": { "field": "is_child_of" } }),
            ]
        );
        assert!(composed["bool"].get("filter").is_none());
    }

    #[test]
    fn collections_may_be_shown_but_compound_children_never() {
        let mut config = config();
        config.show_collection_objects_in_search_results = true;
        let composed = QueryComposer::new(&config).compose(&query(vec![phrase("smith", "all", Combinator::Or)])).to_json();
        assert_eq!(must_not(&composed), &vec![json!({ "exists": { "field": "is_child_of" } })]);
    }

    #[test]
    fn empty_terms_without_facets_match_all_non_collections() {
        let mut config = config();
        config.show_collection_objects_in_search_results = true;
        let composed = QueryComposer::new(&config).compose(&query(vec![SubQuery::default()])).to_json();
        assert_eq!(composed["bool"]["must"], json!([{ "match_all": {} }]));
        let restrictions = must_not(&composed);
        assert!(restrictions.contains(&json!({ "exists": { "field": "is_child_of" } })));
        assert!(restrictions.contains(&json!({ "match": { "object_type": { "query": "collection", "operator": "or" } } })));
    }

    #[test]
    fn facets_and_date_range_become_filters() {
        let config = config();
        let mut search = query(vec![SubQuery::default()]);
        search.facets = FacetSelection::new().with("Type", "image").with("Type", "text");
        search.date_range = DateRange::new(1900, 1950);
        let composed = QueryComposer::new(&config).compose(&search).to_json();
        assert_eq!(composed["bool"]["must"], json!([{ "bool": {} }]));
        assert_eq!(
            composed["bool"]["filter"],
            json!([
                { "match_phrase": { "type": "image" } },
                { "match_phrase": { "type": "text" } },
                { "range": { "date": { "gte": "1900", "lte": "1950", "format": "yyyy" } } }
            ])
        );
    }

    #[test]
    fn configured_facet_mode_is_used() {
        let mut config = config();
        config.facet_filter_mode = FacetFilterMode::AnyValueWithinFacet;
        let mut search = query(vec![phrase("smith", "title", Combinator::Or)]);
        search.facets = FacetSelection::new().with("Type", "image").with("Type", "text");
        let by_config = QueryComposer::new(&config).compose(&search);
        let explicit = QueryComposer::with_facet_strategy(&config, &AnyValueWithinFacet).compose(&search);
        assert_eq!(by_config, explicit);
        assert_eq!(
            by_config.to_json()["bool"]["filter"],
            json!([{ "bool": { "should": [
                { "match_phrase": { "type": "image" } },
                { "match_phrase": { "type": "text" } }
            ] } }])
        );
    }

    #[test]
    fn invalid_date_range_is_ignored() {
        let config = config();
        let mut search = query(vec![phrase("smith", "title", Combinator::Or)]);
        search.date_range = Some(DateRange { from: 1950, to: 1950 });
        let composed = QueryComposer::new(&config).compose(&search).to_json();
        assert!(composed["bool"].get("filter").is_none());
    }

    #[test]
    fn collection_scope_filters_on_membership() {
        let config = config();
        let mut search = query(vec![phrase("smith", "title", Combinator::Or)]);
        search.collection = Some("codu:123".into());
        let composed = QueryComposer::new(&config).compose(&search).to_json();
        assert_eq!(composed["bool"]["filter"], json!([{ "match_phrase": { "is_member_of_collection": "codu:123" } }]));
    }
}
