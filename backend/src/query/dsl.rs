//! Typed search-engine query DSL.
//!
//! Clauses are built as plain Rust values and only turned into engine JSON
//! when the request body is serialized.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::config::Fuzziness;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Or,
    And,
}

impl Operator {
    fn as_str(&self) -> &'static str {
        match self {
            Operator::Or => "or",
            Operator::And => "and",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    Avg,
    Max,
    Sum,
}

impl ScoreMode {
    fn as_str(&self) -> &'static str {
        match self {
            ScoreMode::Avg => "avg",
            ScoreMode::Max => "max",
            ScoreMode::Sum => "sum",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchClause {
    pub field: String,
    pub query: String,
    pub operator: Operator,
    pub fuzziness: Option<Fuzziness>,
    pub boost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    MatchAll,
    /// Token match.
    Match(MatchClause),
    /// Exact sequence match.
    Phrase { field: String, query: String },
    Wildcard { field: String, value: String },
    Term { field: String, value: String },
    Exists { field: String },
    /// Inclusive year range.
    YearRange { field: String, from: i32, to: i32 },
    Nested { path: String, score_mode: ScoreMode, query: Box<Clause> },
    Bool(BoolQuery),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoolQuery {
    pub must: Vec<Clause>,
    pub should: Vec<Clause>,
    pub must_not: Vec<Clause>,
    pub filter: Vec<Clause>,
}

impl BoolQuery {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty() && self.filter.is_empty()
    }

    pub fn into_clause(self) -> Clause {
        Clause::Bool(self)
    }
}

impl Clause {
    pub fn phrase(field: impl Into<String>, query: impl Into<String>) -> Self {
        Clause::Phrase { field: field.into(), query: query.into() }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Clause::Exists { field: field.into() }
    }

    pub fn must(clauses: Vec<Clause>) -> Self {
        Clause::Bool(BoolQuery { must: clauses, ..BoolQuery::default() })
    }

    pub fn should(clauses: Vec<Clause>) -> Self {
        Clause::Bool(BoolQuery { should: clauses, ..BoolQuery::default() })
    }

    pub fn nested(path: impl Into<String>, query: Clause) -> Self {
        Clause::Nested { path: path.into(), score_mode: ScoreMode::Avg, query: Box::new(query) }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Clause::MatchAll => json!({ "match_all": {} }),
            Clause::Match(m) => {
                let mut params = Map::new();
                params.insert("query".to_string(), json!(m.query));
                params.insert("operator".to_string(), json!(m.operator.as_str()));
                if let Some(fuzziness) = &m.fuzziness {
                    params.insert("fuzziness".to_string(), json!(fuzziness));
                }
                if let Some(boost) = m.boost {
                    params.insert("boost".to_string(), json!(boost));
                }
                json!({ "match": { m.field.clone(): params } })
            }
            Clause::Phrase { field, query } => json!({ "match_phrase": { field.clone(): query } }),
            Clause::Wildcard { field, value } => json!({ "wildcard": { field.clone(): value } }),
            Clause::Term { field, value } => json!({ "term": { field.clone(): value } }),
            Clause::Exists { field } => json!({ "exists": { "field": field } }),
            Clause::YearRange { field, from, to } => json!({
                "range": {
                    field.clone(): {
                        "gte": from.to_string(),
                        "lte": to.to_string(),
                        "format": "yyyy"
                    }
                }
            }),
            Clause::Nested { path, score_mode, query } => json!({
                "nested": {
                    "path": path,
                    "score_mode": score_mode.as_str(),
                    "query": query.to_json()
                }
            }),
            Clause::Bool(b) => {
                let mut params = Map::new();
                for (name, clauses) in [("must", &b.must), ("should", &b.should), ("must_not", &b.must_not), ("filter", &b.filter)] {
                    if !clauses.is_empty() {
                        params.insert(name.to_string(), Value::Array(clauses.iter().map(Clause::to_json).collect()));
                    }
                }
                json!({ "bool": params })
            }
        }
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}


#[derive(Debug, Clone, PartialEq)]
pub struct NestedSort {
    pub path: String,
    pub filter: Clause,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortClause {
    pub field: String,
    pub order: common::search_query::SortOrder,
    pub nested: Option<NestedSort>,
}

impl Serialize for SortClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut params = Map::new();
        params.insert("order".to_string(), json!(self.order.as_str()));
        if let Some(nested) = &self.nested {
            params.insert("nested_path".to_string(), json!(nested.path));
            params.insert("nested_filter".to_string(), nested.filter.to_json());
        }
        json!({ self.field.clone(): params }).serialize(serializer)
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermsAggregation {
    pub field: String,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub terms: TermsAggregation,
}
