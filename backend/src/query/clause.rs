//! Per-sub-query clause construction.

use common::search_query::{MatchType, SubQuery};

use crate::config::{FieldDescriptor, SearchConfig};
use crate::error::ConfigError;
use crate::query::dsl::{Clause, MatchClause, Operator};
use crate::query::fields::resolve_fields;

/// Engine query semantics chosen once per sub-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Match,
    Phrase,
    Wildcard,
}

/// Sub-query terms after quote handling, ready to be applied to each field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTerms {
    pub kind: QueryKind,
    pub terms: String,
}

impl PreparedTerms {
    pub fn new(terms: &str, match_type: MatchType) -> Self {
        let trimmed = terms.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'));

        if let Some(inner) = unquoted {
            return Self { kind: QueryKind::Phrase, terms: inner.trim().to_string() };
        }
        if match_type == MatchType::Is {
            return Self { kind: QueryKind::Phrase, terms: trimmed.trim_matches('"').to_string() };
        }
        if trimmed.contains('*') {
            return Self { kind: QueryKind::Wildcard, terms: trimmed.to_string() };
        }
        Self { kind: QueryKind::Match, terms: trimmed.to_string() }
    }

    fn is_numeric(&self) -> bool {
        self.terms.chars().any(|c| c.is_ascii_digit())
            && self.terms.chars().all(|c| c.is_ascii_digit() || c.is_whitespace())
    }
}

pub struct ClauseBuilder<'a> {
    config: &'a SearchConfig,
    is_advanced: bool,
}

impl<'a> ClauseBuilder<'a> {
    pub fn new(config: &'a SearchConfig, is_advanced: bool) -> Self {
        Self { config, is_advanced }
    }

    /// One clause per resolved field, in field order. The caller decides how
    /// they are joined. Terms that are empty once quotes are removed produce no clauses.
    pub fn build_sub_query(&self, sub_query: &SubQuery) -> Result<Vec<Clause>, ConfigError> {
        let prepared = PreparedTerms::new(&sub_query.terms, sub_query.match_type);
        if prepared.terms.is_empty() {
            return Ok(Vec::new());
        }
        let fields = resolve_fields(self.config, &sub_query.field)?;
        Ok(fields.iter().map(|field| self.build_clause(&prepared, field)).collect())
    }

    pub fn build_clause(&self, prepared: &PreparedTerms, field: &FieldDescriptor) -> Clause {
        let base = match prepared.kind {
            QueryKind::Phrase => Clause::phrase(&field.path, &prepared.terms),
            QueryKind::Wildcard => Clause::Wildcard { field: field.path.clone(), value: prepared.terms.clone() },
            QueryKind::Match => Clause::Match(MatchClause {
                field: field.path.clone(),
                query: prepared.terms.clone(),
                operator: Operator::Or,
                fuzziness: (!self.is_advanced && !prepared.is_numeric())
                    .then(|| self.config.search_term_fuzziness.clone()),
                boost: field.boost,
            }),
        };

        let clause = match field.co_occurrence() {
            Some((match_field, match_term)) => Clause::must(vec![base, Clause::phrase(match_field, match_term)]),
            None => base,
        };

        match field.nested_path() {
            Some(path) if field.is_nested_type => Clause::nested(path, clause),
            _ => clause,
        }
    }
}
