use std::sync::Arc;

use anyhow::Context;
use backend::{
    SearchConfig, SearchService,
    logging::{LoggingConfig, init_logging},
};
use chrono::Datelike;
use clap::Parser;
use common::search_query::{DateRange, FacetSelection, Pagination, SearchQuery, SortSpec, SubQuery};

#[derive(Parser, Debug)]
#[command(name = "search-index")]
#[command(about = "Search the repository index and print the normalized response")]
struct Args {
    /// Search terms; repeat for combined queries
    #[arg(long = "q")]
    terms: Vec<String>,

    /// Field for the matching --q ("all" or a configured field id)
    #[arg(long = "field")]
    fields: Vec<String>,

    /// Match type for the matching --q ("contains" or "is")
    #[arg(long = "type")]
    types: Vec<String>,

    /// Combinator for the matching --q ("or", "and" or "not")
    #[arg(long = "bool")]
    bools: Vec<String>,

    /// Selected facet value as facet=value
    #[arg(long = "facet", value_parser = parse_facet)]
    facets: Vec<(String, String)>,

    #[arg(long)]
    collection: Option<String>,

    #[arg(long)]
    page: Option<String>,

    #[arg(long = "page-size")]
    page_size: Option<String>,

    /// First year of the date range
    #[arg(long)]
    from: Option<String>,

    /// Last year of the date range
    #[arg(long)]
    to: Option<String>,

    /// Sort as field or field:order
    #[arg(long)]
    sort: Option<String>,

    /// Exact matching without fuzziness
    #[arg(long)]
    advanced: bool,

    /// Configuration file, defaults to $SEARCH_CONFIG_FILE
    #[arg(long)]
    config: Option<String>,
}

fn parse_facet(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((facet, value)) if !facet.is_empty() => Ok((facet.to_string(), value.to_string())),
        _ => Err(format!("expected facet=value, got {value:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(&LoggingConfig::from_env())?;
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let mut config = SearchConfig::load_from_path(path)?;
            config.apply_env_overrides();
            config.validate()?;
            config
        }
        None => SearchConfig::load()?,
    };
    let service = SearchService::from_config(Arc::new(config)).context("failed to create search client")?;

    let sort = match args.sort.as_deref() {
        Some(sort) => Some(SortSpec::parse(sort).with_context(|| format!("invalid sort {sort:?}"))?),
        None => None,
    };
    let query = SearchQuery {
        sub_queries: SubQuery::from_params(&args.terms, &args.fields, &args.types, &args.bools),
        facets: args.facets.into_iter().collect::<FacetSelection>(),
        collection: args.collection,
        pagination: Pagination::from_params(args.page.as_deref(), args.page_size.as_deref()),
        date_range: DateRange::from_params(args.from.as_deref(), args.to.as_deref(), chrono::Utc::now().year()),
        sort,
        is_advanced: args.advanced,
    };

    let response = service.search_index(&query).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
