//! `sift` - run a list query over a JSON file of records.
//!
//! ```text
//! sift --records products.json --query query.json
//! sift --records products.json --search "red chair" --sort price:desc --page 2 --limit 5
//! ```
//!
//! Records are a JSON array of objects. The query file holds a serialized
//! `ListQuery`; the flags override its parts. The resulting page is printed
//! as JSON. Set `RUST_LOG=sift=debug` to see pipeline counts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use sift::{
    EngineConfig, ListPage, ListQuery, PaginationSpec, QueryEngine, SearchSpec, Skipped, SortSpec,
};
use tracing_subscriber::EnvFilter;

/// Filter, search, sort and paginate a JSON record file
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON file holding an array of record objects
    #[arg(long)]
    records: PathBuf,

    /// JSON file holding the list query
    #[arg(long)]
    query: Option<PathBuf>,

    /// YAML (or .json) engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Free-text search, overrides the query file
    #[arg(long)]
    search: Option<String>,

    /// Sort keys as `field[:asc|:desc],...`, overrides the query file
    #[arg(long)]
    sort: Option<String>,

    /// Offset page number
    #[arg(long, conflicts_with = "after")]
    page: Option<i64>,

    /// Page size
    #[arg(long)]
    limit: Option<i64>,

    /// Continue from a cursor token
    #[arg(long)]
    after: Option<String>,

    /// Also print the excluded records and why
    #[arg(long)]
    explain: bool,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Debug, Serialize)]
struct Output {
    #[serde(flatten)]
    page: ListPage<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<Vec<Skipped>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = run(&cli)?;
    let text = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{}", text);
    Ok(())
}

fn run(cli: &Cli) -> Result<Output> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let records = load_records(&cli.records)?;
    let query = build_query(cli)?;
    tracing::debug!(records = records.len(), ?query, "running list query");

    let outcome = QueryEngine::new(&config).run(&records, &query);
    Ok(Output {
        page: outcome.to_page(),
        skipped: cli.explain.then(|| outcome.skipped.clone()),
    })
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let text = read(path)?;
    let config = if path.extension().is_some_and(|ext| ext == "json") {
        EngineConfig::from_json_str(&text)
    } else {
        EngineConfig::from_yaml_str(&text)
    };
    config.with_context(|| format!("invalid config {}", path.display()))
}

fn load_records(path: &Path) -> Result<Vec<Value>> {
    let text = read(path)?;
    let records: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array", path.display()))?;
    if let Some(index) = records.iter().position(|r| !r.is_object()) {
        bail!("record {} in {} is not an object", index, path.display());
    }
    Ok(records)
}

fn build_query(cli: &Cli) -> Result<ListQuery> {
    let mut query = match &cli.query {
        Some(path) => serde_json::from_str::<ListQuery>(&read(path)?)
            .with_context(|| format!("invalid query {}", path.display()))?,
        None => ListQuery::new(),
    };

    if let Some(text) = &cli.search {
        let fields = query.search.take().map(|s| s.fields).unwrap_or_default();
        query.search = Some(SearchSpec::new(text.as_str()).in_fields(fields));
    }
    if let Some(keys) = &cli.sort {
        query.sort = Some(SortSpec::parse(keys));
    }

    let limit = cli.limit.unwrap_or(0);
    if let Some(token) = &cli.after {
        query.pagination = Some(PaginationSpec::after(token.as_str(), limit));
    } else if let Some(page) = cli.page {
        query.pagination = Some(PaginationSpec::offset(page, limit));
    } else if cli.limit.is_some() {
        query.pagination = Some(match query.pagination.take() {
            Some(PaginationSpec::Cursor { token, .. }) => PaginationSpec::Cursor { token, limit },
            Some(PaginationSpec::Offset { page, .. }) => PaginationSpec::offset(page, limit),
            None => PaginationSpec::offset(1, limit),
        });
    }

    Ok(query)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}
