//! anysearch command-line client
//!
//! Runs searches against a SQLite database holding the search views and the
//! realm and schema metadata tables.

mod formatter;

use std::path::PathBuf;
use std::sync::Arc;

use anysearch_core::proto::{
    AnyKind, AttrOp, FieldCond, OrderDirection, OrderSpec, PageRequest, Predicate, SearchCond,
};
use anysearch_core::{RealmDirectory, SearchConfig, SearchEngine, SqliteStore};
use clap::{Parser, ValueEnum};
use formatter::OutputFormat;
use thiserror::Error;
use tracing::debug;

/// anysearch command-line client
#[derive(Parser, Debug)]
#[command(name = "anysearch")]
#[command(version, about = "Search identities in a SQLite search-view database")]
pub struct Args {
    /// SQLite database file
    #[arg(long)]
    pub db: PathBuf,

    /// Identity kind to search
    #[arg(long, value_enum, default_value = "user")]
    pub kind: KindArg,

    /// Condition as JSON; matches every identity when omitted
    #[arg(long)]
    pub cond: Option<String>,

    /// Full path of the search base realm
    #[arg(long, default_value = "/")]
    pub base: String,

    /// Admin realm scope (repeatable); none means unrestricted
    #[arg(long = "scope")]
    pub scopes: Vec<String>,

    /// Include realms below the base realm
    #[arg(long)]
    pub recursive: bool,

    /// Page number, starting at 0
    #[arg(long)]
    pub page: Option<u32>,

    /// Page size
    #[arg(long, default_value_t = 25)]
    pub size: u32,

    /// Sort clause `property[:asc|:desc]` (repeatable)
    #[arg(long = "sort")]
    pub sort: Vec<String>,

    /// Only print the number of matches
    #[arg(long)]
    pub count: bool,

    /// Print the generated SQL instead of running it
    #[arg(long)]
    pub explain: bool,

    /// JSON search configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

/// Identity kinds accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    User,
    Group,
    AnyObject,
}

impl From<KindArg> for AnyKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::User => AnyKind::User,
            KindArg::Group => AnyKind::Group,
            KindArg::AnyObject => AnyKind::AnyObject,
        }
    }
}

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid sort clause '{0}', expected property[:asc|:desc]")]
    InvalidSort(String),

    #[error("base realm {0} not found")]
    UnknownBase(String),

    #[error("invalid condition: {0}")]
    Condition(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Search(#[from] anysearch_core::Error),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("anysearch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            SearchConfig::from_json(&json)?
        }
        None => SearchConfig::default(),
    };

    debug!(db = %args.db.display(), kind = ?args.kind, "Opening search database");
    let store = Arc::new(SqliteStore::open(&args.db)?);
    let base = store
        .find_by_full_path(&args.base)?
        .ok_or_else(|| CliError::UnknownBase(args.base.clone()))?;
    let engine = SearchEngine::new(store.clone(), store.clone(), store, config);

    let kind = AnyKind::from(args.kind);
    let cond = parse_cond(args.cond.as_deref())?;
    let mut request = match args.page {
        Some(page) => PageRequest::of(page, args.size),
        None => PageRequest::unpaged(),
    };
    for clause in &args.sort {
        request = request.with_order(parse_sort(clause)?);
    }

    if args.explain {
        let count = engine.count_statement(&base, args.recursive, &args.scopes, &cond, kind)?;
        println!("{}", formatter::format_statement("count", &count));
        if !args.count {
            let search =
                engine.search_statement(&base, args.recursive, &args.scopes, &cond, &request, kind)?;
            println!("{}", formatter::format_statement("search", &search));
        }
        return Ok(());
    }

    if args.count {
        let total = engine.count(&base, args.recursive, &args.scopes, &cond, kind)?;
        println!("{}", formatter::format_count(args.format, total));
        return Ok(());
    }

    let page = engine.search_page(&base, args.recursive, &args.scopes, &cond, &request, kind)?;
    let offset = args.page.map_or(0, |p| u64::from(p) * u64::from(args.size));
    println!("{}", formatter::format_page(args.format, &page, offset));
    Ok(())
}

fn parse_cond(json: Option<&str>) -> Result<SearchCond, CliError> {
    match json {
        Some(json) => Ok(serde_json::from_str(json)?),
        None => Ok(SearchCond::leaf(Predicate::Field(FieldCond::new(
            "key",
            AttrOp::IsNotNull,
        )))),
    }
}

fn parse_sort(clause: &str) -> Result<OrderSpec, CliError> {
    let (property, direction) = match clause.split_once(':') {
        Some((property, direction)) => (property, direction),
        None => (clause, "asc"),
    };
    if property.is_empty() {
        return Err(CliError::InvalidSort(clause.to_string()));
    }
    let direction = match direction.to_ascii_lowercase().as_str() {
        "asc" => OrderDirection::Asc,
        "desc" => OrderDirection::Desc,
        _ => return Err(CliError::InvalidSort(clause.to_string())),
    };
    Ok(OrderSpec {
        property: property.to_string(),
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("username").unwrap(), OrderSpec::asc("username"));
        assert_eq!(parse_sort("email:DESC").unwrap(), OrderSpec::desc("email"));
        assert!(parse_sort("email:sideways").is_err());
        assert!(parse_sort(":asc").is_err());
    }

    #[test]
    fn test_parse_cond() {
        let cond = parse_cond(Some(
            r#"{"leaf":{"type":"attr","schema":"email","op":"ILIKE","expression":"%@acme.com"}}"#,
        ))
        .unwrap();
        assert_eq!(
            cond,
            SearchCond::leaf(Predicate::attr("email", AttrOp::Ilike, "%@acme.com"))
        );
        assert_eq!(parse_cond(None).unwrap().leaf_count(), 1);
        assert!(parse_cond(Some("{}")).is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "anysearch",
            "--db",
            "ids.db",
            "--kind",
            "any-object",
            "--scope",
            "/",
            "--scope",
            "vip",
            "--recursive",
            "--sort",
            "name:desc",
        ])
        .unwrap();
        assert_eq!(args.kind, KindArg::AnyObject);
        assert_eq!(args.scopes, vec!["/", "vip"]);
        assert!(args.recursive);
        assert_eq!(args.format, OutputFormat::Table);
    }
}
