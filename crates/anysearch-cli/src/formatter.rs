//! Output formatters for search results.

use anysearch_core::query::Statement;
use anysearch_core::SearchPage;
use clap::ValueEnum;
use comfy_table::Table;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Render a page of keys.
pub fn format_page(format: OutputFormat, page: &SearchPage, offset: u64) -> String {
    match format {
        OutputFormat::Table => {
            if page.keys.is_empty() {
                return format!("No results ({} total)", page.total);
            }
            let mut table = Table::new();
            table.set_header(vec!["#", "key"]);
            for (i, key) in page.keys.iter().enumerate() {
                table.add_row(vec![(offset + i as u64 + 1).to_string(), key.clone()]);
            }
            format!("{table}\n{} of {} shown", page.keys.len(), page.total)
        }
        OutputFormat::Json => serde_json::to_string_pretty(page).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")),
        OutputFormat::Csv => {
            let mut output = String::from("key\n");
            for key in &page.keys {
                output.push_str(&csv_escape(key));
                output.push('\n');
            }
            output
        }
    }
}

/// Render a count.
pub fn format_count(format: OutputFormat, total: u64) -> String {
    match format {
        OutputFormat::Table => format!("{total} match(es)"),
        OutputFormat::Json => serde_json::json!({ "total": total }).to_string(),
        OutputFormat::Csv => format!("total\n{total}\n"),
    }
}

/// Render a statement for `--explain`.
pub fn format_statement(label: &str, statement: &Statement) -> String {
    let params: Vec<String> = statement.query.params().iter().map(ToString::to_string).collect();
    let mut output = format!("-- {label}\n{}\n-- params: [{}]", statement.query.sql(), params.join(", "));
    if let Some((offset, limit)) = statement.page {
        output.push_str(&format!("\n-- offset {offset}, limit {limit}"));
    }
    output
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> SearchPage {
        SearchPage {
            keys: vec!["u1".into(), "a,b".into()],
            total: 7,
        }
    }

    #[test]
    fn test_csv() {
        assert_eq!(format_page(OutputFormat::Csv, &page(), 0), "key\nu1\n\"a,b\"\n");
    }

    #[test]
    fn test_json() {
        let json: serde_json::Value =
            serde_json::from_str(&format_page(OutputFormat::Json, &page(), 0)).unwrap();
        assert_eq!(json["total"], 7);
        assert_eq!(json["keys"][0], "u1");
    }

    #[test]
    fn test_table_numbers_rows_from_offset() {
        let output = format_page(OutputFormat::Table, &page(), 10);
        assert!(output.contains("11"));
        assert!(output.ends_with("2 of 7 shown"));
        assert_eq!(format_count(OutputFormat::Table, 3), "3 match(es)");
    }
}
