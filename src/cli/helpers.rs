//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use chrono::{DateTime, Utc};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Store, Workspace};
use crate::entities::Project;
use crate::import::ReferenceIndex;

/// Everything a command needs once the workspace is known
pub struct Session {
    pub workspace: Workspace,
    pub config: Config,
    pub store: Store,
}

impl Session {
    /// Discover the workspace, load configuration and open the database
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace = match &global.workspace {
            Some(path) => Workspace::discover_from(path),
            None => Workspace::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        let config = Config::load(Some(&workspace));
        let db_path = workspace.database_path(config.database.as_deref());
        let store = Store::open(&db_path).into_diagnostic()?;

        Ok(Self {
            workspace,
            config,
            store,
        })
    }

    /// Effective output format (`auto` falls back to the configured default)
    pub fn format(&self, global: &GlobalOpts) -> OutputFormat {
        global.format.resolve(self.config.default_format.as_deref())
    }

    /// Resolve a `--project` argument: id, then code, then name
    pub fn project(&self, reference: &str) -> Result<Project> {
        let projects = self.store.list_projects().into_diagnostic()?;
        let index = ReferenceIndex::from_parts(projects, Vec::new(), Vec::new());
        index
            .project(reference)
            .cloned()
            .ok_or_else(|| miette::miette!("No project matches '{}'", reference))
    }
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Short local-independent date for tables
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Display an optional value, or an empty string
pub fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("ünïcödé text", 6), "ünï...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_format_date_and_opt() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 23, 0, 0).unwrap();
        assert_eq!(format_date(&dt), "2024-03-09");
        assert_eq!(opt(&Some(5)), "5");
        assert_eq!(opt::<i64>(&None), "");
    }
}
