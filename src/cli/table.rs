//! Table output for CLI list commands
//!
//! Human output goes through `tabled`; TSV and CSV stay single-line per
//! record so they pipe cleanly. JSON is handled by each command, since it
//! serializes the full entities rather than the table cells.

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::escape_csv;
use crate::cli::OutputFormat;

/// Rows of display cells under a fixed header
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render in the given (non-JSON) format
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Tsv => self.delimited("\t", |s| s.replace(['\t', '\n'], " ")),
            OutputFormat::Csv => self.delimited(",", escape_csv),
            OutputFormat::Auto | OutputFormat::Json => {
                let mut builder = Builder::default();
                builder.push_record(self.headers.iter().copied());
                for row in &self.rows {
                    builder.push_record(row.iter().map(|c| c.replace('\n', " ")));
                }
                builder.build().with(Style::sharp()).to_string()
            }
        }
    }

    fn delimited(&self, sep: &str, cell: impl Fn(&str) -> String) -> String {
        let mut out = self.headers.join(sep);
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| cell(c)).collect();
            out.push_str(&cells.join(sep));
            out.push('\n');
        }
        out
    }

    /// Print the table, plus a count line in human format
    ///
    /// `noun` is singular ("test case"); the count line reads "3 test case(s) found".
    pub fn print(&self, format: OutputFormat, noun: &str, quiet: bool) {
        if format == OutputFormat::Auto && self.is_empty() {
            if !quiet {
                println!("No {}(s) found.", noun);
            }
            return;
        }

        print!("{}", self.render(format));
        if format == OutputFormat::Auto {
            println!();
            if !quiet {
                println!("{} {}(s) found", style(self.rows.len()).cyan(), noun);
            }
        }
    }
}
