//! Export of test cases and defects in the import column layout
//!
//! References are written the way a person would type them (project code,
//! file name, user email), so an exported file re-imports into the same
//! workspace as a run of pure updates. A code or email that would resolve
//! to a different record on import is replaced by the numeric id.

use std::io::Write;

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde_json::Value;
use thiserror::Error;

use crate::core::format_timestamp;
use crate::entities::{Defect, EntityKind, TestCase};
use crate::import::columns::template_columns;
use crate::import::ReferenceIndex;

/// Errors raised while writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Header plus one text row per record
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn test_cases(records: &[TestCase], index: &ReferenceIndex) -> Self {
        let rows = records
            .iter()
            .map(|tc| {
                let f = &tc.fields;
                vec![
                    project_code(index, f.project_id),
                    f.test_case_id_code.clone(),
                    f.title.clone(),
                    text(&f.description),
                    text(&f.module),
                    text(&f.preconditions),
                    text(&f.steps),
                    text(&f.expected_result),
                    display(&f.priority),
                    display(&f.severity),
                    display(&f.complexity),
                    display(&f.status),
                    display(&f.estimated_minutes),
                    json_text(&f.test_data),
                    file_name(index, f.file_id),
                    user_email(index, f.author_id),
                    date(&f.created_date),
                ]
            })
            .collect();

        Self {
            headers: template_columns(EntityKind::TestCase),
            rows,
        }
    }

    pub fn defects(records: &[Defect], index: &ReferenceIndex) -> Self {
        let rows = records
            .iter()
            .map(|d| {
                let f = &d.fields;
                vec![
                    project_code(index, f.project_id),
                    f.defect_id_code.clone(),
                    f.title.clone(),
                    text(&f.description),
                    text(&f.module),
                    text(&f.steps_to_reproduce),
                    text(&f.expected_result),
                    text(&f.actual_result),
                    text(&f.environment),
                    display(&f.severity),
                    display(&f.priority),
                    display(&f.status),
                    text(&f.test_case_id_code),
                    json_text(&f.input_data),
                    file_name(index, f.file_id),
                    user_email(index, f.assigned_to_id),
                    user_email(index, f.reported_by_id),
                    date(&f.reported_date),
                    date(&f.due_date),
                    date(&f.resolved_date),
                ]
            })
            .collect();

        Self {
            headers: template_columns(EntityKind::Defect),
            rows,
        }
    }

    /// Write as delimited text
    pub fn write_delimited<W: Write>(&self, writer: W, delimiter: u8) -> Result<(), ExportError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Render a single-sheet XLSX workbook
    pub fn to_xlsx(&self, sheet_name: &str) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let mut worksheet = Worksheet::new();
        worksheet.set_name(sheet_name)?;

        let bold = Format::new().set_bold();
        for (c, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, c as u16, *header, &bold)?;
        }

        for (r, row) in self.rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet.write_string((r + 1) as u32, c as u16, value)?;
            }
        }

        workbook.push_worksheet(worksheet);
        Ok(workbook.save_to_buffer()?)
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn display<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

fn date(value: &Option<DateTime<Utc>>) -> String {
    value.as_ref().map(format_timestamp).unwrap_or_default()
}

/// Plain strings are written bare so they re-import as strings
fn json_text(value: &Option<Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
    }
}

/// Project code, or the id when the code reads as another project's id
fn project_code(index: &ReferenceIndex, id: i64) -> String {
    match index.project_by_id(id) {
        Some(p) if index.project(&p.code).map(|found| found.id) == Some(id) => p.code.clone(),
        _ => id.to_string(),
    }
}

fn file_name(index: &ReferenceIndex, id: Option<i64>) -> String {
    match id {
        Some(id) => index
            .file_by_id(id)
            .map(|f| f.name.clone())
            .unwrap_or_default(),
        None => String::new(),
    }
}

fn user_email(index: &ReferenceIndex, id: Option<i64>) -> String {
    match id {
        Some(id) => match index.user_by_id(id) {
            Some(u) if index.user(&u.email).map(|found| found.id) == Some(id) => u.email.clone(),
            _ => id.to_string(),
        },
        None => String::new(),
    }
}
