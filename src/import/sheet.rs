//! Tabular file parsing
//!
//! Turns uploaded bytes into header-keyed rows. Malformed records never
//! abort parsing; they are collected as parse errors and forwarded
//! untouched in the import summary.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use serde_json::Value;

/// A loosely-typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Blank,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Trim text; whitespace-only becomes [`Cell::Blank`]
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Cell::Blank
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Blank)
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Blank,
            Value::String(s) => Cell::from_text(s),
            Value::Number(n) => n
                .as_f64()
                .map(Cell::Number)
                .unwrap_or_else(|| Cell::Text(n.to_string())),
            Value::Bool(b) => Cell::Text(b.to_string()),
            Value::Array(_) | Value::Object(_) => Cell::Text(value.to_string()),
        }
    }

    /// Dates stay numeric (day serials) so they take the serial conversion path
    fn from_workbook(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Blank,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::Error(e) => Cell::Text(e.to_string()),
        }
    }
}

static BLANK: Cell = Cell::Blank;

/// One data row, keyed by header name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    /// Spreadsheet row number; the header is row 1, so data starts at 2
    pub row: usize,
    pub cells: HashMap<String, Cell>,
}

impl SheetRow {
    /// Build a row from text pairs (blank text becomes [`Cell::Blank`])
    pub fn from_pairs(row: usize, pairs: &[(&str, &str)]) -> Self {
        Self {
            row,
            cells: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Cell::from_text(v)))
                .collect(),
        }
    }

    /// Cell for an exact (case-sensitive) column name; missing columns read as blank
    pub fn get(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&BLANK)
    }

    fn is_empty(&self) -> bool {
        self.cells.values().all(Cell::is_blank)
    }
}

/// Result of parsing one file
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
    pub errors: Vec<String>,
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SheetFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// JSON array of row objects (or `{"rows": [...]}`)
    Json,
    /// Spreadsheet workbook (xlsx, xlsm, xls or ods); first sheet only
    Xlsx,
}

impl SheetFormat {
    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "csv" => Some(SheetFormat::Csv),
            "tsv" | "tab" => Some(SheetFormat::Tsv),
            "json" => Some(SheetFormat::Json),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(SheetFormat::Xlsx),
            _ => None,
        }
    }
}

/// Parse a file's bytes into rows
pub fn parse_sheet(bytes: &[u8], format: SheetFormat) -> ParsedSheet {
    let sheet = match format {
        SheetFormat::Csv => parse_delimited(bytes, b','),
        SheetFormat::Tsv => parse_delimited(bytes, b'\t'),
        SheetFormat::Json => parse_json(bytes),
        SheetFormat::Xlsx => parse_workbook(bytes),
    };
    tracing::debug!(
        rows = sheet.rows.len(),
        errors = sheet.errors.len(),
        "parsed sheet"
    );
    sheet
}

fn parse_delimited(bytes: &[u8], delimiter: u8) -> ParsedSheet {
    let mut sheet = ParsedSheet::default();

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = match rdr.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            sheet.errors.push(format!("Unable to read header row: {}", e));
            return sheet;
        }
    };

    // Column index for each distinct header; the first occurrence wins
    let mut columns: Vec<(usize, String)> = Vec::new();
    for (i, raw) in headers.iter().enumerate() {
        let name = raw.trim_start_matches('\u{feff}').trim().to_string();
        if name.is_empty() {
            continue;
        }
        if sheet.headers.contains(&name) {
            sheet
                .errors
                .push(format!("Duplicate column '{}' ignored", name));
            continue;
        }
        sheet.headers.push(name.clone());
        columns.push((i, name));
    }

    if columns.is_empty() {
        sheet.errors.push("File has no header row".to_string());
        return sheet;
    }

    let mut last_line = 1;
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(last_line + 1);
                last_line = line;
                sheet.errors.push(format!("Row {}: {}", line, e));
                continue;
            }
        };

        // Physical line of the record's start, so skipped empty lines still count
        let row_num = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(last_line + 1);
        last_line = row_num;

        let row = SheetRow {
            row: row_num,
            cells: columns
                .iter()
                .map(|(i, name)| {
                    let cell = record.get(*i).map(Cell::from_text).unwrap_or(Cell::Blank);
                    (name.clone(), cell)
                })
                .collect(),
        };

        if !row.is_empty() {
            sheet.rows.push(row);
        }
    }

    sheet
}

fn parse_workbook(bytes: &[u8]) -> ParsedSheet {
    let mut sheet = ParsedSheet::default();

    let mut workbook = match open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())) {
        Ok(wb) => wb,
        Err(e) => {
            sheet.errors.push(format!("Unable to open workbook: {}", e));
            return sheet;
        }
    };

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        sheet.errors.push("Workbook has no sheets".to_string());
        return sheet;
    };

    let range = match workbook.worksheet_range(&sheet_name) {
        Ok(range) => range,
        Err(e) => {
            sheet
                .errors
                .push(format!("Unable to read sheet '{}': {}", sheet_name, e));
            return sheet;
        }
    };

    // The range starts at the first used cell; that row is the header
    let first_row = range.start().map(|(r, _)| r as usize + 1).unwrap_or(1);
    let mut rows = range.rows();

    let mut columns: Vec<(usize, String)> = Vec::new();
    if let Some(header) = rows.next() {
        for (i, data) in header.iter().enumerate() {
            let name = data.to_string().trim().to_string();
            if name.is_empty() {
                continue;
            }
            if sheet.headers.contains(&name) {
                sheet
                    .errors
                    .push(format!("Duplicate column '{}' ignored", name));
                continue;
            }
            sheet.headers.push(name.clone());
            columns.push((i, name));
        }
    }

    if columns.is_empty() {
        sheet.errors.push("File has no header row".to_string());
        return sheet;
    }

    for (offset, data) in rows.enumerate() {
        let row = SheetRow {
            row: first_row + offset + 1,
            cells: columns
                .iter()
                .map(|(i, name)| {
                    let cell = data.get(*i).map(Cell::from_workbook).unwrap_or(Cell::Blank);
                    (name.clone(), cell)
                })
                .collect(),
        };

        if !row.is_empty() {
            sheet.rows.push(row);
        }
    }

    sheet
}

fn parse_json(bytes: &[u8]) -> ParsedSheet {
    let mut sheet = ParsedSheet::default();

    let value: Value = match serde_json::from_slice(bytes) {
        Ok(v) => v,
        Err(e) => {
            sheet.errors.push(format!("Invalid JSON: {}", e));
            return sheet;
        }
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("rows") {
            Some(Value::Array(items)) => items,
            _ => {
                sheet
                    .errors
                    .push("Expected a JSON array of row objects".to_string());
                return sheet;
            }
        },
        _ => {
            sheet
                .errors
                .push("Expected a JSON array of row objects".to_string());
            return sheet;
        }
    };

    for (row_idx, item) in items.iter().enumerate() {
        let row_num = row_idx + 2;

        let Value::Object(obj) = item else {
            sheet
                .errors
                .push(format!("Row {}: expected an object", row_num));
            continue;
        };

        let mut cells = HashMap::new();
        for (key, value) in obj {
            let name = key.trim().to_string();
            if !sheet.headers.contains(&name) {
                sheet.headers.push(name.clone());
            }
            cells.insert(name, Cell::from_json(value));
        }

        let row = SheetRow {
            row: row_num,
            cells,
        };
        if !row.is_empty() {
            sheet.rows.push(row);
        }
    }

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rows_are_numbered_from_two() {
        let csv = "projectCode,title\nWEB,First\nWEB,Second\n";
        let sheet = parse_sheet(csv.as_bytes(), SheetFormat::Csv);

        assert!(sheet.errors.is_empty());
        assert_eq!(sheet.headers, vec!["projectCode", "title"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].row, 2);
        assert_eq!(sheet.rows[1].row, 3);
        assert_eq!(sheet.rows[1].get("title"), &Cell::Text("Second".to_string()));
    }

    #[test]
    fn test_csv_blank_cells_and_missing_columns() {
        let csv = "a,b,c\n1,  ,\n";
        let sheet = parse_sheet(csv.as_bytes(), SheetFormat::Csv);
        let row = &sheet.rows[0];

        assert_eq!(row.get("a"), &Cell::Text("1".to_string()));
        assert!(row.get("b").is_blank());
        assert!(row.get("c").is_blank());
        assert!(row.get("missing").is_blank());
    }

    #[test]
    fn test_csv_headers_are_case_sensitive_and_trimmed() {
        let csv = " projectId ,ProjectId\n1,2\n";
        let sheet = parse_sheet(csv.as_bytes(), SheetFormat::Csv);
        let row = &sheet.rows[0];

        assert_eq!(row.get("projectId"), &Cell::Text("1".to_string()));
        assert_eq!(row.get("ProjectId"), &Cell::Text("2".to_string()));
    }

    #[test]
    fn test_csv_skips_fully_blank_rows_but_keeps_numbering() {
        let csv = "a,b\nx,y\n,\nz,w\n";
        let sheet = parse_sheet(csv.as_bytes(), SheetFormat::Csv);

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].row, 4);
    }

    #[test]
    fn test_csv_empty_lines_keep_line_numbers() {
        let sheet = parse_sheet(b"a,b\nx,y\n\nz,w\n", SheetFormat::Csv);

        let rows: Vec<usize> = sheet.rows.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 4]);
    }

    #[test]
    fn test_csv_quoted_newline_counts_from_record_start() {
        let sheet = parse_sheet(b"a,b\n\"one\ntwo\",y\nz,w\n", SheetFormat::Csv);

        let rows: Vec<usize> = sheet.rows.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 4]);
    }

    #[test]
    fn test_csv_duplicate_header_reported() {
        let csv = "a,a\n1,2\n";
        let sheet = parse_sheet(csv.as_bytes(), SheetFormat::Csv);

        assert_eq!(sheet.errors, vec!["Duplicate column 'a' ignored"]);
        assert_eq!(sheet.rows[0].get("a"), &Cell::Text("1".to_string()));
    }

    #[test]
    fn test_empty_file_reports_missing_header() {
        let sheet = parse_sheet(b"", SheetFormat::Csv);
        assert!(sheet.rows.is_empty());
        assert_eq!(sheet.errors, vec!["File has no header row"]);
    }

    #[test]
    fn test_tsv() {
        let tsv = "a\tb\nhello, world\t2\n";
        let sheet = parse_sheet(tsv.as_bytes(), SheetFormat::Tsv);
        assert_eq!(
            sheet.rows[0].get("a"),
            &Cell::Text("hello, world".to_string())
        );
    }

    #[test]
    fn test_json_rows_keep_types() {
        let json = r#"[{"title": "A", "createdDate": 44197, "testData": {"k": 1}, "module": null},
                       "oops",
                       {"title": "B"}]"#;
        let sheet = parse_sheet(json.as_bytes(), SheetFormat::Json);

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.errors, vec!["Row 3: expected an object"]);
        assert_eq!(sheet.rows[0].get("createdDate"), &Cell::Number(44197.0));
        assert_eq!(
            sheet.rows[0].get("testData"),
            &Cell::Text(r#"{"k":1}"#.to_string())
        );
        assert!(sheet.rows[0].get("module").is_blank());
        assert_eq!(sheet.rows[1].row, 4);
    }

    #[test]
    fn test_json_rows_wrapper_and_invalid_json() {
        let sheet = parse_sheet(br#"{"rows": [{"a": "1"}]}"#, SheetFormat::Json);
        assert_eq!(sheet.rows.len(), 1);

        let sheet = parse_sheet(b"{not json", SheetFormat::Json);
        assert!(sheet.rows.is_empty());
        assert!(sheet.errors[0].starts_with("Invalid JSON"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SheetFormat::from_path(Path::new("cases.CSV")),
            Some(SheetFormat::Csv)
        );
        assert_eq!(
            SheetFormat::from_path(Path::new("x.tsv")),
            Some(SheetFormat::Tsv)
        );
        assert_eq!(
            SheetFormat::from_path(Path::new("x.xlsx")),
            Some(SheetFormat::Xlsx)
        );
        assert_eq!(
            SheetFormat::from_path(Path::new("x.ods")),
            Some(SheetFormat::Xlsx)
        );
        assert_eq!(SheetFormat::from_path(Path::new("x.txt")), None);
    }

    fn workbook(build: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        build(workbook.add_worksheet());
        workbook.add_worksheet().write_string(0, 0, "ignored").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_xlsx_reads_first_sheet_with_typed_cells() {
        let bytes = workbook(|ws| {
            ws.write_string(0, 0, "title").unwrap();
            ws.write_string(0, 1, "createdDate").unwrap();
            ws.write_string(0, 2, "estimatedMinutes").unwrap();
            ws.write_string(1, 0, " Login ").unwrap();
            ws.write_number(1, 1, 44197.0).unwrap();
            ws.write_number(1, 2, 15).unwrap();
            ws.write_string(3, 0, "Logout").unwrap();
        });

        let sheet = parse_sheet(&bytes, SheetFormat::Xlsx);

        assert!(sheet.errors.is_empty(), "{:?}", sheet.errors);
        assert_eq!(sheet.headers, vec!["title", "createdDate", "estimatedMinutes"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].row, 2);
        assert_eq!(sheet.rows[0].get("title"), &Cell::Text("Login".to_string()));
        assert_eq!(sheet.rows[0].get("createdDate"), &Cell::Number(44197.0));
        assert_eq!(sheet.rows[0].get("estimatedMinutes"), &Cell::Number(15.0));
        assert_eq!(sheet.rows[1].row, 4);
        assert!(sheet.rows[1].get("createdDate").is_blank());
    }

    #[test]
    fn test_xlsx_header_below_empty_rows() {
        let bytes = workbook(|ws| {
            ws.write_string(2, 0, "title").unwrap();
            ws.write_string(3, 0, "First").unwrap();
        });

        let sheet = parse_sheet(&bytes, SheetFormat::Xlsx);
        assert_eq!(sheet.rows[0].row, 4);
    }

    #[test]
    fn test_xlsx_garbage_bytes_report_error() {
        let sheet = parse_sheet(b"not a workbook", SheetFormat::Xlsx);
        assert!(sheet.rows.is_empty());
        assert!(sheet.errors[0].starts_with("Unable to open workbook"));
    }
}
