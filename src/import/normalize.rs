//! Row normalization: raw cells to typed fields
//!
//! Pure functions over a single row. Reference columns (project, parent
//! file, users) are only trimmed here; they are resolved against the
//! reference index in the next stage. Enum columns are case-normalized but
//! validated downstream.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use super::columns as col;
use super::sheet::{Cell, SheetRow};
use crate::entities::EntityKind;

/// Day number of 1970-01-01 in the 1899-12-30 based spreadsheet date system
pub const SPREADSHEET_EPOCH_OFFSET: f64 = 25569.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Unresolved references carried by every row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowReferences {
    /// First non-blank of projectId, projectCode, projectName
    pub project: Option<String>,
    pub file_id: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTestCase {
    pub refs: RowReferences,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub module: Option<String>,
    pub preconditions: Option<String>,
    pub steps: Option<String>,
    pub expected_result: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub complexity: Option<String>,
    pub status: Option<String>,
    pub estimated_minutes: Option<i64>,
    pub test_data: Option<Value>,
    /// User id or email
    pub author: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDefect {
    pub refs: RowReferences,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub module: Option<String>,
    pub steps_to_reproduce: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
    pub environment: Option<String>,
    pub severity: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub test_case_id_code: Option<String>,
    pub input_data: Option<Value>,
    /// User id or email
    pub assigned_to: Option<String>,
    /// User id or email
    pub reported_by: Option<String>,
    pub reported_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub resolved_date: Option<DateTime<Utc>>,
}

/// A row with typed fields and unresolved references
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRow {
    TestCase(NormalizedTestCase),
    Defect(NormalizedDefect),
}

/// Normalize one row; all field errors of the row are collected
pub fn normalize(kind: EntityKind, row: &SheetRow) -> Result<NormalizedRow, Vec<String>> {
    let mut fields = FieldReader::new(row);
    let refs = RowReferences {
        project: fields
            .optional(col::PROJECT_ID)
            .or_else(|| fields.optional(col::PROJECT_CODE))
            .or_else(|| fields.optional(col::PROJECT_NAME)),
        file_id: fields.optional(kind.file_id_column()),
        file_name: fields.optional(kind.file_name_column()),
    };

    let normalized = match kind {
        EntityKind::TestCase => NormalizedRow::TestCase(NormalizedTestCase {
            refs,
            code: fields.required(col::TEST_CASE_ID_CODE),
            title: fields.required(col::TITLE),
            description: fields.optional(col::DESCRIPTION),
            module: fields.optional(col::MODULE),
            preconditions: fields.optional(col::PRECONDITIONS),
            steps: fields.optional(col::STEPS),
            expected_result: fields.optional(col::EXPECTED_RESULT),
            priority: fields.enum_value(col::PRIORITY),
            severity: fields.enum_value(col::SEVERITY),
            complexity: fields.enum_value(col::COMPLEXITY),
            status: fields.enum_value(col::STATUS),
            estimated_minutes: fields.integer(col::ESTIMATED_MINUTES),
            test_data: fields.json(col::TEST_DATA),
            author: fields.optional(col::AUTHOR),
            created_date: fields.date(col::CREATED_DATE),
        }),
        EntityKind::Defect => NormalizedRow::Defect(NormalizedDefect {
            refs,
            code: fields.required(col::DEFECT_ID_CODE),
            title: fields.required(col::TITLE),
            description: fields.optional(col::DESCRIPTION),
            module: fields.optional(col::MODULE),
            steps_to_reproduce: fields.optional(col::STEPS_TO_REPRODUCE),
            expected_result: fields.optional(col::EXPECTED_RESULT),
            actual_result: fields.optional(col::ACTUAL_RESULT),
            environment: fields.optional(col::ENVIRONMENT),
            severity: fields.enum_value(col::SEVERITY),
            priority: fields.enum_value(col::PRIORITY),
            status: fields.enum_value(col::STATUS),
            test_case_id_code: fields.optional(col::TEST_CASE_ID_CODE),
            input_data: fields.json(col::INPUT_DATA),
            assigned_to: fields.optional(col::ASSIGNED_TO),
            reported_by: fields.optional(col::REPORTED_BY),
            reported_date: fields.date(col::REPORTED_DATE),
            due_date: fields.date(col::DUE_DATE),
            resolved_date: fields.date(col::RESOLVED_DATE),
        }),
    };

    fields.finish(normalized)
}

/// Reads typed fields from a row, accumulating errors
struct FieldReader<'a> {
    row: &'a SheetRow,
    errors: Vec<String>,
}

impl<'a> FieldReader<'a> {
    fn new(row: &'a SheetRow) -> Self {
        Self {
            row,
            errors: Vec::new(),
        }
    }

    fn required(&mut self, column: &str) -> String {
        match cell_text(self.row.get(column)) {
            Some(text) => text,
            None => {
                self.errors.push(format!("{} is required", column));
                String::new()
            }
        }
    }

    fn optional(&self, column: &str) -> Option<String> {
        cell_text(self.row.get(column))
    }

    fn enum_value(&self, column: &str) -> Option<String> {
        self.optional(column).map(|s| normalize_case(&s))
    }

    fn date(&mut self, column: &str) -> Option<DateTime<Utc>> {
        match parse_date(self.row.get(column)) {
            Ok(date) => date,
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    fn json(&self, column: &str) -> Option<Value> {
        parse_json_cell(self.row.get(column))
    }

    fn integer(&mut self, column: &str) -> Option<i64> {
        let cell = self.row.get(column);
        let value = match cell {
            Cell::Blank => return None,
            Cell::Number(n) => whole_number(*n),
            Cell::Text(s) => s
                .parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number)),
        };
        if value.is_none() {
            self.errors.push(format!("{} must be a whole number", column));
        }
        value
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<String>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

fn whole_number(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Some(n as i64)
    } else {
        None
    }
}

/// Render a number the way a spreadsheet shows it ("3", not "3.0")
fn number_text(n: f64) -> String {
    match whole_number(n) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}

/// Trimmed text of a cell; blank becomes `None`
pub fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Blank => None,
        Cell::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Cell::Number(n) => Some(number_text(*n)),
    }
}

/// First letter upper case, the rest lower case ("hIGH" -> "High")
pub fn normalize_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Convert a spreadsheet date serial (days since 1899-12-30) to UTC
pub fn serial_to_datetime(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - SPREADSHEET_EPOCH_OFFSET) * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse an optional date cell: ISO text or a spreadsheet serial
///
/// Text that is a plain number is treated as a serial, since delimited
/// files carry every cell as text.
pub fn parse_date(cell: &Cell) -> Result<Option<DateTime<Utc>>, String> {
    match cell {
        Cell::Blank => Ok(None),
        Cell::Number(n) => serial_to_datetime(*n)
            .map(Some)
            .ok_or_else(|| format!("Invalid date '{}'", number_text(*n))),
        Cell::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            let parsed = match s.parse::<f64>() {
                Ok(serial) => serial_to_datetime(serial),
                Err(_) => parse_iso(s),
            };
            parsed
                .map(Some)
                .ok_or_else(|| format!("Invalid date '{}'", s))
        }
    }
}

/// Parse an embedded JSON cell, falling back to the raw string
pub fn parse_json_cell(cell: &Cell) -> Option<Value> {
    match cell {
        Cell::Blank => None,
        Cell::Number(n) => Some(match whole_number(*n) {
            Some(i) => Value::from(i),
            None => Value::from(*n),
        }),
        Cell::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            Some(serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format_timestamp;
    use serde_json::json;

    fn test_case(pairs: &[(&str, &str)]) -> Result<NormalizedTestCase, Vec<String>> {
        match normalize(EntityKind::TestCase, &SheetRow::from_pairs(2, pairs))? {
            NormalizedRow::TestCase(tc) => Ok(tc),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_serial_44197_is_new_year_2021() {
        let dt = serial_to_datetime(44197.0).unwrap();
        assert_eq!(format_timestamp(&dt), "2021-01-01T00:00:00.000Z");

        let from_text = parse_date(&Cell::Text("44197".to_string())).unwrap().unwrap();
        assert_eq!(from_text, dt);
    }

    #[test]
    fn test_fractional_serial_keeps_time_of_day() {
        let dt = serial_to_datetime(44197.5).unwrap();
        assert_eq!(format_timestamp(&dt), "2021-01-01T12:00:00.000Z");
    }

    #[test]
    fn test_iso_dates() {
        let cases = [
            ("2021-01-01", "2021-01-01T00:00:00.000Z"),
            ("2021-01-01T10:30:00Z", "2021-01-01T10:30:00.000Z"),
            ("2021-01-01T10:30:00+02:00", "2021-01-01T08:30:00.000Z"),
            ("2021-01-01T10:30:00.250", "2021-01-01T10:30:00.250Z"),
            ("2021-01-01 10:30:00", "2021-01-01T10:30:00.000Z"),
        ];
        for (raw, expected) in cases {
            let dt = parse_date(&Cell::Text(raw.to_string())).unwrap().unwrap();
            assert_eq!(format_timestamp(&dt), expected, "parsing {}", raw);
        }
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(
            parse_date(&Cell::Text("next tuesday".to_string())).unwrap_err(),
            "Invalid date 'next tuesday'"
        );
        assert_eq!(
            parse_date(&Cell::Text("2021-02-30".to_string())).unwrap_err(),
            "Invalid date '2021-02-30'"
        );
        assert!(parse_date(&Cell::Number(f64::NAN)).is_err());
        assert_eq!(parse_date(&Cell::Blank).unwrap(), None);
    }

    #[test]
    fn test_json_cell_falls_back_to_string() {
        assert_eq!(
            parse_json_cell(&Cell::Text(r#"{"a": [1, 2]}"#.to_string())),
            Some(json!({"a": [1, 2]}))
        );
        assert_eq!(
            parse_json_cell(&Cell::Text("not json".to_string())),
            Some(json!("not json"))
        );
        assert_eq!(parse_json_cell(&Cell::Number(7.0)), Some(json!(7)));
        assert_eq!(parse_json_cell(&Cell::Blank), None);
    }

    #[test]
    fn test_normalize_case() {
        assert_eq!(normalize_case("hIGH"), "High");
        assert_eq!(normalize_case("open"), "Open");
        assert_eq!(normalize_case(""), "");
    }

    #[test]
    fn test_number_cells_render_without_fraction() {
        assert_eq!(cell_text(&Cell::Number(12.0)), Some("12".to_string()));
        assert_eq!(cell_text(&Cell::Number(1.5)), Some("1.5".to_string()));
    }

    #[test]
    fn test_required_fields_reported_together() {
        let errors = test_case(&[("projectCode", "WEB")]).unwrap_err();
        assert_eq!(
            errors,
            vec!["testCaseIdCode is required", "title is required"]
        );
    }

    #[test]
    fn test_blank_optional_fields_are_absent() {
        let tc = test_case(&[
            ("projectCode", "WEB"),
            ("testCaseIdCode", "TC-1"),
            ("title", "  Login  "),
            ("description", "   "),
            ("priority", ""),
            ("testData", ""),
            ("createdDate", ""),
        ])
        .unwrap();

        assert_eq!(tc.title, "Login");
        assert_eq!(tc.description, None);
        assert_eq!(tc.priority, None);
        assert_eq!(tc.test_data, None);
        assert_eq!(tc.created_date, None);
        assert_eq!(tc.refs.file_id, None);
    }

    #[test]
    fn test_project_reference_prefers_id_column() {
        let tc = test_case(&[
            ("projectId", "7"),
            ("projectCode", "WEB"),
            ("testCaseIdCode", "TC-1"),
            ("title", "t"),
        ])
        .unwrap();
        assert_eq!(tc.refs.project.as_deref(), Some("7"));

        let tc = test_case(&[
            ("projectId", ""),
            ("projectName", "Website"),
            ("testCaseIdCode", "TC-1"),
            ("title", "t"),
        ])
        .unwrap();
        assert_eq!(tc.refs.project.as_deref(), Some("Website"));
    }

    #[test]
    fn test_enum_and_integer_fields() {
        let tc = test_case(&[
            ("testCaseIdCode", "TC-1"),
            ("title", "t"),
            ("priority", "hIGH"),
            ("estimatedMinutes", "30"),
        ])
        .unwrap();
        assert_eq!(tc.priority.as_deref(), Some("High"));
        assert_eq!(tc.estimated_minutes, Some(30));

        let errors = test_case(&[
            ("testCaseIdCode", "TC-1"),
            ("title", "t"),
            ("estimatedMinutes", "2.5"),
            ("createdDate", "soon"),
        ])
        .unwrap_err();
        assert_eq!(
            errors,
            vec!["estimatedMinutes must be a whole number", "Invalid date 'soon'"]
        );
    }

    #[test]
    fn test_defect_file_columns() {
        let row = SheetRow::from_pairs(
            5,
            &[
                ("defectIdCode", "D-1"),
                ("title", "Crash"),
                ("defectFileName", "Sprint 1"),
                ("testCaseFileName", "ignored"),
                ("assignedTo", "dev@example.com"),
            ],
        );
        let NormalizedRow::Defect(defect) = normalize(EntityKind::Defect, &row).unwrap() else {
            panic!("expected a defect row");
        };
        assert_eq!(defect.refs.file_name.as_deref(), Some("Sprint 1"));
        assert_eq!(defect.assigned_to.as_deref(), Some("dev@example.com"));
    }
}
