//! Test case and defect persistence
//!
//! Both record tables share the same shape: a surrogate `id`, the writable
//! fields of the draft type in a fixed column order, and bookkeeping
//! timestamps. Inserts and full-field updates are generated from the
//! column lists below so the two stay in step.

use std::str::FromStr;

use rusqlite::{params, OptionalExtension, Row, ToSql};

use super::{format_timestamp, now, parse_datetime, parse_optional_datetime, Store, StoreError};
use crate::entities::{Defect, DefectDraft, TestCase, TestCaseDraft};

/// Writable test case columns, in [`test_case_values`] order
const TEST_CASE_FIELDS: [&str; 17] = [
    "project_id",
    "test_case_id_code",
    "title",
    "description",
    "module",
    "preconditions",
    "steps",
    "expected_result",
    "priority",
    "severity",
    "complexity",
    "status",
    "estimated_minutes",
    "test_data",
    "file_id",
    "author_id",
    "created_date",
];

/// Writable defect columns, in [`defect_values`] order
const DEFECT_FIELDS: [&str; 20] = [
    "project_id",
    "defect_id_code",
    "title",
    "description",
    "module",
    "steps_to_reproduce",
    "expected_result",
    "actual_result",
    "environment",
    "severity",
    "priority",
    "status",
    "test_case_id_code",
    "input_data",
    "file_id",
    "assigned_to_id",
    "reported_by_id",
    "reported_date",
    "due_date",
    "resolved_date",
];

/// Filters for listing test cases or defects
#[derive(Debug, Default, Clone)]
pub struct TargetFilter {
    pub project_id: Option<i64>,
    pub file_id: Option<i64>,
    /// Canonical status text, e.g. "Open"
    pub status: Option<String>,
    /// Canonical severity text, e.g. "High"
    pub severity: Option<String>,
    pub limit: Option<usize>,
}

fn test_case_values(d: &TestCaseDraft) -> Vec<Box<dyn ToSql>> {
    vec![
        Box::new(d.project_id),
        Box::new(d.test_case_id_code.clone()),
        Box::new(d.title.clone()),
        Box::new(d.description.clone()),
        Box::new(d.module.clone()),
        Box::new(d.preconditions.clone()),
        Box::new(d.steps.clone()),
        Box::new(d.expected_result.clone()),
        Box::new(d.priority.map(|v| v.as_str())),
        Box::new(d.severity.map(|v| v.as_str())),
        Box::new(d.complexity.map(|v| v.as_str())),
        Box::new(d.status.map(|v| v.as_str())),
        Box::new(d.estimated_minutes),
        Box::new(d.test_data.as_ref().map(|v| v.to_string())),
        Box::new(d.file_id),
        Box::new(d.author_id),
        Box::new(d.created_date.as_ref().map(format_timestamp)),
    ]
}

fn defect_values(d: &DefectDraft) -> Vec<Box<dyn ToSql>> {
    vec![
        Box::new(d.project_id),
        Box::new(d.defect_id_code.clone()),
        Box::new(d.title.clone()),
        Box::new(d.description.clone()),
        Box::new(d.module.clone()),
        Box::new(d.steps_to_reproduce.clone()),
        Box::new(d.expected_result.clone()),
        Box::new(d.actual_result.clone()),
        Box::new(d.environment.clone()),
        Box::new(d.severity.map(|v| v.as_str())),
        Box::new(d.priority.map(|v| v.as_str())),
        Box::new(d.status.map(|v| v.as_str())),
        Box::new(d.test_case_id_code.clone()),
        Box::new(d.input_data.as_ref().map(|v| v.to_string())),
        Box::new(d.file_id),
        Box::new(d.assigned_to_id),
        Box::new(d.reported_by_id),
        Box::new(d.reported_date.as_ref().map(format_timestamp)),
        Box::new(d.due_date.as_ref().map(format_timestamp)),
        Box::new(d.resolved_date.as_ref().map(format_timestamp)),
    ]
}

fn parse_enum<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|s| s.parse().ok())
}

fn parse_json(value: Option<String>) -> Option<serde_json::Value> {
    value.and_then(|s| serde_json::from_str(&s).ok())
}

fn test_case_from_row(row: &Row) -> rusqlite::Result<TestCase> {
    Ok(TestCase {
        id: row.get(0)?,
        fields: TestCaseDraft {
            project_id: row.get(1)?,
            test_case_id_code: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            module: row.get(5)?,
            preconditions: row.get(6)?,
            steps: row.get(7)?,
            expected_result: row.get(8)?,
            priority: parse_enum(row.get(9)?),
            severity: parse_enum(row.get(10)?),
            complexity: parse_enum(row.get(11)?),
            status: parse_enum(row.get(12)?),
            estimated_minutes: row.get(13)?,
            test_data: parse_json(row.get(14)?),
            file_id: row.get(15)?,
            author_id: row.get(16)?,
            created_date: parse_optional_datetime(row, 17)?,
        },
        created_at: parse_datetime(row, 18)?,
        updated_at: parse_datetime(row, 19)?,
    })
}

fn defect_from_row(row: &Row) -> rusqlite::Result<Defect> {
    Ok(Defect {
        id: row.get(0)?,
        fields: DefectDraft {
            project_id: row.get(1)?,
            defect_id_code: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            module: row.get(5)?,
            steps_to_reproduce: row.get(6)?,
            expected_result: row.get(7)?,
            actual_result: row.get(8)?,
            environment: row.get(9)?,
            severity: parse_enum(row.get(10)?),
            priority: parse_enum(row.get(11)?),
            status: parse_enum(row.get(12)?),
            test_case_id_code: row.get(13)?,
            input_data: parse_json(row.get(14)?),
            file_id: row.get(15)?,
            assigned_to_id: row.get(16)?,
            reported_by_id: row.get(17)?,
            reported_date: parse_optional_datetime(row, 18)?,
            due_date: parse_optional_datetime(row, 19)?,
            resolved_date: parse_optional_datetime(row, 20)?,
        },
        created_at: parse_datetime(row, 21)?,
        updated_at: parse_datetime(row, 22)?,
    })
}

impl Store {
    fn insert_row(
        &mut self,
        table: &str,
        fields: &[&str],
        mut values: Vec<Box<dyn ToSql>>,
    ) -> Result<i64, StoreError> {
        let stamp = format_timestamp(&now());
        values.push(Box::new(stamp.clone()));
        values.push(Box::new(stamp));

        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}, created_at, updated_at) VALUES ({})",
            table,
            fields.join(", "),
            placeholders.join(", ")
        );
        tracing::trace!(%sql, "insert");

        let params_refs: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();
        self.conn.execute(&sql, params_refs.as_slice())?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite every writable column of an existing row
    fn update_row(
        &mut self,
        table: &str,
        fields: &[&str],
        mut values: Vec<Box<dyn ToSql>>,
        id: i64,
    ) -> Result<(), StoreError> {
        let assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, field)| format!("{} = ?{}", field, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {}, updated_at = ?{} WHERE id = ?{}",
            table,
            assignments.join(", "),
            fields.len() + 1,
            fields.len() + 2
        );
        tracing::trace!(%sql, id, "update");

        values.push(Box::new(format_timestamp(&now())));
        values.push(Box::new(id));

        let params_refs: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let changed = self.conn.execute(&sql, params_refs.as_slice())?;
        if changed == 0 {
            return Err(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        }
        Ok(())
    }

    fn list_rows<T>(
        &self,
        table: &str,
        fields: &[&str],
        filter: &TargetFilter,
        map_row: fn(&Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StoreError> {
        let mut sql = format!(
            "SELECT id, {}, created_at, updated_at FROM {} WHERE 1=1",
            fields.join(", "),
            table
        );
        let mut params_vec: Vec<Box<dyn ToSql>> = vec![];

        if let Some(project_id) = filter.project_id {
            sql.push_str(" AND project_id = ?");
            params_vec.push(Box::new(project_id));
        }

        if let Some(file_id) = filter.file_id {
            sql.push_str(" AND file_id = ?");
            params_vec.push(Box::new(file_id));
        }

        if let Some(ref status) = filter.status {
            sql.push_str(" AND status = ?");
            params_vec.push(Box::new(status.clone()));
        }

        if let Some(ref severity) = filter.severity {
            sql.push_str(" AND severity = ?");
            params_vec.push(Box::new(severity.clone()));
        }

        sql.push_str(" ORDER BY project_id, id");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(params_refs.as_slice(), map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // =========================================================================
    // Test cases
    // =========================================================================

    /// Find a test case id by natural key
    pub fn find_test_case_id(
        &self,
        project_id: i64,
        code: &str,
    ) -> Result<Option<i64>, StoreError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM test_cases WHERE project_id = ?1 AND test_case_id_code = ?2",
                params![project_id, code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    pub fn insert_test_case(&mut self, draft: &TestCaseDraft) -> Result<i64, StoreError> {
        self.insert_row("test_cases", &TEST_CASE_FIELDS, test_case_values(draft))
    }

    pub fn update_test_case(&mut self, id: i64, draft: &TestCaseDraft) -> Result<(), StoreError> {
        self.update_row("test_cases", &TEST_CASE_FIELDS, test_case_values(draft), id)
    }

    pub fn get_test_case(&self, id: i64) -> Result<Option<TestCase>, StoreError> {
        let sql = format!(
            "SELECT id, {}, created_at, updated_at FROM test_cases WHERE id = ?1",
            TEST_CASE_FIELDS.join(", ")
        );
        let test_case = self
            .conn
            .query_row(&sql, params![id], test_case_from_row)
            .optional()?;
        Ok(test_case)
    }

    pub fn list_test_cases(&self, filter: &TargetFilter) -> Result<Vec<TestCase>, StoreError> {
        self.list_rows("test_cases", &TEST_CASE_FIELDS, filter, test_case_from_row)
    }

    // =========================================================================
    // Defects
    // =========================================================================

    /// Find a defect id by natural key
    pub fn find_defect_id(&self, project_id: i64, code: &str) -> Result<Option<i64>, StoreError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM defects WHERE project_id = ?1 AND defect_id_code = ?2",
                params![project_id, code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    pub fn insert_defect(&mut self, draft: &DefectDraft) -> Result<i64, StoreError> {
        self.insert_row("defects", &DEFECT_FIELDS, defect_values(draft))
    }

    pub fn update_defect(&mut self, id: i64, draft: &DefectDraft) -> Result<(), StoreError> {
        self.update_row("defects", &DEFECT_FIELDS, defect_values(draft), id)
    }

    pub fn get_defect(&self, id: i64) -> Result<Option<Defect>, StoreError> {
        let sql = format!(
            "SELECT id, {}, created_at, updated_at FROM defects WHERE id = ?1",
            DEFECT_FIELDS.join(", ")
        );
        let defect = self
            .conn
            .query_row(&sql, params![id], defect_from_row)
            .optional()?;
        Ok(defect)
    }

    pub fn list_defects(&self, filter: &TargetFilter) -> Result<Vec<Defect>, StoreError> {
        self.list_rows("defects", &DEFECT_FIELDS, filter, defect_from_row)
    }
}
