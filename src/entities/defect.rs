//! Defect entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{DefectStatus, Priority, Severity};

/// Every writable field of a defect
///
/// `(project_id, defect_id_code)` is the natural key. An update writes all
/// fields, so `None` clears a previously stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectDraft {
    pub project_id: i64,
    pub defect_id_code: String,
    pub title: String,
    pub description: Option<String>,
    pub module: Option<String>,
    pub steps_to_reproduce: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
    pub environment: Option<String>,
    pub severity: Option<Severity>,
    pub priority: Option<Priority>,
    pub status: Option<DefectStatus>,

    /// Code of the test case that found the defect (not a foreign key)
    pub test_case_id_code: Option<String>,

    /// Arbitrary structured input that triggered the defect
    pub input_data: Option<serde_json::Value>,

    /// Defect file this defect belongs to
    pub file_id: Option<i64>,

    pub assigned_to_id: Option<i64>,
    pub reported_by_id: Option<i64>,
    pub reported_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub resolved_date: Option<DateTime<Utc>>,
}

/// A stored defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    pub id: i64,

    #[serde(flatten)]
    pub fields: DefectDraft,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
