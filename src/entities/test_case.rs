//! Test case entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Complexity, Priority, Severity, TestCaseStatus};

/// Every writable field of a test case
///
/// `(project_id, test_case_id_code)` is the natural key. An update writes
/// all fields, so `None` clears a previously stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseDraft {
    pub project_id: i64,
    pub test_case_id_code: String,
    pub title: String,
    pub description: Option<String>,
    pub module: Option<String>,
    pub preconditions: Option<String>,
    pub steps: Option<String>,
    pub expected_result: Option<String>,
    pub priority: Option<Priority>,
    pub severity: Option<Severity>,
    pub complexity: Option<Complexity>,
    pub status: Option<TestCaseStatus>,

    /// Estimated execution time in minutes
    pub estimated_minutes: Option<i64>,

    /// Arbitrary structured input attached to the test case
    pub test_data: Option<serde_json::Value>,

    /// Test case file this case belongs to
    pub file_id: Option<i64>,

    pub author_id: Option<i64>,
    pub created_date: Option<DateTime<Utc>>,
}

/// A stored test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: i64,

    #[serde(flatten)]
    pub fields: TestCaseDraft,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
