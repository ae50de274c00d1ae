//! Parent file entity (test case file or defect file)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityKind;

/// A named grouping of test cases or defects inside exactly one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentFile {
    pub id: i64,

    /// Which record kind this file groups
    pub kind: EntityKind,

    /// Unique within (project, kind), compared case-insensitively
    pub name: String,

    pub project_id: i64,

    pub created_at: DateTime<Utc>,
}
