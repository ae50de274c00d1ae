//! Project entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project groups files, test cases and defects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,

    /// Short unique code, e.g. "WEB"
    pub code: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
}
