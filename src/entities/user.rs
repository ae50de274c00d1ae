//! User entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user that can author test cases, report defects or be assigned to them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    /// Unique, compared case-insensitively
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub created_at: DateTime<Utc>,
}
