//! Audit log of changes made through QAT

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;

use super::{format_timestamp, now, parse_datetime, Store, StoreError};

/// One audit log entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: i64,
    pub actor: String,
    /// What happened, e.g. "import" or "create"
    pub action: String,
    /// Which kind of entity was touched, e.g. "defect" or "project"
    pub entity_kind: String,
    pub entity_id: Option<i64>,
    /// Action-specific details
    pub detail: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Append an entry to the audit log
    pub fn record_audit(
        &mut self,
        actor: &str,
        action: &str,
        entity_kind: &str,
        entity_id: Option<i64>,
        detail: &serde_json::Value,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO audit_log (actor, action, entity_kind, entity_id, detail, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                actor,
                action,
                entity_kind,
                entity_id,
                detail.to_string(),
                format_timestamp(&now())
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent entries first
    pub fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, actor, action, entity_kind, entity_id, detail, created_at
             FROM audit_log ORDER BY id DESC LIMIT ?1",
        )?;

        let entries = stmt
            .query_map(params![limit as i64], |row| {
                let detail: String = row.get(5)?;
                Ok(AuditEntry {
                    id: row.get(0)?,
                    actor: row.get(1)?,
                    action: row.get(2)?,
                    entity_kind: row.get(3)?,
                    entity_id: row.get(4)?,
                    detail: serde_json::from_str(&detail).unwrap_or(serde_json::Value::Null),
                    created_at: parse_datetime(row, 6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
