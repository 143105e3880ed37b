use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, Set};
use serde_json::Value;

use crate::{entity::audit_logs::ActiveModel, error::AppResult};

/// One row of the audit trail.
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub user_id: Option<i32>,
    pub action: &'a str,
    pub table_name: &'a str,
    pub record_id: i32,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl<'a> AuditEntry<'a> {
    pub fn new(user_id: Option<i32>, action: &'a str, table_name: &'a str, record_id: i32) -> Self {
        Self {
            user_id,
            action,
            table_name,
            record_id,
            old_value: None,
            new_value: None,
        }
    }

    pub fn old(mut self, value: Value) -> Self {
        self.old_value = Some(value);
        self
    }

    pub fn new_value(mut self, value: Value) -> Self {
        self.new_value = Some(value);
        self
    }
}

pub async fn log_audit<C: ConnectionTrait>(conn: &C, entry: AuditEntry<'_>) -> AppResult<()> {
    ActiveModel {
        log_id: NotSet,
        user_id: Set(entry.user_id),
        action_type: Set(entry.action.to_string()),
        table_name: Set(entry.table_name.to_string()),
        record_id: Set(entry.record_id),
        old_value: Set(entry.old_value.map(|v| v.to_string())),
        new_value: Set(entry.new_value.map(|v| v.to_string())),
        action_timestamp: Set(Utc::now()),
    }
    .insert(conn)
    .await?;

    Ok(())
}

/// Audit writes never fail the request that triggered them.
pub async fn log_audit_or_warn<C: ConnectionTrait>(conn: &C, entry: AuditEntry<'_>) {
    let action = entry.action;
    if let Err(err) = log_audit(conn, entry).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
