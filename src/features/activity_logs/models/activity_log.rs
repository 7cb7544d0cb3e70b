use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::extractor::RequestContext;

/// Audit actions written by the services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Verify,
    ChangeVisibility,
    ChangeStatus,
    SaveGeometry,
    DeleteGeometry,
    RecordDistribution,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Create => "create",
            ActivityAction::Update => "update",
            ActivityAction::Delete => "delete",
            ActivityAction::Verify => "verify",
            ActivityAction::ChangeVisibility => "change_visibility",
            ActivityAction::ChangeStatus => "change_status",
            ActivityAction::SaveGeometry => "save_geometry",
            ActivityAction::DeleteGeometry => "delete_geometry",
            ActivityAction::RecordDistribution => "record_distribution",
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored audit entry. Rows are only ever inserted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ActivityLog {
    pub id: Uuid,
    pub actor: Option<String>,
    pub action: String,
    pub table_name: String,
    pub record_id: Option<Uuid>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub ip_address: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry to append, built next to the write it describes
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub actor: Option<String>,
    pub action: ActivityAction,
    pub table_name: &'static str,
    pub record_id: Option<Uuid>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub ip_address: Option<String>,
    pub description: Option<String>,
}

impl NewActivityLog {
    pub fn new(
        ctx: &RequestContext,
        action: ActivityAction,
        table_name: &'static str,
        record_id: Uuid,
    ) -> Self {
        Self {
            actor: ctx.actor.clone(),
            action,
            table_name,
            record_id: Some(record_id),
            old_values: None,
            new_values: None,
            ip_address: ctx.ip_address.clone(),
            description: None,
        }
    }

    pub fn before<T: Serialize>(mut self, value: &T) -> Self {
        self.old_values = snapshot(value);
        self
    }

    pub fn after<T: Serialize>(mut self, value: &T) -> Self {
        self.new_values = snapshot(value);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Failed to snapshot value for activity log: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_carries_request_context() {
        let ctx = RequestContext {
            actor: Some("petugas".to_string()),
            ip_address: Some("10.0.0.1".to_string()),
        };
        let id = Uuid::new_v4();

        let entry = NewActivityLog::new(&ctx, ActivityAction::Update, "keluarga", id)
            .before(&serde_json::json!({"is_public": false}))
            .after(&serde_json::json!({"is_public": true}))
            .description("Visibility changed");

        assert_eq!(entry.actor.as_deref(), Some("petugas"));
        assert_eq!(entry.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(entry.record_id, Some(id));
        assert_eq!(entry.old_values.unwrap()["is_public"], false);
        assert_eq!(entry.new_values.unwrap()["is_public"], true);
        assert_eq!(entry.action.as_str(), "update");
    }
}
