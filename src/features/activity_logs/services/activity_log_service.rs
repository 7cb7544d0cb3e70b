use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::activity_logs::dtos::ActivityLogQuery;
use crate::features::activity_logs::models::{ActivityLog, NewActivityLog};
use crate::shared::validation::non_blank;

/// Service for the append-only audit trail
pub struct ActivityLogService {
    pool: PgPool,
}

impl ActivityLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one entry using the caller's transaction
    pub async fn record<'e, E>(executor: E, entry: NewActivityLog) -> Result<()>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO activity_logs
                (actor, action, table_name, record_id, old_values, new_values, ip_address, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&entry.actor)
        .bind(entry.action.as_str())
        .bind(entry.table_name)
        .bind(entry.record_id)
        .bind(&entry.old_values)
        .bind(&entry.new_values)
        .bind(&entry.ip_address)
        .bind(&entry.description)
        .execute(executor)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to record activity {} on {}: {:?}",
                entry.action,
                entry.table_name,
                e
            );
            AppError::Database(e)
        })?;

        Ok(())
    }

    /// List entries newest first, with total count for the active filters
    pub async fn list(&self, query: &ActivityLogQuery) -> Result<(Vec<ActivityLog>, i64)> {
        let page = query.page_query();
        let table_name = non_blank(query.table_name.as_deref()).map(str::to_string);
        let action = non_blank(query.action.as_deref()).map(str::to_string);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM activity_logs");
        push_filters(&mut count, table_name.clone(), action.clone());

        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count activity logs: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT id, actor, action, table_name, record_id, old_values, new_values, \
             ip_address, description, created_at FROM activity_logs",
        );
        push_filters(&mut select, table_name, action);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let logs = select
            .build_query_as::<ActivityLog>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list activity logs: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((logs, total))
    }
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    table_name: Option<String>,
    action: Option<String>,
) {
    let mut separator = " WHERE ";
    if let Some(table_name) = table_name {
        builder.push(separator).push("table_name = ").push_bind(table_name);
        separator = " AND ";
    }
    if let Some(action) = action {
        builder.push(separator).push("action = ").push_bind(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_combine_with_and() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM activity_logs");
        push_filters(
            &mut builder,
            Some("keluarga".to_string()),
            Some("verify".to_string()),
        );
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM activity_logs WHERE table_name = $1 AND action = $2"
        );
    }

    #[test]
    fn test_no_filters_leaves_query_untouched() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM activity_logs");
        push_filters(&mut builder, None, None);
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM activity_logs");
    }
}
