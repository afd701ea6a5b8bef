use serde_json::Value as JsonValue;
use sqlx::types::ipnetwork::IpNetwork;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::listing::{Page, Pagination};
use crate::models::audit_log::AuditLog;

const AUDIT_COLUMNS: &str =
    "id, action, entity_type, entity_id, actor_id, reason, metadata, ip_address, created_at";

/// One moderation or system event to record.
#[derive(Debug, Clone, Default)]
pub struct AuditEntry {
    pub action: &'static str,
    pub entity_type: &'static str,
    pub entity_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub reason: Option<String>,
    pub metadata: Option<JsonValue>,
    pub ip: Option<IpNetwork>,
}

#[derive(Clone)]
pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn log(&self, entry: AuditEntry) -> Result<AuditLog> {
        let sql = format!(
            r#"
            INSERT INTO audit_logs (action, entity_type, entity_id, actor_id, reason, metadata, ip_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            AUDIT_COLUMNS
        );
        let row = sqlx::query_as::<_, AuditLog>(&sql)
            .bind(entry.action)
            .bind(entry.entity_type)
            .bind(entry.entity_id)
            .bind(entry.actor_id)
            .bind(entry.reason)
            .bind(entry.metadata)
            .bind(entry.ip)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Audit failures never fail the action being audited.
    pub async fn record(&self, entry: AuditEntry) {
        let action = entry.action;
        let entity_id = entry.entity_id;
        if let Err(e) = self.log(entry).await {
            tracing::warn!(error = %e, action, entity_id = %entity_id, "failed to write audit log");
        }
    }

    pub async fn list(&self, entity_type: Option<&str>, page: usize, per_page: usize) -> Result<Page<AuditLog>> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM audit_logs WHERE ($1::TEXT IS NULL OR entity_type = $1)",
        )
        .bind(entity_type)
        .fetch_one(&self.pool)
        .await?;

        let pagination = Pagination::new(total.max(0) as usize, page, per_page);
        let range = pagination.range();
        let sql = format!(
            r#"
            SELECT {} FROM audit_logs
            WHERE ($1::TEXT IS NULL OR entity_type = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            AUDIT_COLUMNS
        );
        let items = sqlx::query_as::<_, AuditLog>(&sql)
            .bind(entity_type)
            .bind(range.len() as i64)
            .bind(range.start as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(Page {
            items,
            page_window: pagination.window(),
            pagination,
        })
    }

    pub async fn all(&self, entity_type: Option<&str>) -> Result<Vec<AuditLog>> {
        let sql = format!(
            "SELECT {} FROM audit_logs WHERE ($1::TEXT IS NULL OR entity_type = $1) ORDER BY created_at DESC",
            AUDIT_COLUMNS
        );
        Ok(sqlx::query_as::<_, AuditLog>(&sql)
            .bind(entity_type)
            .fetch_all(&self.pool)
            .await?)
    }
}
