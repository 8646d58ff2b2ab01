use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use pipecrm_activity::{ActivityKind, ActivityRecord, ActivityStore};
use pipecrm_core::{ActivityId, StoreError};

use super::map_sqlx;

pub struct PostgresActivityStore {
    pool: PgPool,
}

impl PostgresActivityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn kind_from_str(s: &str) -> Result<ActivityKind, StoreError> {
    match s {
        "lead_created" => Ok(ActivityKind::LeadCreated),
        "lead_updated" => Ok(ActivityKind::LeadUpdated),
        "deal_created" => Ok(ActivityKind::DealCreated),
        "deal_updated" => Ok(ActivityKind::DealUpdated),
        "deal_won" => Ok(ActivityKind::DealWon),
        other => Err(StoreError::backend(format!(
            "unknown kind in activities row: {other}"
        ))),
    }
}

fn record_from_row(row: &PgRow) -> Result<ActivityRecord, StoreError> {
    let kind: String = row.try_get("kind").map_err(map_sqlx)?;

    Ok(ActivityRecord {
        id: ActivityId::from_uuid(row.try_get::<Uuid, _>("id").map_err(map_sqlx)?),
        user_email: row.try_get("user_email").map_err(map_sqlx)?,
        kind: kind_from_str(&kind)?,
        message: row.try_get("message").map_err(map_sqlx)?,
        amount: row.try_get("amount").map_err(map_sqlx)?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

#[async_trait]
impl ActivityStore for PostgresActivityStore {
    async fn append(&self, record: ActivityRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO activities (id, user_email, kind, message, amount, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*record.id.as_uuid())
        .bind(&record.user_email)
        .bind(record.kind.as_str())
        .bind(&record.message)
        .bind(record.amount)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn recent(
        &self,
        user_email: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, user_email, kind, message, amount, created_at \
             FROM activities WHERE user_email = $1 \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_email)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(record_from_row).collect()
    }
}
