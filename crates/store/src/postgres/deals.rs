use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use pipecrm_core::{DealId, StoreError, UserId};
use pipecrm_deals::{Deal, DealPatch, DealStage, DealStore};

use super::map_sqlx;

pub struct PostgresDealStore {
    pool: PgPool,
}

impl PostgresDealStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn deal_from_row(row: &PgRow) -> Result<Deal, StoreError> {
    let stage: String = row.try_get("stage").map_err(map_sqlx)?;
    let stage: DealStage = stage
        .parse()
        .map_err(|_| StoreError::backend(format!("unknown stage in deals row: {stage}")))?;

    Ok(Deal {
        id: DealId::from_uuid(row.try_get::<Uuid, _>("id").map_err(map_sqlx)?),
        owner_id: UserId::from_uuid(row.try_get::<Uuid, _>("owner_id").map_err(map_sqlx)?),
        title: row.try_get("title").map_err(map_sqlx)?,
        stage,
        value: row.try_get("value").map_err(map_sqlx)?,
        close_date: row.try_get("close_date").map_err(map_sqlx)?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

const COLUMNS: &str = "id, owner_id, title, stage, value, close_date, created_at";

#[async_trait]
impl DealStore for PostgresDealStore {
    async fn insert(&self, deal: Deal) -> Result<Deal, StoreError> {
        sqlx::query(
            "INSERT INTO deals (id, owner_id, title, stage, value, close_date, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*deal.id.as_uuid())
        .bind(*deal.owner_id.as_uuid())
        .bind(&deal.title)
        .bind(deal.stage.as_str())
        .bind(deal.value)
        .bind(deal.close_date)
        .bind(deal.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(deal)
    }

    async fn get(&self, id: DealId, owner: UserId) -> Result<Option<Deal>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM deals WHERE id = $1 AND owner_id = $2"
        ))
        .bind(*id.as_uuid())
        .bind(*owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        row.as_ref().map(deal_from_row).transpose()
    }

    async fn list(&self, owner: UserId) -> Result<Vec<Deal>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM deals WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(*owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.iter().map(deal_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Deal>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM deals ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.iter().map(deal_from_row).collect()
    }

    async fn update(
        &self,
        id: DealId,
        owner: UserId,
        patch: &DealPatch,
    ) -> Result<Deal, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE deals SET \
                title      = COALESCE($3, title), \
                stage      = COALESCE($4, stage), \
                value      = COALESCE($5, value), \
                close_date = COALESCE($6, close_date) \
             WHERE id = $1 AND owner_id = $2 RETURNING {COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .bind(*owner.as_uuid())
        .bind(&patch.title)
        .bind(patch.stage.map(|s| s.as_str()))
        .bind(patch.value)
        .bind(patch.close_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or(StoreError::NotFound)?;

        deal_from_row(&row)
    }

    async fn delete(&self, id: DealId, owner: UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM deals WHERE id = $1 AND owner_id = $2")
            .bind(*id.as_uuid())
            .bind(*owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
