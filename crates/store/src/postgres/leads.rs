use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use pipecrm_core::{LeadId, StoreError};
use pipecrm_leads::{Lead, LeadPatch, LeadQuery, LeadStore};

use super::map_sqlx;

pub struct PostgresLeadStore {
    pool: PgPool,
}

impl PostgresLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn lead_from_row(row: &PgRow) -> Result<Lead, StoreError> {
    Ok(Lead {
        id: LeadId::from_uuid(row.try_get::<Uuid, _>("id").map_err(map_sqlx)?),
        owner_email: row.try_get("owner_email").map_err(map_sqlx)?,
        first_name: row.try_get("first_name").map_err(map_sqlx)?,
        last_name: row.try_get("last_name").map_err(map_sqlx)?,
        email: row.try_get("email").map_err(map_sqlx)?,
        company: row.try_get("company").map_err(map_sqlx)?,
        phone: row.try_get("phone").map_err(map_sqlx)?,
        source: row.try_get("source").map_err(map_sqlx)?,
        status: row.try_get("status").map_err(map_sqlx)?,
        notes: row.try_get("notes").map_err(map_sqlx)?,
        created: row.try_get("created").map_err(map_sqlx)?,
    })
}

const COLUMNS: &str = "id, owner_email, first_name, last_name, email, company, phone, source, \
                       status, notes, created";

async fn insert_one(pool: &PgPool, lead: &Lead) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO leads \
            (id, owner_email, first_name, last_name, email, company, phone, source, status, \
             notes, created) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(*lead.id.as_uuid())
    .bind(&lead.owner_email)
    .bind(&lead.first_name)
    .bind(&lead.last_name)
    .bind(&lead.email)
    .bind(&lead.company)
    .bind(&lead.phone)
    .bind(&lead.source)
    .bind(&lead.status)
    .bind(&lead.notes)
    .bind(lead.created)
    .execute(pool)
    .await
    .map_err(map_sqlx)?;
    Ok(())
}

#[async_trait]
impl LeadStore for PostgresLeadStore {
    async fn insert(&self, lead: Lead) -> Result<Lead, StoreError> {
        insert_one(&self.pool, &lead).await?;
        Ok(lead)
    }

    async fn insert_many(&self, leads: Vec<Lead>) -> Result<usize, StoreError> {
        // Row-at-a-time is fine at import sizes; a failed row aborts the rest.
        for lead in &leads {
            insert_one(&self.pool, lead).await?;
        }
        Ok(leads.len())
    }

    async fn list(&self, owner_email: &str, query: &LeadQuery) -> Result<Vec<Lead>, StoreError> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM leads WHERE owner_email = "));
        qb.push_bind(owner_email);

        if let Some(status) = &query.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }

        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search.replace('%', "\\%").replace('_', "\\_"));
            qb.push(" AND (first_name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR last_name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR company ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR email ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        qb.push(" ORDER BY created DESC LIMIT ");
        qb.push_bind(pg_window(query.page.limit));
        qb.push(" OFFSET ");
        qb.push_bind(pg_window(query.page.offset));

        let rows = qb.build().fetch_all(&self.pool).await.map_err(map_sqlx)?;
        rows.iter().map(lead_from_row).collect()
    }

    async fn list_all(&self, owner_email: &str) -> Result<Vec<Lead>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM leads WHERE owner_email = $1 ORDER BY created DESC"
        ))
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.iter().map(lead_from_row).collect()
    }

    async fn update(
        &self,
        id: LeadId,
        owner_email: &str,
        patch: &LeadPatch,
    ) -> Result<Lead, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE leads SET \
                first_name = COALESCE($3, first_name), \
                last_name  = COALESCE($4, last_name), \
                email      = COALESCE($5, email), \
                company    = COALESCE($6, company), \
                phone      = COALESCE($7, phone), \
                source     = COALESCE($8, source), \
                status     = COALESCE($9, status), \
                notes      = COALESCE($10, notes) \
             WHERE id = $1 AND owner_email = $2 RETURNING {COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .bind(owner_email)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.email)
        .bind(&patch.company)
        .bind(&patch.phone)
        .bind(&patch.source)
        .bind(&patch.status)
        .bind(&patch.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or(StoreError::NotFound)?;

        lead_from_row(&row)
    }

    async fn count_all(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(count as usize)
    }
}

/// Bind value for a LIMIT/OFFSET clause. A window size past `i64::MAX` must
/// saturate rather than wrap negative, which Postgres rejects.
fn pg_window(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
