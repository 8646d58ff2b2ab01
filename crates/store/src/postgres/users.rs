use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use pipecrm_auth::{CredentialPatch, CredentialStore, Role, UserRecord};
use pipecrm_core::{StoreError, UserId};

use super::map_sqlx;

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, StoreError> {
    let role: String = row.try_get("role").map_err(map_sqlx)?;
    let role: Role = role
        .parse()
        .map_err(|_| StoreError::backend(format!("unknown role in users row: {role}")))?;

    Ok(UserRecord {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(map_sqlx)?),
        email: row.try_get("email").map_err(map_sqlx)?,
        name: row.try_get("name").map_err(map_sqlx)?,
        password_hash: row.try_get("password_hash").map_err(map_sqlx)?,
        role,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

const COLUMNS: &str = "id, email, name, password_hash, role, created_at";

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(user)
    }

    async fn update(&self, email: &str, patch: CredentialPatch) -> Result<UserRecord, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                password_hash = COALESCE($3, password_hash) \
             WHERE email = $1 RETURNING {COLUMNS}"
        ))
        .bind(email)
        .bind(&patch.name)
        .bind(&patch.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or(StoreError::NotFound)?;

        user_from_row(&row)
    }
}
