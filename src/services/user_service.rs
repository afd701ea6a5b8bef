use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::admin_dto::AdminUpdateUserPayload;
use crate::dto::auth_dto::{LoginPayload, RegisterPayload};
use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::utils::crypto::{hash_password, verify_password};

const USER_COLUMNS: &str = "id, email, name, role, password_hash, created_at, updated_at";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Self-service sign-up. Admin accounts are only created by promotion.
    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        if payload.role == Role::Admin {
            return Err(Error::Forbidden("admin_registration_not_allowed".into()));
        }
        let password_hash = hash_password(&payload.password)?;
        let sql = format!(
            "INSERT INTO users (email, name, role, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(normalize_email(&payload.email))
            .bind(payload.name.trim())
            .bind(payload.role.as_str())
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match Error::from(e) {
                Error::Conflict(_) => Error::Conflict("email_taken".into()),
                other => other,
            })?;
        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    pub async fn authenticate(&self, payload: LoginPayload) -> Result<User> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(normalize_email(&payload.email))
            .fetch_optional(&self.pool)
            .await?;
        match user {
            Some(user) if verify_password(&payload.password, &user.password_hash) => Ok(user),
            _ => Err(Error::Unauthorized("invalid_credentials".into())),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("user_not_found".into()))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn rename(&self, id: Uuid, name: &str) -> Result<User> {
        let sql = format!(
            "UPDATE users SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("user_not_found".into()))
    }

    pub async fn admin_update(&self, id: Uuid, payload: AdminUpdateUserPayload) -> Result<User> {
        let sql = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(payload.name.as_deref().map(str::trim))
            .bind(payload.role.map(|r| r.as_str()))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("user_not_found".into()))
    }

    /// Owned company, jobs, CV, applications and saved searches go with the
    /// account through cascading foreign keys.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("user_not_found".into()));
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}
