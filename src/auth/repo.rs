use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::Identity;

impl Identity {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Identity>, sqlx::Error> {
        sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM identities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Find an identity by (already normalized) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<Identity>, sqlx::Error> {
        sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM identities
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_many(db: &PgPool, ids: &[Uuid]) -> Result<Vec<Identity>, sqlx::Error> {
        sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM identities
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(db)
        .await
    }

    pub async fn insert(db: &PgPool, identity: &Identity) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO identities (id, name, email, password_hash, avatar, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(identity.id)
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(&identity.avatar)
        .bind(identity.created_at)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let res = sqlx::query("DELETE FROM identities WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }
}
