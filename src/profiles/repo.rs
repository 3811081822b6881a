use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{model::Profile, repo_types::ProfileRow};

const COLUMNS: &str = "id, owner_id, company, website, location, bio, status, githubusername, \
                       skills, experience, education, social, created_at";

pub async fn find_by_owner(db: &PgPool, owner: Uuid) -> Result<Option<Profile>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {COLUMNS} FROM profiles WHERE owner_id = $1"
    ))
    .bind(owner)
    .fetch_optional(db)
    .await?;
    Ok(row.map(Profile::from))
}

pub async fn list(db: &PgPool) -> Result<Vec<Profile>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {COLUMNS} FROM profiles ORDER BY created_at ASC, id ASC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Profile::from).collect())
}

pub async fn insert(db: &PgPool, p: &Profile) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, owner_id, company, website, location, bio, status,
                              githubusername, skills, experience, education, social, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(p.id)
    .bind(p.owner)
    .bind(&p.company)
    .bind(&p.website)
    .bind(&p.location)
    .bind(&p.bio)
    .bind(&p.status)
    .bind(&p.githubusername)
    .bind(Json(&p.skills))
    .bind(Json(&p.experience))
    .bind(Json(&p.education))
    .bind(Json(&p.social))
    .bind(p.date)
    .execute(db)
    .await?;
    Ok(())
}

/// Single UPDATE, so a half-applied mutation is never visible.
pub async fn save(db: &PgPool, p: &Profile) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        r#"
        UPDATE profiles
           SET company = $2, website = $3, location = $4, bio = $5, status = $6,
               githubusername = $7, skills = $8, experience = $9, education = $10, social = $11
         WHERE id = $1
        "#,
    )
    .bind(p.id)
    .bind(&p.company)
    .bind(&p.website)
    .bind(&p.location)
    .bind(&p.bio)
    .bind(&p.status)
    .bind(&p.githubusername)
    .bind(Json(&p.skills))
    .bind(Json(&p.experience))
    .bind(Json(&p.education))
    .bind(Json(&p.social))
    .execute(db)
    .await?;
    Ok(res.rows_affected())
}

pub async fn delete_by_owner(db: &PgPool, owner: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM profiles WHERE owner_id = $1")
        .bind(owner)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
