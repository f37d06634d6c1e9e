use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub birthday: Date,
    pub age: i32,
    pub gender: Option<String>,
    pub interests: Option<String>,
    pub likes: Option<String>,
    pub budget: Option<f64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str =
    "id, user_id, name, birthday, age, gender, interests, likes, budget, created_at, updated_at";

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Recipient>> {
    let rows = sqlx::query_as::<_, Recipient>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM recipients
        WHERE user_id = $1
        ORDER BY birthday ASC
        "#,
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Fetches a recipient only when it belongs to `user_id`; a foreign row is
/// indistinguishable from a missing one.
pub async fn get_owned(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<Recipient>> {
    let row = sqlx::query_as::<_, Recipient>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM recipients
        WHERE id = $1 AND user_id = $2
        "#,
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub struct NewRecipient<'a> {
    pub name: &'a str,
    pub birthday: Date,
    pub age: i32,
    pub gender: Option<&'a str>,
    pub interests: Option<&'a str>,
    pub likes: Option<&'a str>,
    pub budget: Option<f64>,
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    new: NewRecipient<'_>,
) -> anyhow::Result<Recipient> {
    let row = sqlx::query_as::<_, Recipient>(&format!(
        r#"
        INSERT INTO recipients (user_id, name, birthday, age, gender, interests, likes, budget)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {COLUMNS}
        "#,
    ))
    .bind(user_id)
    .bind(new.name)
    .bind(new.birthday)
    .bind(new.age)
    .bind(new.gender)
    .bind(new.interests)
    .bind(new.likes)
    .bind(new.budget)
    .fetch_one(db)
    .await?;
    Ok(row)
}

#[derive(Debug, Default)]
pub struct RecipientPatch {
    pub name: Option<String>,
    pub birthday: Option<Date>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub interests: Option<String>,
    pub likes: Option<String>,
    pub budget: Option<f64>,
}

/// Partial update; absent fields keep their stored value. Returns `None`
/// when the row is missing or owned by another user.
pub async fn update_owned(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    patch: RecipientPatch,
) -> anyhow::Result<Option<Recipient>> {
    let row = sqlx::query_as::<_, Recipient>(&format!(
        r#"
        UPDATE recipients SET
            name = COALESCE($3, name),
            birthday = COALESCE($4, birthday),
            age = COALESCE($5, age),
            gender = COALESCE($6, gender),
            interests = COALESCE($7, interests),
            likes = COALESCE($8, likes),
            budget = COALESCE($9, budget),
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(user_id)
    .bind(patch.name)
    .bind(patch.birthday)
    .bind(patch.age)
    .bind(patch.gender)
    .bind(patch.interests)
    .bind(patch.likes)
    .bind(patch.budget)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Returns true when a row was deleted.
pub async fn delete_owned(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM recipients
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
