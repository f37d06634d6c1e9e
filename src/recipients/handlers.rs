use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, patch, post},
    Json, Router,
};
use time::{Date, OffsetDateTime};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::countdown::{age_on, parse_birthday};
use crate::state::AppState;

use super::dto::{CreateRecipientRequest, RecipientResponse, StringOrList, UpdateRecipientRequest};
use super::repo::{self, NewRecipient, RecipientPatch};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipients", get(list_recipients))
        .route("/recipients/:id", get(get_recipient))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipients", post(create_recipient))
        .route("/recipients/:id", patch(update_recipient))
        .route("/recipients/:id", delete(delete_recipient))
}

// The reference date is taken once at the HTTP edge; everything below it
// receives the date as a parameter.
fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

#[instrument(skip(state))]
pub async fn list_recipients(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<RecipientResponse>>, (StatusCode, String)> {
    let today = today_utc();
    let rows = repo::list_by_user(&state.db, user_id)
        .await
        .map_err(internal)?;
    let mut items: Vec<RecipientResponse> = rows
        .into_iter()
        .map(|r| RecipientResponse::from_row(r, today))
        .collect();
    // Soonest upcoming birthday first.
    items.sort_by_key(|r| r.countdown.days_until);
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_recipient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipientResponse>, (StatusCode, String)> {
    let row = repo::get_owned(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            warn!(%user_id, %id, "recipient not found");
            (StatusCode::NOT_FOUND, "Recipient not found".to_string())
        })?;
    Ok(Json(RecipientResponse::from_row(row, today_utc())))
}

#[instrument(skip(state, body))]
pub async fn create_recipient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateRecipientRequest>,
) -> Result<(StatusCode, HeaderMap, Json<RecipientResponse>), (StatusCode, String)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Name and birthday are required".into(),
        ));
    }

    let birthday = parse_birthday(&body.birthday)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let today = today_utc();
    let interests = body.interests.map(StringOrList::join);
    let likes = body.likes.map(StringOrList::join);

    let row = repo::insert(
        &state.db,
        user_id,
        NewRecipient {
            name,
            birthday,
            age: age_on(birthday, today),
            gender: body.gender.as_deref(),
            interests: interests.as_deref(),
            likes: likes.as_deref(),
            budget: body.budget,
        },
    )
    .await
    .map_err(internal)?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/recipients/{}", row.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(RecipientResponse::from_row(row, today)),
    ))
}

#[instrument(skip(state, body))]
pub async fn update_recipient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRecipientRequest>,
) -> Result<Json<RecipientResponse>, (StatusCode, String)> {
    let today = today_utc();
    let mut patch = RecipientPatch {
        gender: body.gender,
        interests: body.interests.map(StringOrList::join),
        likes: body.likes.map(StringOrList::join),
        budget: body.budget,
        ..RecipientPatch::default()
    };

    if let Some(name) = body.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err((StatusCode::BAD_REQUEST, "Name must not be empty".into()));
        }
        patch.name = Some(name);
    }

    // A new birthday re-derives the stored age.
    if let Some(raw) = body.birthday {
        let birthday =
            parse_birthday(&raw).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        patch.birthday = Some(birthday);
        patch.age = Some(age_on(birthday, today));
    }

    let row = repo::update_owned(&state.db, user_id, id, patch)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            warn!(%user_id, %id, "recipient not found");
            (StatusCode::NOT_FOUND, "Recipient not found".to_string())
        })?;

    Ok(Json(RecipientResponse::from_row(row, today)))
}

#[instrument(skip(state))]
pub async fn delete_recipient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = repo::delete_owned(&state.db, user_id, id)
        .await
        .map_err(internal)?;
    if !deleted {
        warn!(%user_id, %id, "recipient not found");
        return Err((StatusCode::NOT_FOUND, "Recipient not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "database error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
