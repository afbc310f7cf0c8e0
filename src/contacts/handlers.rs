use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::gate::AuthUser,
    binder,
    contacts::{dto::SearchParams, repo_types::Contact},
    error::{AppError, AppResult},
    id::RecordId,
    state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/search", get(search_contacts))
        .route(
            "/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route("/contacts/:id/favourite", patch(toggle_favourite))
}

fn parse_id(raw: &str) -> AppResult<RecordId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid ID".into()))
}

fn not_found() -> AppError {
    AppError::not_found("Contact not found")
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<Json<Vec<Contact>>> {
    let contacts = Contact::list_by_user(state.store.as_ref(), auth.user.id).await?;
    Ok(Json(contacts))
}

#[instrument(skip_all, fields(user_id = %auth.user.id, query = %params.query))]
pub async fn search_contacts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Contact>>> {
    let pattern = params.pattern().map_err(AppError::Validation)?;
    let contacts = Contact::search(state.store.as_ref(), auth.user.id, &pattern).await?;
    Ok(Json(contacts))
}

#[instrument(skip_all, fields(user_id = %auth.user.id, contact_id = %id))]
pub async fn get_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Contact>> {
    let id = parse_id(&id)?;
    Contact::get(state.store.as_ref(), auth.user.id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn create_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Contact>)> {
    let payload: Contact = binder::bind(&body).map_err(AppError::Validation)?;
    let contact = Contact::create(state.store.as_ref(), auth.user.id, payload)
        .await
        .map_err(|e| AppError::internal("Failed to create contact", e))?;

    info!(contact_id = %contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

#[instrument(skip_all, fields(user_id = %auth.user.id, contact_id = %id))]
pub async fn update_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Contact>> {
    let id = parse_id(&id)?;
    let store = state.store.as_ref();

    // ownership first, so a foreign id is a 404 even with a bad payload
    if Contact::get(store, auth.user.id, id).await?.is_none() {
        return Err(not_found());
    }

    let payload: Contact = binder::bind(&body).map_err(AppError::Validation)?;
    let contact = Contact::update(store, auth.user.id, id, payload)
        .await
        .map_err(|e| AppError::internal("Failed to update contact", e))?
        .ok_or_else(not_found)?;

    info!("contact updated");
    Ok(Json(contact))
}

#[instrument(skip_all, fields(user_id = %auth.user.id, contact_id = %id))]
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    let deleted = Contact::delete(state.store.as_ref(), auth.user.id, id)
        .await
        .map_err(|e| AppError::internal("Failed to delete contact", e))?;

    if !deleted {
        return Err(not_found());
    }
    info!("contact deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(user_id = %auth.user.id, contact_id = %id))]
pub async fn toggle_favourite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Contact>> {
    let id = parse_id(&id)?;
    let contact = Contact::toggle_favorite(state.store.as_ref(), auth.user.id, id)
        .await
        .map_err(|e| AppError::internal("Failed to update favorite status", e))?
        .ok_or_else(not_found)?;

    info!(favorite = contact.favorite, "favorite toggled");
    Ok(Json(contact))
}
