use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
    http::StatusCode,
};

use crate::{
    application::dto::{MessageResponse, PingResponse, UserPayload, UserResponse},
    domain::errors::DomainError,
    interface::http::problem::{ApiProblem, ApiResult},
    state::AppState,
};

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse::pong())
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let payload = UserPayload::from_json(&body?)?;
    let created = state.user_service.create_user(payload).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = parse_user_id(&id)?;
    let user = state.user_service.get_user(user_id).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let user_id = parse_user_id(&id)?;
    let payload = UserPayload::from_json(&body?)?;
    let updated = state.user_service.update_user(user_id, payload).await?;

    Ok(Json(updated))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let user_id = parse_user_id(&id)?;
    let removed = state.user_service.delete_user(user_id).await?;

    Ok(Json(removed))
}

pub async fn route_not_found() -> ApiProblem {
    ApiProblem::route_not_found()
}

pub async fn method_not_allowed() -> ApiProblem {
    ApiProblem::method_not_allowed()
}

// Ids that are not integers cannot name a row, so they are reported the same
// way as unknown integer ids.
fn parse_user_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| ApiProblem::from_domain(DomainError::not_found(raw)))
}
