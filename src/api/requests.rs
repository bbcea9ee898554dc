//! Item request endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        pagination::PageParams,
        request::{CreateItemRequest, ItemRequestDetails},
    },
    AppState,
};

use super::{positive_id, AppJson, AppPath, AppQuery, SharerUser};

/// Ask for an item nobody lists yet
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Requestor")
    ),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Request created", body = ItemRequestDetails),
        (status = 400, description = "Blank description", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppJson(request): AppJson<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ItemRequestDetails>)> {
    tracing::info!(requestor_id = user_id, "Create item request");
    let created = state.services.requests.create(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Requests of the acting user with the items offered for them
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Requestor")
    ),
    responses(
        (status = 200, description = "Own requests, newest first", body = Vec<ItemRequestDetails>),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_own_requests(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
) -> AppResult<Json<Vec<ItemRequestDetails>>> {
    let requests = state.services.requests.list_own(user_id).await?;
    Ok(Json(requests))
}

/// Requests of all other users
#[utoipa::path(
    get,
    path = "/requests/all",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user"),
        PageParams
    ),
    responses(
        (status = 200, description = "Other users' requests, newest first", body = Vec<ItemRequestDetails>),
        (status = 400, description = "Bad paging", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_other_requests(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<Vec<ItemRequestDetails>>> {
    let page = params.resolve(state.config.paging.default_size)?;
    let requests = state.services.requests.list_others(user_id, page).await?;
    Ok(Json(requests))
}

#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user"),
        ("id" = i64, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request with its items", body = ItemRequestDetails),
        (status = 404, description = "User or request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ItemRequestDetails>> {
    let id = positive_id(id, "requestId")?;
    let request = state.services.requests.get(user_id, id).await?;
    Ok(Json(request))
}
