//! Item endpoints: own listings, search, updates and comments

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        comment::{CommentDetails, CreateComment},
        item::{CreateItem, ItemDetails, SearchQuery, UpdateItem},
        pagination::PageParams,
    },
    AppState,
};

use super::{positive_id, AppJson, AppPath, AppQuery, SharerUser};

/// List items owned by the acting user
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user"),
        PageParams
    ),
    responses(
        (status = 200, description = "Owned items with comments and bookings", body = Vec<ItemDetails>),
        (status = 400, description = "Bad paging", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<Vec<ItemDetails>>> {
    let page = params.resolve(state.config.paging.default_size)?;
    let items = state.services.items.list_owner_items(user_id, page).await?;
    Ok(Json(items))
}

/// Get an item; booking summaries are included for its owner
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user"),
        ("id" = i64, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemDetails),
        (status = 404, description = "User or item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ItemDetails>> {
    let id = positive_id(id, "itemId")?;
    let item = state.services.items.get_item(user_id, id).await?;
    Ok(Json(item))
}

/// Search available items by name or description
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Acting user"),
        SearchQuery,
        PageParams
    ),
    responses(
        (status = 200, description = "Matching items", body = Vec<ItemDetails>),
        (status = 400, description = "Bad paging", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_items(
    State(state): State<AppState>,
    SharerUser(_user_id): SharerUser,
    AppQuery(query): AppQuery<SearchQuery>,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<Vec<ItemDetails>>> {
    let page = params.resolve(state.config.paging.default_size)?;
    let text = query.text.unwrap_or_default();
    tracing::debug!(text = %text, "Search items");

    let items = state.services.items.search(&text, page).await?;
    Ok(Json(items))
}

/// List a new item
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner")
    ),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = ItemDetails),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Owner or request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppJson(item): AppJson<CreateItem>,
) -> AppResult<(StatusCode, Json<ItemDetails>)> {
    let created = state.services.items.create_item(user_id, item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an item (owner only)
#[utoipa::path(
    patch,
    path = "/items/{id}",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner"),
        ("id" = i64, Path, description = "Item ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = ItemDetails),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found or not owned", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
    AppJson(update): AppJson<UpdateItem>,
) -> AppResult<Json<ItemDetails>> {
    let id = positive_id(id, "itemId")?;
    tracing::info!(item_id = id, user_id, "Update item");
    let updated = state.services.items.update_item(user_id, id, update).await?;
    Ok(Json(updated))
}

/// Comment on an item after a finished booking
#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Author"),
        ("id" = i64, Path, description = "Item ID")
    ),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment created", body = CommentDetails),
        (status = 400, description = "Blank text or no finished booking", body = crate::error::ErrorResponse),
        (status = 404, description = "User or item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_comment(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
    AppJson(comment): AppJson<CreateComment>,
) -> AppResult<(StatusCode, Json<CommentDetails>)> {
    let id = positive_id(id, "itemId")?;
    tracing::info!(item_id = id, author_id = user_id, "Add comment");
    let created = state.services.items.add_comment(user_id, id, comment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
