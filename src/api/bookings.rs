//! Booking endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        booking::{BookingDetails, BookingState, CreateBooking},
        pagination::PageParams,
    },
    AppState,
};

use super::{positive_id, AppJson, AppPath, AppQuery, SharerUser};

/// State filter of the booking listings; paging comes from `PageParams`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    /// ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED (default ALL)
    pub state: Option<String>,
}

impl BookingListQuery {
    fn booking_state(&self) -> AppResult<BookingState> {
        match self.state.as_deref() {
            Some(raw) => BookingState::parse(raw),
            None => Ok(BookingState::All),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnswerQuery {
    /// true approves the booking, false rejects it
    pub approved: bool,
}

/// Request a booking of someone else's item
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker")
    ),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created, waiting for the owner", body = BookingDetails),
        (status = 400, description = "Invalid dates or item unavailable", body = crate::error::ErrorResponse),
        (status = 404, description = "User or item not found, or own item", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppJson(booking): AppJson<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingDetails>)> {
    tracing::info!(booker_id = user_id, item_id = ?booking.item_id, "Create booking");
    let created = state.services.bookings.create(user_id, booking).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Approve or reject a waiting booking (item owner only)
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner"),
        ("id" = i64, Path, description = "Booking ID"),
        AnswerQuery
    ),
    responses(
        (status = 200, description = "Booking answered", body = BookingDetails),
        (status = 400, description = "Booking already answered", body = crate::error::ErrorResponse),
        (status = 404, description = "Booking not found or not owned", body = crate::error::ErrorResponse)
    )
)]
pub async fn answer_booking(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
    AppQuery(query): AppQuery<AnswerQuery>,
) -> AppResult<Json<BookingDetails>> {
    let id = positive_id(id, "bookingId")?;
    tracing::info!(booking_id = id, user_id, approved = query.approved, "Answer booking");
    let answered = state
        .services
        .bookings
        .answer(user_id, id, query.approved)
        .await?;
    Ok(Json(answered))
}

/// Get a booking (booker or item owner only)
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker or item owner"),
        ("id" = i64, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = BookingDetails),
        (status = 404, description = "Booking not found or not visible", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<BookingDetails>> {
    let id = positive_id(id, "bookingId")?;
    let booking = state.services.bookings.get(user_id, id).await?;
    Ok(Json(booking))
}

/// Bookings made by the acting user
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker"),
        BookingListQuery,
        PageParams
    ),
    responses(
        (status = 200, description = "Bookings, latest start first", body = Vec<BookingDetails>),
        (status = 400, description = "Unknown state or bad paging", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_booker_bookings(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppQuery(query): AppQuery<BookingListQuery>,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let booking_state = query.booking_state()?;
    let page = params.resolve(state.config.paging.default_size)?;
    let bookings = state
        .services
        .bookings
        .list_for_booker(user_id, booking_state, page)
        .await?;
    Ok(Json(bookings))
}

/// Bookings of the items owned by the acting user
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner"),
        BookingListQuery,
        PageParams
    ),
    responses(
        (status = 200, description = "Bookings, latest start first", body = Vec<BookingDetails>),
        (status = 400, description = "Unknown state or bad paging", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_owner_bookings(
    State(state): State<AppState>,
    SharerUser(user_id): SharerUser,
    AppQuery(query): AppQuery<BookingListQuery>,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let booking_state = query.booking_state()?;
    let page = params.resolve(state.config.paging.default_size)?;
    let bookings = state
        .services
        .bookings
        .list_for_owner(user_id, booking_state, page)
        .await?;
    Ok(Json(bookings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_state_defaults_to_all() {
        assert_eq!(BookingListQuery::default().booking_state().unwrap(), BookingState::All);
    }

    #[test]
    fn listing_state_is_case_insensitive() {
        let query = BookingListQuery {
            state: Some("waiting".into()),
        };
        assert_eq!(query.booking_state().unwrap(), BookingState::Waiting);
    }
}
