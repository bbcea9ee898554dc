//! API handlers for ShareIt REST endpoints

pub mod bookings;
pub mod health;
pub mod items;
pub mod openapi;
pub mod requests;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{request::Parts, HeaderName, HeaderValue},
    routing::{get, post},
    Router,
};
use axum_extra::{
    headers::{self, Header},
    TypedHeader,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    AppState,
};

static SHARER_USER_ID: HeaderName = HeaderName::from_static("x-sharer-user-id");

/// `X-Sharer-User-Id`: id of the user performing the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerUserId(pub i64);

impl Header for SharerUserId {
    fn name() -> &'static HeaderName {
        &SHARER_USER_ID
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(SharerUserId)
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        values.extend(std::iter::once(HeaderValue::from(self.0)));
    }
}

/// Extractor for the acting user named by `X-Sharer-User-Id`
pub struct SharerUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SharerUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(SharerUserId(id)) =
            TypedHeader::<SharerUserId>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AppError::BadRequest("Missing X-Sharer-User-Id header".to_string())
                    } else {
                        AppError::BadRequest(
                            "X-Sharer-User-Id must be a positive integer".to_string(),
                        )
                    }
                })?;
        Ok(SharerUser(id))
    }
}

/// JSON body; a body that does not deserialize is a 400 `AppError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string counterpart of [`AppJson`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Path counterpart of [`AppJson`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Path ids start at 1
pub(crate) fn positive_id(id: i64, what: &str) -> AppResult<i64> {
    if id <= 0 {
        return Err(AppError::Validation(format!("{} must be positive", what)));
    }
    Ok(id)
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // Items
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/search", get(items::search_items))
        .route("/items/:id", get(items::get_item).patch(items::update_item))
        .route("/items/:id/comment", post(items::add_comment))
        // Bookings
        .route(
            "/bookings",
            get(bookings::list_booker_bookings).post(bookings::create_booking),
        )
        .route("/bookings/owner", get(bookings::list_owner_bookings))
        .route(
            "/bookings/:id",
            get(bookings::get_booking).patch(bookings::answer_booking),
        )
        // Item requests
        .route(
            "/requests",
            get(requests::list_own_requests).post(requests::create_request),
        )
        .route("/requests/all", get(requests::list_other_requests))
        .route("/requests/:id", get(requests::get_request))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig,
        models::booking::BookingStatus,
        services::{
            testing::{booking_row, user, MockStores},
            Services,
        },
    };

    fn app(mocks: MockStores) -> Router {
        create_router(AppState {
            config: Arc::new(AppConfig::default()),
            services: Arc::new(Services::new(mocks.into_stores())),
        })
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str, user_id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(id) = user_id {
            builder = builder.header("X-Sharer-User-Id", id);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, user_id: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(id) = user_id {
            builder = builder.header("X-Sharer-User-Id", id);
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    async fn assert_bad_value(response: axum::response::Response) {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body = json_body(response).await;
        assert_eq!(body["code"], 5);
        assert_eq!(body["error"], "BadValue");
    }

    #[test]
    fn sharer_header_decoding() {
        let decode = |raw: &'static str| {
            let value = HeaderValue::from_static(raw);
            SharerUserId::decode(&mut std::iter::once(&value))
        };
        assert_eq!(decode("42").unwrap(), SharerUserId(42));
        assert!(decode("0").is_err());
        assert!(decode("-1").is_err());
        assert!(decode("abc").is_err());
    }

    #[tokio::test]
    async fn health_is_always_up() {
        let response = app(MockStores::default())
            .oneshot(get_request("/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_reports_database_failure() {
        let mut mocks = MockStores::default();
        mocks
            .health
            .expect_ping()
            .returning(|| Err(AppError::Internal("connection refused".into())));

        let response = app(mocks).oneshot(get_request("/ready", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn missing_sharer_header_is_bad_request() {
        let response = app(MockStores::default())
            .oneshot(get_request("/items", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "BadValue");
    }

    #[tokio::test]
    async fn non_positive_sharer_header_is_bad_request() {
        let response = app(MockStores::default())
            .oneshot(get_request("/bookings", Some("0")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_state_is_reported() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks.bookings.expect_list_by_booker().never();

        let response = app(mocks)
            .oneshot(get_request("/bookings?state=UNSUPPORTED_STATUS", Some("1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Unknown state: UNSUPPORTED_STATUS");
    }

    #[tokio::test]
    async fn bad_paging_is_reported() {
        let response = app(MockStores::default())
            .oneshot(get_request("/requests/all?from=-1&size=10", Some("1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "from must be >= 0 and size must be > 0");
    }

    #[tokio::test]
    async fn stranger_gets_not_found_for_booking() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(booking_row(id, 1, 2, BookingStatus::Waiting)));

        let response = app(mocks)
            .oneshot(get_request("/bookings/5", Some("3")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn booking_view_uses_camel_case() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(booking_row(id, 1, 2, BookingStatus::Approved)));

        let response = app(mocks)
            .oneshot(get_request("/bookings/5", Some("2")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "APPROVED");
        assert_eq!(body["item"]["id"], 10);
        assert_eq!(body["booker"]["email"], "user2@example.com");
    }

    #[tokio::test]
    async fn zero_path_id_is_bad_request() {
        let response = app(MockStores::default())
            .oneshot(get_request("/users/0", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn null_user_fields_are_bad_request() {
        let request = json_request(
            "POST",
            "/users",
            None,
            r#"{"id":null,"name":null,"email":"wrong_email"}"#,
        );
        let response = app(MockStores::default()).oneshot(request).await.unwrap();
        assert_bad_value(response).await;
    }

    #[tokio::test]
    async fn blank_user_name_is_bad_request() {
        let request = json_request("POST", "/users", None, r#"{"name":"","email":"a@b.com"}"#);
        let response = app(MockStores::default()).oneshot(request).await.unwrap();
        assert_bad_value(response).await;
    }

    #[tokio::test]
    async fn null_item_name_is_bad_request() {
        let request = json_request(
            "POST",
            "/items",
            Some("1"),
            r#"{"name":null,"description":"drill","available":true}"#,
        );
        let response = app(MockStores::default()).oneshot(request).await.unwrap();
        assert_bad_value(response).await;
    }

    #[tokio::test]
    async fn null_comment_text_is_bad_request() {
        let request = json_request("POST", "/items/1/comment", Some("1"), r#"{"text":null}"#);
        let response = app(MockStores::default()).oneshot(request).await.unwrap();
        assert_bad_value(response).await;
    }

    #[tokio::test]
    async fn unparsable_booking_date_is_bad_request() {
        let request = json_request(
            "POST",
            "/bookings",
            Some("1"),
            r#"{"itemId":1,"start":"garbage","end":"2030-01-01T10:00:00"}"#,
        );
        let response = app(MockStores::default()).oneshot(request).await.unwrap();
        assert_bad_value(response).await;
    }

    #[tokio::test]
    async fn answer_without_approved_is_bad_request() {
        let request = Request::builder()
            .method("PATCH")
            .uri("/bookings/5")
            .header("X-Sharer-User-Id", "1")
            .body(Body::empty())
            .unwrap();
        let response = app(MockStores::default()).oneshot(request).await.unwrap();
        assert_bad_value(response).await;
    }

    #[tokio::test]
    async fn non_numeric_paging_is_bad_request() {
        let response = app(MockStores::default())
            .oneshot(get_request("/requests/all?from=abc", Some("1")))
            .await
            .unwrap();
        assert_bad_value(response).await;
    }

    #[tokio::test]
    async fn non_numeric_path_id_is_bad_request() {
        let response = app(MockStores::default())
            .oneshot(get_request("/items/abc", Some("1")))
            .await
            .unwrap();
        assert_bad_value(response).await;
    }
}
