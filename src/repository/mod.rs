//! Repository layer for database operations
//!
//! Each entity has a store trait implemented by a PostgreSQL repository.
//! Services only see the traits.

pub mod bookings;
pub mod comments;
pub mod items;
pub mod requests;
pub mod users;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        booking::{Booking, BookingRow, BookingState, BookingStatus, NewBooking},
        comment::Comment,
        item::{CreateItem, Item, UpdateItem},
        pagination::Page,
        request::ItemRequest,
        user::{CreateUser, UpdateUser, User},
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<User>>;

    /// `NotFound` when the user does not exist
    async fn get_by_id(&self, id: i64) -> AppResult<User>;

    /// Whether `email` belongs to a user other than `exclude_id`
    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool>;

    async fn create(&self, user: &CreateUser) -> AppResult<User>;

    async fn update(&self, id: i64, user: &UpdateUser) -> AppResult<User>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// `NotFound` when the item does not exist
    async fn get_by_id(&self, id: i64) -> AppResult<Item>;

    async fn list_by_owner(&self, owner_id: i64, page: Page) -> AppResult<Vec<Item>>;

    /// Available items whose name or description contains `text`
    async fn search(&self, text: &str, page: Page) -> AppResult<Vec<Item>>;

    async fn list_by_requests(&self, request_ids: &[i64]) -> AppResult<Vec<Item>>;

    async fn create(&self, owner_id: i64, item: &CreateItem) -> AppResult<Item>;

    async fn update(&self, id: i64, item: &UpdateItem) -> AppResult<Item>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// `NotFound` when the booking does not exist
    async fn get_by_id(&self, id: i64) -> AppResult<BookingRow>;

    async fn create(&self, booker_id: i64, booking: &NewBooking) -> AppResult<i64>;

    /// Moves a `WAITING` booking to `status`. Returns false when the booking
    /// was no longer waiting.
    async fn answer(&self, id: i64, status: BookingStatus) -> AppResult<bool>;

    async fn list_by_booker(
        &self,
        booker_id: i64,
        state: BookingState,
        now: NaiveDateTime,
        page: Page,
    ) -> AppResult<Vec<BookingRow>>;

    async fn list_by_owner(
        &self,
        owner_id: i64,
        state: BookingState,
        now: NaiveDateTime,
        page: Page,
    ) -> AppResult<Vec<BookingRow>>;

    async fn approved_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<Booking>>;

    /// Whether the user has an approved booking of the item that ended before `now`
    async fn has_finished_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: NaiveDateTime,
    ) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn list_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<Comment>>;

    async fn create(
        &self,
        item_id: i64,
        author_id: i64,
        text: &str,
        created: NaiveDateTime,
    ) -> AppResult<Comment>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// `NotFound` when the request does not exist
    async fn get_by_id(&self, id: i64) -> AppResult<ItemRequest>;

    async fn create(
        &self,
        requestor_id: i64,
        description: &str,
        created: NaiveDateTime,
    ) -> AppResult<ItemRequest>;

    async fn list_by_requestor(&self, requestor_id: i64) -> AppResult<Vec<ItemRequest>>;

    /// Requests of every user except `user_id`, newest first
    async fn list_others(&self, user_id: i64, page: Page) -> AppResult<Vec<ItemRequest>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Round-trip to the database
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub items: items::ItemsRepository,
    pub bookings: bookings::BookingsRepository,
    pub comments: comments::CommentsRepository,
    pub requests: requests::RequestsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            items: items::ItemsRepository::new(pool.clone()),
            bookings: bookings::BookingsRepository::new(pool.clone()),
            comments: comments::CommentsRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl HealthCheck for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
