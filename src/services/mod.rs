//! Business logic services

pub mod bookings;
pub mod items;
pub mod requests;
pub mod users;

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use crate::{
    error::AppResult,
    repository::{
        BookingStore, CommentStore, HealthCheck, ItemStore, Repository, RequestStore, UserStore,
    },
};

/// Current time on the server's local clock; every stored timestamp uses it.
pub(crate) fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Store handles shared by the services
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub items: Arc<dyn ItemStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub comments: Arc<dyn CommentStore>,
    pub requests: Arc<dyn RequestStore>,
    pub health: Arc<dyn HealthCheck>,
}

impl From<Repository> for Stores {
    fn from(repository: Repository) -> Self {
        Self {
            users: Arc::new(repository.users.clone()),
            items: Arc::new(repository.items.clone()),
            bookings: Arc::new(repository.bookings.clone()),
            comments: Arc::new(repository.comments.clone()),
            requests: Arc::new(repository.requests.clone()),
            health: Arc::new(repository),
        }
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub items: items::ItemsService,
    pub bookings: bookings::BookingsService,
    pub requests: requests::RequestsService,
    health: Arc<dyn HealthCheck>,
}

impl Services {
    /// Create all services over the given stores
    pub fn new(stores: Stores) -> Self {
        Self {
            users: users::UsersService::new(&stores),
            items: items::ItemsService::new(&stores),
            bookings: bookings::BookingsService::new(&stores),
            requests: requests::RequestsService::new(&stores),
            health: stores.health,
        }
    }

    /// Checks that the database answers
    pub async fn ready(&self) -> AppResult<()> {
        self.health.ping().await
    }
}
