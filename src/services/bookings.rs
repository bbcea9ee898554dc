//! Booking service: the WAITING -> APPROVED/REJECTED workflow and listings

use std::sync::Arc;

use super::{local_now, Stores};
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{BookingDetails, BookingState, BookingStatus, CreateBooking},
        pagination::Page,
    },
    repository::{BookingStore, ItemStore, UserStore},
};

#[derive(Clone)]
pub struct BookingsService {
    bookings: Arc<dyn BookingStore>,
    items: Arc<dyn ItemStore>,
    users: Arc<dyn UserStore>,
}

impl BookingsService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            bookings: stores.bookings.clone(),
            items: stores.items.clone(),
            users: stores.users.clone(),
        }
    }

    /// Book someone else's available item. The booking starts out `WAITING`.
    pub async fn create(&self, booker_id: i64, booking: CreateBooking) -> AppResult<BookingDetails> {
        let booking = booking.check(local_now())?;
        self.users.get_by_id(booker_id).await?;
        let item = self.items.get_by_id(booking.item_id).await?;

        if item.owner_id == booker_id {
            return Err(AppError::NoAccess(format!(
                "User {} cannot book their own item {}",
                booker_id, item.id
            )));
        }
        if !item.available {
            return Err(AppError::ItemUnavailable(format!(
                "Item {} is not available",
                item.id
            )));
        }

        let id = self.bookings.create(booker_id, &booking).await?;
        tracing::info!(booking_id = id, item_id = item.id, booker_id, "Booking created");

        let row = self.bookings.get_by_id(id).await?;
        Ok(row.into())
    }

    /// Owner approves or rejects a waiting booking
    pub async fn answer(
        &self,
        user_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> AppResult<BookingDetails> {
        let mut row = self.bookings.get_by_id(booking_id).await?;

        if row.item_owner_id != user_id {
            tracing::warn!(booking_id, user_id, "Answer refused: not the item owner");
            return Err(AppError::NoAccess(format!(
                "User {} is not the owner of item {}",
                user_id, row.item_id
            )));
        }

        let already_answered = || {
            AppError::AlreadyAnswered(format!("Booking {} has already been answered", booking_id))
        };
        if row.status != BookingStatus::Waiting {
            return Err(already_answered());
        }

        let status = BookingStatus::answered(approved);
        // Another answer may have landed between the read and the update.
        if !self.bookings.answer(booking_id, status).await? {
            return Err(already_answered());
        }
        tracing::info!(booking_id, status = %status, "Booking answered");

        row.status = status;
        Ok(row.into())
    }

    /// Visible to the booker and the item owner only
    pub async fn get(&self, user_id: i64, booking_id: i64) -> AppResult<BookingDetails> {
        self.users.get_by_id(user_id).await?;
        let row = self.bookings.get_by_id(booking_id).await?;

        if !row.is_participant(user_id) {
            return Err(AppError::NoAccess(format!(
                "User {} has no access to booking {}",
                user_id, booking_id
            )));
        }
        Ok(row.into())
    }

    /// Bookings made by the user, newest start first
    pub async fn list_for_booker(
        &self,
        user_id: i64,
        state: BookingState,
        page: Page,
    ) -> AppResult<Vec<BookingDetails>> {
        self.users.get_by_id(user_id).await?;
        let rows = self
            .bookings
            .list_by_booker(user_id, state, local_now(), page)
            .await?;
        Ok(rows.into_iter().map(BookingDetails::from).collect())
    }

    /// Bookings of the user's items, newest start first
    pub async fn list_for_owner(
        &self,
        user_id: i64,
        state: BookingState,
        page: Page,
    ) -> AppResult<Vec<BookingDetails>> {
        self.users.get_by_id(user_id).await?;
        let rows = self
            .bookings
            .list_by_owner(user_id, state, local_now(), page)
            .await?;
        Ok(rows.into_iter().map(BookingDetails::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;
    use crate::{
        models::item::Item,
        services::testing::{booking_row, hours_from_now, item, user, MockStores},
    };

    fn service(mocks: MockStores) -> BookingsService {
        BookingsService::new(&mocks.into_stores())
    }

    fn request_for(item_id: i64) -> CreateBooking {
        CreateBooking {
            item_id: Some(item_id),
            start: Some(hours_from_now(1)),
            end: Some(hours_from_now(2)),
        }
    }

    #[tokio::test]
    async fn create_returns_waiting_booking() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks.items.expect_get_by_id().returning(|id| Ok(item(id, 1)));
        mocks
            .bookings
            .expect_create()
            .withf(|booker, b| *booker == 2 && b.item_id == 10)
            .returning(|_, _| Ok(5));
        mocks
            .bookings
            .expect_get_by_id()
            .with(eq(5))
            .returning(|id| Ok(booking_row(id, 1, 2, BookingStatus::Waiting)));

        let created = service(mocks).create(2, request_for(10)).await;
        let created = tokio_test::assert_ok!(created);
        assert_eq!(created.id, 5);
        assert_eq!(created.status, BookingStatus::Waiting);
        assert_eq!(created.booker.id, 2);
    }

    #[tokio::test]
    async fn owner_cannot_book_own_item() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks.items.expect_get_by_id().returning(|id| Ok(item(id, 1)));
        mocks.bookings.expect_create().never();

        let result = service(mocks).create(1, request_for(10)).await;
        assert!(matches!(result, Err(AppError::NoAccess(_))));
    }

    #[tokio::test]
    async fn unavailable_item_cannot_be_booked() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks.items.expect_get_by_id().returning(|id| {
            Ok(Item {
                available: false,
                ..item(id, 1)
            })
        });
        mocks.bookings.expect_create().never();

        let result = service(mocks).create(2, request_for(10)).await;
        assert!(matches!(result, Err(AppError::ItemUnavailable(_))));
    }

    #[tokio::test]
    async fn invalid_dates_fail_before_any_lookup() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().never();

        let backwards = CreateBooking {
            item_id: Some(10),
            start: Some(hours_from_now(3)),
            end: Some(hours_from_now(2)),
        };
        let result = service(mocks).create(2, backwards).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn owner_approves_waiting_booking() {
        let mut mocks = MockStores::default();
        mocks
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(booking_row(id, 1, 2, BookingStatus::Waiting)));
        mocks
            .bookings
            .expect_answer()
            .with(eq(5), eq(BookingStatus::Approved))
            .returning(|_, _| Ok(true));

        let answered = service(mocks).answer(1, 5, true).await.unwrap();
        assert_eq!(answered.status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn booker_cannot_answer() {
        let mut mocks = MockStores::default();
        mocks
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(booking_row(id, 1, 2, BookingStatus::Waiting)));
        mocks.bookings.expect_answer().never();

        let result = service(mocks).answer(2, 5, true).await;
        assert!(matches!(result, Err(AppError::NoAccess(_))));
    }

    #[tokio::test]
    async fn answered_booking_cannot_be_answered_again() {
        let mut mocks = MockStores::default();
        mocks
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(booking_row(id, 1, 2, BookingStatus::Approved)));
        mocks.bookings.expect_answer().never();

        let result = service(mocks).answer(1, 5, false).await;
        assert!(matches!(result, Err(AppError::AlreadyAnswered(_))));
    }

    #[tokio::test]
    async fn lost_answer_race_is_reported() {
        let mut mocks = MockStores::default();
        mocks
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(booking_row(id, 1, 2, BookingStatus::Waiting)));
        mocks.bookings.expect_answer().returning(|_, _| Ok(false));

        let result = service(mocks).answer(1, 5, false).await;
        assert!(matches!(result, Err(AppError::AlreadyAnswered(_))));
    }

    #[tokio::test]
    async fn only_participants_see_booking() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks
            .bookings
            .expect_get_by_id()
            .returning(|id| Ok(booking_row(id, 1, 2, BookingStatus::Waiting)));
        let service = service(mocks);

        assert!(service.get(1, 5).await.is_ok());
        assert!(service.get(2, 5).await.is_ok());
        assert!(matches!(service.get(3, 5).await, Err(AppError::NoAccess(_))));
    }

    #[tokio::test]
    async fn listings_require_known_user() {
        let mut mocks = MockStores::default();
        mocks
            .users
            .expect_get_by_id()
            .returning(|id| Err(AppError::NotFound(format!("User with id {} not found", id))));
        mocks.bookings.expect_list_by_owner().never();

        let page = Page::new(0, 10).unwrap();
        let result = service(mocks).list_for_owner(9, BookingState::All, page).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn booker_listing_passes_state_and_page() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks
            .bookings
            .expect_list_by_booker()
            .withf(|booker, state, _, page| {
                *booker == 2 && *state == BookingState::Future && page.offset() == 20
            })
            .returning(|booker, _, _, _| Ok(vec![booking_row(7, 1, booker, BookingStatus::Waiting)]));

        let page = Page::new(25, 10).unwrap();
        let found = service(mocks)
            .list_for_booker(2, BookingState::Future, page)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].item.id, 10);
    }
}
