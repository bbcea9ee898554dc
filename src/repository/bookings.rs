//! Bookings repository for database operations

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};

use super::BookingStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingRow, BookingState, BookingStatus, NewBooking},
        pagination::Page,
    },
};

const BOOKING_ROW_SELECT: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           i.id AS item_id, i.name AS item_name, i.description AS item_description,
           i.available AS item_available, i.owner_id AS item_owner_id,
           i.request_id AS item_request_id,
           u.id AS booker_id, u.name AS booker_name, u.email AS booker_email
    FROM bookings b
    JOIN items i ON b.item_id = i.id
    JOIN users u ON b.booker_id = u.id
"#;

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

/// Which side of the booking the listing is for
#[derive(Debug, Clone, Copy)]
enum Party {
    Booker,
    Owner,
}

impl Party {
    fn column(&self) -> &'static str {
        match self {
            Party::Booker => "b.booker_id",
            Party::Owner => "i.owner_id",
        }
    }
}

/// Listing query for one party and state; `$1` is the user id.
fn listing_query(party: Party, state: BookingState) -> String {
    let mut conditions = vec![format!("{} = $1", party.column())];
    let mut next_param = 2;

    if let Some(condition) = state.sql_condition(&format!("${}", next_param)) {
        conditions.push(condition);
    }
    if state.needs_clock() {
        next_param += 1;
    }

    format!(
        "{} WHERE {} ORDER BY b.start_date DESC, b.id DESC LIMIT ${} OFFSET ${}",
        BOOKING_ROW_SELECT,
        conditions.join(" AND "),
        next_param,
        next_param + 1
    )
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn list(
        &self,
        party: Party,
        user_id: i64,
        state: BookingState,
        now: NaiveDateTime,
        page: Page,
    ) -> AppResult<Vec<BookingRow>> {
        let query = listing_query(party, state);

        let mut builder = sqlx::query_as::<_, BookingRow>(&query).bind(user_id);
        if state.needs_clock() {
            builder = builder.bind(now);
        }

        let rows = builder
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl BookingStore for BookingsRepository {
    /// Get booking with its item and booker
    async fn get_by_id(&self, id: i64) -> AppResult<BookingRow> {
        sqlx::query_as::<_, BookingRow>(&format!("{} WHERE b.id = $1", BOOKING_ROW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))
    }

    /// Create a waiting booking
    async fn create(&self, booker_id: i64, booking: &NewBooking) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(booking.start)
        .bind(booking.end)
        .bind(booking.item_id)
        .bind(booker_id)
        .bind(BookingStatus::Waiting)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Compare-and-set from WAITING to the answered status
    async fn answer(&self, id: i64, status: BookingStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1 AND status = $3")
            .bind(id)
            .bind(status)
            .bind(BookingStatus::Waiting)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_by_booker(
        &self,
        booker_id: i64,
        state: BookingState,
        now: NaiveDateTime,
        page: Page,
    ) -> AppResult<Vec<BookingRow>> {
        self.list(Party::Booker, booker_id, state, now, page).await
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        state: BookingState,
        now: NaiveDateTime,
        page: Page,
    ) -> AppResult<Vec<BookingRow>> {
        self.list(Party::Owner, owner_id, state, now, page).await
    }

    /// Approved bookings of the given items, used for last/next computation
    async fn approved_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<Booking>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, item_id, booker_id, start_date, end_date, status
            FROM bookings
            WHERE item_id = ANY($1) AND status = $2
            ORDER BY start_date
            "#,
        )
        .bind(item_ids)
        .bind(BookingStatus::Approved)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn has_finished_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: NaiveDateTime,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE booker_id = $1 AND item_id = $2 AND status = $3 AND end_date < $4
            )
            "#,
        )
        .bind(booker_id)
        .bind(item_id)
        .bind(BookingStatus::Approved)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_state_only_filters_by_party() {
        let sql = listing_query(Party::Booker, BookingState::All);
        assert!(sql.contains(
            "WHERE b.booker_id = $1 ORDER BY b.start_date DESC, b.id DESC LIMIT $2 OFFSET $3"
        ));
    }

    #[test]
    fn clock_states_shift_paging_parameters() {
        let sql = listing_query(Party::Owner, BookingState::Current);
        assert!(sql.contains("i.owner_id = $1 AND b.start_date <= $2 AND b.end_date >= $2"));
        assert!(sql.ends_with("LIMIT $3 OFFSET $4"));
    }

    #[test]
    fn status_states_do_not_bind_the_clock() {
        let sql = listing_query(Party::Owner, BookingState::Waiting);
        assert!(sql.contains("i.owner_id = $1 AND b.status = 'WAITING'"));
        assert!(sql.ends_with("LIMIT $2 OFFSET $3"));
    }
}
