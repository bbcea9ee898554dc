//! Booking model, status workflow and time-window classification

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use super::{item::ItemShort, user::User};
use crate::error::{AppError, AppResult};

/// Booking status. `Waiting` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }

    /// Status reached when the owner answers a waiting booking
    pub fn answered(approved: bool) -> Self {
        if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

// SQLx conversion for BookingStatus (stored as TEXT)
impl sqlx::Type<Postgres> for BookingStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BookingStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookingStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Listing filter requested through the `state` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingState {
    #[default]
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    /// Parses a `state` parameter, ignoring case
    pub fn parse(raw: &str) -> AppResult<Self> {
        raw.parse()
            .map_err(|_| AppError::Validation(format!("Unknown state: {}", raw)))
    }

    /// Whether the SQL filter compares against the current time
    pub fn needs_clock(&self) -> bool {
        matches!(
            self,
            BookingState::Current | BookingState::Past | BookingState::Future
        )
    }

    /// SQL condition on the `b` (bookings) alias. `now` is the placeholder
    /// bound to the current time, only referenced when `needs_clock()`.
    pub fn sql_condition(&self, now: &str) -> Option<String> {
        match self {
            BookingState::All => None,
            BookingState::Current => Some(format!(
                "b.start_date <= {now} AND b.end_date >= {now}"
            )),
            BookingState::Past => Some(format!("b.end_date < {now}")),
            BookingState::Future => Some(format!("b.start_date > {now}")),
            BookingState::Waiting => Some("b.status = 'WAITING'".to_string()),
            BookingState::Rejected => Some("b.status = 'REJECTED'".to_string()),
        }
    }
}

impl std::str::FromStr for BookingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "REJECTED" => Ok(BookingState::Rejected),
            _ => Err(format!("Unknown state: {}", s)),
        }
    }
}

/// Booking row from the `bookings` table
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Booking {
    pub id: i64,
    pub item_id: i64,
    pub booker_id: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: BookingStatus,
}

/// Most recent approved booking that has already started
pub fn last_booking<'a, I>(bookings: I, now: NaiveDateTime) -> Option<&'a Booking>
where
    I: IntoIterator<Item = &'a Booking>,
{
    bookings
        .into_iter()
        .filter(|b| b.status == BookingStatus::Approved && b.start_date < now)
        .max_by_key(|b| b.start_date)
}

/// Earliest approved booking that has not started yet
pub fn next_booking<'a, I>(bookings: I, now: NaiveDateTime) -> Option<&'a Booking>
where
    I: IntoIterator<Item = &'a Booking>,
{
    bookings
        .into_iter()
        .filter(|b| b.status == BookingStatus::Approved && b.start_date > now)
        .min_by_key(|b| b.start_date)
}

/// Booking joined with its item and booker
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: BookingStatus,
    pub item_id: i64,
    pub item_name: String,
    pub item_description: String,
    pub item_available: bool,
    pub item_owner_id: i64,
    pub item_request_id: Option<i64>,
    pub booker_id: i64,
    pub booker_name: String,
    pub booker_email: String,
}

impl BookingRow {
    pub fn is_participant(&self, user_id: i64) -> bool {
        self.booker_id == user_id || self.item_owner_id == user_id
    }
}

/// Booking as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub item: ItemShort,
    pub booker: User,
    pub status: BookingStatus,
}

impl From<BookingRow> for BookingDetails {
    fn from(row: BookingRow) -> Self {
        BookingDetails {
            id: row.id,
            start: row.start_date,
            end: row.end_date,
            item: ItemShort {
                id: row.item_id,
                name: row.item_name,
                description: row.item_description,
                available: row.item_available,
                request_id: row.item_request_id,
            },
            booker: User {
                id: row.booker_id,
                name: row.booker_name,
                email: row.booker_email,
            },
            status: row.status,
        }
    }
}

/// Booking summary embedded in an item view (`lastBooking` / `nextBooking`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingShort {
    pub id: i64,
    pub booker_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl From<&Booking> for BookingShort {
    fn from(b: &Booking) -> Self {
        BookingShort {
            id: b.id,
            booker_id: b.booker_id,
            start: b.start_date,
            end: b.end_date,
        }
    }
}

/// Create booking request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub item_id: Option<i64>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

/// Booking request that passed `CreateBooking::check`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewBooking {
    pub item_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl CreateBooking {
    pub fn check(&self, now: NaiveDateTime) -> AppResult<NewBooking> {
        let item_id = match self.item_id {
            Some(id) if id > 0 => id,
            _ => return Err(AppError::Validation("itemId must be positive".to_string())),
        };
        let (start, end) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AppError::Validation(
                    "Booking start and end must be set".to_string(),
                ))
            }
        };
        if start >= end {
            return Err(AppError::Validation(
                "Booking start must be before its end".to_string(),
            ));
        }
        if start < now {
            return Err(AppError::Validation(
                "Booking start must not be in the past".to_string(),
            ));
        }
        Ok(NewBooking { item_id, start, end })
    }
}
