//! Data models for ShareIt

pub mod booking;
pub mod comment;
pub mod item;
pub mod pagination;
pub mod request;
pub mod user;

use validator::ValidationError;

// Re-export commonly used types
pub use booking::{Booking, BookingDetails, BookingShort, BookingState, BookingStatus};
pub use comment::{Comment, CommentDetails};
pub use item::{Item, ItemDetails, ItemShort};
pub use pagination::{Page, PageParams};
pub use request::{ItemRequest, ItemRequestDetails};
pub use user::User;

/// Rejects empty and whitespace-only strings
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
