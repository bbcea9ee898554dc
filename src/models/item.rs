//! Item model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{booking::BookingShort, comment::CommentDetails, not_blank};

/// Item row from the `items` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

/// Item without comments or bookings (booking and request views)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemShort {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

impl From<&Item> for ItemShort {
    fn from(item: &Item) -> Self {
        ItemShort {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            available: item.available,
            request_id: item.request_id,
        }
    }
}

/// Full item view.
///
/// `last_booking` and `next_booking` are only filled in for the owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
    pub comments: Vec<CommentDetails>,
    pub last_booking: Option<BookingShort>,
    pub next_booking: Option<BookingShort>,
}

impl ItemDetails {
    pub fn new(item: Item, comments: Vec<CommentDetails>) -> Self {
        ItemDetails {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
            comments,
            last_booking: None,
            next_booking: None,
        }
    }

    pub fn with_bookings(mut self, last: Option<BookingShort>, next: Option<BookingShort>) -> Self {
        self.last_booking = last;
        self.next_booking = next;
        self
    }
}

/// Create item request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Item name must not be blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Item description must not be blank"))]
    pub description: String,
    #[validate(required(message = "Item availability must be set"))]
    pub available: Option<bool>,
    /// Item request this item answers
    pub request_id: Option<i64>,
}

/// Partial item update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    #[validate(custom(function = "not_blank", message = "Item name must not be blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank", message = "Item description must not be blank"))]
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// Item search text; paging comes from `PageParams` on the same query string
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Text looked up in name and description, case-insensitively
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_all_fields() {
        let ok: CreateItem = serde_json::from_str(
            r#"{"name":"Drill","description":"Cordless drill","available":true}"#,
        )
        .unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.request_id, None);

        let no_available: CreateItem =
            serde_json::from_str(r#"{"name":"Drill","description":"Cordless drill"}"#).unwrap();
        assert!(no_available.validate().is_err());

        let blank_description: CreateItem =
            serde_json::from_str(r#"{"name":"Drill","description":" ","available":true}"#).unwrap();
        assert!(blank_description.validate().is_err());

        let no_name: CreateItem =
            serde_json::from_str(r#"{"description":"Cordless drill","available":false}"#).unwrap();
        assert!(no_name.validate().is_err());
    }

    #[test]
    fn update_accepts_partial_payloads() {
        let only_available: UpdateItem = serde_json::from_str(r#"{"available":false}"#).unwrap();
        assert!(only_available.validate().is_ok());

        let blank_name: UpdateItem = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn details_serialize_in_camel_case() {
        let item = Item {
            id: 1,
            name: "Drill".into(),
            description: "Cordless drill".into(),
            available: true,
            owner_id: 7,
            request_id: Some(4),
        };
        let json = serde_json::to_value(ItemDetails::new(item, Vec::new())).unwrap();
        assert_eq!(json["requestId"], 4);
        assert!(json["lastBooking"].is_null());
        assert!(json["comments"].as_array().unwrap().is_empty());
        assert!(json.get("ownerId").is_none());
    }
}
