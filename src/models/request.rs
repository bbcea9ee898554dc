//! Item request model ("I wish someone would list ...")

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{item::ItemShort, not_blank};

/// Row from the `requests` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: NaiveDateTime,
}

/// Item request with the items created in answer to it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestDetails {
    pub id: i64,
    pub description: String,
    pub created: NaiveDateTime,
    pub items: Vec<ItemShort>,
}

impl ItemRequestDetails {
    pub fn new(request: ItemRequest, items: Vec<ItemShort>) -> Self {
        ItemRequestDetails {
            id: request.id,
            description: request.description,
            created: request.created,
            items,
        }
    }
}

/// Create item request payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Request description must not be blank"))]
    pub description: String,
}
