//! Comment model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::not_blank;

/// Comment joined with its author's name
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_name: String,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentDetails {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    pub created: NaiveDateTime,
}

impl From<Comment> for CommentDetails {
    fn from(c: Comment) -> Self {
        CommentDetails {
            id: c.id,
            text: c.text,
            author_name: c.author_name,
            created: c.created,
        }
    }
}

/// Create comment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Comment text must not be blank"))]
    pub text: String,
}
