//! Comments repository for database operations

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};

use super::CommentStore;
use crate::{error::AppResult, models::comment::Comment};

#[derive(Clone)]
pub struct CommentsRepository {
    pool: Pool<Postgres>,
}

impl CommentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for CommentsRepository {
    /// Comments on any of the given items, oldest first
    async fn list_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<Comment>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.text, c.item_id, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON c.author_id = u.id
            WHERE c.item_id = ANY($1)
            ORDER BY c.created, c.id
            "#,
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn create(
        &self,
        item_id: i64,
        author_id: i64,
        text: &str,
        created: NaiveDateTime,
    ) -> AppResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (text, item_id, author_id, created)
                VALUES ($1, $2, $3, $4)
                RETURNING id, text, item_id, author_id, created
            )
            SELECT c.id, c.text, c.item_id, u.name AS author_name, c.created
            FROM inserted c
            JOIN users u ON c.author_id = u.id
            "#,
        )
        .bind(text)
        .bind(item_id)
        .bind(author_id)
        .bind(created)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }
}
