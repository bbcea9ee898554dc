//! Item requests repository for database operations

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};

use super::RequestStore;
use crate::{
    error::{AppError, AppResult},
    models::{pagination::Page, request::ItemRequest},
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestStore for RequestsRepository {
    async fn get_by_id(&self, id: i64) -> AppResult<ItemRequest> {
        sqlx::query_as::<_, ItemRequest>(
            "SELECT id, description, requestor_id, created FROM requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
    }

    async fn create(
        &self,
        requestor_id: i64,
        description: &str,
        created: NaiveDateTime,
    ) -> AppResult<ItemRequest> {
        let request = sqlx::query_as::<_, ItemRequest>(
            r#"
            INSERT INTO requests (description, requestor_id, created)
            VALUES ($1, $2, $3)
            RETURNING id, description, requestor_id, created
            "#,
        )
        .bind(description)
        .bind(requestor_id)
        .bind(created)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    async fn list_by_requestor(&self, requestor_id: i64) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, description, requestor_id, created FROM requests
            WHERE requestor_id = $1
            ORDER BY created DESC, id DESC
            "#,
        )
        .bind(requestor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn list_others(&self, user_id: i64, page: Page) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as::<_, ItemRequest>(
            r#"
            SELECT id, description, requestor_id, created FROM requests
            WHERE requestor_id != $1
            ORDER BY created DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }
}
