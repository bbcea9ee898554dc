//! Items repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::ItemStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        item::{CreateItem, Item, UpdateItem},
        pagination::Page,
    },
};

const ITEM_COLUMNS: &str = "id, name, description, available, owner_id, request_id";

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so user text is matched literally
fn like_pattern(text: &str) -> String {
    let escaped = text
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ItemStore for ItemsRepository {
    /// Get item by ID
    async fn get_by_id(&self, id: i64) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(&format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Items owned by a user
    async fn list_by_owner(&self, owner_id: i64, page: Page) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE owner_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            ITEM_COLUMNS
        ))
        .bind(owner_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Full-text-ish search over available items
    async fn search(&self, text: &str, page: Page) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            r#"
            SELECT {} FROM items
            WHERE available = TRUE
              AND (LOWER(name) LIKE $1 ESCAPE '\' OR LOWER(description) LIKE $1 ESCAPE '\')
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
            ITEM_COLUMNS
        ))
        .bind(like_pattern(text))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Items created in answer to any of the given requests
    async fn list_by_requests(&self, request_ids: &[i64]) -> AppResult<Vec<Item>> {
        if request_ids.is_empty() {
            return Ok(Vec::new());
        }
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE request_id = ANY($1) ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(request_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Create a new item
    async fn create(&self, owner_id: i64, item: &CreateItem) -> AppResult<Item> {
        let row = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (name, description, available, owner_id, request_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.available.unwrap_or(false))
        .bind(owner_id)
        .bind(item.request_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update the provided fields of an item
    async fn update(&self, id: i64, item: &UpdateItem) -> AppResult<Item> {
        let mut sets = Vec::new();
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(item.name, "name");
        add_field!(item.description, "description");
        add_field!(item.available, "available");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE items SET {} WHERE id = $1 RETURNING {}",
            sets.join(", "),
            ITEM_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, Item>(&query).bind(id);
        if let Some(ref name) = item.name {
            builder = builder.bind(name);
        }
        if let Some(ref description) = item.description {
            builder = builder.bind(description);
        }
        if let Some(available) = item.available {
            builder = builder.bind(available);
        }

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_is_lowercased_and_escaped() {
        assert_eq!(like_pattern("DrIlL"), "%drill%");
        assert_eq!(like_pattern("100%_a"), "%100\\%\\_a%");
    }
}
