//! Item catalog service: listings, search, updates and comments

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDateTime;
use validator::Validate;

use super::{local_now, Stores};
use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{last_booking, next_booking, Booking, BookingShort},
        comment::{Comment, CommentDetails, CreateComment},
        item::{CreateItem, Item, ItemDetails, UpdateItem},
        pagination::Page,
    },
    repository::{BookingStore, CommentStore, ItemStore, RequestStore, UserStore},
};

#[derive(Clone)]
pub struct ItemsService {
    items: Arc<dyn ItemStore>,
    users: Arc<dyn UserStore>,
    bookings: Arc<dyn BookingStore>,
    comments: Arc<dyn CommentStore>,
    requests: Arc<dyn RequestStore>,
}

/// Builds item views, attaching comments and, when `bookings` is given,
/// the last and next approved booking of each item.
fn assemble(
    items: Vec<Item>,
    comments: Vec<Comment>,
    bookings: Option<&[Booking]>,
    now: NaiveDateTime,
) -> Vec<ItemDetails> {
    let mut comments_by_item: HashMap<i64, Vec<CommentDetails>> = HashMap::new();
    for comment in comments {
        comments_by_item
            .entry(comment.item_id)
            .or_default()
            .push(comment.into());
    }

    items
        .into_iter()
        .map(|item| {
            let item_id = item.id;
            let comments = comments_by_item.remove(&item_id).unwrap_or_default();
            let details = ItemDetails::new(item, comments);
            match bookings {
                Some(bookings) => {
                    let own = move || bookings.iter().filter(move |b| b.item_id == item_id);
                    details.with_bookings(
                        last_booking(own(), now).map(BookingShort::from),
                        next_booking(own(), now).map(BookingShort::from),
                    )
                }
                None => details,
            }
        })
        .collect()
}

impl ItemsService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            items: stores.items.clone(),
            users: stores.users.clone(),
            bookings: stores.bookings.clone(),
            comments: stores.comments.clone(),
            requests: stores.requests.clone(),
        }
    }

    /// Owner view of several items: comments plus last/next bookings
    async fn owner_views(&self, items: Vec<Item>) -> AppResult<Vec<ItemDetails>> {
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        let comments = self.comments.list_for_items(&ids).await?;
        let bookings = self.bookings.approved_for_items(&ids).await?;
        Ok(assemble(items, comments, Some(&bookings), local_now()))
    }

    /// Items owned by the acting user
    pub async fn list_owner_items(&self, user_id: i64, page: Page) -> AppResult<Vec<ItemDetails>> {
        self.users.get_by_id(user_id).await?;
        let items = self.items.list_by_owner(user_id, page).await?;
        self.owner_views(items).await
    }

    /// Single item; booking summaries are only shown to the owner
    pub async fn get_item(&self, user_id: i64, item_id: i64) -> AppResult<ItemDetails> {
        self.users.get_by_id(user_id).await?;
        let item = self.items.get_by_id(item_id).await?;

        if item.owner_id == user_id {
            return self
                .owner_views(vec![item])
                .await?
                .pop()
                .ok_or_else(|| AppError::Internal(format!("Item {} vanished from its own view", item_id)));
        }

        let comments = self.comments.list_for_items(&[item_id]).await?;
        let comments = comments.into_iter().map(CommentDetails::from).collect();
        Ok(ItemDetails::new(item, comments))
    }

    /// Available items matching `text` in name or description
    pub async fn search(&self, text: &str, page: Page) -> AppResult<Vec<ItemDetails>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items = self.items.search(text, page).await?;
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        let comments = self.comments.list_for_items(&ids).await?;
        Ok(assemble(items, comments, None, local_now()))
    }

    /// List a new item, optionally in answer to an item request
    pub async fn create_item(&self, owner_id: i64, item: CreateItem) -> AppResult<ItemDetails> {
        item.validate()?;
        self.users.get_by_id(owner_id).await?;
        if let Some(request_id) = item.request_id {
            self.requests.get_by_id(request_id).await?;
        }

        let created = self.items.create(owner_id, &item).await?;
        tracing::info!(item_id = created.id, owner_id, request_id = ?created.request_id, "Item created");
        Ok(ItemDetails::new(created, Vec::new()))
    }

    /// Owner-only partial update
    pub async fn update_item(
        &self,
        user_id: i64,
        item_id: i64,
        update: UpdateItem,
    ) -> AppResult<ItemDetails> {
        update.validate()?;
        let item = self.items.get_by_id(item_id).await?;
        self.users.get_by_id(user_id).await?;

        if item.owner_id != user_id {
            tracing::warn!(item_id, user_id, "Update refused: not the owner");
            return Err(AppError::NoAccess(format!(
                "User {} is not the owner of item {}",
                user_id, item_id
            )));
        }

        let updated = self.items.update(item_id, &update).await?;
        self.owner_views(vec![updated])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Item {} vanished from its own view", item_id)))
    }

    /// Comment on an item the author has finished renting
    pub async fn add_comment(
        &self,
        author_id: i64,
        item_id: i64,
        comment: CreateComment,
    ) -> AppResult<CommentDetails> {
        comment.validate()?;
        self.users.get_by_id(author_id).await?;
        self.items.get_by_id(item_id).await?;

        let now = local_now();
        if !self.bookings.has_finished_booking(author_id, item_id, now).await? {
            tracing::warn!(item_id, author_id, "Comment refused: no finished booking");
            return Err(AppError::NotRented(format!(
                "User {} has not rented item {}",
                author_id, item_id
            )));
        }

        let created = self
            .comments
            .create(item_id, author_id, &comment.text, now)
            .await?;
        Ok(created.into())
    }
}
