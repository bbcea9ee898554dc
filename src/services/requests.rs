//! Item request service

use std::{collections::HashMap, sync::Arc};

use validator::Validate;

use super::{local_now, Stores};
use crate::{
    error::{AppError, AppResult},
    models::{
        item::ItemShort,
        pagination::Page,
        request::{CreateItemRequest, ItemRequest, ItemRequestDetails},
    },
    repository::{ItemStore, RequestStore, UserStore},
};

#[derive(Clone)]
pub struct RequestsService {
    requests: Arc<dyn RequestStore>,
    items: Arc<dyn ItemStore>,
    users: Arc<dyn UserStore>,
}

impl RequestsService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            requests: stores.requests.clone(),
            items: stores.items.clone(),
            users: stores.users.clone(),
        }
    }

    /// Attach the items listed in answer to each request, in one query
    async fn with_items(&self, requests: Vec<ItemRequest>) -> AppResult<Vec<ItemRequestDetails>> {
        let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
        let mut by_request: HashMap<i64, Vec<ItemShort>> = HashMap::new();
        for item in self.items.list_by_requests(&ids).await? {
            if let Some(request_id) = item.request_id {
                by_request.entry(request_id).or_default().push(ItemShort::from(&item));
            }
        }

        Ok(requests
            .into_iter()
            .map(|r| {
                let items = by_request.remove(&r.id).unwrap_or_default();
                ItemRequestDetails::new(r, items)
            })
            .collect())
    }

    pub async fn create(
        &self,
        requestor_id: i64,
        request: CreateItemRequest,
    ) -> AppResult<ItemRequestDetails> {
        request.validate()?;
        self.users.get_by_id(requestor_id).await?;

        let created = self
            .requests
            .create(requestor_id, &request.description, local_now())
            .await?;
        tracing::info!(request_id = created.id, requestor_id, "Item request created");
        Ok(ItemRequestDetails::new(created, Vec::new()))
    }

    /// The user's own requests, newest first
    pub async fn list_own(&self, user_id: i64) -> AppResult<Vec<ItemRequestDetails>> {
        self.users.get_by_id(user_id).await?;
        let requests = self.requests.list_by_requestor(user_id).await?;
        self.with_items(requests).await
    }

    /// Everybody else's requests, newest first
    pub async fn list_others(&self, user_id: i64, page: Page) -> AppResult<Vec<ItemRequestDetails>> {
        self.users.get_by_id(user_id).await?;
        let requests = self.requests.list_others(user_id, page).await?;
        self.with_items(requests).await
    }

    pub async fn get(&self, user_id: i64, request_id: i64) -> AppResult<ItemRequestDetails> {
        self.users.get_by_id(user_id).await?;
        let request = self.requests.get_by_id(request_id).await?;
        self.with_items(vec![request])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Request {} vanished", request_id)))
    }
}
