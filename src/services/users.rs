//! User management service

use std::sync::Arc;

use validator::Validate;

use super::Stores;
use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    repository::UserStore,
};

#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserStore>,
}

impl UsersService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            users: stores.users.clone(),
        }
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    pub async fn get_user(&self, id: i64) -> AppResult<User> {
        self.users.get_by_id(id).await
    }

    /// Register a user; the e-mail must not be taken
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()?;

        if self.users.email_exists(&user.email, None).await? {
            tracing::warn!(email = %user.email, "Email already registered");
            return Err(AppError::Conflict(format!(
                "Email {} is already in use",
                user.email
            )));
        }

        let created = self.users.create(&user).await?;
        tracing::info!(user_id = created.id, "User created");
        Ok(created)
    }

    /// Apply the provided fields to an existing user
    pub async fn update_user(&self, id: i64, user: UpdateUser) -> AppResult<User> {
        user.validate()?;
        self.users.get_by_id(id).await?;

        if let Some(ref email) = user.email {
            if self.users.email_exists(email, Some(id)).await? {
                tracing::warn!(user_id = id, email = %email, "Email already registered");
                return Err(AppError::Conflict(format!("Email {} is already in use", email)));
            }
        }

        self.users.update(id, &user).await
    }

    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;
    use crate::services::testing::{user, MockStores};

    fn service(mocks: MockStores) -> UsersService {
        UsersService::new(&mocks.into_stores())
    }

    #[tokio::test]
    async fn create_rejects_taken_email() {
        let mut mocks = MockStores::default();
        mocks
            .users
            .expect_email_exists()
            .with(eq("ann@example.com"), eq(None::<i64>))
            .returning(|_, _| Ok(true));
        mocks.users.expect_create().never();

        let result = service(mocks)
            .create_user(CreateUser {
                name: "Ann".into(),
                email: "ann@example.com".into(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_validates_before_touching_the_store() {
        let mocks = MockStores::default();

        let result = service(mocks)
            .create_user(CreateUser {
                name: String::new(),
                email: "ann@example.com".into(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_stores_new_user() {
        let mut mocks = MockStores::default();
        mocks.users.expect_email_exists().returning(|_, _| Ok(false));
        mocks.users.expect_create().times(1).returning(|u| {
            Ok(User {
                id: 1,
                name: u.name.clone(),
                email: u.email.clone(),
            })
        });

        let created = service(mocks)
            .create_user(CreateUser {
                name: "Ann".into(),
                email: "ann@example.com".into(),
            })
            .await;

        let created = tokio_test::assert_ok!(created);
        assert_eq!(created.id, 1);
    }

    #[tokio::test]
    async fn update_of_missing_user_is_not_found() {
        let mut mocks = MockStores::default();
        mocks
            .users
            .expect_get_by_id()
            .with(eq(9))
            .returning(|id| Err(AppError::NotFound(format!("User with id {} not found", id))));

        let result = service(mocks).update_user(9, UpdateUser::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_allows_keeping_own_email() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks
            .users
            .expect_email_exists()
            .with(eq("user1@example.com"), eq(Some(1_i64)))
            .returning(|_, _| Ok(false));
        mocks.users.expect_update().returning(|id, _| Ok(user(id)));

        let update = UpdateUser {
            name: None,
            email: Some("user1@example.com".into()),
        };
        assert_eq!(service(mocks).update_user(1, update).await.unwrap(), user(1));
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_user() {
        let mut mocks = MockStores::default();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks.users.expect_email_exists().returning(|_, _| Ok(true));
        mocks.users.expect_update().never();

        let update = UpdateUser {
            name: None,
            email: Some("user2@example.com".into()),
        };
        let result = service(mocks).update_user(1, update).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn delete_of_missing_user_is_not_found() {
        let mut mocks = MockStores::default();
        mocks
            .users
            .expect_delete()
            .with(eq(9))
            .returning(|id| Err(AppError::NotFound(format!("User with id {} not found", id))));

        let result = service(mocks).delete_user(9).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_user() {
        let mut mocks = MockStores::default();
        mocks.users.expect_delete().with(eq(1)).times(1).returning(|_| Ok(()));

        tokio_test::assert_ok!(service(mocks).delete_user(1).await);
    }
}
