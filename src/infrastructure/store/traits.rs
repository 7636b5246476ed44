//! Store trait definitions

use async_trait::async_trait;
use serde_json::Value;

use crate::core::upload::FileAsset;
use crate::domain::{DomainResult, User};

/// Store trait for persistence operations
#[async_trait]
pub trait Store: Send + Sync {
    // User account operations
    async fn create_user(&self, user: User) -> DomainResult<User>;
    async fn get_user(&self, id: &str) -> DomainResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn update_user(&self, user: User) -> DomainResult<()>;
    async fn count_users(&self) -> DomainResult<u64>;

    // Collection operations (named datasets of JSON rows)
    async fn collection_names(&self) -> DomainResult<Vec<String>>;
    async fn list_rows(&self, collection: &str) -> DomainResult<Vec<Value>>;
    async fn get_row(&self, collection: &str, id: i64) -> DomainResult<Option<Value>>;
    async fn insert_row(&self, collection: &str, row: Value) -> DomainResult<Value>;
    async fn update_row(&self, collection: &str, id: i64, row: Value) -> DomainResult<Value>;
    async fn delete_row(&self, collection: &str, id: i64) -> DomainResult<()>;

    // Upload asset operations
    async fn save_asset(&self, asset: FileAsset) -> DomainResult<()>;
    async fn get_asset(&self, id: &str) -> DomainResult<Option<FileAsset>>;
    async fn list_assets(&self) -> DomainResult<Vec<FileAsset>>;
    async fn delete_asset(&self, id: &str) -> DomainResult<()>;
}
