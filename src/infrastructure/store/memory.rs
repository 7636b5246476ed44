//! In-memory store implementation

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};

use super::Store;
use crate::core::upload::FileAsset;
use crate::domain::{DomainError, DomainResult, User};

/// One named dataset: JSON rows keyed by integer id.
struct Collection {
    rows: DashMap<i64, Value>,
    id_counter: AtomicI64,
}

impl Collection {
    fn new() -> Self {
        Self {
            rows: DashMap::new(),
            id_counter: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> i64 {
        self.id_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Rows in id order. Ids are issued monotonically, so this is
    /// insertion order, which the table engine treats as the baseline.
    fn ordered_rows(&self) -> Vec<Value> {
        let mut rows: Vec<(i64, Value)> = self
            .rows
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        rows.into_iter().map(|(_, row)| row).collect()
    }
}

/// In-memory store for development and testing
pub struct InMemoryStore {
    users: DashMap<String, User>,
    collections: DashMap<String, Collection>,
    assets: DashMap<String, FileAsset>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            collections: DashMap::new(),
            assets: DashMap::new(),
        }
    }

    /// A store pre-filled with the demo dataset.
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        let collection = Collection::new();
        for mut row in demo_users() {
            let id = collection.next_id();
            if let Some(object) = row.as_object_mut() {
                object.insert("id".to_string(), json!(id));
            }
            collection.rows.insert(id, row);
        }
        store.collections.insert("users".to_string(), collection);
        store
    }

    fn require_collection(
        &self,
        name: &str,
    ) -> DomainResult<dashmap::mapref::one::Ref<'_, String, Collection>> {
        self.collections.get(name).ok_or_else(|| {
            DomainError::not_found("collection", "name", name)
        })
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_user(&self, user: User) -> DomainResult<User> {
        let username_taken = self
            .users
            .iter()
            .any(|entry| entry.username == user.username || entry.email == user.email);
        if username_taken {
            return Err(DomainError::Conflict(format!(
                "User '{}' already exists",
                user.username
            )));
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.value().clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn update_user(&self, user: User) -> DomainResult<()> {
        if !self.users.contains_key(&user.id) {
            return Err(DomainError::not_found("user", "id", user.id));
        }
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn count_users(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn collection_names(&self) -> DomainResult<Vec<String>> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn list_rows(&self, collection: &str) -> DomainResult<Vec<Value>> {
        Ok(self.require_collection(collection)?.ordered_rows())
    }

    async fn get_row(&self, collection: &str, id: i64) -> DomainResult<Option<Value>> {
        Ok(self
            .require_collection(collection)?
            .rows
            .get(&id)
            .map(|row| row.clone()))
    }

    async fn insert_row(&self, collection: &str, mut row: Value) -> DomainResult<Value> {
        if !row.is_object() {
            return Err(DomainError::Validation(
                "Row must be a JSON object".to_string(),
            ));
        }
        // First insert creates the collection.
        let entry = self
            .collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);
        let id = entry.next_id();
        if let Some(object) = row.as_object_mut() {
            object.insert("id".to_string(), json!(id));
        }
        entry.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update_row(&self, collection: &str, id: i64, mut row: Value) -> DomainResult<Value> {
        if !row.is_object() {
            return Err(DomainError::Validation(
                "Row must be a JSON object".to_string(),
            ));
        }
        let entry = self.require_collection(collection)?;
        if !entry.rows.contains_key(&id) {
            return Err(DomainError::not_found("row", "id", id.to_string()));
        }
        if let Some(object) = row.as_object_mut() {
            object.insert("id".to_string(), json!(id));
        }
        entry.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_row(&self, collection: &str, id: i64) -> DomainResult<()> {
        let entry = self.require_collection(collection)?;
        entry
            .rows
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("row", "id", id.to_string()))?;
        Ok(())
    }

    async fn save_asset(&self, asset: FileAsset) -> DomainResult<()> {
        self.assets.insert(asset.id.clone(), asset);
        Ok(())
    }

    async fn get_asset(&self, id: &str) -> DomainResult<Option<FileAsset>> {
        Ok(self.assets.get(id).map(|a| a.clone()))
    }

    async fn list_assets(&self) -> DomainResult<Vec<FileAsset>> {
        let mut assets: Vec<FileAsset> = self.assets.iter().map(|e| e.value().clone()).collect();
        assets.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at).then(a.id.cmp(&b.id)));
        Ok(assets)
    }

    async fn delete_asset(&self, id: &str) -> DomainResult<()> {
        self.assets
            .remove(id)
            .ok_or_else(|| DomainError::not_found("asset", "id", id))?;
        Ok(())
    }
}

/// Demo rows for the seeded "users" collection.
fn demo_users() -> Vec<Value> {
    vec![
        json!({"name": "John Doe", "email": "john@example.com", "role": "Admin", "status": "Active", "joinDate": "2024-01-15"}),
        json!({"name": "Jane Smith", "email": "jane@example.com", "role": "User", "status": "Active", "joinDate": "2024-02-20"}),
        json!({"name": "Mike Johnson", "email": "mike@example.com", "role": "Editor", "status": "Inactive", "joinDate": "2024-01-10"}),
        json!({"name": "Sarah Williams", "email": "sarah@example.com", "role": "User", "status": "Active", "joinDate": "2024-03-05"}),
        json!({"name": "Tom Brown", "email": "tom@example.com", "role": "Viewer", "status": "Active", "joinDate": "2024-02-28"}),
        json!({"name": "Emma Davis", "email": "emma@example.com", "role": "Admin", "status": "Active", "joinDate": "2024-01-20"}),
        json!({"name": "Alex Rodriguez", "email": "alex@example.com", "role": "Editor", "status": "Active", "joinDate": "2024-03-15"}),
        json!({"name": "Lisa Anderson", "email": "lisa@example.com", "role": "User", "status": "Inactive", "joinDate": "2024-02-10"}),
        json!({"name": "David Miller", "email": "david@example.com", "role": "Viewer", "status": "Active", "joinDate": "2024-03-20"}),
        json!({"name": "Grace Lee", "email": "grace@example.com", "role": "User", "status": "Active", "joinDate": "2024-01-30"}),
        json!({"name": "Chris Martin", "email": "chris@example.com", "role": "Editor", "status": "Active", "joinDate": "2024-03-25"}),
        json!({"name": "Sophie Taylor", "email": "sophie@example.com", "role": "Admin", "status": "Active", "joinDate": "2024-02-15"}),
        json!({"name": "Oliver Wilson", "email": "oliver@example.com", "role": "User", "status": "Inactive", "joinDate": "2024-01-25"}),
        json!({"name": "Ava Thomas", "email": "ava@example.com", "role": "Viewer", "status": "Active", "joinDate": "2024-03-10"}),
        json!({"name": "Ethan Jackson", "email": "ethan@example.com", "role": "Editor", "status": "Active", "joinDate": "2024-02-05"}),
        json!({"name": "Mia White", "email": "mia@example.com", "role": "User", "status": "Active", "joinDate": "2024-03-01"}),
        json!({"name": "Lucas Harris", "email": "lucas@example.com", "role": "Admin", "status": "Active", "joinDate": "2024-02-20"}),
        json!({"name": "Olivia Martin", "email": "olivia@example.com", "role": "Editor", "status": "Inactive", "joinDate": "2024-01-15"}),
        json!({"name": "Noah Thompson", "email": "noah@example.com", "role": "User", "status": "Active", "joinDate": "2024-03-12"}),
        json!({"name": "Isabella Garcia", "email": "isabella@example.com", "role": "Viewer", "status": "Active", "joinDate": "2024-02-25"}),
    ]
}
