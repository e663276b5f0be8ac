// In-memory `UserStore` used by the service and HTTP test suites.

use super::UserStore;
use crate::models::User;
use crate::utils::error::AppError;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    items: Mutex<Vec<Document>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_item(&self, mut item: Document) {
        if !item.contains_key("_id") {
            item.insert("_id", ObjectId::new());
        }
        self.items.lock().await.push(item);
    }

    pub async fn items_for(&self, user_id: &str) -> Vec<Document> {
        self.items
            .lock()
            .await
            .iter()
            .filter(|item| item_belongs_to(item, user_id))
            .cloned()
            .collect()
    }

    /// Makes `ping` fail, as an unreachable database would.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    pub async fn item_count(&self) -> usize {
        self.items.lock().await.len()
    }
}

fn item_belongs_to(item: &Document, user_id: &str) -> bool {
    matches!(item.get("user_id"), Some(Bson::String(id)) if id == user_id)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut user = user.clone();
        user.id.get_or_insert_with(ObjectId::new);
        self.users.lock().await.push(user);
        Ok(())
    }

    async fn set_linked_id(&self, email: &str, linked_id: &str) -> Result<u64, AppError> {
        let mut users = self.users.lock().await;
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.linked_id = Some(linked_id.to_string());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn users_with_items(&self) -> Result<Vec<Document>, AppError> {
        let users = self.users.lock().await;
        let items = self.items.lock().await;

        users
            .iter()
            .map(|user| -> Result<Document, AppError> {
                let mut document = mongodb::bson::to_document(user)
                    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

                let user_items: Vec<Bson> = match &user.linked_id {
                    Some(linked_id) => items
                        .iter()
                        .filter(|item| item_belongs_to(item, linked_id))
                        .cloned()
                        .map(Bson::Document)
                        .collect(),
                    None => Vec::new(),
                };
                document.insert("user_items", user_items);
                Ok(document)
            })
            .collect()
    }

    async fn delete_user_by_email(&self, email: &str) -> Result<u64, AppError> {
        let mut users = self.users.lock().await;
        match users.iter().position(|u| u.email == email) {
            Some(index) => {
                users.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_items_by_user_id(&self, user_id: &str) -> Result<u64, AppError> {
        let mut items = self.items.lock().await;
        let before = items.len();
        items.retain(|item| !item_belongs_to(item, user_id));
        Ok((before - items.len()) as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(AppError::DatabaseError("server selection timeout".to_string()));
        }
        Ok(())
    }
}
