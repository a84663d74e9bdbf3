//! User record storage
//!
//! Records live in process memory. Ids are assigned from a counter that never
//! goes backwards, so a deleted id is never handed out again. Email addresses
//! are unique across records.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Fields to change; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("User not found")]
    NotFound,

    #[error("User with this email already exists")]
    DuplicateEmail,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, newest first
    async fn list(&self) -> Vec<User>;

    async fn get(&self, id: u64) -> Option<User>;

    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn update(&self, id: u64, changes: UserChanges) -> Result<User, StoreError>;

    async fn delete(&self, id: u64) -> Result<User, StoreError>;
}

#[derive(Default)]
struct Records {
    users: BTreeMap<u64, User>,
    last_id: u64,
}

impl Records {
    fn email_taken(&self, email: &str, except: Option<u64>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }
}

/// In-memory [`UserStore`]
#[derive(Default)]
pub struct InMemoryUserStore {
    records: RwLock<Records>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> Vec<User> {
        let records = self.records.read();
        let mut users: Vec<User> = records.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        users
    }

    async fn get(&self, id: u64) -> Option<User> {
        self.records.read().users.get(&id).cloned()
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut records = self.records.write();
        if records.email_taken(&user.email, None) {
            return Err(StoreError::DuplicateEmail);
        }

        records.last_id += 1;
        let now = Utc::now();
        let user = User {
            id: records.last_id,
            name: user.name,
            email: user.email,
            created_at: now,
            updated_at: now,
        };
        records.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: u64, changes: UserChanges) -> Result<User, StoreError> {
        let mut records = self.records.write();
        if !records.users.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if let Some(email) = &changes.email {
            if records.email_taken(email, Some(id)) {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let user = records.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: u64) -> Result<User, StoreError> {
        self.records.write().users.remove(&id).ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_never_reused() {
        let store = InMemoryUserStore::new();
        let first = store.create(new_user("Ada", "ada@example.com")).await.unwrap();
        store.delete(first.id).await.unwrap();

        let second = store.create(new_user("Ada", "ada@example.com")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let store = InMemoryUserStore::new();
        let ada = store.create(new_user("Ada", "ada@example.com")).await.unwrap();
        let bob = store.create(new_user("Bob", "bob@example.com")).await.unwrap();

        assert_eq!(
            store.create(new_user("Other", "ADA@example.com")).await,
            Err(StoreError::DuplicateEmail)
        );

        let changes = UserChanges {
            email: Some("ada@example.com".to_string()),
            ..UserChanges::default()
        };
        assert_eq!(store.update(bob.id, changes).await, Err(StoreError::DuplicateEmail));

        // keeping your own address is not a conflict
        let changes = UserChanges {
            name: Some("Ada L".to_string()),
            email: Some("ada@example.com".to_string()),
        };
        let updated = store.update(ada.id, changes).await.unwrap();
        assert_eq!(updated.name, "Ada L");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryUserStore::new();
        let users = [("Ada", "a@example.com"), ("Bob", "b@example.com"), ("Cy", "c@example.com")];
        for (name, email) in users {
            store.create(new_user(name, email)).await.unwrap();
        }
        let names: Vec<_> = store.list().await.into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Cy", "Bob", "Ada"]);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let store = InMemoryUserStore::new();
        assert!(store.get(9).await.is_none());
        assert_eq!(store.update(9, UserChanges::default()).await, Err(StoreError::NotFound));
        assert_eq!(store.delete(9).await, Err(StoreError::NotFound));
    }
}
