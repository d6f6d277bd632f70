use crate::models::User;
use crate::services::store::{JsonStore, StorageError};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// File-backed user accounts keyed by username
pub struct UserRepository {
    store: JsonStore<User>,
}

impl UserRepository {
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            store: JsonStore::new(path, pretty),
        }
    }

    pub fn load_all(&self) -> BTreeMap<String, User> {
        self.store.load()
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.store.get(username)
    }

    pub fn add(&self, user: User) -> Result<User, StorageError> {
        self.store.insert(&user.username, user.clone())?;
        tracing::info!("Registered user {} as {}", user.username, user.role);
        Ok(user)
    }

    pub fn update(&self, user: &User) -> Result<(), StorageError> {
        self.store.replace(&user.username, user.clone())
    }

    /// Add or remove a restaurant from the user's set; returns whether it is now present
    pub fn toggle_restaurant(&self, username: &str, restaurant_id: &str) -> Result<bool, StorageError> {
        let user = self.store.update(username, |user| {
            if !user.restaurants.remove(restaurant_id) {
                user.restaurants.insert(restaurant_id.to_string());
            }
        })?;
        Ok(user.restaurants.contains(restaurant_id))
    }

    pub fn add_restaurant(&self, username: &str, restaurant_id: &str) -> Result<User, StorageError> {
        self.store.update(username, |user| {
            user.restaurants.insert(restaurant_id.to_string());
        })
    }

    /// Drop a restaurant from every user's favourites or owned set
    pub fn forget_restaurant(&self, restaurant_id: &str) -> Result<usize, StorageError> {
        let mut users = self.store.try_load()?;
        let mut touched = 0;
        for user in users.values_mut() {
            if user.restaurants.remove(restaurant_id) {
                touched += 1;
            }
        }
        if touched > 0 {
            self.store.save(&users)?;
        }
        Ok(touched)
    }

    pub fn add_review(&self, username: &str, review_id: &str) -> Result<User, StorageError> {
        self.store.update(username, |user| {
            if !user.reviews.iter().any(|r| r == review_id) {
                user.reviews.push(review_id.to_string());
            }
        })
    }

    /// Drop review references from every user
    pub fn forget_reviews(&self, review_ids: &[String]) -> Result<(), StorageError> {
        if review_ids.is_empty() {
            return Ok(());
        }
        let mut users = self.store.try_load()?;
        let mut changed = false;
        for user in users.values_mut() {
            let before = user.reviews.len();
            user.reviews.retain(|r| !review_ids.contains(r));
            changed |= user.reviews.len() != before;
        }
        if changed {
            self.store.save(&users)?;
        }
        Ok(())
    }
}
