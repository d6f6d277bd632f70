use crate::models::Review;
use crate::services::store::{JsonStore, StorageError};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// File-backed reviews in simplified form (author username + restaurant id)
pub struct ReviewRepository {
    store: JsonStore<Review>,
}

impl ReviewRepository {
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            store: JsonStore::new(path, pretty),
        }
    }

    pub fn load_all(&self) -> BTreeMap<String, Review> {
        self.store.load()
    }

    pub fn get(&self, id: &str) -> Option<Review> {
        self.store.get(id)
    }

    /// Reviews grouped by restaurant id
    pub fn by_restaurant(&self) -> BTreeMap<String, Vec<Review>> {
        let mut grouped: BTreeMap<String, Vec<Review>> = BTreeMap::new();
        for review in self.load_all().into_values() {
            grouped.entry(review.restaurant_id.clone()).or_default().push(review);
        }
        grouped
    }

    pub fn for_restaurant(&self, restaurant_id: &str) -> Vec<Review> {
        self.load_all()
            .into_values()
            .filter(|r| r.restaurant_id == restaurant_id)
            .collect()
    }

    pub fn by_user(&self, username: &str) -> Vec<Review> {
        self.load_all()
            .into_values()
            .filter(|r| r.author == username)
            .collect()
    }

    /// Add a review; a second review by the same user on the same restaurant is a duplicate
    pub fn add(&self, review: Review) -> Result<Review, StorageError> {
        self.store.insert(&review.id, review.clone())?;
        tracing::info!("{} reviewed {} ({} stars)", review.author, review.restaurant_id, review.stars);
        Ok(review)
    }

    pub fn edit(&self, review: &Review) -> Result<(), StorageError> {
        self.store.replace(&review.id, review.clone())
    }

    /// Set or replace the owner's answer
    pub fn answer(&self, id: &str, answer: &str) -> Result<Review, StorageError> {
        self.store.update(id, |review| {
            review.answer = Some(answer.to_string());
        })
    }

    pub fn delete(&self, id: &str) -> Result<Review, StorageError> {
        self.store.remove(id)
    }

    /// Remove all reviews of a restaurant, returning their ids
    pub fn delete_for_restaurant(&self, restaurant_id: &str) -> Result<Vec<String>, StorageError> {
        let ids: Vec<String> = self
            .store
            .try_load()?
            .into_values()
            .filter(|r| r.restaurant_id == restaurant_id)
            .map(|r| r.id)
            .collect();
        self.store.remove_where(|r| r.restaurant_id == restaurant_id)?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::ErrorCode;

    fn repo(dir: &tempfile::TempDir) -> ReviewRepository {
        ReviewRepository::new(dir.path().join("reviews.json"), true)
    }

    #[test]
    fn test_one_review_per_user_and_restaurant() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);

        repo.add(Review::new("anna", "r1", "Ottimo".to_string(), 5)).unwrap();
        let result = repo.add(Review::new("anna", "r1", "Again".to_string(), 1));

        assert_eq!(ErrorCode::of(&result), ErrorCode::Duplicated);
        assert!(repo.add(Review::new("anna", "r2", "Buono".to_string(), 4)).is_ok());
        assert!(repo.add(Review::new("bruno", "r1", "Meh".to_string(), 2)).is_ok());
        assert_eq!(repo.load_all().len(), 3);
    }

    #[test]
    fn test_grouping_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        repo.add(Review::new("anna", "r1", "a".to_string(), 5)).unwrap();
        repo.add(Review::new("bruno", "r1", "b".to_string(), 3)).unwrap();
        repo.add(Review::new("anna", "r2", "c".to_string(), 4)).unwrap();

        let grouped = repo.by_restaurant();
        assert_eq!(grouped["r1"].len(), 2);
        assert_eq!(grouped["r2"].len(), 1);
        assert_eq!(repo.for_restaurant("r1").len(), 2);
        assert_eq!(repo.by_user("anna").len(), 2);
    }

    #[test]
    fn test_answer_and_edit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        let review = repo.add(Review::new("anna", "r1", "Slow service".to_string(), 2)).unwrap();

        let answered = repo.answer(&review.id, "Sorry, we will improve").unwrap();
        assert_eq!(answered.answer.as_deref(), Some("Sorry, we will improve"));

        let mut edited = answered.clone();
        edited.stars = 3;
        repo.edit(&edited).unwrap();
        assert_eq!(repo.get(&review.id).unwrap().stars, 3);
    }

    #[test]
    fn test_delete_for_restaurant() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        repo.add(Review::new("anna", "r1", "a".to_string(), 5)).unwrap();
        repo.add(Review::new("bruno", "r1", "b".to_string(), 3)).unwrap();
        repo.add(Review::new("anna", "r2", "c".to_string(), 4)).unwrap();

        let removed = repo.delete_for_restaurant("r1").unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(repo.load_all().len(), 1);
        assert!(repo.delete("missing").is_err());
    }
}
