use crate::models::Restaurant;
use crate::services::seed;
use crate::services::store::{JsonStore, StorageError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// File-backed restaurant catalog, seeded from CSV on first use
pub struct RestaurantRepository {
    store: JsonStore<Restaurant>,
    seed_csv: Option<PathBuf>,
}

impl RestaurantRepository {
    pub fn new(path: impl Into<PathBuf>, seed_csv: Option<PathBuf>, pretty: bool) -> Self {
        Self {
            store: JsonStore::new(path, pretty),
            seed_csv,
        }
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Load every restaurant keyed by id
    ///
    /// When the JSON file does not exist yet and a seed CSV is configured, the
    /// CSV is converted and written out first.
    pub fn load_all(&self) -> BTreeMap<String, Restaurant> {
        if !self.store.exists() {
            if let Some(csv) = &self.seed_csv {
                match self.seed_from(csv) {
                    Ok(restaurants) => return restaurants,
                    Err(e) => {
                        tracing::warn!("Failed to seed restaurants from {}: {}", csv.display(), e)
                    }
                }
            }
        }
        self.store.load()
    }

    fn seed_from(&self, csv: &Path) -> Result<BTreeMap<String, Restaurant>, StorageError> {
        let restaurants: BTreeMap<String, Restaurant> = seed::read_restaurants_file(csv)?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        self.store.save(&restaurants)?;
        tracing::info!("Seeded {} restaurants into {}", restaurants.len(), self.path().display());
        Ok(restaurants)
    }

    /// Merge the rows of a CSV file into the catalog, skipping known ids
    ///
    /// Returns the number of restaurants added.
    pub fn import_csv(&self, csv: &Path) -> Result<usize, StorageError> {
        let mut restaurants = self.store.try_load()?;
        let mut added = 0;
        for restaurant in seed::read_restaurants_file(csv)? {
            if !restaurants.contains_key(&restaurant.id) {
                restaurants.insert(restaurant.id.clone(), restaurant);
                added += 1;
            }
        }
        self.store.save(&restaurants)?;
        Ok(added)
    }

    pub fn get(&self, id: &str) -> Option<Restaurant> {
        self.load_all().remove(id)
    }

    /// Add a new restaurant, deriving its id from name and coordinates
    pub fn add(&self, mut restaurant: Restaurant) -> Result<Restaurant, StorageError> {
        restaurant.id = Restaurant::derive_id(&restaurant.name, restaurant.latitude, restaurant.longitude);
        self.ensure_seeded();
        self.store.insert(&restaurant.id, restaurant.clone())?;
        tracing::info!("Added restaurant {} ({})", restaurant.name, restaurant.id);
        Ok(restaurant)
    }

    /// Overwrite an existing restaurant; the id never changes
    pub fn edit(&self, restaurant: &Restaurant) -> Result<(), StorageError> {
        self.ensure_seeded();
        self.store.replace(&restaurant.id, restaurant.clone())
    }

    pub fn delete(&self, id: &str) -> Result<Restaurant, StorageError> {
        self.ensure_seeded();
        let removed = self.store.remove(id)?;
        tracing::info!("Deleted restaurant {} ({})", removed.name, id);
        Ok(removed)
    }

    /// Sorted distinct cities
    pub fn locations(&self) -> Vec<String> {
        self.load_all()
            .into_values()
            .map(|r| r.location)
            .filter(|l| !l.trim().is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn ensure_seeded(&self) {
        if !self.store.exists() && self.seed_csv.is_some() {
            self.load_all();
        }
    }
}
