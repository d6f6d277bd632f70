//! TheKnife - Michelin restaurant catalog
//!
//! This library provides the catalog behind the `theknife` CLI: distance and
//! filter computations, file-backed JSON repositories for restaurants, users
//! and reviews, and role-aware catalog operations for guests, customers and
//! restaurant owners.

pub mod catalog;
pub mod config;
pub mod core;
pub mod models;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use crate::catalog::{Catalog, CatalogError};
pub use crate::core::{distance::{haversine_distance, calculate_bounding_box}, BrowseQuery, BrowseResult, Ranker};
pub use crate::models::{FilterOptions, NewRestaurant, RankedRestaurant, RegisterUser, Restaurant, Review, ReviewDraft, Role, SortOrder, User};
pub use crate::services::{ErrorCode, StorageError};
pub use crate::session::{Session, Viewer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let bbox = calculate_bounding_box(45.4642, 9.19, 10.0);
        assert!(bbox.min_lat < 45.4642);
        assert_eq!(haversine_distance(45.0, 9.0, 45.0, 9.0), 0.0);
        assert!(FilterOptions::default().is_empty());
    }
}
