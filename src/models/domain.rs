use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Namespace for restaurant identifiers derived from name and coordinates
const RESTAURANT_NAMESPACE: Uuid = Uuid::from_u128(0x6b6e_6966_6500_4000_8000_7265_7374_6f00);

/// Namespace for review identifiers derived from author and restaurant
const REVIEW_NAMESPACE: Uuid = Uuid::from_u128(0x6b6e_6966_6500_4000_8000_7265_7669_6577);

/// A point on the globe, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Michelin-listed restaurant
///
/// The identifier is derived from name and coordinates exactly once, when the
/// restaurant is first created. Later edits to those fields keep the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "michelinUrl", default)]
    pub michelin_url: Option<String>,
    #[serde(rename = "websiteUrl", default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub award: Option<String>,
    #[serde(rename = "greenStar", default)]
    pub green_star: bool,
    #[serde(default)]
    pub facilities: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "ownerUsername", default)]
    pub owner: Option<String>,
    /// Hydrated from the review store, never written to `restaurants.json`
    #[serde(skip)]
    pub reviews: Vec<Review>,
}

impl Restaurant {
    /// Derive the identifier for a restaurant from its name and coordinates
    pub fn derive_id(name: &str, latitude: Option<f64>, longitude: Option<f64>) -> String {
        let fmt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        let key = format!("{}|{}|{}", name, fmt(latitude), fmt(longitude));
        Uuid::new_v5(&RESTAURANT_NAMESPACE, key.as_bytes()).to_string()
    }

    /// Coordinates, if both latitude and longitude are known
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate { latitude, longitude }),
            _ => None,
        }
    }

    /// Arithmetic mean of the review stars, `None` without reviews
    pub fn average_stars(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: u32 = self.reviews.iter().map(|r| r.stars as u32).sum();
        Some(total as f64 / self.reviews.len() as f64)
    }

    /// Floor of the average rating, the bucket the star filter compares against
    pub fn star_bucket(&self) -> Option<u8> {
        self.average_stars().map(|avg| avg.floor() as u8)
    }

    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner.as_deref() == Some(username)
    }
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[serde(alias = "CLIENTE")]
    Customer,
    #[serde(alias = "RISTORATORE")]
    RestaurantOwner,
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::RestaurantOwner => write!(f, "restaurant owner"),
        }
    }
}

/// Registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
    pub city: String,
    #[serde(default)]
    pub role: Role,
    /// Favourites for customers, owned restaurants for owners
    #[serde(default)]
    pub restaurants: BTreeSet<String>,
    #[serde(default)]
    pub reviews: Vec<String>,
}

impl User {
    pub fn is_owner(&self) -> bool {
        self.role == Role::RestaurantOwner
    }
}

/// Review of a restaurant, stored referencing only username and restaurant id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    #[serde(rename = "username")]
    pub author: String,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: String,
    pub content: String,
    pub stars: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn new(author: &str, restaurant_id: &str, content: String, stars: u8) -> Self {
        Self {
            id: Self::derive_id(author, restaurant_id),
            author: author.to_string(),
            restaurant_id: restaurant_id.to_string(),
            content,
            stars,
            answer: None,
            created_at: Some(Utc::now()),
        }
    }

    /// One review per (user, restaurant): the id is a function of both
    pub fn derive_id(author: &str, restaurant_id: &str) -> String {
        let key = format!("{}|{}", author, restaurant_id);
        Uuid::new_v5(&REVIEW_NAMESPACE, key.as_bytes()).to_string()
    }
}

/// Active browsing filters. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub cuisine: Option<String>,
    pub location: Option<String>,
    pub price: Option<String>,
    pub stars: Option<u8>,
    #[serde(rename = "deliveryAvailable", default)]
    pub delivery_available: bool,
    #[serde(rename = "onlineBookingAvailable", default)]
    pub online_booking_available: bool,
}

impl FilterOptions {
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_stars(mut self, stars: u8) -> Self {
        self.stars = Some(stars);
        self
    }

    pub fn with_delivery(mut self) -> Self {
        self.delivery_available = true;
        self
    }

    pub fn with_online_booking(mut self) -> Self {
        self.online_booking_available = true;
        self
    }

    /// True when no condition is active
    pub fn is_empty(&self) -> bool {
        is_unset(&self.cuisine)
            && is_unset(&self.location)
            && is_unset(&self.price)
            && self.stars.is_none()
            && !self.delivery_available
            && !self.online_booking_available
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn is_unset(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Requested ordering of a browse result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    /// Case-insensitive ascending by name
    Name,
    /// Ascending by distance from `reference`, dropping anything beyond `max_km`
    Distance { reference: Coordinate, max_km: f64 },
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Name
    }
}

/// Restaurant in a browse result
#[derive(Debug, Clone, Serialize)]
pub struct RankedRestaurant {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    #[serde(rename = "averageStars")]
    pub average_stars: Option<f64>,
    #[serde(rename = "reviewCount")]
    pub review_count: usize,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restaurant_with_stars(stars: &[u8]) -> Restaurant {
        let id = Restaurant::derive_id("Da Vittorio", Some(45.6), Some(9.6));
        Restaurant {
            id: id.clone(),
            name: "Da Vittorio".to_string(),
            address: String::new(),
            location: "Brusaporto".to_string(),
            price: "€€€€".to_string(),
            cuisine: "Creative".to_string(),
            latitude: Some(45.6),
            longitude: Some(9.6),
            phone: None,
            michelin_url: None,
            website_url: None,
            award: None,
            green_star: false,
            facilities: String::new(),
            description: String::new(),
            owner: None,
            reviews: stars
                .iter()
                .enumerate()
                .map(|(i, s)| Review::new(&format!("user{}", i), &id, "ok".to_string(), *s))
                .collect(),
        }
    }

    #[test]
    fn test_restaurant_id_is_deterministic() {
        let a = Restaurant::derive_id("Osteria", Some(45.0), Some(9.0));
        let b = Restaurant::derive_id("Osteria", Some(45.0), Some(9.0));
        let c = Restaurant::derive_id("Osteria", Some(45.0), Some(9.1));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_review_id_per_user_and_restaurant() {
        assert_eq!(Review::derive_id("anna", "r1"), Review::derive_id("anna", "r1"));
        assert_ne!(Review::derive_id("anna", "r1"), Review::derive_id("anna", "r2"));
        assert_ne!(Review::derive_id("anna", "r1"), Review::derive_id("bruno", "r1"));
    }

    #[test]
    fn test_star_bucket_floors_average() {
        assert_eq!(restaurant_with_stars(&[]).star_bucket(), None);
        assert_eq!(restaurant_with_stars(&[4, 5]).star_bucket(), Some(4));
        assert_eq!(restaurant_with_stars(&[3, 3, 4]).star_bucket(), Some(3));
    }

    #[test]
    fn test_role_accepts_legacy_names() {
        let role: Role = serde_json::from_str("\"RISTORATORE\"").unwrap();
        assert_eq!(role, Role::RestaurantOwner);
        let role: Role = serde_json::from_str("\"CUSTOMER\"").unwrap();
        assert_eq!(role, Role::Customer);
        assert_eq!(serde_json::to_string(&Role::RestaurantOwner).unwrap(), "\"RESTAURANT_OWNER\"");
    }

    #[test]
    fn test_reviews_not_serialized_with_restaurant() {
        let restaurant = restaurant_with_stars(&[5]);
        let json = serde_json::to_value(&restaurant).unwrap();
        assert!(json.get("reviews").is_none());
        assert_eq!(json["greenStar"], false);
    }

    #[test]
    fn test_empty_filters() {
        assert!(FilterOptions::default().is_empty());
        assert!(FilterOptions::default().with_location("  ").is_empty());
        assert!(!FilterOptions::default().with_delivery().is_empty());
    }

    #[test]
    fn test_clear_resets_filters() {
        let mut filters = FilterOptions::default()
            .with_location("Milano")
            .with_price("€€")
            .with_stars(3)
            .with_online_booking();
        assert!(!filters.is_empty());

        filters.clear();
        assert!(filters.is_empty());
        assert_eq!(filters, FilterOptions::default());
    }
}
