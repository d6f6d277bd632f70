use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::{Restaurant, Role};

/// Request to register a new account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "first name is required"))]
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[serde(default)]
    pub role: Role,
}

/// Restaurant data submitted by an owner, for creation or edit
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewRestaurant {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[validate(custom(function = "validate_location"))]
    pub location: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub cuisine: String,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(custom(function = "validate_website"))]
    #[serde(rename = "websiteUrl")]
    pub website_url: Option<String>,
    pub award: Option<String>,
    #[validate(range(min = 0, max = 1, message = "green star must be 0 or 1"))]
    #[serde(rename = "greenStar")]
    pub green_star: Option<u8>,
    #[serde(default)]
    pub facilities: String,
    #[serde(default)]
    pub description: String,
}

/// Review content submitted by a customer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewDraft {
    #[validate(length(min = 1, message = "review text is required"))]
    pub content: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub stars: u8,
}

impl NewRestaurant {
    /// Build a restaurant owned by `owner`; the id is assigned when it is stored
    pub fn into_restaurant(self, owner: &str) -> Restaurant {
        let mut restaurant = Restaurant {
            id: String::new(),
            name: String::new(),
            address: String::new(),
            location: String::new(),
            price: String::new(),
            cuisine: String::new(),
            latitude: None,
            longitude: None,
            phone: None,
            michelin_url: None,
            website_url: None,
            award: None,
            green_star: false,
            facilities: String::new(),
            description: String::new(),
            owner: Some(owner.to_string()),
            reviews: Vec::new(),
        };
        self.apply_to(&mut restaurant);
        restaurant
    }

    /// Overwrite the editable fields of `restaurant`, leaving id, owner and reviews alone
    pub fn apply_to(self, restaurant: &mut Restaurant) {
        restaurant.name = self.name;
        restaurant.address = self.address;
        restaurant.location = self.location;
        restaurant.price = self.price;
        restaurant.cuisine = self.cuisine;
        restaurant.latitude = self.latitude;
        restaurant.longitude = self.longitude;
        restaurant.phone = non_blank(self.phone);
        restaurant.website_url = non_blank(self.website_url);
        restaurant.award = non_blank(self.award);
        restaurant.green_star = self.green_star == Some(1);
        restaurant.facilities = self.facilities;
        restaurant.description = self.description;
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_location(location: &str) -> Result<(), ValidationError> {
    if location.trim().is_empty() {
        return Err(ValidationError::new("location_required"));
    }
    if location.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("location_has_digits"));
    }
    Ok(())
}

/// International phone number: optional `+`, then 7 to 25 digits or separators
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() {
        return Ok(());
    }
    let body = phone.strip_prefix('+').unwrap_or(phone);
    let len = body.chars().count();
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | ' ' | '(' | ')' | '-'));
    if !allowed || !(7..=25).contains(&len) {
        return Err(ValidationError::new("invalid_phone"));
    }
    Ok(())
}

/// Website address with an optional http(s) scheme and a dotted host
fn validate_website(website: &str) -> Result<(), ValidationError> {
    if website.trim().is_empty() {
        return Ok(());
    }
    let rest = website
        .strip_prefix("https://")
        .or_else(|| website.strip_prefix("http://"))
        .unwrap_or(website);
    let host = rest.split('/').next().unwrap_or_default();
    let tld = host.rsplit('.').next().unwrap_or_default();
    let host_ok = host.contains('.')
        && !host.starts_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    let tld_ok = (2..=6).contains(&tld.len()) && tld.chars().all(|c| c.is_ascii_lowercase());
    if !host_ok || !tld_ok {
        return Err(ValidationError::new("invalid_website"));
    }
    Ok(())
}
