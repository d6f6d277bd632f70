use crate::models::{FilterOptions, Restaurant};
use thiserror::Error;

/// Placeholder the filter form uses for "no preference"
pub const ANY: &str = "Qualsiasi";

/// Price symbols accepted by the price filter
pub const PRICE_SYMBOLS: [&str; 8] = ["$", "$$", "$$$", "$$$$", "€", "€€", "€€€", "€€€€"];

/// Facility keywords searched for the delivery flag
const DELIVERY_KEYWORDS: [&str; 1] = ["delivery"];

/// Facility keywords searched for the online booking flag
const BOOKING_KEYWORDS: [&str; 2] = ["online booking", "prenotazione"];

/// Errors raised while turning user input into filter values
#[derive(Debug, Error, PartialEq)]
pub enum FilterParseError {
    #[error("Unknown price symbol: {0}")]
    UnknownPrice(String),

    #[error("Star rating must be between 1 and 5, got: {0}")]
    InvalidStars(String),
}

/// Parse a price filter; blank or [`ANY`] means no filter
pub fn parse_price(input: &str) -> Result<Option<String>, FilterParseError> {
    let trimmed = input.trim();
    if is_any(trimmed) {
        return Ok(None);
    }
    PRICE_SYMBOLS
        .iter()
        .find(|symbol| symbol.eq_ignore_ascii_case(trimmed))
        .map(|symbol| Some(symbol.to_string()))
        .ok_or_else(|| FilterParseError::UnknownPrice(trimmed.to_string()))
}

/// Parse a star bucket such as `"3"` or `"3★"`; blank or [`ANY`] means no filter
pub fn parse_stars(input: &str) -> Result<Option<u8>, FilterParseError> {
    let trimmed = input.trim();
    if is_any(trimmed) {
        return Ok(None);
    }
    match trimmed.trim_end_matches('★').trim().parse::<u8>() {
        Ok(stars) if (1..=5).contains(&stars) => Ok(Some(stars)),
        _ => Err(FilterParseError::InvalidStars(trimmed.to_string())),
    }
}

fn is_any(input: &str) -> bool {
    input.is_empty() || input.eq_ignore_ascii_case(ANY) || input.eq_ignore_ascii_case("any")
}

/// Check if a restaurant satisfies every active filter
///
/// Unset or blank fields are permissive.
#[inline]
pub fn matches_filters(restaurant: &Restaurant, filters: &FilterOptions) -> bool {
    if !matches_text(&filters.location, &restaurant.location) {
        return false;
    }

    if !matches_text(&filters.cuisine, &restaurant.cuisine) {
        return false;
    }

    if let Some(price) = active(&filters.price) {
        if !is_any(price) && !price.eq_ignore_ascii_case(restaurant.price.trim()) {
            return false;
        }
    }

    // No reviews means no bucket, so a specific star filter never matches
    if let Some(stars) = filters.stars {
        if restaurant.star_bucket() != Some(stars) {
            return false;
        }
    }

    if filters.delivery_available && !contains_any(&restaurant.facilities, &DELIVERY_KEYWORDS) {
        return false;
    }

    if filters.online_booking_available
        && !contains_any(&restaurant.facilities, &BOOKING_KEYWORDS)
    {
        return false;
    }

    true
}

/// Free-text search over name, location and cuisine
///
/// A blank query matches everything.
#[inline]
pub fn matches_search(restaurant: &Restaurant, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    [&restaurant.name, &restaurant.location, &restaurant.cuisine]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

impl FilterOptions {
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        matches_filters(restaurant, self)
    }
}

fn active(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn matches_text(filter: &Option<String>, value: &str) -> bool {
    match active(filter).filter(|w| !is_any(w)) {
        Some(wanted) => same_text(wanted, value),
        None => true,
    }
}

/// Case-insensitive (Unicode) equality of trimmed text, as used for city and cuisine
pub fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|k| text.contains(k))
}
