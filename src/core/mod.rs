// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod ranking;

pub use distance::{calculate_bounding_box, distance_km, haversine_distance, is_within_bounding_box, UNKNOWN_DISTANCE};
pub use filters::{matches_filters, matches_search, parse_price, parse_stars, same_text, FilterParseError};
pub use ranking::{BrowseQuery, BrowseResult, Ranker, DEFAULT_MAX_DISTANCE_KM};
