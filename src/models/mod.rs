// Model exports
pub mod domain;
pub mod requests;

pub use domain::{BoundingBox, Coordinate, FilterOptions, RankedRestaurant, Restaurant, Review, Role, SortOrder, User};
pub use requests::{NewRestaurant, RegisterUser, ReviewDraft};
