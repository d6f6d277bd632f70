//! Explicit session context and role-based capabilities.
//!
//! A [`Session`] is created at login (or as a guest) and passed to every
//! catalog operation; nothing is kept in global state.

use crate::models::{FilterOptions, Restaurant, Review, Role, User};

/// Who is looking at the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum Viewer {
    Guest,
    Customer(User),
    Owner(User),
}

impl Viewer {
    pub fn from_user(user: User) -> Self {
        match user.role {
            Role::Customer => Viewer::Customer(user),
            Role::RestaurantOwner => Viewer::Owner(user),
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Viewer::Guest => None,
            Viewer::Customer(user) | Viewer::Owner(user) => Some(user),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.user().map(|u| u.username.as_str())
    }

    /// Owners browse only their own restaurants
    pub fn owner_scope(&self) -> Option<&str> {
        match self {
            Viewer::Owner(user) => Some(&user.username),
            _ => None,
        }
    }

    pub fn can_review(&self) -> bool {
        matches!(self, Viewer::Customer(_))
    }

    pub fn can_favorite(&self) -> bool {
        matches!(self, Viewer::Customer(_))
    }

    pub fn can_add_restaurant(&self) -> bool {
        matches!(self, Viewer::Owner(_))
    }

    /// Edit or delete a restaurant
    pub fn can_manage(&self, restaurant: &Restaurant) -> bool {
        match self {
            Viewer::Owner(user) => {
                restaurant.is_owned_by(&user.username) || user.restaurants.contains(&restaurant.id)
            }
            _ => false,
        }
    }

    pub fn can_answer(&self, restaurant: &Restaurant) -> bool {
        self.can_manage(restaurant)
    }

    /// Edit or delete a review
    pub fn is_author(&self, review: &Review) -> bool {
        matches!(self, Viewer::Customer(user) if user.username == review.author)
    }

    pub fn is_favorite(&self, restaurant_id: &str) -> bool {
        match self {
            Viewer::Customer(user) => user.restaurants.contains(restaurant_id),
            _ => false,
        }
    }
}

/// Per-user browsing state
#[derive(Debug, Clone)]
pub struct Session {
    pub viewer: Viewer,
    pub location: Option<String>,
    pub filters: FilterOptions,
    pub selected_restaurant: Option<String>,
}

impl Session {
    pub fn guest() -> Self {
        Self::new(Viewer::Guest)
    }

    pub fn new(viewer: Viewer) -> Self {
        let location = viewer.user().map(|u| u.city.clone());
        Self {
            viewer,
            location,
            filters: FilterOptions::default(),
            selected_restaurant: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_filters(mut self, filters: FilterOptions) -> Self {
        self.filters = filters;
        self
    }

    pub fn select(&mut self, restaurant_id: impl Into<String>) {
        self.selected_restaurant = Some(restaurant_id.into());
    }

    /// Forget the user and everything tied to them
    pub fn logout(&mut self) {
        *self = Session::guest();
    }
}
