//! User-level operations over the restaurant catalog.
//!
//! [`Catalog`] ties the repositories, the ranker and password hashing
//! together. Every operation takes the caller's [`Session`]; permissions are
//! decided by its [`Viewer`].

use crate::config::Settings;
use crate::core::{same_text, BrowseQuery, BrowseResult, Ranker};
use crate::models::{
    Coordinate, NewRestaurant, RegisterUser, Restaurant, Review, ReviewDraft, SortOrder, User,
};
use crate::services::{
    ErrorCode, PasswordHasher, RestaurantRepository, ReviewRepository, SecurityError,
    StorageError, UserRepository,
};
use crate::session::{Session, Viewer};
use thiserror::Error;
use validator::Validate;

/// Errors returned by catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid username or password")]
    Auth,

    #[error("Not allowed: {0}")]
    Forbidden(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    Invalid(&'static str),

    #[error(transparent)]
    Security(#[from] SecurityError),
}

impl CatalogError {
    /// Outcome code for storage failures; everything else is a service error
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::Storage(e) => e.code(),
            _ => ErrorCode::ServiceError,
        }
    }
}

pub struct Catalog {
    restaurants: RestaurantRepository,
    users: UserRepository,
    reviews: ReviewRepository,
    hasher: PasswordHasher,
    ranker: Ranker,
    default_limit: Option<usize>,
}

impl Catalog {
    pub fn new(
        restaurants: RestaurantRepository,
        users: UserRepository,
        reviews: ReviewRepository,
        hasher: PasswordHasher,
        ranker: Ranker,
    ) -> Self {
        Self {
            restaurants,
            users,
            reviews,
            hasher,
            ranker,
            default_limit: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let storage = &settings.storage;
        let mut catalog = Self::new(
            RestaurantRepository::new(storage.restaurants_path(), storage.seed_csv_path(), storage.pretty),
            UserRepository::new(storage.users_path(), storage.pretty),
            ReviewRepository::new(storage.reviews_path(), storage.pretty),
            PasswordHasher::new(settings.security.bcrypt_cost),
            Ranker::new(settings.browsing.max_distance_km),
        );
        catalog.default_limit = settings.browsing.default_limit;
        catalog
    }

    pub fn restaurants(&self) -> &RestaurantRepository {
        &self.restaurants
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn reviews(&self) -> &ReviewRepository {
        &self.reviews
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    // ---- Browsing -------------------------------------------------------

    /// All restaurants with their reviews attached
    pub fn all_restaurants(&self) -> Vec<Restaurant> {
        let mut reviews = self.reviews.by_restaurant();
        self.restaurants
            .load_all()
            .into_values()
            .map(|mut r| {
                r.reviews = reviews.remove(&r.id).unwrap_or_default();
                r
            })
            .collect()
    }

    pub fn restaurant(&self, id: &str) -> Result<Restaurant, CatalogError> {
        let mut restaurant = self
            .restaurants
            .get(id)
            .ok_or_else(|| CatalogError::NotFound(format!("restaurant {}", id)))?;
        restaurant.reviews = self.reviews.for_restaurant(id);
        Ok(restaurant)
    }

    pub fn locations(&self) -> Vec<String> {
        self.restaurants.locations()
    }

    /// Coordinates of the first restaurant in `location`, used as the distance origin
    pub fn reference_point(&self, location: &str) -> Option<Coordinate> {
        self.restaurants
            .load_all()
            .into_values()
            .filter(|r| same_text(&r.location, location))
            .find_map(|r| r.coordinate())
    }

    /// Distance ordering around the session's location, when it can be placed on the map
    pub fn distance_order(&self, session: &Session) -> Option<SortOrder> {
        let location = session.location.as_deref()?;
        self.reference_point(location)
            .map(|reference| self.ranker.by_distance(reference))
    }

    /// Filter and order the catalog for the session's viewer
    pub fn browse(&self, session: &Session, order: SortOrder, search: Option<&str>) -> BrowseResult {
        let query = BrowseQuery {
            filters: session.filters.clone(),
            search: search.map(str::to_string),
            order,
            owned_by: session.viewer.owner_scope().map(str::to_string),
            limit: self.default_limit,
        };
        self.ranker.rank(&query, self.all_restaurants())
    }

    /// A customer's favourite restaurants, by name
    pub fn favorites(&self, session: &Session) -> Result<Vec<Restaurant>, CatalogError> {
        let user = match &session.viewer {
            Viewer::Customer(user) => user,
            _ => return Err(CatalogError::Forbidden("only customers have favourites")),
        };
        let mut favorites: Vec<Restaurant> = self
            .all_restaurants()
            .into_iter()
            .filter(|r| user.restaurants.contains(&r.id))
            .collect();
        sort_by_name(&mut favorites);
        Ok(favorites)
    }

    /// Restaurants the customer has reviewed, by name
    pub fn reviewed(&self, session: &Session) -> Result<Vec<Restaurant>, CatalogError> {
        let username = match &session.viewer {
            Viewer::Customer(user) => user.username.as_str(),
            _ => return Err(CatalogError::Forbidden("only customers write reviews")),
        };
        let ids: Vec<String> = self
            .reviews
            .by_user(username)
            .into_iter()
            .map(|r| r.restaurant_id)
            .collect();
        let mut reviewed: Vec<Restaurant> = self
            .all_restaurants()
            .into_iter()
            .filter(|r| ids.contains(&r.id))
            .collect();
        sort_by_name(&mut reviewed);
        Ok(reviewed)
    }

    // ---- Accounts -------------------------------------------------------

    pub fn register(&self, request: RegisterUser) -> Result<Session, CatalogError> {
        request.validate()?;
        let user = User {
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
            password_hash: self.hasher.hash(&request.password)?,
            birth_date: request.birth_date,
            city: request.city,
            role: request.role,
            restaurants: Default::default(),
            reviews: Vec::new(),
        };
        let user = self.users.add(user)?;
        Ok(Session::new(Viewer::from_user(user)))
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, CatalogError> {
        let user = self.users.get(username).ok_or(CatalogError::Auth)?;
        if !self.hasher.verify(password, &user.password_hash) {
            tracing::info!("Rejected login for {}", username);
            return Err(CatalogError::Auth);
        }
        tracing::info!("{} logged in as {}", user.username, user.role);
        Ok(Session::new(Viewer::from_user(user)))
    }

    /// Re-read the session's user after a change to their record
    fn refresh(&self, session: &mut Session) {
        if let Some(username) = session.viewer.username() {
            if let Some(user) = self.users.get(username) {
                session.viewer = Viewer::from_user(user);
            }
        }
    }

    pub fn toggle_favorite(&self, session: &mut Session, restaurant_id: &str) -> Result<bool, CatalogError> {
        if !session.viewer.can_favorite() {
            return Err(CatalogError::Forbidden("only customers can keep favourites"));
        }
        let restaurant = self.restaurant(restaurant_id)?;
        let username = session.viewer.username().unwrap_or_default().to_string();
        let now_favorite = self.users.toggle_restaurant(&username, &restaurant.id)?;
        self.refresh(session);
        Ok(now_favorite)
    }

    // ---- Reviews --------------------------------------------------------

    pub fn add_review(
        &self,
        session: &mut Session,
        restaurant_id: &str,
        draft: ReviewDraft,
    ) -> Result<Review, CatalogError> {
        if !session.viewer.can_review() {
            return Err(CatalogError::Forbidden("only customers can review"));
        }
        draft.validate()?;
        let restaurant = self.restaurant(restaurant_id)?;
        let username = session.viewer.username().unwrap_or_default().to_string();

        let review = self
            .reviews
            .add(Review::new(&username, &restaurant.id, draft.content, draft.stars))?;
        self.users.add_review(&username, &review.id)?;
        self.refresh(session);
        Ok(review)
    }

    fn authored_review(&self, session: &Session, review_id: &str) -> Result<Review, CatalogError> {
        let review = self
            .reviews
            .get(review_id)
            .ok_or_else(|| CatalogError::NotFound(format!("review {}", review_id)))?;
        if !session.viewer.is_author(&review) {
            return Err(CatalogError::Forbidden("only the author can change a review"));
        }
        Ok(review)
    }

    pub fn edit_review(
        &self,
        session: &Session,
        review_id: &str,
        draft: ReviewDraft,
    ) -> Result<Review, CatalogError> {
        draft.validate()?;
        let mut review = self.authored_review(session, review_id)?;
        review.content = draft.content;
        review.stars = draft.stars;
        self.reviews.edit(&review)?;
        Ok(review)
    }

    pub fn delete_review(&self, session: &mut Session, review_id: &str) -> Result<(), CatalogError> {
        let review = self.authored_review(session, review_id)?;
        self.reviews.delete(&review.id)?;
        self.users.forget_reviews(&[review.id])?;
        self.refresh(session);
        Ok(())
    }

    /// Owner's reply to a review of one of their restaurants
    pub fn answer_review(
        &self,
        session: &Session,
        review_id: &str,
        answer: &str,
    ) -> Result<Review, CatalogError> {
        if answer.trim().is_empty() {
            return Err(CatalogError::Invalid("answer text is required"));
        }
        let review = self
            .reviews
            .get(review_id)
            .ok_or_else(|| CatalogError::NotFound(format!("review {}", review_id)))?;
        let restaurant = self.restaurant(&review.restaurant_id)?;
        if !session.viewer.can_answer(&restaurant) {
            return Err(CatalogError::Forbidden("only the restaurant owner can answer"));
        }
        Ok(self.reviews.answer(&review.id, answer.trim())?)
    }

    // ---- Owner management -----------------------------------------------

    pub fn add_restaurant(
        &self,
        session: &mut Session,
        request: NewRestaurant,
    ) -> Result<Restaurant, CatalogError> {
        if !session.viewer.can_add_restaurant() {
            return Err(CatalogError::Forbidden("only restaurant owners can add restaurants"));
        }
        request.validate()?;
        let username = session.viewer.username().unwrap_or_default().to_string();

        let restaurant = self.restaurants.add(request.into_restaurant(&username))?;
        self.users.add_restaurant(&username, &restaurant.id)?;
        self.refresh(session);
        Ok(restaurant)
    }

    pub fn edit_restaurant(
        &self,
        session: &Session,
        restaurant_id: &str,
        request: NewRestaurant,
    ) -> Result<Restaurant, CatalogError> {
        let mut restaurant = self.restaurant(restaurant_id)?;
        if !session.viewer.can_manage(&restaurant) {
            return Err(CatalogError::Forbidden("only the owner can edit this restaurant"));
        }
        request.validate()?;
        request.apply_to(&mut restaurant);
        self.restaurants.edit(&restaurant)?;
        Ok(restaurant)
    }

    /// Delete a restaurant together with its reviews and every reference to it
    pub fn delete_restaurant(&self, session: &mut Session, restaurant_id: &str) -> Result<(), CatalogError> {
        let restaurant = self.restaurant(restaurant_id)?;
        if !session.viewer.can_manage(&restaurant) {
            return Err(CatalogError::Forbidden("only the owner can delete this restaurant"));
        }
        self.restaurants.delete(&restaurant.id)?;
        let review_ids = self.reviews.delete_for_restaurant(&restaurant.id)?;
        self.users.forget_reviews(&review_ids)?;
        self.users.forget_restaurant(&restaurant.id)?;
        self.refresh(session);
        Ok(())
    }
}

fn sort_by_name(restaurants: &mut [Restaurant]) {
    restaurants.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}
