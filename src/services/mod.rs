// Service exports
pub mod restaurants;
pub mod reviews;
pub mod security;
pub mod seed;
pub mod store;
pub mod users;

pub use restaurants::RestaurantRepository;
pub use reviews::ReviewRepository;
pub use security::{PasswordHasher, SecurityError};
pub use store::{ErrorCode, JsonStore, StorageError};
pub use users::UserRepository;
