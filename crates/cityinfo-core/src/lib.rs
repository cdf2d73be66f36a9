pub mod error;
pub mod models;
pub mod pagination;
pub mod seed;
pub mod traits;

pub use error::AppError;
pub use models::{AuthenticatedUser, City, PointOfInterest};
pub use pagination::{PageRequest, PaginationMetadata};
pub use seed::{SeedData, SeedStore};
pub use traits::{CityFilter, CityStore, CredentialValidator, DemoCredentials};
