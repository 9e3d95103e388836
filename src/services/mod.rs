//! Request-scoped application services.
//!
//! Each service wraps the shared database handle and exposes the
//! operations one area of the site needs. All reads work over the
//! snapshot fetched for the current request; nothing is cached across
//! requests.

pub mod catalog_service;
pub mod form_service;
pub mod rfq_service;

pub use catalog_service::{CatalogService, CategoryNav, HomeContent, ProductListing, SearchResults};
pub use form_service::{FormService, SubmitOutcome};
pub use rfq_service::RfqService;

use std::fmt;

use catalog::CatalogError;

use crate::database::DatabaseError;

#[derive(Debug)]
pub enum ServiceError {
    Database(DatabaseError),
    Catalog(CatalogError),
    Invalid(String),
}

impl ServiceError {
    /// Whether this error should surface as a 404 rather than a 500.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::Database(DatabaseError::NotFound(_))
                | ServiceError::Catalog(CatalogError::NotFound(_))
        )
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Database(err) => write!(f, "{}", err),
            ServiceError::Catalog(err) => write!(f, "{}", err),
            ServiceError::Invalid(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Database(err) => Some(err),
            ServiceError::Catalog(err) => Some(err),
            ServiceError::Invalid(_) => None,
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        ServiceError::Database(err)
    }
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        ServiceError::Catalog(err)
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
