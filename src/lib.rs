//! # catalog-graphql
//!
//! GraphQL query and mutation layer for a product catalog.
//!
//! ## Features
//!
//! - **Page Pagination** - bounded pages over lazy store cursors
//! - **Field Validation** - link-shape and range checks with field attribution
//! - **Mutation Responses** - typed outcomes flattened into one wire record
//! - **Activity Log** - best-effort audit trail of successful writes
//! - **Auth Plumbing** - token-derived actor identity and an Axum handler
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use catalog_graphql::{
//!     CatalogConfig, CatalogContext, MemoryStore, PassthroughVerifier, TracingActivityLog,
//! };
//! use catalog_graphql::schema::{build_schema, router};
//!
//! let context = CatalogContext::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(TracingActivityLog),
//!     Arc::new(PassthroughVerifier),
//!     CatalogConfig::default(),
//! );
//! let app = router(build_schema(context));
//! ```

pub mod activity;
pub mod auth;
pub mod config;
pub mod context;
pub mod envelope;
pub mod model;
pub mod pagination;
pub mod resolvers;
pub mod schema;
pub mod store;
pub mod types;
pub mod validation;

pub use activity::{ActivityAction, ActivityLog, ClientMeta, InMemoryActivityLog, TracingActivityLog};
pub use auth::{graphql_handler, ActorId, PassthroughVerifier, TokenVerifier};
pub use config::CatalogConfig;
pub use context::CatalogContext;
pub use envelope::{FailureReason, MutationOutcome, MutationResponse, NO_DATA};
pub use model::{Banner, Discount, Product, Review};
pub use pagination::{paginate, Page, PageRequest, DEFAULT_ITEMS_PER_PAGE};
pub use schema::{build_schema, CatalogSchema};
pub use store::{CatalogStore, MemoryStore, StoreError};
pub use types::DateTime;
pub use validation::{is_resource_link, ValidationError};

use async_graphql::ErrorExtensions;
use thiserror::Error;

/// Query-side errors surfaced to GraphQL callers
///
/// Mutations never fail this way; they report through [`MutationResponse`].
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Display never includes the store's own message
    #[error("The catalog could not complete the request")]
    Persistence(#[from] StoreError),
}

impl CatalogError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "BAD_USER_INPUT",
            Self::Persistence(_) => "INTERNAL",
        }
    }
}

impl ErrorExtensions for CatalogError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.code());
            if let Self::Validation(v) = self {
                e.set("field", v.field());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_does_not_leak() {
        let err = CatalogError::from(StoreError::Unavailable("mongodb://admin:secret@db".into()));
        assert!(!err.to_string().contains("secret"));
        assert_eq!(err.code(), "INTERNAL");
    }

    #[test]
    fn test_validation_error_extensions() {
        let err = CatalogError::from(ValidationError::required("linkedProductId")).extend();
        let extensions = serde_json::to_value(err.extensions.unwrap()).unwrap();
        assert_eq!(extensions["code"], "BAD_USER_INPUT");
        assert_eq!(extensions["field"], "linkedProductId");
    }
}
