//! GraphQL resolvers

pub mod mutation;
pub mod query;

pub use mutation::Mutation;
pub use query::Query;

use async_graphql::ID;

/// Treat an empty id argument like an absent one
pub(crate) fn present_id(id: Option<ID>) -> Option<String> {
    id.map(|id| id.0).filter(|id| !id.trim().is_empty())
}
