//! GraphQL schema definition

use async_graphql::{EmptySubscription, Schema};
use axum::{routing::post, Extension, Router};

use crate::{
    auth::graphql_handler,
    context::CatalogContext,
    resolvers::{Mutation, Query},
};

/// The catalog GraphQL schema
pub type CatalogSchema = Schema<Query, Mutation, EmptySubscription>;

/// Build the schema with `context` injected and its configured limits applied
pub fn build_schema(context: CatalogContext) -> CatalogSchema {
    let config = context.config.clone();
    let mut builder = Schema::build(Query, Mutation, EmptySubscription).data(context);

    if let Some(depth) = config.max_query_depth {
        builder = builder.limit_depth(depth);
    }
    if let Some(complexity) = config.max_query_complexity {
        builder = builder.limit_complexity(complexity);
    }

    builder.finish()
}

/// Axum router serving `schema` at `POST /graphql`
pub fn router(schema: CatalogSchema) -> Router {
    Router::new()
        .route("/graphql", post(graphql_handler))
        .layer(Extension(schema))
}
