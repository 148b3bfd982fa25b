//! Authentication plumbing for catalog mutations
//!
//! Provides helpers for:
//! - Extracting the bearer token and client metadata from HTTP headers
//! - Resolving the acting user from a token through a [`TokenVerifier`]
//! - A standard Axum handler that injects both into the GraphQL request

use std::fmt;

use async_graphql::{Context, Request, Response};
use async_trait::async_trait;
use axum::{extract::Extension, http::HeaderMap, Json};
use serde::Serialize;
use thiserror::Error;

use crate::activity::ClientMeta;
use crate::schema::CatalogSchema;

/// Identity of the user performing a mutation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bearer token lifted from the `Authorization` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("no auth token supplied")]
    MissingToken,

    #[error("auth token rejected: {0}")]
    Rejected(String),
}

/// Turns an auth token into the identity it was issued to
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<ActorId, AuthError>;
}

/// Treats the token itself as the actor id.
///
/// Suitable for local development and tests only; it performs no
/// verification beyond rejecting blank tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughVerifier;

#[async_trait]
impl TokenVerifier for PassthroughVerifier {
    async fn verify(&self, token: &str) -> Result<ActorId, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(ActorId::new(token))
    }
}

/// Extract the token from an `Authorization: Bearer ...` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<BearerToken> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| BearerToken(token.to_string()))
}

/// Extract browser and address hints from `User-Agent` / `X-Forwarded-For`
pub fn extract_client_meta(headers: &HeaderMap) -> ClientMeta {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    ClientMeta {
        browser_info: header("User-Agent").map(str::to_string),
        ip_address: header("X-Forwarded-For")
            .and_then(|list| list.split(',').next())
            .map(|ip| ip.trim().to_string()),
    }
}

/// Standard GraphQL handler with auth and client context injection
///
/// # Example
///
/// ```rust,no_run
/// use axum::{Extension, Router, routing::post};
/// use catalog_graphql::auth::graphql_handler;
/// use catalog_graphql::schema::CatalogSchema;
///
/// # fn example(schema: CatalogSchema) {
/// let app: Router = Router::new()
///     .route("/graphql", post(graphql_handler))
///     .layer(Extension(schema));
/// # }
/// ```
pub async fn graphql_handler(
    Extension(schema): Extension<CatalogSchema>,
    headers: HeaderMap,
    req: Json<Request>,
) -> Json<Response> {
    let mut request = req.0;

    if let Some(token) = extract_bearer_token(&headers) {
        request = request.data(token);
    }
    request = request.data(extract_client_meta(&headers));

    Json(schema.execute(request).await)
}

/// Get the header bearer token from GraphQL context
pub fn get_bearer_token<'a>(ctx: &'a Context<'_>) -> Option<&'a str> {
    ctx.data_opt::<BearerToken>().map(|t| t.0.as_str())
}

/// Get header-derived client metadata from GraphQL context
pub fn get_client_meta(ctx: &Context<'_>) -> ClientMeta {
    ctx.data_opt::<ClientMeta>().cloned().unwrap_or_default()
}
