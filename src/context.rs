//! GraphQL context for dependency injection

use std::fmt::Display;
use std::sync::Arc;

use async_graphql::{Context, ID};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::activity::{ActivityAction, ActivityLog, ClientMeta};
use crate::auth::{self, ActorId, AuthError, TokenVerifier};
use crate::config::CatalogConfig;
use crate::envelope::{MutationOutcome, MutationResponse};
use crate::store::CatalogStore;

/// Collaborators and configuration shared by every resolver
#[derive(Clone)]
pub struct CatalogContext {
    pub store: Arc<dyn CatalogStore>,
    pub activity: Arc<dyn ActivityLog>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub config: CatalogConfig,
}

impl CatalogContext {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        activity: Arc<dyn ActivityLog>,
        verifier: Arc<dyn TokenVerifier>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            store,
            activity,
            verifier,
            config,
        }
    }

    /// Log resolver arguments, outside production only
    pub fn log_arguments(&self, operation: &str, arguments: JsonValue) {
        if !self.config.is_production {
            tracing::debug!(operation, arguments = %arguments, "resolver arguments");
        }
    }

    /// Log a recovered failure; detail is withheld in production
    pub fn log_failure(&self, operation: &str, error: &dyn Display) {
        if self.config.is_production {
            tracing::warn!(operation, "operation failed");
        } else {
            tracing::warn!(operation, error = %error, "operation failed");
        }
    }

    /// Resolve the acting user from the `authToken` argument, falling back to
    /// the request's bearer header.
    pub async fn authenticate(
        &self,
        ctx: &Context<'_>,
        auth_token: Option<&str>,
    ) -> Result<ActorId, AuthError> {
        let token = auth_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| auth::get_bearer_token(ctx))
            .ok_or(AuthError::MissingToken)?;
        self.verifier.verify(token).await
    }

    /// Client metadata from arguments, completed from request headers
    pub fn client_meta(
        &self,
        ctx: &Context<'_>,
        browser_info: Option<String>,
        ip_address: Option<String>,
    ) -> ClientMeta {
        ClientMeta::new(browser_info, ip_address).or(&auth::get_client_meta(ctx))
    }

    /// The `userIdOf...` arguments are informational; the verified actor wins.
    pub fn note_claimed_actor(&self, operation: &str, claimed: Option<&ID>, actor: &ActorId) {
        if self.config.is_production {
            return;
        }
        if let Some(claimed) = claimed {
            if claimed.as_str() != actor.as_str() {
                tracing::debug!(
                    operation,
                    claimed = claimed.as_str(),
                    actor = %actor,
                    "ignoring client-supplied actor id"
                );
            }
        }
    }

    /// Report a committed write to the activity log, never failing the caller.
    ///
    /// A rejected entry is logged with the action and target only in
    /// production; the collaborator's error text may carry connection detail.
    pub async fn record(
        &self,
        actor: &ActorId,
        action: ActivityAction,
        target_id: &str,
        client: &ClientMeta,
    ) {
        if let Err(e) = self.activity.log_activity(actor, action, target_id, client).await {
            if self.config.is_production {
                tracing::warn!(action = action.as_str(), target_id, "activity entry dropped");
            } else {
                tracing::warn!(action = action.as_str(), target_id, error = %e, "activity entry dropped");
            }
        }
    }

    /// Flatten `outcome` into the wire record, logging encode failures
    /// under the same production rules as any other failure
    pub fn respond<T: Serialize>(&self, operation: &str, outcome: MutationOutcome<T>) -> MutationResponse {
        outcome.into_response_with(|e| self.log_failure(operation, e))
    }
}
