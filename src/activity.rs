//! Activity log collaborator
//!
//! Every successful write is reported as `(actor, action, target, client)`.
//! Logging is best effort: [`crate::CatalogContext::record`] swallows
//! failures after reporting them, so a broken log never fails the write it
//! describes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::auth::ActorId;

/// Write operations that are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityAction {
    AddProduct,
    UpdateProduct,
    DeleteProduct,
    AddBanner,
    DeleteBanner,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddProduct => "addProduct",
            Self::UpdateProduct => "updateProduct",
            Self::DeleteProduct => "deleteProduct",
            Self::AddBanner => "addBanner",
            Self::DeleteBanner => "deleteBanner",
        }
    }
}

/// Client metadata sent along with a mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMeta {
    pub browser_info: Option<String>,
    pub ip_address: Option<String>,
}

impl ClientMeta {
    pub fn new(browser_info: Option<String>, ip_address: Option<String>) -> Self {
        Self {
            browser_info,
            ip_address,
        }
    }

    /// Fill fields left empty here from `fallback`
    pub fn or(self, fallback: &ClientMeta) -> Self {
        Self {
            browser_info: self.browser_info.or_else(|| fallback.browser_info.clone()),
            ip_address: self.ip_address.or_else(|| fallback.ip_address.clone()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ActivityLogError {
    #[error("activity log unavailable: {0}")]
    Unavailable(String),
}

/// Sink for activity entries
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn log_activity(
        &self,
        actor_id: &ActorId,
        action: ActivityAction,
        target_id: &str,
        client: &ClientMeta,
    ) -> Result<(), ActivityLogError>;
}

/// Emits activity entries as `tracing` events on the `catalog::activity` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingActivityLog;

#[async_trait]
impl ActivityLog for TracingActivityLog {
    async fn log_activity(
        &self,
        actor_id: &ActorId,
        action: ActivityAction,
        target_id: &str,
        client: &ClientMeta,
    ) -> Result<(), ActivityLogError> {
        tracing::info!(
            target: "catalog::activity",
            actor_id = %actor_id,
            action = action.as_str(),
            target_id,
            client_browser_info = client.browser_info.as_deref().unwrap_or("unknown"),
            client_ip_address = client.ip_address.as_deref().unwrap_or("unknown"),
            "catalog activity"
        );
        Ok(())
    }
}

/// One recorded activity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub actor_id: ActorId,
    pub action: ActivityAction,
    pub target_id: String,
    pub client: ClientMeta,
    pub recorded_at: DateTime<Utc>,
}

/// Keeps entries in memory, oldest first
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLog {
    entries: Arc<Mutex<Vec<ActivityEntry>>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn log_activity(
        &self,
        actor_id: &ActorId,
        action: ActivityAction,
        target_id: &str,
        client: &ClientMeta,
    ) -> Result<(), ActivityLogError> {
        self.entries.lock().await.push(ActivityEntry {
            actor_id: actor_id.clone(),
            action,
            target_id: target_id.to_string(),
            client: client.clone(),
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_log_keeps_order() {
        let log = InMemoryActivityLog::new();
        let actor = ActorId::new("admin");
        let client = ClientMeta::new(Some("firefox".into()), Some("10.0.0.1".into()));

        log.log_activity(&actor, ActivityAction::AddBanner, "b1", &client)
            .await
            .unwrap();
        log.log_activity(&actor, ActivityAction::DeleteBanner, "b1", &client)
            .await
            .unwrap();

        let entries = log.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, ActivityAction::AddBanner);
        assert_eq!(entries[1].action, ActivityAction::DeleteBanner);
        assert_eq!(entries[1].client, client);
    }

    #[tokio::test]
    async fn test_tracing_log_accepts_entries() {
        assert!(TracingActivityLog
            .log_activity(&ActorId::new("admin"), ActivityAction::AddProduct, "p1", &ClientMeta::default())
            .await
            .is_ok());
    }

    #[test]
    fn test_client_meta_fallback() {
        let headers = ClientMeta::new(Some("curl/8".into()), Some("192.0.2.1".into()));
        let merged = ClientMeta::new(Some("safari".into()), None).or(&headers);
        assert_eq!(merged.browser_info.as_deref(), Some("safari"));
        assert_eq!(merged.ip_address.as_deref(), Some("192.0.2.1"));
    }
}
