use async_trait::async_trait;
use axum::http::HeaderMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::{HookError, Result, ServiceError};

/// Header carrying the webhook's identifier.
pub const HOOK_UUID_HEADER: &str = "x-hook-uuid";

/// Source of secret strings, such as AWS Secrets Manager.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn secret_string(&self, secret_id: &str) -> std::result::Result<String, ServiceError>;
}

/// Webhook identifiers allowed to trigger jobs.
///
/// The list is read from the secret store on first use and kept for the
/// lifetime of the process.
pub struct HookAllowList {
    store: Arc<dyn SecretStore>,
    secret_id: String,
    allowed: OnceCell<HashSet<String>>,
}

impl HookAllowList {
    pub fn new(store: Arc<dyn SecretStore>, secret_id: impl Into<String>) -> Self {
        Self {
            store,
            secret_id: secret_id.into(),
            allowed: OnceCell::new(),
        }
    }

    async fn allowed(&self) -> Result<&HashSet<String>> {
        self.allowed
            .get_or_try_init(|| async {
                tracing::info!("Loading allowed webhook identifiers");
                let secret = self.store.secret_string(&self.secret_id).await?;
                let ids: Vec<String> = serde_json::from_str(&secret)?;
                Ok::<_, HookError>(ids.into_iter().collect())
            })
            .await
    }

    pub async fn is_allowed(&self, hook_uuid: &str) -> Result<bool> {
        Ok(self.allowed().await?.contains(hook_uuid))
    }

    /// Reject the request unless its identifier header is on the list.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<()> {
        let Some(hook_uuid) = headers.get(HOOK_UUID_HEADER).and_then(|v| v.to_str().ok()) else {
            tracing::warn!("Rejected webhook without {} header", HOOK_UUID_HEADER);
            return Err(HookError::Unauthorized);
        };

        if self.is_allowed(hook_uuid).await? {
            Ok(())
        } else {
            tracing::warn!("Rejected webhook with unknown identifier");
            Err(HookError::Unauthorized)
        }
    }
}
