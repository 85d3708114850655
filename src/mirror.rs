//! Remote Mirror Adapter
//!
//! Best-effort side channel that forwards set/delete/clear to an external
//! distribution layer (CDN). The local cache stays the source of truth:
//! mirror calls run detached with their own timeout, and failures are
//! logged, never returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// == Remote Mirror Trait ==
/// Extension point for a remote distribution layer.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    async fn update(&self, endpoint: &str, key: &str, value: &Value) -> anyhow::Result<()>;

    async fn remove(&self, endpoint: &str, key: &str) -> anyhow::Result<()>;

    async fn clear(&self, endpoint: &str) -> anyhow::Result<()>;
}

// == Logging Mirror ==
/// Default mirror: records each call in the log and reports success.
/// Swap in a real client through `CacheBuilder::mirror`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMirror;

#[async_trait]
impl RemoteMirror for LoggingMirror {
    async fn update(&self, endpoint: &str, key: &str, _value: &Value) -> anyhow::Result<()> {
        info!("Remote mirror updated: endpoint={}, key={}", endpoint, key);
        Ok(())
    }

    async fn remove(&self, endpoint: &str, key: &str) -> anyhow::Result<()> {
        info!("Remote mirror entry removed: endpoint={}, key={}", endpoint, key);
        Ok(())
    }

    async fn clear(&self, endpoint: &str) -> anyhow::Result<()> {
        info!("Remote mirror cleared: endpoint={}", endpoint);
        Ok(())
    }
}

// == Mirror Operation ==
#[derive(Debug, Clone)]
pub enum MirrorOp {
    Update { key: String, value: Value },
    Remove { key: String },
    Clear,
}

impl MirrorOp {
    fn label(&self) -> &'static str {
        match self {
            MirrorOp::Update { .. } => "update",
            MirrorOp::Remove { .. } => "remove",
            MirrorOp::Clear => "clear",
        }
    }
}

// == Mirror Dispatcher ==
/// Runs mirror operations as detached tasks bounded by a timeout.
#[derive(Clone)]
pub struct MirrorDispatcher {
    mirror: Arc<dyn RemoteMirror>,
}

impl MirrorDispatcher {
    pub fn new(mirror: Arc<dyn RemoteMirror>) -> Self {
        Self { mirror }
    }

    /// Spawns `op` on the runtime. The handle is only useful to tests;
    /// callers are expected to drop it.
    pub fn dispatch(&self, endpoint: String, op: MirrorOp, timeout: Duration) -> JoinHandle<()> {
        let mirror = Arc::clone(&self.mirror);

        tokio::spawn(async move {
            let call = async {
                match &op {
                    MirrorOp::Update { key, value } => mirror.update(&endpoint, key, value).await,
                    MirrorOp::Remove { key } => mirror.remove(&endpoint, key).await,
                    MirrorOp::Clear => mirror.clear(&endpoint).await,
                }
            };

            match tokio::time::timeout(timeout, call).await {
                Ok(Ok(())) => debug!("Remote mirror {} succeeded", op.label()),
                Ok(Err(e)) => warn!("Remote mirror {} failed: {:#}", op.label(), e),
                Err(_) => warn!(
                    "Remote mirror {} timed out after {}ms",
                    op.label(),
                    timeout.as_millis()
                ),
            }
        })
    }
}
