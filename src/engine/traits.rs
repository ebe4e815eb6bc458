//! Common traits for generation engines

use async_trait::async_trait;

use crate::config::settings::EngineSettings;
use crate::error::Result;
use crate::params::GenerationConfig;

/// The opaque generation capability: a resolved configuration in, encoded
/// image bytes out.
///
/// Implementations own the obligation to run CPU/accelerator-bound work off
/// the async scheduler (e.g. via `tokio::task::spawn_blocking`) so that a
/// multi-minute generation never stalls concurrent requests.
#[async_trait]
pub trait ImageEngine: Send + Sync {
    /// Generate a PNG-encoded image from a fully resolved configuration
    async fn generate(&self, config: &GenerationConfig) -> Result<Vec<u8>>;

    /// Identifier of the loaded model, for logging and status reporting
    fn model_id(&self) -> &str;
}

/// Constructs an engine instance from settings.
///
/// Loading is expected to be heavyweight (weights from disk, accelerator
/// placement). The lifecycle manager invokes this at most once per process.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self, settings: &EngineSettings) -> Result<std::sync::Arc<dyn ImageEngine>>;
}
