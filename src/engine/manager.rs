//! Engine lifecycle management
//!
//! Owns the single shared engine instance behind an explicit state machine.
//! Initialization is lazy, happens at most once per process, and a failed
//! load is terminal: subsequent requests fail fast with the original error
//! instead of re-attempting an expensive reload.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::config::settings::EngineSettings;
use crate::engine::capabilities;
use crate::engine::traits::{EngineLoader, ImageEngine};
use crate::error::{AppError, Result};

/// Lifecycle states of the shared engine handle. Ready and Failed are
/// terminal for the process lifetime.
pub enum EngineState {
    Unloaded,
    Loading,
    Ready(Arc<dyn ImageEngine>),
    Failed(String),
}

impl EngineState {
    pub fn label(&self) -> &'static str {
        match self {
            EngineState::Unloaded => "unloaded",
            EngineState::Loading => "loading",
            EngineState::Ready(_) => "ready",
            EngineState::Failed(_) => "failed",
        }
    }
}

/// Manages lazy, once-only initialization of the generation engine.
///
/// The loader is injected so tests can substitute a fake engine without a
/// process restart. No other component mutates the state.
pub struct EngineManager {
    state: RwLock<EngineState>,
    // Serializes the Unloaded -> Loading transition so concurrent first
    // requests trigger exactly one load.
    load_lock: Mutex<()>,
    loader: Box<dyn EngineLoader>,
    settings: EngineSettings,
}

impl EngineManager {
    pub fn new(loader: Box<dyn EngineLoader>, settings: EngineSettings) -> Self {
        Self {
            state: RwLock::new(EngineState::Unloaded),
            load_lock: Mutex::new(()),
            loader,
            settings,
        }
    }

    /// Return the ready engine, loading it on first call. Idempotent and
    /// safe to call from every request path.
    pub async fn ensure_ready(&self) -> Result<Arc<dyn ImageEngine>> {
        // Fast path: no lock contention once the terminal state is reached.
        if let Some(resolved) = self.resolved().await {
            return resolved;
        }

        let _guard = self.load_lock.lock().await;

        // A concurrent request may have finished the load while this one
        // waited on the guard.
        if let Some(resolved) = self.resolved().await {
            return resolved;
        }

        *self.state.write().await = EngineState::Loading;
        info!(model_path = %self.settings.model_path, "Loading generation engine");

        capabilities::probe_and_log();

        match self.loader.load(&self.settings).await {
            Ok(engine) => {
                info!(model = engine.model_id(), "Engine ready");
                *self.state.write().await = EngineState::Ready(engine.clone());
                Ok(engine)
            }
            Err(e) => {
                let message = e.to_string();
                error!(error = %message, "Engine load failed; not retrying");
                *self.state.write().await = EngineState::Failed(message.clone());
                Err(AppError::EngineInit(message))
            }
        }
    }

    /// Whether the engine has reached Ready. Pure read, never loads.
    pub async fn is_loaded(&self) -> bool {
        matches!(&*self.state.read().await, EngineState::Ready(_))
    }

    /// Current lifecycle state label. Pure read, never loads.
    pub async fn state_label(&self) -> &'static str {
        self.state.read().await.label()
    }

    fn terminal(state: &EngineState) -> Option<Result<Arc<dyn ImageEngine>>> {
        match state {
            EngineState::Ready(engine) => Some(Ok(engine.clone())),
            EngineState::Failed(message) => Some(Err(AppError::EngineInit(message.clone()))),
            _ => None,
        }
    }

    async fn resolved(&self) -> Option<Result<Arc<dyn ImageEngine>>> {
        Self::terminal(&*self.state.read().await)
    }
}
