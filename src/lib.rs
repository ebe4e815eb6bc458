//! Text-to-Image Serving API
//!
//! A single-process HTTP service that accepts text-to-image generation
//! requests, forwards them to an underlying generation engine with lazy,
//! once-only initialization, persists the resulting image, and returns
//! metadata plus an access URL.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod storage;

pub use error::{AppError, Result};

use std::sync::Arc;

use engine::EngineManager;
use storage::OutputStore;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: config::Settings,
    pub engine: Arc<EngineManager>,
    pub store: Arc<OutputStore>,
}
