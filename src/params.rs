//! Parameter normalization
//!
//! Reconciles the overlapping request surface (explicit width/height vs. a
//! size descriptor vs. "auto") into one fully resolved generation
//! configuration, or rejects the request before the engine is ever invoked.

use serde::{Deserialize, Serialize};

use crate::api::types::GenerateRequest;
use crate::error::{AppError, Result};

/// Inclusive bounds for explicit width/height, in pixels
pub const MIN_DIMENSION: u32 = 512;
pub const MAX_DIMENSION: u32 = 2048;

/// Inclusive bounds for diffusion inference steps
pub const MIN_STEPS: u32 = 1;
pub const MAX_STEPS: u32 = 100;

/// Accepted task-mode tokens. They are passed through to the engine
/// opaquely; only membership is checked here.
pub const BOT_TASKS: [&str; 4] = ["image", "auto", "think", "recaption"];

/// Fully resolved generation configuration. Immutable once built: no "auto"
/// placeholder dimensions or unset fields remain except the documented
/// nondeterministic-seed case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub prompt: String,
    /// Resolved size expression: explicit "WxH" or a symbolic token the
    /// engine understands ("auto", "16:9", ...)
    pub image_size: String,
    pub diff_infer_steps: u32,
    pub seed: Option<i64>,
    pub bot_task: String,
    pub use_system_prompt: bool,
    pub system_prompt: Option<String>,
    pub verbose: bool,
}

/// Resolve a request into a [`GenerationConfig`].
///
/// A non-empty `image_size` descriptor wins over width/height and is used
/// verbatim. Otherwise the size expression is synthesized as
/// `"{width}x{height}"`. Width and height are bounds-checked regardless of
/// the descriptor: an out-of-range dimension is a malformed request even
/// when the descriptor makes it moot.
pub fn resolve(req: &GenerateRequest) -> Result<GenerationConfig> {
    if req.prompt.is_empty() {
        return Err(AppError::Validation("prompt must not be empty".to_string()));
    }

    check_dimension("width", req.width)?;
    check_dimension("height", req.height)?;

    if req.diff_infer_steps < MIN_STEPS || req.diff_infer_steps > MAX_STEPS {
        return Err(AppError::Validation(format!(
            "diff_infer_steps must be in [{}, {}], got {}",
            MIN_STEPS, MAX_STEPS, req.diff_infer_steps
        )));
    }

    if !BOT_TASKS.contains(&req.bot_task.as_str()) {
        return Err(AppError::Validation(format!(
            "bot_task must be one of {:?}, got '{}'",
            BOT_TASKS, req.bot_task
        )));
    }

    let image_size = match req.image_size.as_deref() {
        Some(descriptor) if !descriptor.is_empty() => descriptor.to_string(),
        _ => format!("{}x{}", req.width, req.height),
    };

    Ok(GenerationConfig {
        prompt: req.prompt.clone(),
        image_size,
        diff_infer_steps: req.diff_infer_steps,
        // Absent seed means nondeterministic generation. That is a
        // documented non-reproducibility case, not an error.
        seed: req.seed,
        bot_task: req.bot_task.clone(),
        use_system_prompt: req.use_system_prompt,
        system_prompt: req.system_prompt.clone(),
        verbose: req.verbose,
    })
}

fn check_dimension(name: &str, value: u32) -> Result<()> {
    if value < MIN_DIMENSION || value > MAX_DIMENSION {
        return Err(AppError::Validation(format!(
            "{} must be in [{}, {}], got {}",
            name, MIN_DIMENSION, MAX_DIMENSION, value
        )));
    }
    Ok(())
}
