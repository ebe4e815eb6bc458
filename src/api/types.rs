//! Request and response types for the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::params::GenerationConfig;

/// Image generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Text prompt to generate from
    pub prompt: String,

    /// Image width in pixels, used when no size descriptor is given
    #[serde(default = "default_dimension")]
    pub width: u32,

    /// Image height in pixels, used when no size descriptor is given
    #[serde(default = "default_dimension")]
    pub height: u32,

    /// Number of diffusion inference steps
    #[serde(default = "default_steps")]
    pub diff_infer_steps: u32,

    /// Random seed; absent means nondeterministic generation
    #[serde(default)]
    pub seed: Option<i64>,

    /// Size descriptor ("auto", "1024x1024", "16:9", ...). Takes precedence
    /// over width/height when non-empty.
    #[serde(default = "default_image_size")]
    pub image_size: Option<String>,

    /// Task mode: image, auto, think, or recaption
    #[serde(default = "default_bot_task")]
    pub bot_task: String,

    /// Whether to apply a system prompt
    #[serde(default)]
    pub use_system_prompt: bool,

    /// Custom system prompt override
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Whether the engine logs detailed progress (server-side only)
    #[serde(default = "default_true")]
    pub verbose: bool,

    /// Whether to inline the artifact bytes as base64 in the response
    #[serde(default)]
    pub return_base64: bool,
}

fn default_dimension() -> u32 {
    1024
}

fn default_steps() -> u32 {
    50
}

fn default_image_size() -> Option<String> {
    Some("auto".to_string())
}

fn default_bot_task() -> String {
    "auto".to_string()
}

fn default_true() -> bool {
    true
}

/// The effective parameters echoed back to the client. Always reflects the
/// resolved configuration, not the raw request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub image_size: String,
    pub diff_infer_steps: u32,
    pub seed: Option<i64>,
    pub bot_task: String,
    pub use_system_prompt: bool,
    pub verbose: bool,
}

impl From<&GenerationConfig> for GenerationParameters {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            image_size: config.image_size.clone(),
            diff_infer_steps: config.diff_infer_steps,
            seed: config.seed,
            bot_task: config.bot_task.clone(),
            use_system_prompt: config.use_system_prompt,
            verbose: config.verbose,
        }
    }
}

/// Image generation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub task_id: Uuid,
    /// Relative URL the artifact can be fetched from
    pub image_url: String,
    /// Server-side path the artifact was written to
    pub image_path: String,
    /// Base64-encoded artifact bytes, when requested
    pub image_base64: Option<String>,
    pub prompt: String,
    pub parameters: GenerationParameters,
    pub timestamp: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub gpu_available: bool,
    pub model_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req: GenerateRequest =
            serde_json::from_value(serde_json::json!({ "prompt": "a red cube" })).unwrap();

        assert_eq!(req.width, 1024);
        assert_eq!(req.height, 1024);
        assert_eq!(req.diff_infer_steps, 50);
        assert_eq!(req.seed, None);
        assert_eq!(req.image_size.as_deref(), Some("auto"));
        assert_eq!(req.bot_task, "auto");
        assert!(!req.use_system_prompt);
        assert!(req.verbose);
        assert!(!req.return_base64);
    }

    #[test]
    fn test_explicit_null_image_size_clears_default() {
        let req: GenerateRequest = serde_json::from_value(serde_json::json!({
            "prompt": "a red cube",
            "image_size": null,
        }))
        .unwrap();

        assert_eq!(req.image_size, None);
    }

    #[test]
    fn test_request_without_prompt_rejected() {
        let result: std::result::Result<GenerateRequest, _> =
            serde_json::from_value(serde_json::json!({ "width": 1024 }));
        assert!(result.is_err());
    }
}
