//! Built-in procedural engine
//!
//! A self-contained engine implementation used for default wiring, local
//! development, and integration tests. It renders a deterministic gradient
//! derived from the prompt and seed, so fixed seeds reproduce byte-identical
//! PNGs and the full request lifecycle can be exercised without model
//! weights or accelerators.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task;
use tracing::debug;

use crate::config::settings::EngineSettings;
use crate::engine::traits::{EngineLoader, ImageEngine};
use crate::error::{AppError, Result};
use crate::params::GenerationConfig;

/// Base edge length used when resolving symbolic size expressions
const BASE_DIMENSION: u32 = 1024;

/// Largest edge length the renderer accepts. The descriptor arrives
/// verbatim from the request, so an unchecked value could demand an
/// arbitrarily large allocation.
const MAX_EDGE: u32 = 4096;

pub struct LocalEngine {
    model_id: String,
}

pub struct LocalEngineLoader;

#[async_trait]
impl EngineLoader for LocalEngineLoader {
    async fn load(&self, settings: &EngineSettings) -> Result<Arc<dyn ImageEngine>> {
        let model_id = settings.model_path.clone();
        // Construction is trivial here, but heavyweight loaders run off the
        // scheduler, so this one does too.
        let engine = task::spawn_blocking(move || LocalEngine { model_id })
            .await
            .map_err(|e| AppError::Internal(format!("engine load task panicked: {e}")))?;
        Ok(Arc::new(engine))
    }
}

#[async_trait]
impl ImageEngine for LocalEngine {
    async fn generate(&self, config: &GenerationConfig) -> Result<Vec<u8>> {
        let config = config.clone();
        task::spawn_blocking(move || render(&config))
            .await
            .map_err(|e| AppError::Internal(format!("generation task panicked: {e}")))?
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Render a PNG for the resolved configuration. Blocking; callers run this
/// under `spawn_blocking`.
fn render(config: &GenerationConfig) -> Result<Vec<u8>> {
    let (width, height) = parse_size_expression(&config.image_size)?;

    let seed = config
        .seed
        .map(|s| s as u64)
        .unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed ^ prompt_digest(&config.prompt));

    let base: [u8; 3] = [rng.gen(), rng.gen(), rng.gen()];
    let accent: [u8; 3] = [rng.gen(), rng.gen(), rng.gen()];

    let mut img = RgbImage::new(width, height);
    for step in 0..config.diff_infer_steps {
        // One refinement pass per inference step: blend the accent band a
        // little further into the base gradient.
        let t = (step + 1) as f32 / config.diff_infer_steps as f32;
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let fx = x as f32 / width as f32;
            let fy = y as f32 / height as f32;
            let mix = (fx * t + fy * (1.0 - t)).clamp(0.0, 1.0);
            let blend = |a: u8, b: u8| -> u8 {
                (a as f32 * (1.0 - mix) + b as f32 * mix) as u8
            };
            *pixel = Rgb([
                blend(base[0], accent[0]),
                blend(base[1], accent[1]),
                blend(base[2], accent[2]),
            ]);
        }
        if config.verbose && (step + 1) % 10 == 0 {
            debug!(step = step + 1, total = config.diff_infer_steps, "Diffusion progress");
        }
    }

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| AppError::Internal(format!("PNG encoding failed: {e}")))?;
    Ok(bytes)
}

/// Interpret a resolved size expression: explicit "WxH", an aspect ratio
/// "W:H" scaled to the base edge, or the symbolic "auto".
fn parse_size_expression(expr: &str) -> Result<(u32, u32)> {
    if expr == "auto" {
        return Ok((BASE_DIMENSION, BASE_DIMENSION));
    }

    if let Some((w, h)) = expr.split_once('x') {
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| bad_size(expr))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| bad_size(expr))?;
        if width == 0 || height == 0 || width > MAX_EDGE || height > MAX_EDGE {
            return Err(bad_size(expr));
        }
        return Ok((width, height));
    }

    if let Some((w, h)) = expr.split_once(':') {
        let rw: f64 = w.trim().parse().map_err(|_| bad_size(expr))?;
        let rh: f64 = h.trim().parse().map_err(|_| bad_size(expr))?;
        if rw <= 0.0 || rh <= 0.0 {
            return Err(bad_size(expr));
        }
        if rw >= rh {
            let height = (BASE_DIMENSION as f64 * rh / rw).round() as u32;
            return Ok((BASE_DIMENSION, height.max(1)));
        }
        let width = (BASE_DIMENSION as f64 * rw / rh).round() as u32;
        return Ok((width.max(1), BASE_DIMENSION));
    }

    Err(bad_size(expr))
}

fn bad_size(expr: &str) -> AppError {
    AppError::Internal(format!("engine cannot interpret size expression '{expr}'"))
}

fn prompt_digest(prompt: &str) -> u64 {
    // FNV-1a; stable across runs, unlike the std hasher.
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in prompt.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
