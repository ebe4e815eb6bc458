//! Accelerator and capability-backend probing
//!
//! Mirrors the feature-detection policy of the engine load path: optional
//! accelerated backends are selected when compiled in, otherwise the slower
//! defaults are used. Missing acceleration is a degradation, not an error.

use std::path::Path;

use tracing::info;

/// Attention implementation chosen at load time
pub const ATTENTION_ACCELERATED: &str = "flash_attention_2";
pub const ATTENTION_DEFAULT: &str = "sdpa";

/// Expert-routing implementation chosen at load time
pub const ROUTING_ACCELERATED: &str = "flashinfer";
pub const ROUTING_DEFAULT: &str = "eager";

/// Backends and devices resolved for an engine load
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub attention_impl: &'static str,
    pub routing_impl: &'static str,
    pub accelerators: Vec<String>,
}

impl Capabilities {
    pub fn accelerator_available(&self) -> bool {
        !self.accelerators.is_empty()
    }
}

/// Probe available backends and accelerators. Pure read: safe to call from
/// health checks, never mutates engine state.
pub fn probe() -> Capabilities {
    let attention_impl = if cfg!(feature = "accel-attention") {
        ATTENTION_ACCELERATED
    } else {
        ATTENTION_DEFAULT
    };

    let routing_impl = if cfg!(feature = "accel-routing") {
        ROUTING_ACCELERATED
    } else {
        ROUTING_DEFAULT
    };

    Capabilities {
        attention_impl,
        routing_impl,
        accelerators: enumerate_accelerators(),
    }
}

/// Probe and log the outcome. Used on the engine load path and at startup.
pub fn probe_and_log() -> Capabilities {
    let caps = probe();

    if caps.attention_impl == ATTENTION_ACCELERATED {
        info!(attention = caps.attention_impl, "Accelerated attention backend enabled");
    } else {
        info!(
            attention = caps.attention_impl,
            "Accelerated attention unavailable, using default backend"
        );
    }

    if caps.routing_impl == ROUTING_ACCELERATED {
        info!(routing = caps.routing_impl, "Accelerated routing backend enabled");
    } else {
        info!(
            routing = caps.routing_impl,
            "Accelerated routing unavailable, using default backend"
        );
    }

    if caps.accelerators.is_empty() {
        info!("No accelerators detected, generation runs on CPU");
    } else {
        info!(count = caps.accelerators.len(), "Detected accelerators");
        for (i, id) in caps.accelerators.iter().enumerate() {
            info!(index = i, device = %id, "Accelerator");
        }
    }

    caps
}

/// Whether any accelerator device is visible. Used by the health endpoint.
pub fn accelerator_available() -> bool {
    !enumerate_accelerators().is_empty()
}

/// Enumerate accelerator device nodes visible to this process
fn enumerate_accelerators() -> Vec<String> {
    let mut devices = Vec::new();

    // Dedicated compute devices enumerate as /dev/nvidia0, /dev/nvidia1, ...
    for ordinal in 0..16 {
        let node = format!("/dev/nvidia{}", ordinal);
        if Path::new(&node).exists() {
            devices.push(node);
        }
    }

    if devices.is_empty() {
        // Fall back to DRM render nodes
        for ordinal in 128..144 {
            let node = format!("/dev/dri/renderD{}", ordinal);
            if Path::new(&node).exists() {
                devices.push(node);
            }
        }
    }

    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_resolves_both_backends() {
        let caps = probe();
        assert!(
            caps.attention_impl == ATTENTION_ACCELERATED
                || caps.attention_impl == ATTENTION_DEFAULT
        );
        assert!(
            caps.routing_impl == ROUTING_ACCELERATED || caps.routing_impl == ROUTING_DEFAULT
        );
    }

    #[test]
    fn test_accelerator_available_matches_enumeration() {
        let caps = probe();
        assert_eq!(caps.accelerator_available(), accelerator_available());
    }
}
