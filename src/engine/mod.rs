//! Generation engine: trait seams, lifecycle management, and capability probing

pub mod capabilities;
pub mod local;
pub mod manager;
pub mod traits;

pub use manager::{EngineManager, EngineState};
pub use traits::{EngineLoader, ImageEngine};
