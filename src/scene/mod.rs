//! Scene construction and renderer hand-off

pub mod buffers;
pub mod config;
pub mod manager;

pub use buffers::{GpuSvoInfo, SvoBuffers};
pub use config::SceneConfig;
pub use manager::{SceneManager, SceneSource};
