//! Scene configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Deepest tree the builder accepts from configuration
pub const MAX_DEPTH: u8 = 16;

/// Configuration for building a scene index
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Octree depth; the grid is `2^depth` cells per axis
    pub depth: u8,
    /// `.vox` model to load. `None` builds the test scene.
    pub model_path: Option<PathBuf>,
    /// Run the homogeneous compressor over the test scene
    /// (loaded models are always compressed)
    pub compress_test_scene: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            depth: 8,
            model_path: None,
            compress_test_scene: true,
        }
    }
}

impl SceneConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: SceneConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Config that loads `path` at the default depth
    pub fn with_model(path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 || self.depth > MAX_DEPTH {
            return Err(Error::Config(format!(
                "depth must be in 1..={}, got {}",
                MAX_DEPTH, self.depth
            )));
        }
        Ok(())
    }
}
