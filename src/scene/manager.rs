//! Scene construction: load a model or fall back to the test scene

use std::path::PathBuf;

use super::buffers::SvoBuffers;
use super::config::SceneConfig;
use crate::core::Result;
use crate::voxel::svo::Octree;
use crate::voxel::test_scene::generate_test_scene;
use crate::voxel::vox_file::LoadReport;

/// Where the scene's voxels came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneSource {
    Model { path: PathBuf, report: LoadReport },
    TestScene,
}

/// Owns the octree while it is built, then hands out read-only buffers
pub struct SceneManager {
    config: SceneConfig,
    octree: Octree,
    source: SceneSource,
}

impl SceneManager {
    /// Build the scene described by `config`.
    ///
    /// The config is validated first. A model that fails to load is reported
    /// at `warn` and replaced by the test scene on a fresh octree.
    pub fn build(config: SceneConfig) -> Result<Self> {
        config.validate()?;

        if let Some(path) = config.model_path.clone() {
            let mut octree = Octree::new(config.depth);
            match octree.load_model(&path) {
                Ok(report) => {
                    return Ok(Self {
                        config,
                        octree,
                        source: SceneSource::Model { path, report },
                    });
                }
                Err(e) => {
                    log::warn!(
                        "Failed to load {}: {}; falling back to test scene",
                        path.display(),
                        e
                    );
                }
            }
        }

        let mut octree = Octree::new(config.depth);
        generate_test_scene(&mut octree);
        if config.compress_test_scene {
            octree.compress();
        }

        log::info!(
            "Built test scene: {} nodes, {} colors, {} lights",
            octree.node_count(),
            octree.palette().len(),
            octree.emissive_voxels().len()
        );

        Ok(Self {
            config,
            octree,
            source: SceneSource::TestScene,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    pub fn source(&self) -> &SceneSource {
        &self.source
    }

    /// Snapshot for the renderer
    pub fn buffers(&self) -> SvoBuffers {
        SvoBuffers::from_octree(&self.octree)
    }

    /// Finish construction and keep only the octree
    pub fn into_octree(self) -> Octree {
        self.octree
    }
}
