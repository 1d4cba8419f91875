//! svo-index - Sparse voxel octree index builder
//!
//! Builds a flat, GPU-ready octree (node words, color palette, emissive
//! voxel list) from a `.vox` model or a built-in test scene.

pub mod core;
pub mod voxel;
pub mod scene;
pub mod storage;
