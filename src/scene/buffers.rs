//! Read-only buffers handed to the renderer

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::voxel::svo::Octree;

/// Scene header for the GPU (16 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct GpuSvoInfo {
    pub depth: u32,
    /// Cells per axis (`2^depth`)
    pub grid_size: u32,
    pub node_count: u32,
    pub emissive_count: u32,
}

/// Immutable snapshot of a finished octree.
///
/// Cloning shares the underlying storage, so the buffers can be passed to
/// other threads once construction is over.
#[derive(Clone, Debug)]
pub struct SvoBuffers {
    pub depth: u8,
    pub grid_size: u32,
    /// Node words, root at index 0
    pub nodes: Arc<[u32]>,
    /// Packed palette colors indexed by leaf payloads
    pub colors: Arc<[u32]>,
    /// Emissive voxel grid positions
    pub emissive: Arc<[[u32; 3]]>,
}

impl SvoBuffers {
    /// Copy the octree's buffers into a shared snapshot
    pub fn from_octree(octree: &Octree) -> Self {
        Self {
            depth: octree.depth(),
            grid_size: octree.grid_size(),
            nodes: Arc::from(octree.node_words()),
            colors: Arc::from(octree.colors()),
            emissive: octree.emissive_voxels().iter().map(|p| p.to_array()).collect(),
        }
    }

    pub fn info(&self) -> GpuSvoInfo {
        GpuSvoInfo {
            depth: self.depth as u32,
            grid_size: self.grid_size,
            node_count: self.nodes.len() as u32,
            emissive_count: self.emissive.len() as u32,
        }
    }

    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn emissive_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.emissive)
    }
}

impl From<&Octree> for SvoBuffers {
    fn from(octree: &Octree) -> Self {
        Self::from_octree(octree)
    }
}
