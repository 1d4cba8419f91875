//! Sparse Voxel Octree implementation

pub mod node;
pub mod palette;
pub mod octree;
pub mod compress;

pub use node::{Node, NodeKind};
pub use palette::ColorPalette;
pub use octree::Octree;
pub use compress::CompressStats;
