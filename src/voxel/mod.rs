//! Voxel data structures and scene sources

pub mod color;
pub mod svo;
pub mod test_scene;
pub mod vox_file;

pub use svo::{ColorPalette, Node, NodeKind, Octree};
pub use test_scene::generate_test_scene;
pub use vox_file::{LoadReport, VoxError, VoxModel};
