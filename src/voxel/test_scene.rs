//! Fixed procedural test scene
//!
//! Used when no model file is configured or loading fails.

use glam::UVec3;

use crate::voxel::color::{pack_rgb, WHITE_LIGHT};
use crate::voxel::svo::Octree;

/// Offset applied to every block so the scene sits near the middle of a
/// depth-8 grid
pub const TEST_SCENE_BASE: UVec3 = UVec3::new(120, 120, 120);

/// Light position relative to [`TEST_SCENE_BASE`], above the blocks
pub const TEST_SCENE_LIGHT: UVec3 = UVec3::new(12, 24, 2);

/// Fill the box `min..max` (exclusive) with one color
fn fill_box(octree: &mut Octree, min: UVec3, max: UVec3, color: u32) {
    for x in min.x..max.x {
        for y in min.y..max.y {
            for z in min.z..max.z {
                let pos = TEST_SCENE_BASE + UVec3::new(x, y, z);
                // Small grids cannot hold the whole scene
                if octree.contains(pos) {
                    octree.insert_voxel(pos, color);
                }
            }
        }
    }
}

/// Insert the test blocks and a single light.
///
/// Deterministic: two fresh octrees of the same depth end up with identical
/// nodes and palettes.
pub fn generate_test_scene(octree: &mut Octree) {
    // Red base block
    fill_box(octree, UVec3::new(0, 0, 0), UVec3::new(4, 4, 4), pack_rgb(255, 0, 0));
    // Green block to the side
    fill_box(octree, UVec3::new(8, 0, 0), UVec3::new(12, 4, 4), pack_rgb(0, 255, 0));
    // Blue block higher
    fill_box(octree, UVec3::new(4, 8, 4), UVec3::new(8, 12, 8), pack_rgb(0, 0, 255));
    // Yellow slab
    fill_box(octree, UVec3::new(0, 12, 0), UVec3::new(8, 16, 4), pack_rgb(255, 255, 0));
    // Magenta pillar
    fill_box(octree, UVec3::new(16, 0, 0), UVec3::new(20, 16, 4), pack_rgb(255, 0, 255));
    // Cyan tower
    fill_box(octree, UVec3::new(20, 0, 0), UVec3::new(24, 20, 4), pack_rgb(0, 255, 255));

    // Orange stairs
    for step in 0..8u32 {
        fill_box(
            octree,
            UVec3::new(24 + step, step * 2, 0),
            UVec3::new(28 + step, step * 2 + 2, 4),
            pack_rgb(255, 128, 0),
        );
    }

    let light = TEST_SCENE_BASE + TEST_SCENE_LIGHT;
    if octree.contains(light) {
        octree.insert_voxel(light, WHITE_LIGHT);
    }

    log::debug!(
        "Generated test scene: {} voxels, {} nodes, {} colors",
        octree.insert_count(),
        octree.node_count(),
        octree.palette().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::color;

    #[test]
    fn test_deterministic() {
        let mut a = Octree::new(8);
        let mut b = Octree::new(8);
        generate_test_scene(&mut a);
        generate_test_scene(&mut b);

        assert_eq!(a.node_words(), b.node_words());
        assert_eq!(a.colors(), b.colors());
        assert_eq!(a.emissive_voxels(), b.emissive_voxels());
    }

    #[test]
    fn test_contents() {
        let mut octree = Octree::new(8);
        generate_test_scene(&mut octree);

        // 7 block colors plus the light
        assert_eq!(octree.palette().len(), 8);
        assert_eq!(
            octree.emissive_voxels(),
            &[TEST_SCENE_BASE + TEST_SCENE_LIGHT]
        );
        assert_eq!(octree.lookup_color(TEST_SCENE_BASE), Some(pack_rgb(255, 0, 0)));
        assert_eq!(
            octree.lookup_color(TEST_SCENE_BASE + UVec3::new(22, 18, 2)),
            Some(pack_rgb(0, 255, 255))
        );
        assert!(octree.lookup(TEST_SCENE_BASE + UVec3::new(40, 40, 40)).is_none());
    }

    #[test]
    fn test_only_light_is_emissive() {
        let mut octree = Octree::new(8);
        generate_test_scene(&mut octree);
        let lit = octree.colors().iter().filter(|&&c| color::is_emissive(c)).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_small_grid_skips_out_of_range() {
        let mut octree = Octree::new(4);
        generate_test_scene(&mut octree);
        assert!(octree.is_empty());
        assert_eq!(octree.insert_count(), 0);
    }

    #[test]
    fn test_compresses_solid_blocks() {
        let mut octree = Octree::new(8);
        generate_test_scene(&mut octree);
        let len = octree.node_count();
        let stats = octree.compress();

        assert_eq!(octree.node_count(), len);
        assert!(stats.collapsed > 0);
        assert_eq!(octree.lookup_color(TEST_SCENE_BASE + UVec3::ONE), Some(pack_rgb(255, 0, 0)));
    }
}
