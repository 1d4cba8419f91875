//! Sparse Voxel Octree container and single-voxel builder

use glam::UVec3;

use super::node::Node;
use super::palette::ColorPalette;
use crate::voxel::color;

/// Sparse Voxel Octree over a `2^depth` grid.
///
/// Nodes live in a flat, append-only array with the root at index 0. An
/// internal node's 8 children are contiguous and allocated the first time
/// anything is inserted below it; child `c` of a node is always at
/// `child_base + c` and never moves.
#[derive(Debug, Clone)]
pub struct Octree {
    /// All octree nodes (root is at index 0)
    nodes: Vec<Node>,
    /// Colors referenced by leaf payloads
    palette: ColorPalette,
    /// Grid positions of every emissive insertion, in insertion order
    emissive: Vec<UVec3>,
    /// Grid is `2^depth` cells per axis
    depth: u8,
    /// Number of `insert_voxel` calls on this instance
    insert_count: usize,
}

/// Child slot (0-7) for `pos` at bit `level`: x is the high bit, z the low bit.
/// Levels past bit 31 read as 0.
#[inline]
pub fn child_selector(pos: UVec3, level: u8) -> u32 {
    let bit = |v: u32| v.checked_shr(level as u32).unwrap_or(0) & 1;
    bit(pos.x) * 4 + bit(pos.y) * 2 + bit(pos.z)
}

impl Octree {
    /// Create a new octree holding only an empty root
    pub fn new(depth: u8) -> Self {
        Self::with_capacity(depth, 1)
    }

    /// Create octree with pre-allocated node capacity
    pub fn with_capacity(depth: u8, node_capacity: usize) -> Self {
        Self {
            nodes: {
                let mut v = Vec::with_capacity(node_capacity.max(1));
                v.push(Node::EMPTY);
                v
            },
            palette: ColorPalette::new(),
            emissive: Vec::new(),
            depth,
            insert_count: 0,
        }
    }

    /// Reconstruct an octree from stored buffers
    pub fn from_serialized(depth: u8, nodes: Vec<Node>, colors: Vec<u32>, emissive: Vec<UVec3>) -> Self {
        let nodes = if nodes.is_empty() { vec![Node::EMPTY] } else { nodes };
        Self {
            nodes,
            palette: ColorPalette::from_colors(colors),
            emissive,
            depth,
            insert_count: 0,
        }
    }

    /// Insert one voxel.
    ///
    /// `pos` must lie inside the grid; this is not checked (see
    /// [`contains`](Self::contains)). Inserting twice at the same position
    /// replaces the leaf's color, while the palette and emissive entries of
    /// the earlier insertion are kept.
    ///
    /// Descent reads bits `depth-1` down to 1, so a final leaf covers a
    /// 2x2x2 group: positions that differ only in bit 0 share a leaf.
    ///
    /// Inserting below a collapsed leaf (after [`compress`](Self::compress))
    /// first splits it into 8 leaves of the same color.
    pub fn insert_voxel(&mut self, pos: UVec3, color: u32) {
        self.insert_count += 1;

        let color_index = self.palette.get_or_insert(color);
        if color::is_emissive(color) {
            self.emissive.push(pos);
        }

        let mut node_idx = 0usize;
        for level in (1..self.depth).rev() {
            let child = child_selector(pos, level);

            let node = self.nodes[node_idx];
            let mut child_ptr = node.payload();
            if node.is_leaf() {
                child_ptr = self.nodes.len() as u32;
                self.nodes[node_idx] = Node::internal(child_ptr);
                self.nodes.extend_from_slice(&[Node::leaf(node.payload()); 8]);
            } else if child_ptr == 0 {
                // Create 8 empty children
                child_ptr = self.nodes.len() as u32;
                self.nodes[node_idx] = Node::internal(child_ptr);
                self.nodes.extend_from_slice(&[Node::EMPTY; 8]);
            }

            node_idx = (child_ptr + child) as usize;
        }

        self.nodes[node_idx] = Node::leaf(color_index);
    }

    /// Palette index stored for `pos`, following the same descent as
    /// [`insert_voxel`](Self::insert_voxel).
    ///
    /// A leaf met above the final level (a collapsed subtree) answers for
    /// every position below it. Returns `None` for empty space.
    pub fn lookup(&self, pos: UVec3) -> Option<u32> {
        let mut node_idx = 0usize;
        for level in (1..self.depth).rev() {
            let node = *self.nodes.get(node_idx)?;
            if node.is_leaf() {
                return Some(node.payload());
            }
            let base = node.child_base()?;
            node_idx = (base + child_selector(pos, level)) as usize;
        }

        let node = *self.nodes.get(node_idx)?;
        node.is_leaf().then(|| node.payload())
    }

    /// Packed color stored for `pos`
    pub fn lookup_color(&self, pos: UVec3) -> Option<u32> {
        self.lookup(pos).and_then(|index| self.palette.color(index))
    }

    /// Check whether `pos` lies inside the `2^depth` grid
    pub fn contains(&self, pos: UVec3) -> bool {
        let size = self.grid_size() as u64;
        (pos.x as u64) < size && (pos.y as u64) < size && (pos.z as u64) < size
    }

    /// Get root node
    pub fn root(&self) -> Node {
        self.nodes[0]
    }

    /// Get node by index
    pub fn node(&self, index: u32) -> Node {
        self.nodes[index as usize]
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Get all nodes as slice
    pub fn nodes_slice(&self) -> &[Node] {
        &self.nodes
    }

    /// Node words in renderer layout (for GPU upload)
    pub fn node_words(&self) -> &[u32] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// Get number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    /// Palette color words (for GPU upload)
    pub fn colors(&self) -> &[u32] {
        self.palette.as_slice()
    }

    /// Positions of emissive insertions. Not deduplicated.
    pub fn emissive_voxels(&self) -> &[UVec3] {
        &self.emissive
    }

    /// Get tree depth
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Cells per axis
    pub fn grid_size(&self) -> u32 {
        1u32.checked_shl(self.depth as u32).unwrap_or(u32::MAX)
    }

    /// Number of voxels inserted into this instance
    pub fn insert_count(&self) -> usize {
        self.insert_count
    }

    /// Calculate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Node>() * self.nodes.len()
            + std::mem::size_of::<u32>() * self.palette.len()
            + std::mem::size_of::<UVec3>() * self.emissive.len()
    }

    /// Check if octree is empty (only has empty root)
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0] == Node::EMPTY
    }
}

impl Default for Octree {
    fn default() -> Self {
        Self::new(8)
    }
}
