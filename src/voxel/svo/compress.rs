//! Post-build homogeneous node compression

use super::node::Node;
use super::octree::Octree;

/// Counts reported by [`Octree::compress`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompressStats {
    /// Internal nodes rewritten as homogeneous leaves
    pub collapsed: usize,
    /// Internal nodes that only received the homogeneous hint
    pub hinted: usize,
}

impl Octree {
    /// Collapse internal nodes whose 8 children are identical leaves.
    ///
    /// Runs once, after all insertions. Nodes are visited from the highest
    /// index down, so a block collapsed into a leaf can in turn make its
    /// parent collapsible. For each internal node with allocated children
    /// whose first child is a leaf:
    /// - all 8 child words equal: the node becomes
    ///   `LEAF | HOMOGENEOUS | color` and its children are left in place,
    ///   unreachable;
    /// - otherwise the homogeneous bit is set and the child pointer kept.
    ///
    /// On internal nodes the bit only records that child 0 was a leaf. It does
    /// not mean the subtree is uniform, and traversal must not skip on it.
    ///
    /// The node array is never resized or reordered.
    pub fn compress(&mut self) -> CompressStats {
        let mut stats = CompressStats::default();
        let nodes = self.nodes_mut();
        let len = nodes.len();

        for i in (0..len).rev() {
            let node = nodes[i];
            if node.is_leaf() {
                continue;
            }

            let base = node.payload() as usize;
            if base == 0 || base + 8 > len {
                continue;
            }

            let first = nodes[base];
            if !first.is_leaf() {
                continue;
            }

            if nodes[base..base + 8].iter().all(|&child| child == first) {
                nodes[i] = Node::homogeneous_leaf(first.payload());
                stats.collapsed += 1;
            } else {
                nodes[i] = node.with_homogeneous();
                stats.hinted += 1;
            }
        }

        log::debug!(
            "Compressed octree: {} nodes collapsed, {} hinted ({} nodes total)",
            stats.collapsed, stats.hinted, len
        );

        stats
    }
}
