//! Sparse Voxel Octree node word

use bytemuck::{Pod, Zeroable};

/// Octree node - exactly one 32-bit word, uploaded to the GPU unchanged
///
/// Layout:
/// - bit 31: leaf flag (payload is a palette index)
/// - bit 30: homogeneous hint (see [`Octree::compress`](super::Octree::compress))
/// - bits 0-29: payload, either the index of the first of 8 contiguous
///   children (internal) or a color palette index (leaf)
///
/// An internal node with payload 0 has no children yet. The root always lives
/// at index 0, so no child block can start there.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Node(u32);

/// Decoded view of a [`Node`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Leaf {
        color_index: u32,
        homogeneous: bool,
    },
    Internal {
        /// Index of child 0, or `None` while unallocated
        child_base: Option<u32>,
        homogeneous: bool,
    },
}

impl Node {
    pub const LEAF_BIT: u32 = 0x8000_0000;
    pub const HOMOGENEOUS_BIT: u32 = 0x4000_0000;
    pub const PAYLOAD_MASK: u32 = 0x3FFF_FFFF;

    /// Internal node with no children
    pub const EMPTY: Node = Node(0);

    /// Wrap a raw word
    pub const fn from_raw(word: u32) -> Self {
        Self(word)
    }

    /// Leaf pointing at a palette entry
    pub const fn leaf(color_index: u32) -> Self {
        Self(Self::LEAF_BIT | (color_index & Self::PAYLOAD_MASK))
    }

    /// Leaf produced by collapsing 8 identical children
    pub const fn homogeneous_leaf(color_index: u32) -> Self {
        Self(Self::LEAF_BIT | Self::HOMOGENEOUS_BIT | (color_index & Self::PAYLOAD_MASK))
    }

    /// Internal node whose children start at `child_base`
    pub const fn internal(child_base: u32) -> Self {
        Self(child_base & Self::PAYLOAD_MASK)
    }

    /// Raw 32-bit word
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_leaf(self) -> bool {
        self.0 & Self::LEAF_BIT != 0
    }

    pub const fn is_homogeneous(self) -> bool {
        self.0 & Self::HOMOGENEOUS_BIT != 0
    }

    /// Bits 0-29, interpretation depends on [`is_leaf`](Self::is_leaf)
    pub const fn payload(self) -> u32 {
        self.0 & Self::PAYLOAD_MASK
    }

    /// First child index of an internal node, `None` for leaves and
    /// unallocated nodes
    pub const fn child_base(self) -> Option<u32> {
        if self.is_leaf() || self.payload() == 0 {
            None
        } else {
            Some(self.payload())
        }
    }

    /// Copy of this node with the homogeneous bit set, payload untouched
    pub const fn with_homogeneous(self) -> Self {
        Self(self.0 | Self::HOMOGENEOUS_BIT)
    }

    pub fn kind(self) -> NodeKind {
        if self.is_leaf() {
            NodeKind::Leaf {
                color_index: self.payload(),
                homogeneous: self.is_homogeneous(),
            }
        } else {
            NodeKind::Internal {
                child_base: self.child_base(),
                homogeneous: self.is_homogeneous(),
            }
        }
    }
}

impl From<NodeKind> for Node {
    fn from(kind: NodeKind) -> Self {
        let node = match kind {
            NodeKind::Leaf { color_index, .. } => Node::leaf(color_index),
            NodeKind::Internal { child_base, .. } => Node::internal(child_base.unwrap_or(0)),
        };
        match kind {
            NodeKind::Leaf { homogeneous: true, .. }
            | NodeKind::Internal { homogeneous: true, .. } => node.with_homogeneous(),
            _ => node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<Node>(), 4);
    }

    #[test]
    fn test_empty() {
        assert_eq!(Node::EMPTY.raw(), 0);
        assert!(!Node::EMPTY.is_leaf());
        assert_eq!(Node::EMPTY.child_base(), None);
        assert_eq!(
            Node::EMPTY.kind(),
            NodeKind::Internal { child_base: None, homogeneous: false }
        );
    }

    #[test]
    fn test_leaf_bits() {
        let node = Node::leaf(42);
        assert_eq!(node.raw(), 0x8000_002A);
        assert!(node.is_leaf());
        assert!(!node.is_homogeneous());
        assert_eq!(node.child_base(), None);

        let h = Node::homogeneous_leaf(42);
        assert_eq!(h.raw(), 0xC000_002A);
        assert_eq!(h.kind(), NodeKind::Leaf { color_index: 42, homogeneous: true });
    }

    #[test]
    fn test_internal_hint_keeps_pointer() {
        let node = Node::internal(9).with_homogeneous();
        assert_eq!(node.raw(), 0x4000_0009);
        assert_eq!(node.child_base(), Some(9));
        assert_eq!(
            node.kind(),
            NodeKind::Internal { child_base: Some(9), homogeneous: true }
        );
    }

    #[test]
    fn test_kind_conversion() {
        for node in [
            Node::EMPTY,
            Node::leaf(7),
            Node::homogeneous_leaf(Node::PAYLOAD_MASK),
            Node::internal(17),
            Node::internal(17).with_homogeneous(),
        ] {
            assert_eq!(Node::from(node.kind()), node);
        }
    }

    #[test]
    fn test_cast_to_words() {
        let nodes = [Node::internal(1), Node::leaf(3)];
        let words: &[u32] = bytemuck::cast_slice(&nodes);
        assert_eq!(words, &[1, 0x8000_0003]);
    }
}
