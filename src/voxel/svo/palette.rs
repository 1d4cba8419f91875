//! Deduplicated color table referenced by leaf nodes

use std::collections::HashMap;

/// Insertion-ordered table of unique packed color words.
///
/// Leaf payloads index into [`as_slice`](Self::as_slice). Entries are never
/// removed, so an index stays valid for the lifetime of the palette.
#[derive(Debug, Clone, Default)]
pub struct ColorPalette {
    /// Index -> color, in insertion order
    colors: Vec<u32>,
    /// Color -> index
    lookup: HashMap<u32, u32>,
}

impl ColorPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a palette from a stored color table.
    ///
    /// Duplicate words keep their first index for lookups.
    pub fn from_colors(colors: Vec<u32>) -> Self {
        let mut lookup = HashMap::with_capacity(colors.len());
        for (i, &color) in colors.iter().enumerate() {
            lookup.entry(color).or_insert(i as u32);
        }
        Self { colors, lookup }
    }

    /// Index of `color`, appending it if it has not been seen before
    pub fn get_or_insert(&mut self, color: u32) -> u32 {
        if let Some(&index) = self.lookup.get(&color) {
            return index;
        }
        let index = self.colors.len() as u32;
        self.colors.push(color);
        self.lookup.insert(color, index);
        index
    }

    pub fn index_of(&self, color: u32) -> Option<u32> {
        self.lookup.get(&color).copied()
    }

    pub fn color(&self, index: u32) -> Option<u32> {
        self.colors.get(index as usize).copied()
    }

    /// Color words for GPU upload
    pub fn as_slice(&self) -> &[u32] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
