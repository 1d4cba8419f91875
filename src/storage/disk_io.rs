//! Octree index serialization and disk I/O
//!
//! A built index is stored as an rkyv archive of its raw buffers, LZ4
//! compressed with the uncompressed size prepended.

use std::io;
use std::path::Path;

use glam::UVec3;
use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize};

use crate::voxel::svo::{Node, Octree};

/// Current version of the index cache format
pub const SVO_DATA_VERSION: u32 = 1;

/// File extension for index cache files
pub const SVO_FILE_EXTENSION: &str = "svoc";

/// Serializable octree buffers
#[derive(Archive, Deserialize, Serialize)]
pub struct SvoData {
    /// Format version for compatibility
    pub version: u32,
    pub depth: u8,
    /// Node words, root first
    pub nodes: Vec<u32>,
    /// Palette colors in index order
    pub colors: Vec<u32>,
    /// Emissive voxel positions
    pub emissive: Vec<[u32; 3]>,
}

impl SvoData {
    pub fn from_octree(octree: &Octree) -> Self {
        Self {
            version: SVO_DATA_VERSION,
            depth: octree.depth(),
            nodes: octree.node_words().to_vec(),
            colors: octree.colors().to_vec(),
            emissive: octree.emissive_voxels().iter().map(|p| p.to_array()).collect(),
        }
    }

    pub fn into_octree(self) -> Octree {
        Octree::from_serialized(
            self.depth,
            self.nodes.into_iter().map(Node::from_raw).collect(),
            self.colors,
            self.emissive.into_iter().map(UVec3::from_array).collect(),
        )
    }
}

/// Serialize an octree to bytes (uncompressed)
pub fn serialize_svo(octree: &Octree) -> Result<Vec<u8>, io::Error> {
    let data = SvoData::from_octree(octree);

    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    Ok(bytes.to_vec())
}

/// Deserialize an octree from bytes (uncompressed)
pub fn deserialize_svo(data: &[u8]) -> Result<Octree, io::Error> {
    // Archives must be read from aligned memory
    let mut aligned = AlignedVec::<16>::with_capacity(data.len());
    aligned.extend_from_slice(data);

    let archived = rkyv::access::<ArchivedSvoData, rkyv::rancor::Error>(&aligned)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    let svo_data: SvoData = rkyv::deserialize::<SvoData, rkyv::rancor::Error>(archived)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    if svo_data.version != SVO_DATA_VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Unsupported index version: {}", svo_data.version),
        ));
    }

    Ok(svo_data.into_octree())
}

/// Compress a serialized octree using LZ4
pub fn compress_svo(octree: &Octree) -> Result<Vec<u8>, io::Error> {
    let serialized = serialize_svo(octree)?;
    Ok(lz4_flex::compress_prepend_size(&serialized))
}

/// Decompress and deserialize an octree
pub fn decompress_svo(data: &[u8]) -> Result<Octree, io::Error> {
    let decompressed = lz4_flex::decompress_size_prepended(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("LZ4 decompression failed: {}", e)))?;
    deserialize_svo(&decompressed)
}

/// Save an octree to disk (compressed)
pub async fn save_svo(path: &Path, octree: &Octree) -> Result<(), io::Error> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let compressed = compress_svo(octree)?;
    tokio::fs::write(path, &compressed).await?;

    log::info!("Saved index to {} ({} bytes)", path.display(), compressed.len());
    Ok(())
}

/// Load an octree from disk (if it exists)
pub async fn load_svo(path: &Path) -> Result<Option<Octree>, io::Error> {
    if !path.exists() {
        return Ok(None);
    }

    let compressed = tokio::fs::read(path).await?;
    let octree = decompress_svo(&compressed)?;

    Ok(Some(octree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::color::{pack_rgb, WHITE_LIGHT};
    use crate::voxel::test_scene::generate_test_scene;

    fn sample_octree() -> Octree {
        let mut octree = Octree::new(8);
        generate_test_scene(&mut octree);
        octree.compress();
        octree
    }

    #[test]
    fn test_serialize_roundtrip() {
        let octree = sample_octree();
        let bytes = serialize_svo(&octree).expect("serialization failed");
        let restored = deserialize_svo(&bytes).expect("deserialization failed");

        assert_eq!(restored.depth(), octree.depth());
        assert_eq!(restored.node_words(), octree.node_words());
        assert_eq!(restored.colors(), octree.colors());
        assert_eq!(restored.emissive_voxels(), octree.emissive_voxels());
        assert_eq!(restored.palette().index_of(pack_rgb(0, 255, 0)), octree.palette().index_of(pack_rgb(0, 255, 0)));
    }

    #[test]
    fn test_compression() {
        let octree = sample_octree();
        let uncompressed = serialize_svo(&octree).expect("serialization failed");
        let compressed = compress_svo(&octree).expect("compression failed");

        println!(
            "Compression: {} bytes -> {} bytes ({:.1}% reduction)",
            uncompressed.len(),
            compressed.len(),
            100.0 * (1.0 - compressed.len() as f64 / uncompressed.len() as f64)
        );

        // Mostly-empty node blocks compress well
        assert!(compressed.len() < uncompressed.len());

        let restored = decompress_svo(&compressed).expect("decompression failed");
        assert_eq!(restored.node_words(), octree.node_words());
    }

    #[test]
    fn test_version_mismatch() {
        let mut data = SvoData::from_octree(&Octree::new(3));
        data.version = SVO_DATA_VERSION + 1;
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data).unwrap();

        let err = deserialize_svo(&bytes).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decompress_svo(&[1, 2, 3]).is_err());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenes").join(format!("test.{}", SVO_FILE_EXTENSION));

        let mut octree = Octree::new(4);
        octree.insert_voxel(UVec3::new(3, 3, 3), WHITE_LIGHT);

        save_svo(&path, &octree).await.expect("save failed");
        let loaded = load_svo(&path)
            .await
            .expect("load failed")
            .expect("index not found");

        assert_eq!(loaded.node_words(), octree.node_words());
        assert_eq!(loaded.emissive_voxels(), &[UVec3::new(3, 3, 3)]);
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_svo(&dir.path().join("missing.svoc")).await.expect("load should not error");
        assert!(result.is_none());
    }
}
