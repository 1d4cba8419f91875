//! Chunked `.vox` voxel model loader
//!
//! File layout (all integers little-endian):
//!
//! ```text
//! "VOX " | version u32 | MAIN chunk
//! chunk  = id[4] | content_size u32 | children_size u32 | content | children
//! ```
//!
//! `MAIN` has no content of its own; its children are `SIZE`, `XYZI`, the
//! optional `RGBA` palette and any number of chunks this loader skips.
//! Parsing finishes before anything is inserted, so a malformed file never
//! leaves a half-built octree behind.

use std::io;
use std::path::Path;

use glam::UVec3;
use thiserror::Error;

use crate::voxel::color::{self, WHITE_LIGHT};
use crate::voxel::svo::{CompressStats, Octree};

const MAGIC: &[u8; 4] = b"VOX ";
const CHUNK_HEADER_SIZE: usize = 12;

/// Number of entries in a model palette
pub const PALETTE_SIZE: usize = 256;

/// Errors produced while reading a model file
#[derive(Debug, Error)]
pub enum VoxError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid magic bytes {0:?}, expected \"VOX \"")]
    BadMagic([u8; 4]),

    #[error("expected MAIN chunk, found {0:?}")]
    MissingMain(String),

    #[error("missing {0} chunk")]
    MissingChunk(&'static str),

    #[error("stream truncated: {needed} bytes needed at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("malformed {chunk} chunk: {reason}")]
    Malformed { chunk: &'static str, reason: String },
}

/// One `XYZI` record. `color_index` is 1-based; 0 is empty space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxRecord {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub color_index: u8,
}

/// Parsed model, still in the file's Z-up coordinates
#[derive(Clone, Debug)]
pub struct VoxModel {
    pub version: u32,
    /// Declared `SIZE` (x, y, z), before axis remapping
    pub size: UVec3,
    pub voxels: Vec<VoxRecord>,
    /// Packed colors from the `RGBA` chunk, if present
    pub palette: Option<Box<[u32; PALETTE_SIZE]>>,
}

/// Summary of a model load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Model voxels inserted (the synthesized light is not counted)
    pub inserted: usize,
    /// Voxels outside the destination grid after remapping
    pub dropped: usize,
    /// Records with color index 0
    pub skipped_empty: usize,
    /// Tight bounding box size in grid axes (x, y-up, z)
    pub extent: UVec3,
    /// Position of the synthesized light
    pub light: UVec3,
    pub compress: CompressStats,
}

struct ChunkHeader {
    id: [u8; 4],
    content_size: usize,
    children_size: usize,
}

/// Bounds-checked little-endian cursor over `data[..end]`
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, end: data.len() }
    }

    fn remaining(&self) -> usize {
        self.end - self.pos
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8], VoxError> {
        if n > self.remaining() {
            return Err(VoxError::Truncated { offset: self.pos, needed: n });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn tag(&mut self) -> Result<[u8; 4], VoxError> {
        let b = self.bytes(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    fn u32(&mut self) -> Result<u32, VoxError> {
        Ok(u32::from_le_bytes(self.tag()?))
    }

    fn skip(&mut self, n: usize) -> Result<(), VoxError> {
        self.bytes(n).map(|_| ())
    }

    /// Reader over the next `n` bytes; advances past them
    fn sub(&mut self, n: usize) -> Result<Reader<'a>, VoxError> {
        let start = self.pos;
        self.skip(n)?;
        Ok(Reader { data: self.data, pos: start, end: start + n })
    }

    fn chunk_header(&mut self) -> Result<ChunkHeader, VoxError> {
        if self.remaining() < CHUNK_HEADER_SIZE {
            return Err(VoxError::Truncated { offset: self.pos, needed: CHUNK_HEADER_SIZE });
        }
        Ok(ChunkHeader {
            id: self.tag()?,
            content_size: self.u32()? as usize,
            children_size: self.u32()? as usize,
        })
    }
}

fn tag_name(id: &[u8; 4]) -> String {
    String::from_utf8_lossy(id).into_owned()
}

/// Deterministic palette used when a file has no `RGBA` chunk.
///
/// Entries are spread over the RGB cube by index; none is emissive.
pub fn synthetic_palette() -> [u32; PALETTE_SIZE] {
    let mut palette = [0u32; PALETTE_SIZE];
    for (i, entry) in palette.iter_mut().enumerate() {
        let i = i as u32;
        let r = (i * 37 + 32) % 256;
        let g = (i * 91 + 64) % 256;
        let b = (i * 53 + 128) % 256;
        *entry = color::pack_rgb(r as u8, g as u8, b as u8);
    }
    palette
}

/// Pack an `RGBA` entry. Pure white marks a light source.
fn palette_entry(r: u8, g: u8, b: u8) -> u32 {
    let packed = color::pack_rgb(r, g, b);
    if (r, g, b) == (255, 255, 255) {
        color::with_emissive(packed, color::FULL_EMISSIVE)
    } else {
        packed
    }
}

impl VoxModel {
    /// Parse a complete file image
    pub fn parse(data: &[u8]) -> Result<Self, VoxError> {
        let mut reader = Reader::new(data);

        let magic = reader.tag()?;
        if &magic != MAGIC {
            return Err(VoxError::BadMagic(magic));
        }
        let version = reader.u32()?;

        let main = reader.chunk_header()?;
        if &main.id != b"MAIN" {
            return Err(VoxError::MissingMain(tag_name(&main.id)));
        }
        reader.skip(main.content_size)?;
        let mut body = reader.sub(main.children_size)?;

        log::debug!("vox file version {}, MAIN children: {} bytes", version, main.children_size);

        let mut size = None;
        let mut voxels = None;
        let mut palette = None;
        let mut extra_models = 0usize;

        while body.remaining() > 0 {
            let header = body.chunk_header()?;
            let mut content = body.sub(header.content_size)?;

            match &header.id {
                b"SIZE" => {
                    if size.is_some() {
                        extra_models += 1;
                    } else {
                        size = Some(Self::read_size(&mut content)?);
                    }
                }
                b"XYZI" => {
                    if voxels.is_none() {
                        voxels = Some(Self::read_voxels(&mut content)?);
                    }
                }
                b"RGBA" => {
                    if let Some(entries) = Self::read_palette(&mut content) {
                        palette = Some(entries);
                    }
                }
                other => {
                    log::debug!(
                        "Skipping {} chunk ({} + {} bytes)",
                        tag_name(other), header.content_size, header.children_size
                    );
                }
            }

            body.skip(header.children_size)?;
        }

        if extra_models > 0 {
            log::warn!("vox file holds {} additional models; only the first is loaded", extra_models);
        }

        let size = size.ok_or(VoxError::MissingChunk("SIZE"))?;
        let voxels = voxels.ok_or(VoxError::MissingChunk("XYZI"))?;

        Ok(Self { version, size, voxels, palette })
    }

    fn read_size(content: &mut Reader<'_>) -> Result<UVec3, VoxError> {
        Ok(UVec3::new(content.u32()?, content.u32()?, content.u32()?))
    }

    fn read_voxels(content: &mut Reader<'_>) -> Result<Vec<VoxRecord>, VoxError> {
        let count = content.u32()? as usize;
        let needed = count.checked_mul(4).ok_or_else(|| VoxError::Malformed {
            chunk: "XYZI",
            reason: format!("voxel count {} overflows", count),
        })?;
        let records = content.bytes(needed)?;

        Ok(records
            .chunks_exact(4)
            .map(|r| VoxRecord { x: r[0], y: r[1], z: r[2], color_index: r[3] })
            .collect())
    }

    /// Returns `None` (with a warning) for a short palette so the synthetic
    /// one is used instead
    fn read_palette(content: &mut Reader<'_>) -> Option<Box<[u32; PALETTE_SIZE]>> {
        let bytes = match content.bytes(PALETTE_SIZE * 4) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Ignoring RGBA chunk: {}", e);
                return None;
            }
        };

        let mut palette = Box::new([0u32; PALETTE_SIZE]);
        for (entry, rgba) in palette.iter_mut().zip(bytes.chunks_exact(4)) {
            *entry = palette_entry(rgba[0], rgba[1], rgba[2]);
        }
        Some(palette)
    }

    /// Tight bounds (min, max inclusive) of non-empty records
    pub fn bounds(&self) -> Option<(UVec3, UVec3)> {
        self.voxels
            .iter()
            .filter(|v| v.color_index != 0)
            .map(|v| UVec3::new(v.x as u32, v.y as u32, v.z as u32))
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((min, max)) => Some((min.min(p), max.max(p))),
            })
    }
}

impl Octree {
    /// Load a `.vox` file into this octree, then compress it.
    ///
    /// On error nothing has been inserted.
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, VoxError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        log::info!("Loading voxel model {} ({} bytes)", path.display(), data.len());
        self.load_model_bytes(&data)
    }

    /// Same as [`load_model`](Self::load_model) for an in-memory file image
    pub fn load_model_bytes(&mut self, data: &[u8]) -> Result<LoadReport, VoxError> {
        let model = VoxModel::parse(data)?;
        Ok(self.insert_model(&model))
    }

    /// Insert a parsed model.
    ///
    /// Coordinates are made relative to the model's tight bounds and turned
    /// from Z-up to Y-up: `(x, y, z) -> (x, (height - 1) - z, y)`. Voxels
    /// that land outside the grid are dropped. One white light is added above
    /// the model and the octree is compressed.
    pub fn insert_model(&mut self, model: &VoxModel) -> LoadReport {
        let fallback;
        let palette: &[u32; PALETTE_SIZE] = match &model.palette {
            Some(palette) => &**palette,
            None => {
                log::info!("vox file has no RGBA chunk, using synthetic palette");
                fallback = synthetic_palette();
                &fallback
            }
        };

        let mut report = LoadReport::default();
        let (min, max) = model.bounds().unwrap_or((UVec3::ZERO, UVec3::ZERO));
        let height = max.z - min.z + 1;

        if model.bounds().is_some() {
            let span = max - min + UVec3::ONE;
            report.extent = UVec3::new(span.x, span.z, span.y);
        }

        for voxel in &model.voxels {
            if voxel.color_index == 0 {
                report.skipped_empty += 1;
                continue;
            }

            let rel = UVec3::new(voxel.x as u32, voxel.y as u32, voxel.z as u32) - min;
            let pos = UVec3::new(rel.x, (height - 1) - rel.z, rel.y);
            if !self.contains(pos) {
                report.dropped += 1;
                continue;
            }

            let color = palette[(voxel.color_index - 1) as usize];
            self.insert_voxel(pos, color);
            report.inserted += 1;
        }

        let max_coord = self.grid_size().saturating_sub(1);
        report.light = UVec3::new(
            report.extent.x / 2,
            report.extent.y + 2,
            report.extent.z / 2,
        )
        .min(UVec3::splat(max_coord));
        self.insert_voxel(report.light, WHITE_LIGHT);

        report.compress = self.compress();

        log::info!(
            "Loaded model: {} voxels inserted, {} dropped, {} empty; extent {:?}, {} nodes, {} colors",
            report.inserted,
            report.dropped,
            report.skipped_empty,
            report.extent,
            self.node_count(),
            self.palette().len()
        );

        if report.dropped > 0 {
            log::warn!(
                "{} voxels fell outside the {}^3 grid and were dropped",
                report.dropped,
                self.grid_size()
            );
        }

        report
    }
}
