//! On-disk cache of built indices

pub mod disk_io;

pub use disk_io::{SvoData, load_svo, save_svo};
