//! Archive decoding and the filesystem writers it feeds.

pub mod common;
pub mod zip;

pub use zip::ZipArchive;
