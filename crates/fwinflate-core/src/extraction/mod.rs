//! Extraction strategies layered over the zip decoder.

pub mod atomic;

pub use atomic::extract_staged;
