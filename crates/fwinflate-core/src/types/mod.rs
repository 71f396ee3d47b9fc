//! Validated path wrappers used during extraction.
//!
//! Both types can only be built through their validating constructors, so a
//! value in hand has already passed the checks.

pub mod dest_dir;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use safe_path::SafePath;
