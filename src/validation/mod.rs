//! Validation utilities for target digests and input lines

pub mod line;
pub mod target;

pub use line::is_valid_csv_line;
pub use target::{is_hex, is_valid_hash, normalize_hash};
