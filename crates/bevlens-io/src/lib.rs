#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access and PNG encoding/decoding failures.
pub mod error;

/// PNG image encoding and decoding.
///
/// Camera frames of any 8/16-bit PNG color type are read as RGB8; overlays are written as RGB8.
pub mod png;

pub use crate::error::IoError;
