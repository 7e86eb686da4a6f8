#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Wireframe boxes, depth-colored points and labels drawn over camera images.
pub mod annotate;

/// Placement of camera views into a single mosaic.
pub mod compositor;

/// Typed visualization settings loaded from JSON.
pub mod config;

/// Error types for the visualization crate.
pub mod error;

/// Static camera-to-slot layouts.
pub mod layout;

/// Detection samples with their camera inputs.
pub mod sample;

/// Result writers producing meshes, overlays and mosaics.
pub mod show;

/// Destinations for rendered images and scenes.
pub mod sink;

pub use crate::error::VizError;
