#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// lookup tables mapping scalars to colors.
pub mod colormap;

/// utilities to draw on images.
pub mod draw;

/// copy an image into a region of a larger one.
pub mod paste;

/// bitmap text rendering.
pub mod text;
