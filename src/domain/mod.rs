//! Pure domain types with minimal dependencies
//!
//! Types here have no dependency on the image codecs or analyzers.

pub mod geometry;

pub use geometry::*;
