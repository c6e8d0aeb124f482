//! Texture codec adapters
//!
//! Persistence delegates entirely to external codecs; the renderer only
//! sees `CubeImage` and `CubeMetadata`.

pub mod dds;
pub use dds::{load_dds, save_dds};
