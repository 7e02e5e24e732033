//! Layer grouping and the per-layer line document

pub mod document;
pub mod index;

pub use document::{round4, LayerDocument, LayerRecord};
pub use index::LayerIndex;
