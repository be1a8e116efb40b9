//! Rendering module for serializing export documents.

mod pdf;

pub use pdf::{to_pdf, EMBED_DPI};
