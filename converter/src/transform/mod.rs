//! Transformation module.
//!
//! This module handles AFNI matrix to ITK transform conversion:
//! - Repack: affine layout to ITK parameter order
//! - Writer: ITK transform file serialization
//! - Pipeline: file-level conversion on top of [`convert`]
//!
//! ```text
//! matrix text → parse_matrix → repack_all → write_document → ITK text
//! ```

pub mod pipeline;
pub mod repack;
pub mod writer;

pub use pipeline::*;
pub use repack::{repack, repack_all};
pub use writer::{block_lines, format_number, write_document};

use crate::error::ConversionResult;
use crate::models::TransformDocument;
use crate::parser::parse_matrix;

/// Parse and repack matrix text without rendering it.
///
/// The returned document holds only finite values.
pub fn build_document(input_text: &str) -> ConversionResult<TransformDocument> {
    let transforms = parse_matrix(input_text)?;
    let document = TransformDocument::new(repack_all(&transforms));
    document.validate()?;
    Ok(document)
}

/// Convert AFNI 3dVolreg matrix text into ITK transform file text.
///
/// Pure and deterministic: no I/O, no logging, no shared state.
///
/// # Example
/// ```
/// let itk = volreg2itk::convert("1 0 0 0 0 1 0 0 0 0 1 0").unwrap();
/// assert!(itk.contains("Parameters: 1 0 0 0 1 0 0 0 1 0 0 0"));
/// ```
pub fn convert(input_text: &str) -> ConversionResult<String> {
    write_document(&build_document(input_text)?)
}
