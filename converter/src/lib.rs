//! # volreg2itk - AFNI 3dVolreg matrices to ITK transform files
//!
//! Converts the per-volume affine matrices saved by AFNI's `3dvolreg`
//! (`-1Dmatrix_save`) into an ITK multi-transform text file that ANTs and
//! other ITK-based tools can apply.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  .1D matrix │────▶│   Parser    │────▶│   Repack    │────▶│  ITK text   │
//! │ (12 / row)  │     │  (3x4 grid) │     │ (ITK order) │     │  (writer)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! let itk = volreg2itk::convert("1 0 0 0 0 1 0 0 0 0 1 0").unwrap();
//! assert!(itk.starts_with("#Insight Transform File V1.0"));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Affine, parameter block and document types
//! - [`parser`] - Matrix text parsing
//! - [`transform`] - Repacking, writing, and the file pipeline
//! - [`config`] - Environment-driven settings
//! - [`api`] - HTTP API server and log stream

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Settings
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ConversionError,
    ConversionResult,
    PipelineError,
    PipelineResult,
    ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AffineTransform3D,
    TransformDocument,
    TransformParameterBlock,
    ITK_HEADER,
};

// =============================================================================
// Re-exports - Conversion
// =============================================================================

pub use parser::{parse_matrix, parse_row};

pub use transform::{
    build_document,
    convert,
    format_number,
    repack,
    repack_all,
    write_document,
};

// =============================================================================
// Re-exports - File pipeline
// =============================================================================

pub use transform::pipeline::{
    convert_batch,
    convert_file,
    output_path_for,
    ConvertOptions,
    ConvertedFile,
};

pub use config::ConverterConfig;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
