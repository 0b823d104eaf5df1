//! Error types for the volreg2itk conversion pipeline.
//!
//! Errors are layered the same way the code is:
//!
//! - [`ConversionError`] - pure text-to-text conversion errors
//! - [`PipelineError`] - file-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Conversion Errors
// =============================================================================

/// Errors raised while converting matrix text into an ITK transform document.
///
/// Every variant aborts the whole conversion; there is no partial output.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    /// The input holds no data rows at all.
    #[error("Input contains no matrix rows")]
    EmptyInput,

    /// A data row has the wrong token count or a non-numeric token.
    #[error("Malformed matrix row {row}: {message}")]
    MalformedInput { row: usize, message: String },

    /// A parameter of a transform is NaN or infinite.
    #[error("Transform {transform} has a non-finite parameter ({value})")]
    NonFiniteParameter { transform: usize, value: f64 },
}

impl ConversionError {
    pub(crate) fn malformed(row: usize, message: impl Into<String>) -> Self {
        ConversionError::MalformedInput {
            row,
            message: message.into(),
        }
    }
}

// =============================================================================
// Pipeline Errors
// =============================================================================

/// Errors from converting files on disk.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The matrix text could not be converted.
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Reading the input or writing the output failed.
    #[error("IO error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Several batch inputs would write the same output file.
    #[error("Output '{}' would be written by {inputs} inputs", .output.display())]
    DuplicateOutput { output: PathBuf, inputs: usize },

    /// A background conversion task panicked or was cancelled.
    #[error("Conversion task failed: {0}")]
    Task(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ConversionError> for ServerError {
    fn from(err: ConversionError) -> Self {
        ServerError::Pipeline(PipelineError::Conversion(err))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for conversion operations.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Result type for file pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let conv_err = ConversionError::EmptyInput;
        let pipeline_err: PipelineError = conv_err.into();
        assert!(pipeline_err.to_string().contains("no matrix rows"));

        let conv_err = ConversionError::malformed(3, "expected 12 values, found 11");
        let server_err: ServerError = conv_err.into();
        let msg = server_err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("found 11"));
    }

    #[test]
    fn test_non_finite_format() {
        let err = ConversionError::NonFiniteParameter {
            transform: 7,
            value: f64::NAN,
        };
        let msg = err.to_string();
        assert!(msg.contains("Transform 7"));
        assert!(msg.contains("NaN"));
    }

    #[test]
    fn test_duplicate_output_format() {
        let err = PipelineError::DuplicateOutput {
            output: PathBuf::from("/out/m_mc4d_itk.txt"),
            inputs: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("/out/m_mc4d_itk.txt"));
        assert!(msg.contains("2 inputs"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = PipelineError::io(
            "/data/motion.1D",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/data/motion.1D"));
        assert!(msg.contains("missing"));
    }
}
