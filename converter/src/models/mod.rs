//! Domain models for the volreg2itk conversion pipeline.
//!
//! - [`AffineTransform3D`] - one volume's 3x4 affine, split into linear part and translation
//! - [`TransformParameterBlock`] - the ITK parameter layout of one transform
//! - [`TransformDocument`] - the ordered list of blocks written to an ITK transform file

use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, ConversionResult};

/// Number of values in one flattened 3x4 affine row.
pub const ROW_LEN: usize = 12;

/// Grid shape of a flattened row: 3 rows by 4 columns.
pub const GRID_ROWS: usize = 3;
pub const GRID_COLS: usize = 4;

/// First line of every ITK transform text file.
pub const ITK_HEADER: &str = "#Insight Transform File V1.0";

/// ITK class name for a 3D double-precision affine.
pub const ITK_AFFINE_TYPE: &str = "AffineTransform_double_3_3";

/// Center of rotation written for every transform.
pub const FIXED_PARAMETERS: [f64; 3] = [0.0, 0.0, 0.0];

// =============================================================================
// Affine Transform
// =============================================================================

/// A 3D affine transform: a 3x3 linear block plus a translation vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform3D {
    /// Rotation/scale/shear component, indexed `linear[row][col]`.
    pub linear: [[f64; 3]; 3],
    /// Translation column.
    pub translation: [f64; 3],
}

impl AffineTransform3D {
    /// Identity transform with zero translation.
    pub fn identity() -> Self {
        Self {
            linear: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }

    /// Build a transform from a row-major flattened 3x4 grid.
    ///
    /// Value `k` lands at grid cell `(k / 4, k % 4)`. Columns 0-2 form
    /// `linear`, column 3 forms `translation`.
    pub fn from_row_major(values: &[f64; ROW_LEN]) -> Self {
        let at = |row: usize, col: usize| values[row * GRID_COLS + col];

        let mut linear = [[0.0; 3]; 3];
        let mut translation = [0.0; 3];
        for row in 0..GRID_ROWS {
            for col in 0..3 {
                linear[row][col] = at(row, col);
            }
            translation[row] = at(row, 3);
        }

        Self {
            linear,
            translation,
        }
    }

    /// Flatten back into the 3x4 row-major layout the matrix file uses.
    pub fn to_row_major(&self) -> [f64; ROW_LEN] {
        let mut out = [0.0; ROW_LEN];
        for row in 0..GRID_ROWS {
            for col in 0..3 {
                out[row * GRID_COLS + col] = self.linear[row][col];
            }
            out[row * GRID_COLS + 3] = self.translation[row];
        }
        out
    }
}

impl Default for AffineTransform3D {
    fn default() -> Self {
        Self::identity()
    }
}

// =============================================================================
// Parameter Block
// =============================================================================

/// One transform in ITK parameter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformParameterBlock {
    /// Zero-based position in the input sequence. Only used as a label.
    pub index: usize,
    /// Linear block row-major, then translation.
    pub parameters: [f64; ROW_LEN],
    /// Center of rotation. Always the origin.
    pub fixed_parameters: [f64; 3],
}

// =============================================================================
// Document
// =============================================================================

/// A complete ITK multi-transform document, one block per input volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformDocument {
    /// Format header line.
    pub header: String,
    /// Blocks in input order.
    pub blocks: Vec<TransformParameterBlock>,
}

impl TransformDocument {
    /// Create a document with the standard ITK header.
    pub fn new(blocks: Vec<TransformParameterBlock>) -> Self {
        Self {
            header: ITK_HEADER.to_string(),
            blocks,
        }
    }

    pub fn blocks(&self) -> &[TransformParameterBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Reject NaN and infinite values, which ITK cannot represent.
    pub fn validate(&self) -> ConversionResult<()> {
        for block in &self.blocks {
            let mut values = block.parameters.iter().chain(block.fixed_parameters.iter());
            if let Some(&value) = values.find(|v| !v.is_finite()) {
                return Err(ConversionError::NonFiniteParameter {
                    transform: block.index,
                    value,
                });
            }
        }
        Ok(())
    }
}
