//! Repack parsed affines into ITK parameter order.
//!
//! ITK's `AffineTransform` stores its 12 parameters as the 3x3 matrix
//! row-major followed by the translation vector:
//!
//! ```text
//! AFNI row (3x4 row-major)            ITK parameters
//! a0  a1  a2  | a3                    a0 a1 a2 a4 a5 a6 a8 a9 a10 | a3 a7 a11
//! a4  a5  a6  | a7          →
//! a8  a9  a10 | a11
//! ```

use crate::models::{AffineTransform3D, TransformParameterBlock, FIXED_PARAMETERS, ROW_LEN};

/// Convert one affine into its ITK parameter block.
pub fn repack(transform: &AffineTransform3D, index: usize) -> TransformParameterBlock {
    let mut parameters = [0.0; ROW_LEN];

    for (row, values) in transform.linear.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            parameters[row * 3 + col] = *value;
        }
    }
    parameters[9..].copy_from_slice(&transform.translation);

    TransformParameterBlock {
        index,
        parameters,
        fixed_parameters: FIXED_PARAMETERS,
    }
}

/// Repack a whole sequence, numbering blocks from zero in input order.
pub fn repack_all(transforms: &[AffineTransform3D]) -> Vec<TransformParameterBlock> {
    transforms
        .iter()
        .enumerate()
        .map(|(index, t)| repack(t, index))
        .collect()
}
