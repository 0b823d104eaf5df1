//! Serialize parameter blocks as an ITK transform text file.
//!
//! # Output Format
//!
//! ```text
//! #Insight Transform File V1.0
//! #Transform 0
//! Transform: AffineTransform_double_3_3
//! Parameters: 1 0 0 0 1 0 0 0 1 0 0 0
//! FixedParameters: 0 0 0
//! ```
//!
//! Lines are joined with `\n` and the last line has no terminator.

use crate::error::{ConversionError, ConversionResult};
use crate::models::{TransformDocument, TransformParameterBlock, ITK_AFFINE_TYPE};

/// Decimal exponents outside `[MIN_PLAIN_EXP, MAX_PLAIN_EXP)` switch to scientific notation.
const MIN_PLAIN_EXP: i32 = -4;
const MAX_PLAIN_EXP: i32 = 16;

/// Render a whole document.
///
/// Fails with [`ConversionError::NonFiniteParameter`] if any value is NaN
/// or infinite, since ITK has no spelling for those.
pub fn write_document(document: &TransformDocument) -> ConversionResult<String> {
    let mut lines = Vec::with_capacity(1 + document.len() * 4);
    lines.push(document.header.clone());

    for block in document.blocks() {
        lines.extend(block_lines(block)?);
    }

    Ok(lines.join("\n"))
}

/// The four lines describing one transform.
pub fn block_lines(block: &TransformParameterBlock) -> ConversionResult<[String; 4]> {
    Ok([
        format!("#Transform {}", block.index),
        format!("Transform: {}", ITK_AFFINE_TYPE),
        format!("Parameters: {}", join_values(block.index, &block.parameters)?),
        format!(
            "FixedParameters: {}",
            join_values(block.index, &block.fixed_parameters)?
        ),
    ])
}

fn join_values(transform: usize, values: &[f64]) -> ConversionResult<String> {
    let formatted = values
        .iter()
        .map(|&value| {
            format_number(value)
                .ok_or(ConversionError::NonFiniteParameter { transform, value })
        })
        .collect::<ConversionResult<Vec<_>>>()?;
    Ok(formatted.join(" "))
}

/// Format a double in compact general style.
///
/// Uses the shortest digit string that parses back to the same value.
/// Large and tiny magnitudes get a C-style exponent (`1e+16`, `2.5e-07`).
/// Returns `None` for NaN and infinities.
pub fn format_number(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    // `{:e}` yields shortest round-trip digits, e.g. "1.5e-7" or "-2e16".
    let sci = format!("{:e}", value);
    let (mantissa, exponent) = sci.split_once('e')?;
    let exponent: i32 = exponent.parse().ok()?;

    if value == 0.0 || (MIN_PLAIN_EXP..MAX_PLAIN_EXP).contains(&exponent) {
        return Some(format!("{}", value));
    }

    let sign = if exponent < 0 { '-' } else { '+' };
    Some(format!("{}e{}{:02}", mantissa, sign, exponent.abs()))
}
