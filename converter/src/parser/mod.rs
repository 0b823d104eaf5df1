//! Parser for AFNI 3dVolreg matrix text.
//!
//! Each data line holds 12 whitespace-separated numbers: a 3x4 affine
//! flattened row-major. Blank lines and `#` comments are ignored, so both
//! raw `-1Dmatrix_save` output and annotated `.1D` files are accepted.

use crate::error::{ConversionError, ConversionResult};
use crate::models::{AffineTransform3D, ROW_LEN};

/// Comment marker, as written by AFNI in `.1D` headers.
const COMMENT_CHAR: char = '#';

/// Parse matrix text into one transform per data row.
///
/// # Example
/// ```
/// use volreg2itk::parse_matrix;
///
/// let transforms = parse_matrix("1 0 0 5 0 1 0 6 0 0 1 7").unwrap();
/// assert_eq!(transforms.len(), 1);
/// assert_eq!(transforms[0].translation, [5.0, 6.0, 7.0]);
/// ```
pub fn parse_matrix(text: &str) -> ConversionResult<Vec<AffineTransform3D>> {
    let transforms = data_lines(text)
        .enumerate()
        .map(|(row, line)| parse_row(row, line).map(|v| AffineTransform3D::from_row_major(&v)))
        .collect::<ConversionResult<Vec<_>>>()?;

    if transforms.is_empty() {
        return Err(ConversionError::EmptyInput);
    }

    Ok(transforms)
}

/// Parse one data line into its 12 values.
///
/// `row` is only used for error context.
pub fn parse_row(row: usize, line: &str) -> ConversionResult<[f64; ROW_LEN]> {
    let mut values = [0.0; ROW_LEN];
    let mut count = 0;

    for token in line.split_ascii_whitespace() {
        if count < ROW_LEN {
            values[count] = token.parse::<f64>().map_err(|_| {
                ConversionError::malformed(row, format!("'{}' is not a number", token))
            })?;
        }
        count += 1;
    }

    if count != ROW_LEN {
        return Err(ConversionError::malformed(
            row,
            format!("expected {} values, found {}", ROW_LEN, count),
        ));
    }

    Ok(values)
}

/// Iterate over lines that carry data, with comments stripped.
fn data_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| match line.find(COMMENT_CHAR) {
            Some(pos) => &line[..pos],
            None => line,
        })
        .filter(|line| !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: &str = "1 0 0 0 0 1 0 0 0 0 1 0";

    #[test]
    fn test_single_row() {
        let transforms = parse_matrix(IDENTITY).unwrap();

        assert_eq!(transforms.len(), 1);
        assert_eq!(transforms[0], AffineTransform3D::identity());
    }

    #[test]
    fn test_multiple_rows_in_order() {
        let text = "1 0 0 0.5 0 1 0 0 0 0 1 0\n1 0 0 1.5 0 1 0 0 0 0 1 0\n1 0 0 2.5 0 1 0 0 0 0 1 0\n";
        let transforms = parse_matrix(text).unwrap();

        assert_eq!(transforms.len(), 3);
        assert_eq!(transforms[0].translation[0], 0.5);
        assert_eq!(transforms[1].translation[0], 1.5);
        assert_eq!(transforms[2].translation[0], 2.5);
    }

    #[test]
    fn test_row_major_split() {
        let text = "11 12 13 14 21 22 23 24 31 32 33 34";
        let t = parse_matrix(text).unwrap()[0];

        assert_eq!(t.linear, [[11.0, 12.0, 13.0], [21.0, 22.0, 23.0], [31.0, 32.0, 33.0]]);
        assert_eq!(t.translation, [14.0, 24.0, 34.0]);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = "# 3dvolreg matrices\n#  header line\n\n1 0 0 0 0 1 0 0 0 0 1 0  # vol 0\n   \n1 0 0 0 0 1 0 0 0 0 1 3\n";
        let transforms = parse_matrix(text).unwrap();

        assert_eq!(transforms.len(), 2);
        assert_eq!(transforms[1].translation[2], 3.0);
    }

    #[test]
    fn test_tabs_and_crlf() {
        let text = "1\t0\t0\t0\t0\t1\t0\t0\t0\t0\t1\t0\r\n1 0 0 0 0 1 0 0 0 0 1 0\r\n";
        assert_eq!(parse_matrix(text).unwrap().len(), 2);
    }

    #[test]
    fn test_scientific_notation() {
        let text = "1e0 0 0 -1.2e-3 0 1 0 4E2 0 0 1 0";
        let t = parse_matrix(text).unwrap()[0];
        assert_eq!(t.translation, [-0.0012, 400.0, 0.0]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_matrix(""), Err(ConversionError::EmptyInput));
        assert_eq!(parse_matrix("\n  \n"), Err(ConversionError::EmptyInput));
        assert_eq!(parse_matrix("# only a comment\n"), Err(ConversionError::EmptyInput));
    }

    #[test]
    fn test_too_few_values() {
        let err = parse_matrix("1 0 0 0 0 1 0 0 0 0 1").unwrap_err();
        match err {
            ConversionError::MalformedInput { row, message } => {
                assert_eq!(row, 0);
                assert!(message.contains("found 11"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_too_many_values_reports_row() {
        let text = format!("{}\n{} 9", IDENTITY, IDENTITY);
        let err = parse_matrix(&text).unwrap_err();
        match err {
            ConversionError::MalformedInput { row, message } => {
                assert_eq!(row, 1);
                assert!(message.contains("found 13"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_token() {
        let err = parse_matrix("1 0 0 0 0 one 0 0 0 0 1 0").unwrap_err();
        match err {
            ConversionError::MalformedInput { message, .. } => {
                assert!(message.contains("'one'"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_tokens_parse() {
        // Rejected later, when the document is written.
        let t = parse_matrix("nan 0 0 0 0 1 0 0 0 0 1 inf").unwrap()[0];
        assert!(t.linear[0][0].is_nan());
        assert!(t.translation[2].is_infinite());
    }
}
