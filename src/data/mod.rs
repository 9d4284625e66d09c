//! Tabular inputs of the control loop
//!
//! - [`ReferenceDataset`]: the labeled table the first model was trained on
//! - [`FeatureSnapshot`]: a bounded window of served feature vectors
//! - [`FeatureTable`]: the rectangular numeric table both are built on
//!
//! Missing values are represented as `f64::NAN` throughout.

mod reference;
mod schema;
mod snapshot;
mod table;

pub use reference::ReferenceDataset;
pub use schema::{check_schema, RESERVED_LOG_COLUMNS};
pub use snapshot::FeatureSnapshot;
pub use table::FeatureTable;

/// Parse a single CSV cell; empty cells become NaN
pub(crate) fn parse_cell(raw: &str, column: &str, row: usize) -> crate::Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| {
        crate::Error::InvalidData(format!(
            "non-numeric value '{trimmed}' in column '{column}' at row {row}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_number() {
        assert_eq!(parse_cell(" 4.5 ", "rm", 0).unwrap(), 4.5);
    }

    #[test]
    fn test_parse_cell_empty_is_nan() {
        assert!(parse_cell("", "rm", 0).unwrap().is_nan());
        assert!(parse_cell("NaN", "rm", 0).unwrap().is_nan());
    }

    #[test]
    fn test_parse_cell_rejects_text() {
        let err = parse_cell("abc", "rm", 3).unwrap_err();
        assert!(err.to_string().contains("'rm'"));
        assert!(err.to_string().contains("row 3"));
    }
}
