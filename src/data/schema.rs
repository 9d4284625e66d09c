//! Feature schema guard

use crate::{Error, Result};

/// Columns of the prediction log that are never model features
pub const RESERVED_LOG_COLUMNS: [&str; 2] = ["timestamp", "prediction"];

/// Require `window` to expose exactly the `reference` feature set
///
/// Order does not matter; membership does. A mismatch in either direction is a
/// hard error listing both sides of the difference.
pub fn check_schema(reference: &[String], window: &[String]) -> Result<()> {
    let missing: Vec<String> = reference.iter().filter(|c| !window.contains(c)).cloned().collect();
    let unexpected: Vec<String> =
        window.iter().filter(|c| !reference.contains(c)).cloned().collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(Error::SchemaMismatch { missing, unexpected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_same_set_any_order() {
        assert!(check_schema(&cols(&["age", "rm"]), &cols(&["rm", "age"])).is_ok());
    }

    #[test]
    fn test_missing_column() {
        match check_schema(&cols(&["age", "rm"]), &cols(&["rm"])) {
            Err(Error::SchemaMismatch { missing, unexpected }) => {
                assert_eq!(missing, cols(&["age"]));
                assert!(unexpected.is_empty());
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_column() {
        match check_schema(&cols(&["rm"]), &cols(&["rm", "zip"])) {
            Err(Error::SchemaMismatch { missing, unexpected }) => {
                assert!(missing.is_empty());
                assert_eq!(unexpected, cols(&["zip"]));
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }
}
