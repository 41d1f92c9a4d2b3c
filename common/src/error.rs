//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate hierarchical_structure: {0}")]
    DuplicateKey(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("No tables selected")]
    NoTablesSelected,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_display_duplicate_key() {
        let error = Error::DuplicateKey("/1/2".to_string());
        assert_eq!(format!("{}", error), "Duplicate hierarchical_structure: /1/2");
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_display_edit() {
        assert_eq!(format!("{}", Error::MissingField("new_role")), "Missing field: new_role");
        assert_eq!(format!("{}", Error::NoTablesSelected), "No tables selected");
    }

    #[test]
    fn test_error_debug() {
        let error = Error::InvalidDate("2024-13-40".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("InvalidDate"));
        assert!(debug.contains("2024-13-40"));
    }
}
