pub mod config;
pub mod error;
pub mod health;

pub use config::*;
pub use error::*;
pub use health::*;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[test]
    fn test_error_shape_serde() {
        let error = ErrorShape {
            error: "not_found".to_string(),
            message: "The requested resource was not found.".to_string(),
        };

        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(
            json,
            r#"{"error":"not_found","message":"The requested resource was not found."}"#
        );
        let deserialized: ErrorShape = serde_json::from_str(&json).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_error_shape_deny_unknown_fields() {
        let json = r#"{"error":"x","message":"y","stack_trace":[]}"#;
        let result: Result<ErrorShape, _> = serde_json::from_str(json);
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }
}
