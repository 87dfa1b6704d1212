use thiserror::Error;

/// Construction-time configuration errors.
///
/// The clamp passes themselves never fail: every abnormal condition they meet
/// (empty search range, exhausted text, invisible surface) is handled by policy.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("maxLines must be between 1 and 10000, got {0}")]
    InvalidMaxLines(u32),

    #[error("Font size must be at most 4096px, got {0}px")]
    FontSizeOutOfRange(f32),

    #[error("Invalid length: {0:?}")]
    InvalidLength(String),

    #[error("Length must be finite and non-negative, got {0}")]
    NonFiniteLength(f32),

    #[error("Invalid clamp options: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offending_value() {
        assert_eq!(
            FitError::InvalidMaxLines(0).to_string(),
            "maxLines must be between 1 and 10000, got 0"
        );
        assert_eq!(
            FitError::FontSizeOutOfRange(5000.0).to_string(),
            "Font size must be at most 4096px, got 5000px"
        );
        assert_eq!(
            FitError::InvalidLength("12qq".into()).to_string(),
            "Invalid length: \"12qq\""
        );
    }

    #[test]
    fn test_json_errors_convert_via_from() {
        let err: FitError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, FitError::Json(_)));
    }
}
