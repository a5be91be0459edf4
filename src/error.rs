use serde::Serialize;

/// Errors produced by [`crate::query::parse`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("query text is empty")]
    EmptyInput,
    #[error("query contains only stop words")]
    OnlyStopWords,
    #[error("operator '{operator}' at byte {offset} has no value")]
    MissingValue { operator: String, offset: usize },
    #[error("malformed date in range clause: {text}")]
    MalformedDate { text: String },
    #[error("no condition, aggregation, sort, pagination or index was recognized")]
    NoIntentRecognized,
}

/// Coarse error classes, used by callers that only care whether to
/// re-prompt the user or report a syntax problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Input,
    Syntax,
    Recognition,
}

impl ParseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ParseError::EmptyInput | ParseError::OnlyStopWords => ErrorCategory::Input,
            ParseError::MissingValue { .. } | ParseError::MalformedDate { .. } => {
                ErrorCategory::Syntax
            }
            ParseError::NoIntentRecognized => ErrorCategory::Recognition,
        }
    }

    /// The operator word left without a value, if that is what failed
    pub fn dangling_operator(&self) -> Option<&str> {
        match self {
            ParseError::MissingValue { operator, .. } => Some(operator),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(ParseError::EmptyInput.category(), ErrorCategory::Input);
        assert_eq!(ParseError::OnlyStopWords.category(), ErrorCategory::Input);
        assert_eq!(
            ParseError::MalformedDate { text: "2024-13-01".into() }.category(),
            ErrorCategory::Syntax
        );
        assert_eq!(ParseError::NoIntentRecognized.category(), ErrorCategory::Recognition);
    }

    #[test]
    fn test_missing_value_message() {
        let err = ParseError::MissingValue { operator: "大于".into(), offset: 6 };
        assert_eq!(err.to_string(), "operator '大于' at byte 6 has no value");
        assert_eq!(err.dangling_operator(), Some("大于"));
        assert_eq!(err.category(), ErrorCategory::Syntax);
    }
}
