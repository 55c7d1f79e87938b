//! Comment text validation

use super::ValidationError;

/// Maximum length for a comment, in characters
const MAX_COMMENT_LEN: usize = 500;

/// Validated comment body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentText(String);

impl CommentText {
    /// Create a new comment body.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 500 characters
    ///
    /// # Example
    /// ```
    /// use platerate_server::models::CommentText;
    ///
    /// assert!(CommentText::new("Great noodles").is_ok());
    /// assert!(CommentText::new("").is_err());
    /// assert!(CommentText::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "text" });
        }

        if trimmed.chars().count() > MAX_COMMENT_LEN {
            return Err(ValidationError::TooLong {
                field: "text",
                max: MAX_COMMENT_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Get the text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_text() {
        assert!(CommentText::new("Lovely patio").is_ok());
        assert!(CommentText::new("a").is_ok());
    }

    #[test]
    fn rejects_whitespace_only() {
        assert!(matches!(
            CommentText::new(" \n\t ").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn max_length_counts_characters() {
        // 500 multi-byte characters are still within the limit
        let text_500 = "麵".repeat(500);
        assert!(CommentText::new(&text_500).is_ok());

        let text_501 = "a".repeat(501);
        let err = CommentText::new(&text_501).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 500, .. }));
    }

    #[test]
    fn trims_whitespace() {
        let text = CommentText::new("  tasty  ").unwrap();
        assert_eq!(text.as_str(), "tasty");
    }
}
