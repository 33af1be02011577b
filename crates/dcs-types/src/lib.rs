//! Small validated value types shared by the conformance statement crates.

#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("value is blank")]
    Empty,
}

/// Text that is known to hold something other than whitespace.
///
/// Surrounding whitespace is trimmed on construction, so a version read as `" 3.6.7\n"` compares
/// equal to `"3.6.7"`. Holds the resolved toolkit version and the configuration values that
/// end up in the download URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// # Errors
    ///
    /// Returns `TextError::Empty` if nothing is left after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        match input.as_ref().trim() {
            "" => Err(TextError::Empty),
            trimmed => Ok(Self(trimmed.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_input() {
        let text = NonEmptyText::new("  3.6.7 \n").unwrap();
        assert_eq!(text.as_str(), "3.6.7");
        assert_eq!(text, NonEmptyText::new("3.6.7").unwrap());
    }

    #[test]
    fn test_new_rejects_whitespace_only() {
        assert!(matches!(NonEmptyText::new(" \t "), Err(TextError::Empty)));
        assert!(matches!(NonEmptyText::new(""), Err(TextError::Empty)));
    }

    #[test]
    fn test_display_and_into_string() {
        let text = NonEmptyText::new("dcmtk").unwrap();
        assert_eq!(text.to_string(), "dcmtk");
        assert_eq!(text.into_string(), "dcmtk");
    }
}
