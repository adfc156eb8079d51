//! Error types for the rrec transformer

use thiserror::Error;

/// Source location and declaration context handed to error hooks when a
/// single declaration fails to rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub property: String,
    pub value: String,
}

impl ErrorContext {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            property: String::new(),
            value: String::new(),
        }
    }

    pub fn with_declaration(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.property = property.into();
        self.value = value.into();
        self
    }

    /// One-line rendering for log output and default error reporting
    pub fn describe(&self) -> String {
        if self.property.is_empty() {
            format!("{}:{}:{}", self.file, self.line, self.column)
        } else {
            format!(
                "{}:{}:{} ({}: {})",
                self.file, self.line, self.column, self.property, self.value
            )
        }
    }
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {file} at line {line}: {message}")]
    Parse { file: String, line: usize, message: String },

    #[error("Declaration error in {file} at line {line}: {message}")]
    Declaration { file: String, line: usize, message: String },

    #[error("Scaling error: {message}")]
    Scaling { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;

impl TransformError {
    pub fn parse(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    pub fn declaration(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Declaration {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    pub fn scaling(message: impl Into<String>) -> Self {
        Self::Scaling {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context_describe() {
        let ctx = ErrorContext::new("styles.css", 12, 5);
        assert_eq!(ctx.describe(), "styles.css:12:5");

        let ctx = ctx.with_declaration("font-size", "rre(16)");
        assert_eq!(ctx.describe(), "styles.css:12:5 (font-size: rre(16))");
    }

    #[test]
    fn test_constructor_helpers() {
        let err = TransformError::parse("a.css", 3, "unterminated block");
        assert!(matches!(err, TransformError::Parse { line: 3, .. }));

        let err = TransformError::declaration("a.css", 9, "bad value");
        assert!(err.to_string().contains("line 9"));
    }
}
