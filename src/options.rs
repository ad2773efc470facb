//! Configuration options for IDF output.
//!
//! - [`IdfOptions`]: layout and validation settings for the writer
//! - [`ValidationLevel`]: how record-level field checks are handled on save
//!
//! ## Examples
//!
//! ```rust
//! use idf_core::{IdfOptions, ValidationLevel};
//!
//! let options = IdfOptions::new()
//!     .with_comment_column(40)
//!     .with_validation_level(ValidationLevel::Warn);
//! assert_eq!(options.indent, 4);
//! ```

use chrono::{DateTime, Utc};
use std::fmt;

/// How record-level field checks are treated when saving.
///
/// Object-level checks (required and unique objects) are controlled by the
/// `check` argument of [`Idf::save`](crate::Idf::save) instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ValidationLevel {
    /// Field values are written as they are.
    NoCheck,
    /// Invalid field values are logged and written anyway.
    Warn,
    /// The first invalid field value aborts the save.
    #[default]
    Error,
}

impl ValidationLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::NoCheck => "no",
            ValidationLevel::Warn => "warn",
            ValidationLevel::Error => "error",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration options for IDF serialization.
///
/// # Examples
///
/// ```rust
/// use idf_core::IdfOptions;
/// use chrono::{TimeZone, Utc};
///
/// let options = IdfOptions::new()
///     .with_indent(2)
///     .with_generated_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
/// assert_eq!(options.indent, 2);
/// assert!(options.generated_at.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct IdfOptions {
    /// Spaces in front of every field line.
    pub indent: usize,
    /// Column the inline `!-` comments are aligned to.
    pub comment_column: usize,
    pub validation_level: ValidationLevel,
    /// Timestamp for the banner line; `None` stamps the time of writing.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for IdfOptions {
    fn default() -> Self {
        IdfOptions {
            indent: 4,
            comment_column: 30,
            validation_level: ValidationLevel::default(),
            generated_at: None,
        }
    }
}

impl IdfOptions {
    /// Creates default options (4-space indent, comments at column 30, strict validation).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use idf_core::{IdfOptions, ValidationLevel};
    ///
    /// let options = IdfOptions::new();
    /// assert_eq!(options.comment_column, 30);
    /// assert_eq!(options.validation_level, ValidationLevel::Error);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the column the inline field comments start at.
    ///
    /// Lines too long to reach the column still get two spaces before the comment.
    #[must_use]
    pub fn with_comment_column(mut self, column: usize) -> Self {
        self.comment_column = column;
        self
    }

    #[must_use]
    pub fn with_validation_level(mut self, level: ValidationLevel) -> Self {
        self.validation_level = level;
        self
    }

    /// Pins the banner timestamp, which makes output reproducible.
    #[must_use]
    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }
}
