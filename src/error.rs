//! Error types for reading, validating and writing IDF data.
//!
//! ## Error Categories
//!
//! - **Lookup errors**: a type name the schema registry does not know
//! - **Container invariants**: missing required objects, duplicated unique objects
//! - **Field errors**: unknown field names and values that fail their field schema
//! - **I/O errors**: file reading/writing failures
//!
//! Malformed input lines are not fatal. The reader builds an
//! [`Error::MalformedLine`] only to log it and moves on to the next line.
//!
//! ## Examples
//!
//! ```rust
//! use idf_core::Error;
//!
//! let err = Error::unknown_type("NotAType");
//! assert!(err.to_string().contains("NotAType"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by the IDF reader, container and writer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The schema registry has no entry for this type name
    #[error("Unknown object type: {name}")]
    UnknownType { name: String },

    /// A line that does not end in a field separator or terminator
    #[error("Malformed line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },

    /// A required object type has no records
    #[error("Required object is missing: {object}")]
    MissingRequiredObject { object: String },

    /// A unique object type has more than one record
    #[error("Object {object} must be unique but {count} records exist")]
    NotUnique { object: String, count: usize },

    /// The object schema has no field with this name
    #[error("Object {object} has no field named {field:?}")]
    UnknownField { object: String, field: String },

    /// A field value that does not satisfy its field schema
    #[error("Invalid value for field {field:?} of {object}: {msg}")]
    InvalidValue {
        object: String,
        field: String,
        msg: String,
    },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an unknown type error for a name the registry cannot resolve.
    pub fn unknown_type(name: &str) -> Self {
        Error::UnknownType {
            name: name.to_string(),
        }
    }

    /// Creates a malformed line error. The reader only logs these.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use idf_core::Error;
    ///
    /// let err = Error::malformed_line(12, "Material");
    /// assert!(err.to_string().contains("line 12"));
    /// ```
    pub fn malformed_line(line: usize, content: &str) -> Self {
        Error::MalformedLine {
            line,
            content: content.to_string(),
        }
    }

    pub fn missing_required_object(object: &str) -> Self {
        Error::MissingRequiredObject {
            object: object.to_string(),
        }
    }

    pub fn not_unique(object: &str, count: usize) -> Self {
        Error::NotUnique {
            object: object.to_string(),
            count,
        }
    }

    pub fn unknown_field(object: &str, field: &str) -> Self {
        Error::UnknownField {
            object: object.to_string(),
            field: field.to_string(),
        }
    }

    /// Creates an invalid value error for a field that fails its schema.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use idf_core::Error;
    ///
    /// let err = Error::invalid_value("Material", "Thickness", "value 0 must be > 0");
    /// assert!(err.to_string().contains("Thickness"));
    /// ```
    pub fn invalid_value(object: &str, field: &str, msg: &str) -> Self {
        Error::InvalidValue {
            object: object.to_string(),
            field: field.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
