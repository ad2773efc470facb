//! # idf_core
//!
//! A schema-driven reader, writer and object container for EnergyPlus IDF
//! input files.
//!
//! ## What is IDF?
//!
//! IDF is the plain-text input format of the EnergyPlus building energy
//! simulation engine. A file is a sequence of typed data objects; each object
//! is its type name followed by its field values, separated by `,` and
//! terminated by `;`. Everything after a `!` is a comment:
//!
//! ```text
//! Material,
//!     Concrete,                !- Name
//!     Rough,                   !- Roughness
//!     0.2;                     !- Thickness
//! ```
//!
//! ## Key Features
//!
//! - **Schema-driven**: object types, their categories, fields and layout come
//!   from a [`SchemaRegistry`], typically deserialized from the EnergyPlus data
//!   dictionary
//! - **Ordered container**: [`Idf`] keeps records by category and type in the
//!   order they were first seen, and enforces required and unique object types
//! - **Tolerant reader**: malformed lines are logged and skipped; only an
//!   unknown object type aborts a read
//! - **Faithful writer**: per-type layouts (`vertices`, `compactschedule`, ...)
//!   with field-name comments, and positions that survive a re-read
//!
//! ## Quick Start
//!
//! ```rust
//! use idf_core::{from_str, to_string, FieldSchema, ObjectSchema, SchemaRegistry};
//! use std::sync::Arc;
//!
//! let registry: SchemaRegistry = vec![
//!     ObjectSchema::new("Material", "Surface Construction Elements")
//!         .with_field(FieldSchema::new("Name"))
//!         .with_field(FieldSchema::new("Roughness"))
//!         .with_field(FieldSchema::new("Thickness")),
//! ]
//! .into_iter()
//! .collect();
//! let registry = Arc::new(registry);
//!
//! let idf = from_str("Material,\n  Concrete, Rough, 0.2;\n", Arc::clone(&registry)).unwrap();
//! let material = &idf.get("MATERIAL").unwrap()[0];
//! assert_eq!(material.get("thickness").unwrap().to_string(), "0.2");
//!
//! // Write it out and read it back
//! let text = to_string(&idf);
//! assert!(text.contains("!- Roughness"));
//! let again = from_str(&text, registry).unwrap();
//! assert_eq!(again.get("material").unwrap(), idf.get("material").unwrap());
//! ```
//!
//! ### Loading a registry
//!
//! Schemas deserialize from the generator's JSON keys:
//!
//! ```rust
//! use idf_core::SchemaRegistry;
//!
//! let registry: SchemaRegistry = serde_json::from_str(r#"[
//!     {"name": "Timestep", "group": "Simulation Parameters", "unique-object": true,
//!      "fields": {"number of timesteps per hour": {"name": "Number of Timesteps per Hour",
//!                                                  "type": "integer", "minimum": 1}}}
//! ]"#).unwrap();
//! assert!(registry.lookup("timestep").unwrap().unique_object);
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`]: skipped lines, dropped values and
//! discarded objects at `warn`, completed objects and saves at `debug`. It
//! installs no subscriber.

pub mod error;
pub mod factory;
pub mod idf;
pub mod options;
pub mod reader;
pub mod record;
pub mod schema;
pub mod value;
pub mod writer;

pub use error::{Error, Result};
pub use factory::Factory;
pub use idf::Idf;
pub use options::{IdfOptions, ValidationLevel};
pub use reader::Reader;
pub use record::{FieldEntry, Record};
pub use schema::{FieldSchema, FieldType, Format, ObjectConstraints, ObjectSchema, SchemaRegistry};
pub use value::Value;
pub use writer::Writer;

use std::io;
use std::path::Path;
use std::sync::Arc;

/// Render an [`Idf`] as IDF text with default options.
#[must_use]
pub fn to_string(idf: &Idf) -> String {
    to_string_with_options(idf, IdfOptions::default())
}

/// Render an [`Idf`] as IDF text with custom options.
///
/// # Examples
///
/// ```rust
/// use idf_core::{to_string_with_options, Idf, IdfOptions, SchemaRegistry, ValidationLevel};
/// use chrono::{TimeZone, Utc};
/// use std::sync::Arc;
///
/// let idf = Idf::new(Arc::new(SchemaRegistry::new()));
/// let options = IdfOptions::new()
///     .with_validation_level(ValidationLevel::Warn)
///     .with_generated_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
///
/// let text = to_string_with_options(&idf, options);
/// assert_eq!(
///     text,
///     "!- Generated by idf_core 0.1.0 on 2024-01-01T00:00:00+00:00\n!- Validation level: warn\n\n"
/// );
/// ```
#[must_use]
pub fn to_string_with_options(idf: &Idf, options: IdfOptions) -> String {
    Writer::new(options).write(idf)
}

/// Write an [`Idf`] as IDF text to a writer.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(writer: W, idf: &Idf) -> Result<()>
where
    W: io::Write,
{
    to_writer_with_options(writer, idf, IdfOptions::default())
}

/// Write an [`Idf`] as IDF text to a writer with custom options.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W>(mut writer: W, idf: &Idf, options: IdfOptions) -> Result<()>
where
    W: io::Write,
{
    let text = to_string_with_options(idf, options);
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Parse IDF text into a new [`Idf`].
///
/// # Errors
///
/// Returns [`Error::UnknownType`] if the text contains an object type the
/// registry does not know.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(text: &str, registry: Arc<SchemaRegistry>) -> Result<Idf> {
    Reader::new(text).read(registry)
}

/// Parse IDF text from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use idf_core::{from_reader, ObjectSchema, SchemaRegistry};
/// use std::io::Cursor;
/// use std::sync::Arc;
///
/// let registry: SchemaRegistry = vec![ObjectSchema::new("Output:Surfaces:Drawing", "Output Reporting")]
///     .into_iter()
///     .collect();
/// let idf = from_reader(Cursor::new(b"Output:Surfaces:Drawing;\n"), Arc::new(registry)).unwrap();
/// assert_eq!(idf.len(), 1);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the text contains an unknown object type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R, registry: Arc<SchemaRegistry>) -> Result<Idf>
where
    R: io::Read,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string, registry)
}

/// Parse IDF text from bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or contain an unknown object type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(bytes: &[u8], registry: Arc<SchemaRegistry>) -> Result<Idf> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::custom(e.to_string()))?;
    from_str(text, registry)
}

/// Read and parse an IDF file. Same as [`Idf::from_path`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains an unknown object type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_path<P: AsRef<Path>>(path: P, registry: Arc<SchemaRegistry>) -> Result<Idf> {
    Idf::from_path(registry, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<SchemaRegistry> {
        Arc::new(
            vec![
                ObjectSchema::new("Version", "Simulation Parameters")
                    .with_format(Format::SingleLine)
                    .unique()
                    .with_field(FieldSchema::new("Version Identifier")),
                ObjectSchema::new("Zone", "Thermal Zones and Surfaces")
                    .with_field(FieldSchema::new("Name"))
                    .with_field(FieldSchema::new("Direction of Relative North"))
                    .with_field(FieldSchema::new("X Origin")),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn test_roundtrip_through_text() {
        let text = "Version,9.2;\nZone,Z1,,5;\nZone,Z2;\n";
        let idf = from_str(text, registry()).unwrap();
        let written = to_string(&idf);
        println!("{}", written);

        let idf_back = from_str(&written, registry()).unwrap();
        let before: Vec<&Record> = idf.iter().collect();
        let after: Vec<&Record> = idf_back.iter().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_gap_written_as_empty_value() {
        let idf = from_str("Zone,Z1,,5;\n", registry()).unwrap();
        let written = to_string(&idf);
        assert!(written.contains("    Z1,"));
        assert!(written.contains("    ,                       !- Direction of Relative North"));
        assert!(written.contains("    5;"));
    }

    #[test]
    fn test_singleline_record() {
        let idf = from_str("Version,\n  9.2;\n", registry()).unwrap();
        assert!(to_string(&idf).contains("\nVersion,9.2;\n"));
    }

    #[test]
    fn test_to_writer_and_from_reader() {
        let idf = from_str("Zone,Z1;\n", registry()).unwrap();
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &idf).unwrap();
        let idf_back = from_reader(buffer.as_slice(), registry()).unwrap();
        assert_eq!(idf_back.get("zone").unwrap(), idf.get("zone").unwrap());

        let idf_back = from_slice(&buffer, registry()).unwrap();
        assert_eq!(idf_back.len(), 1);
    }

    #[test]
    fn test_from_slice_rejects_invalid_utf8() {
        let result = from_slice(&[0x5a, 0xff, 0x3b], registry());
        assert!(matches!(result, Err(Error::Custom(_))));
    }
}
