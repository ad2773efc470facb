//! IDF text parsing.
//!
//! The [`Reader`] is a line-oriented state machine. Objects are `,`-separated
//! token lists closed by `;`; they may span any number of lines and several
//! may share one line. `!` starts a comment that runs to the end of the line.
//!
//! ```rust
//! use idf_core::{FieldSchema, Idf, ObjectSchema, Reader, SchemaRegistry};
//! use std::sync::Arc;
//!
//! let registry: SchemaRegistry = vec![ObjectSchema::new("Zone", "Thermal Zones and Surfaces")
//!     .with_field(FieldSchema::new("Name"))
//!     .with_field(FieldSchema::new("Direction of Relative North"))]
//! .into_iter()
//! .collect();
//!
//! let text = "! Office model\n\nZone,\n    West Zone,   !- Name\n    0;           !- Direction of Relative North\n";
//! let idf = Reader::new(text).read(Arc::new(registry)).unwrap();
//!
//! assert_eq!(idf.comment_headers(), [" Office model"]);
//! assert_eq!(idf.get("zone").unwrap()[0].get("name").unwrap().to_string(), "West Zone");
//! ```
//!
//! ## Tolerated input
//!
//! - Comment lines before the first object are kept as header comments;
//!   comments anywhere else are dropped.
//! - A line that does not end in `,` or `;` once its comment is cut off is
//!   logged as malformed and skipped. A lone `,` is a blank field.
//! - Values past the last field a type can name are logged and dropped.
//! - An object still open at the end of the input is logged and dropped.
//!
//! An object type the registry does not know aborts the read with
//! [`Error::UnknownType`](crate::Error::UnknownType).

use crate::{Error, Idf, Result, SchemaRegistry};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

static DATA_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\S.*)?[,;]\s*$").expect("valid data line pattern"));

/// Banner and separator lines written by [`Writer`](crate::Writer); not kept as headers.
const GENERATED_PREFIXES: [&str; 2] = ["- Generated by idf_core", "- Validation level:"];
const SEPARATOR_MARK: &str = "ALL OBJECTS IN CLASS:";

/// Parses IDF text into an [`Idf`].
pub struct Reader<'a> {
    input: &'a str,
    in_header: bool,
    pending_type: Option<String>,
    pending_values: Vec<String>,
    object_line: usize,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Reader {
            input,
            in_header: true,
            pending_type: None,
            pending_values: Vec::new(),
            object_line: 0,
        }
    }

    /// Parses into a fresh container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for an object type the registry does not know.
    pub fn read(self, registry: Arc<SchemaRegistry>) -> Result<Idf> {
        let mut idf = Idf::new(registry);
        self.read_into(&mut idf)?;
        Ok(idf)
    }

    /// Parses into an existing container, adding header comments and records to it.
    ///
    /// On error the container holds whatever was read before the failing object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for an object type the registry does not know.
    pub fn read_into(mut self, idf: &mut Idf) -> Result<()> {
        let input = self.input;
        for (index, raw) in input.lines().enumerate() {
            let line = index + 1;
            let text = raw.trim_end();
            if text.is_empty() {
                continue;
            }

            if self.in_header {
                if let Some(comment) = text.trim_start().strip_prefix('!') {
                    if !is_generated(comment) {
                        idf.add_comment_header(comment);
                    }
                    continue;
                }
                self.in_header = false;
            }

            let content = text.split_once('!').map_or(text, |(data, _)| data);
            if content.trim().is_empty() {
                continue;
            }
            if !DATA_LINE.is_match(content) {
                let err = Error::malformed_line(line, content.trim());
                warn!(line, "{}", err);
                continue;
            }
            self.consume(content, line, idf)?;
        }

        if let Some(type_name) = self.pending_type.take() {
            warn!(
                object = %type_name,
                line = self.object_line,
                "discarding object not terminated by ';' at end of input"
            );
        }
        Ok(())
    }

    fn consume(&mut self, content: &str, line: usize, idf: &mut Idf) -> Result<()> {
        let mut statements = content.split(';').peekable();
        while let Some(statement) = statements.next() {
            let terminated = statements.peek().is_some();
            let mut tokens: Vec<&str> = statement.split(',').map(str::trim).collect();
            if tokens.last() == Some(&"") && (!terminated || tokens.len() == 1) {
                tokens.pop();
            }
            for token in tokens {
                self.push(token, line);
            }
            if terminated {
                self.complete(idf)?;
            }
        }
        Ok(())
    }

    fn push(&mut self, token: &str, line: usize) {
        if self.pending_type.is_some() {
            self.pending_values.push(token.to_string());
        } else if !token.is_empty() {
            self.pending_type = Some(token.to_string());
            self.object_line = line;
        }
    }

    fn complete(&mut self, idf: &mut Idf) -> Result<()> {
        let Some(type_name) = self.pending_type.take() else {
            return Ok(());
        };
        let values = std::mem::take(&mut self.pending_values);
        let mut record = idf.factory().create(&type_name)?;
        let dropped = record.set_values(values)?;
        if dropped > 0 {
            warn!(
                object = record.type_name(),
                line = self.object_line,
                dropped,
                "dropping values past the last field"
            );
        }
        debug!(
            object = record.type_name(),
            line = self.object_line,
            fields = record.len(),
            "read object"
        );
        idf.add(record);
        Ok(())
    }
}

fn is_generated(comment: &str) -> bool {
    GENERATED_PREFIXES
        .iter()
        .any(|prefix| comment.starts_with(prefix))
        || comment.contains(SEPARATOR_MARK)
}
