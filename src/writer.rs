//! IDF text output.
//!
//! The [`Writer`] renders an [`Idf`] as a banner, the preserved header
//! comments, then every category under a separator comment. Each record is
//! laid out by the [`Format`] of its type:
//!
//! | Format            | Layout                                                        |
//! |-------------------|---------------------------------------------------------------|
//! | `default`         | one field per line, commented with the field name             |
//! | `singleline`      | `Type,v1,v2,...;` on one line                                 |
//! | `vertices`        | `x`/`y`/`z` field triplets on one line                        |
//! | `compactschedule` | an `Until:` value and the values following it on one line     |
//! | `fluidproperty`   | up to 7 numbered or value fields on one uncommented line      |
//! | `spectral`        | up to 4 fields without `name` in their name on one line       |
//!
//! ```rust
//! use idf_core::{FieldSchema, IdfOptions, ObjectSchema, Record, Writer};
//! use std::sync::Arc;
//!
//! let schema = ObjectSchema::new("Zone", "Thermal Zones and Surfaces")
//!     .with_field(FieldSchema::new("Name"))
//!     .with_field(FieldSchema::new("Direction of Relative North"));
//! let mut zone = Record::new(Arc::new(schema));
//! zone.set_values(["West Zone", "0"]).unwrap();
//!
//! let mut writer = Writer::new(IdfOptions::new());
//! writer.write_record(&zone);
//! assert_eq!(
//!     writer.into_inner(),
//!     "Zone,\n    West Zone,              !- Name\n    0;                      !- Direction of Relative North\n\n"
//! );
//! ```
//!
//! The grouping for `vertices`, `fluidproperty` and `spectral` matches on
//! field names. A field whose name happens to match can be grouped with its
//! neighbours even when the type does not mean it.

use crate::{FieldEntry, Format, Idf, IdfOptions, Record};
use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;

static FLUID_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d|value|property").expect("valid fluid field pattern"));

const FLUID_WINDOW: usize = 7;
const SPECTRAL_WINDOW: usize = 4;
const MIN_COMMENT_PAD: usize = 2;

/// One output line of a record: values joined by `, ` and an optional comment.
#[derive(Debug, PartialEq)]
struct Line<'a> {
    values: Vec<&'a str>,
    comment: Option<String>,
}

impl<'a> Line<'a> {
    fn single(field: &'a FieldEntry) -> Self {
        Line {
            values: vec![field.value.as_str()],
            comment: Some(field.name.clone()),
        }
    }

    fn run(fields: &'a [FieldEntry], comment: Option<String>) -> Self {
        Line {
            values: fields.iter().map(|field| field.value.as_str()).collect(),
            comment,
        }
    }
}

/// Renders records and containers to IDF text.
pub struct Writer {
    output: String,
    options: IdfOptions,
}

impl Writer {
    pub fn new(options: IdfOptions) -> Self {
        Writer {
            output: String::with_capacity(4096),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Renders a whole container and returns the text.
    pub fn write(mut self, idf: &Idf) -> String {
        self.write_banner(idf.comment_headers());
        for (group, lists) in idf.groups() {
            self.output.push_str(&format!(
                "!-   ===========  ALL OBJECTS IN CLASS: {} ===========\n\n",
                group.to_uppercase()
            ));
            for record in lists.into_iter().flatten() {
                self.write_record(record);
            }
        }
        self.into_inner()
    }

    fn write_banner(&mut self, headers: &[String]) {
        let generated_at = self.options.generated_at.unwrap_or_else(Utc::now);
        self.output.push_str(&format!(
            "!- Generated by idf_core {} on {}\n",
            env!("CARGO_PKG_VERSION"),
            generated_at.to_rfc3339()
        ));
        self.output.push_str(&format!(
            "!- Validation level: {}\n",
            self.options.validation_level
        ));
        for header in headers {
            self.output.push('!');
            self.output.push_str(header);
            self.output.push('\n');
        }
        self.output.push('\n');
    }

    /// Appends one record followed by a blank line.
    pub fn write_record(&mut self, record: &Record) {
        let fields = record.export();
        if fields.is_empty() {
            self.output.push_str(record.type_name());
            self.output.push_str(";\n\n");
            return;
        }

        let lines = match record.format() {
            Format::SingleLine => {
                let values: Vec<&str> = fields.iter().map(|field| field.value.as_str()).collect();
                self.output.push_str(&format!(
                    "{},{};\n\n",
                    record.type_name(),
                    values.join(",")
                ));
                return;
            }
            Format::Default => singles(&fields),
            Format::Vertices => vertices(&fields),
            Format::CompactSchedule => compact_schedule(&fields),
            Format::FluidProperty => fluid_property(&fields),
            Format::Spectral => spectral(&fields),
        };

        self.output.push_str(record.type_name());
        self.output.push_str(",\n");
        let last = lines.len() - 1;
        for (index, line) in lines.iter().enumerate() {
            self.write_line(line, index == last);
        }
        self.output.push('\n');
    }

    fn write_line(&mut self, line: &Line<'_>, last: bool) {
        let text = format!(
            "{}{}",
            line.values.join(", "),
            if last { ';' } else { ',' }
        );
        self.output.push_str(&" ".repeat(self.options.indent));
        self.output.push_str(&text);
        if let Some(comment) = &line.comment {
            let pad = self
                .options
                .comment_column
                .saturating_sub(self.options.indent + text.chars().count() + 2)
                .max(MIN_COMMENT_PAD);
            self.output.push_str(&" ".repeat(pad));
            self.output.push_str("!- ");
            self.output.push_str(comment);
        }
        self.output.push('\n');
    }
}

fn singles(fields: &[FieldEntry]) -> Vec<Line<'_>> {
    fields.iter().map(Line::single).collect()
}

fn vertices(fields: &[FieldEntry]) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut index = 0;
    while index < fields.len() {
        let triplet = fields.get(index..index + 3).filter(|run| {
            run.iter()
                .zip(["x", "y", "z"])
                .all(|(field, axis)| field.name.to_lowercase().contains(axis))
        });
        match triplet {
            Some(run) => {
                let names: Vec<&str> = run.iter().map(|field| field.name.as_str()).collect();
                lines.push(Line::run(run, Some(names.join(", "))));
                index += 3;
            }
            None => {
                lines.push(Line::single(&fields[index]));
                index += 1;
            }
        }
    }
    lines
}

fn compact_schedule(fields: &[FieldEntry]) -> Vec<Line<'_>> {
    let contains = |field: &FieldEntry, word: &str| field.value.to_lowercase().contains(word);
    let mut lines = Vec::new();
    let mut index = 0;
    while index < fields.len() {
        if !contains(&fields[index], "until") {
            lines.push(Line::single(&fields[index]));
            index += 1;
            continue;
        }
        let end = fields[index + 1..]
            .iter()
            .position(|field| contains(field, "for") || contains(field, "until"))
            .map_or(fields.len(), |offset| index + 1 + offset);
        lines.push(Line::run(
            &fields[index..end],
            Some(format!("Fields {} - {}", index + 1, end)),
        ));
        index = end;
    }
    lines
}

fn fluid_property(fields: &[FieldEntry]) -> Vec<Line<'_>> {
    windows(fields, FLUID_WINDOW, |window| {
        window.iter().all(|field| FLUID_FIELD.is_match(&field.name))
    })
}

fn spectral(fields: &[FieldEntry]) -> Vec<Line<'_>> {
    windows(fields, SPECTRAL_WINDOW, |window| {
        !window
            .iter()
            .any(|field| field.name.to_lowercase().contains("name"))
    })
}

/// Groups the next `size` fields (fewer at the tail) into one uncommented
/// line when `accept` holds for them, else writes the current field alone.
fn windows<F>(fields: &[FieldEntry], size: usize, accept: F) -> Vec<Line<'_>>
where
    F: Fn(&[FieldEntry]) -> bool,
{
    let mut lines = Vec::new();
    let mut index = 0;
    while index < fields.len() {
        let window = &fields[index..(index + size).min(fields.len())];
        if accept(window) {
            lines.push(Line::run(window, None));
            index += window.len();
        } else {
            lines.push(Line::single(&fields[index]));
            index += 1;
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<FieldEntry> {
        pairs
            .iter()
            .map(|(name, value)| FieldEntry {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect()
    }

    fn shape(lines: &[Line<'_>]) -> Vec<usize> {
        lines.iter().map(|line| line.values.len()).collect()
    }

    #[test]
    fn test_vertices_groups_xyz_triplets() {
        let fields = entries(&[
            ("Name", "Wall"),
            ("Number of Vertices", "2"),
            ("Vertex 1 X-coordinate", "0"),
            ("Vertex 1 Y-coordinate", "0"),
            ("Vertex 1 Z-coordinate", "3"),
            ("Vertex 2 X-coordinate", "0"),
            ("Vertex 2 Y-coordinate", "0"),
        ]);
        let lines = vertices(&fields);
        assert_eq!(shape(&lines), vec![1, 1, 3, 1, 1]);
        assert_eq!(
            lines[2].comment.as_deref(),
            Some("Vertex 1 X-coordinate, Vertex 1 Y-coordinate, Vertex 1 Z-coordinate")
        );
    }

    #[test]
    fn test_compact_schedule_runs() {
        let fields = entries(&[
            ("Field 1", "Through: 12/31"),
            ("Field 2", "For: AllDays"),
            ("Field 3", "Until: 24:00"),
            ("Field 4", "0.5"),
        ]);
        let lines = compact_schedule(&fields);
        assert_eq!(shape(&lines), vec![1, 1, 2]);
        assert_eq!(lines[2].values, vec!["Until: 24:00", "0.5"]);
        assert_eq!(lines[2].comment.as_deref(), Some("Fields 3 - 4"));

        let fields = entries(&[
            ("Field 1", "Until: 08:00"),
            ("Field 2", "0"),
            ("Field 3", "Until: 18:00"),
            ("Field 4", "1"),
            ("Field 5", "For: AllOtherDays"),
            ("Field 6", "Until: 24:00"),
        ]);
        let lines = compact_schedule(&fields);
        assert_eq!(shape(&lines), vec![2, 2, 1, 1]);
        assert_eq!(lines[1].comment.as_deref(), Some("Fields 3 - 4"));
        assert_eq!(lines[3].comment.as_deref(), Some("Fields 6 - 6"));
    }

    #[test]
    fn test_fluid_property_windows() {
        let mut pairs = vec![("Fluid Name", "Water"), ("Temperature Values Name", "Temps")];
        let names: Vec<String> = (1..=9).map(|i| format!("Temperature {}", i)).collect();
        pairs.extend(names.iter().map(|name| (name.as_str(), "10")));
        let fields = entries(&pairs);
        let lines = fluid_property(&fields);
        // "Temperature Values Name" matches "value" and starts the first window
        assert_eq!(shape(&lines), vec![1, 7, 3]);
        assert!(lines[1].comment.is_none());
        assert_eq!(lines[0].comment.as_deref(), Some("Fluid Name"));
    }

    #[test]
    fn test_spectral_windows() {
        let fields = entries(&[
            ("Name", "Glass"),
            ("Wavelength 1", "0.3"),
            ("Transmittance 1", "0.0"),
            ("Front Reflectance 1", "0.045"),
            ("Back Reflectance 1", "0.045"),
            ("Wavelength 2", "0.31"),
            ("Transmittance 2", "0.0"),
        ]);
        let lines = spectral(&fields);
        assert_eq!(shape(&lines), vec![1, 4, 2]);
        assert_eq!(lines[0].comment.as_deref(), Some("Name"));
    }

    #[test]
    fn test_comment_padding() {
        let mut writer = Writer::new(IdfOptions::new());
        let line = Line {
            values: vec!["Concrete"],
            comment: Some("Name".to_string()),
        };
        writer.write_line(&line, false);
        // 30 - 4 - len("Concrete,") - 2 = 15
        assert_eq!(writer.output, format!("    Concrete,{}!- Name\n", " ".repeat(15)));

        let mut writer = Writer::new(IdfOptions::new());
        let long = "a value far longer than the comment column";
        let line = Line {
            values: vec![long],
            comment: Some("Name".to_string()),
        };
        writer.write_line(&line, true);
        assert_eq!(writer.output, format!("    {};  !- Name\n", long));
    }
}
