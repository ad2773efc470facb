//! The IDF object container.
//!
//! [`Idf`] keeps records in a two-level ordered map, category → type →
//! records, so iteration and output follow the order in which categories and
//! types were first seen. It owns the required-type and unique-type sets it
//! enforces:
//!
//! - adding a record of a unique type replaces the records of that type;
//! - [`Idf::validate`] fails if a required type has no records or a unique
//!   type has several (possible after edits through [`Idf::get_mut`]).
//!
//! ```rust
//! use idf_core::{Idf, ObjectSchema, SchemaRegistry};
//! use std::sync::Arc;
//!
//! let registry: SchemaRegistry = vec![
//!     ObjectSchema::new("Version", "Simulation Parameters").unique(),
//!     ObjectSchema::new("Zone", "Thermal Zones and Surfaces"),
//! ]
//! .into_iter()
//! .collect();
//! let mut idf = Idf::new(Arc::new(registry));
//!
//! let zone = idf.factory().create("zone").unwrap();
//! idf.add(zone.clone());
//! idf.add(zone);
//! let version = idf.factory().create("version").unwrap();
//! idf.add(version.clone());
//! idf.add(version);
//!
//! assert_eq!(idf.len(), 3);
//! assert_eq!(idf.get("ZONE").unwrap().len(), 2);
//! assert_eq!(idf.get("Version").unwrap().len(), 1);
//! ```

use crate::schema::normalize;
use crate::{
    Error, Factory, IdfOptions, ObjectConstraints, Reader, Record, Result, SchemaRegistry,
    ValidationLevel, Writer,
};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

type TypeMap = IndexMap<String, Vec<Record>>;

/// An in-memory IDF file.
#[derive(Clone, Debug)]
pub struct Idf {
    factory: Factory,
    constraints: ObjectConstraints,
    comment_headers: Vec<String>,
    data: IndexMap<String, TypeMap>,
}

impl Idf {
    /// Creates an empty container enforcing the registry's required and unique flags.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        let constraints = ObjectConstraints::from_registry(&registry);
        Self::with_constraints(registry, constraints)
    }

    /// Creates an empty container with explicit required and unique type sets.
    #[must_use]
    pub fn with_constraints(registry: Arc<SchemaRegistry>, constraints: ObjectConstraints) -> Self {
        Idf {
            factory: Factory::new(registry),
            constraints,
            comment_headers: Vec::new(),
            data: IndexMap::new(),
        }
    }

    /// Reads and parses an IDF file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::UnknownType`]
    /// if it contains an object type the registry does not know.
    pub fn from_path<P: AsRef<Path>>(registry: Arc<SchemaRegistry>, path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let mut idf = Idf::new(registry);
        Reader::new(&text).read_into(&mut idf)?;
        debug!(path = %path.as_ref().display(), objects = idf.len(), "read IDF file");
        Ok(idf)
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        self.factory.registry()
    }

    pub fn constraints(&self) -> &ObjectConstraints {
        &self.constraints
    }

    /// Comment lines found before the first object, without their leading `!`.
    pub fn comment_headers(&self) -> &[String] {
        &self.comment_headers
    }

    pub fn add_comment_header(&mut self, comment: &str) {
        self.comment_headers.push(comment.to_string());
    }

    /// Adds a record under its category and type.
    ///
    /// Records of a unique type replace the ones already stored.
    pub fn add(&mut self, record: Record) {
        let key = record.schema().key();
        let unique = self.constraints.is_unique(&key);
        let records = self
            .data
            .entry(record.group().to_string())
            .or_default()
            .entry(key)
            .or_default();
        if unique {
            *records = vec![record];
        } else {
            records.push(record);
        }
    }

    /// Returns the records of a type, looked up case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if the registry does not know the type.
    pub fn get(&self, type_name: &str) -> Result<&[Record]> {
        let (group, key) = self.locate(type_name)?;
        Ok(self
            .data
            .get(&group)
            .and_then(|types| types.get(&key))
            .map_or(&[], Vec::as_slice))
    }

    /// Returns the record list of a type for editing, creating an empty one if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if the registry does not know the type.
    pub fn get_mut(&mut self, type_name: &str) -> Result<&mut Vec<Record>> {
        let (group, key) = self.locate(type_name)?;
        Ok(self.data.entry(group).or_default().entry(key).or_default())
    }

    /// Returns the record at position `index` in iteration order, or `None` past the end.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Record> {
        self.iter().nth(index)
    }

    /// `true` if any record of the type is stored.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.count(&normalize(type_name)) > 0
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data
            .values()
            .flat_map(IndexMap::values)
            .map(Vec::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates all records by category, then type, then insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            groups: self.data.values(),
            types: None,
            records: Default::default(),
        }
    }

    /// Names of the types that hold at least one record, as the schemas spell them.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data
            .values()
            .flat_map(IndexMap::values)
            .filter_map(|records| records.first())
            .map(Record::type_name)
    }

    /// Categories in order, each with its non-empty record lists.
    pub fn groups(&self) -> impl Iterator<Item = (&str, Vec<&[Record]>)> {
        self.data.iter().filter_map(|(group, types)| {
            let lists: Vec<&[Record]> = types
                .values()
                .filter(|records| !records.is_empty())
                .map(Vec::as_slice)
                .collect();
            (!lists.is_empty()).then_some((group.as_str(), lists))
        })
    }

    /// Checks the required-object and unique-object invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRequiredObject`] or [`Error::NotUnique`] for the
    /// first violated type.
    pub fn validate(&self) -> Result<()> {
        for key in self.constraints.required() {
            if self.count(key) == 0 {
                return Err(Error::missing_required_object(&self.display_name(key)));
            }
        }
        for key in self.constraints.unique() {
            let count = self.count(key);
            if count > 1 {
                return Err(Error::not_unique(&self.display_name(key), count));
            }
        }
        Ok(())
    }

    /// Runs [`Record::validate`] on every record according to `level`.
    ///
    /// # Errors
    ///
    /// With [`ValidationLevel::Error`], returns the first record error.
    pub fn validate_records(&self, level: ValidationLevel) -> Result<()> {
        if level == ValidationLevel::NoCheck {
            return Ok(());
        }
        for record in self {
            match (record.validate(), level) {
                (Err(err), ValidationLevel::Error) => return Err(err),
                (Err(err), _) => warn!(object = record.type_name(), error = %err, "invalid field value"),
                (Ok(()), _) => {}
            }
        }
        Ok(())
    }

    /// Writes the container to `path` with default options.
    ///
    /// With `check`, object invariants and record values are validated first.
    ///
    /// # Errors
    ///
    /// Validation errors abort before the file is touched; [`Error::Io`] reports
    /// write failures, which may leave a partially written file.
    pub fn save<P: AsRef<Path>>(&self, path: P, check: bool) -> Result<()> {
        self.save_with_options(path, check, &IdfOptions::default())
    }

    /// Writes the container to `path` with custom options.
    ///
    /// # Errors
    ///
    /// See [`Idf::save`].
    pub fn save_with_options<P: AsRef<Path>>(
        &self,
        path: P,
        check: bool,
        options: &IdfOptions,
    ) -> Result<()> {
        if check {
            self.validate()?;
            self.validate_records(options.validation_level)?;
        }
        let text = Writer::new(options.clone()).write(self);
        fs::write(path.as_ref(), text)?;
        debug!(path = %path.as_ref().display(), objects = self.len(), "saved IDF file");
        Ok(())
    }

    fn locate(&self, type_name: &str) -> Result<(String, String)> {
        let schema = self
            .registry()
            .lookup(type_name)
            .ok_or_else(|| Error::unknown_type(type_name))?;
        Ok((schema.group.clone(), schema.key()))
    }

    fn count(&self, key: &str) -> usize {
        self.data
            .values()
            .filter_map(|types| types.get(key))
            .map(Vec::len)
            .sum()
    }

    fn display_name(&self, key: &str) -> String {
        self.registry()
            .lookup(key)
            .map_or_else(|| key.to_string(), |schema| schema.name.clone())
    }
}

/// Iterator over the records of an [`Idf`], see [`Idf::iter`].
pub struct Iter<'a> {
    groups: indexmap::map::Values<'a, String, TypeMap>,
    types: Option<indexmap::map::Values<'a, String, Vec<Record>>>,
    records: std::slice::Iter<'a, Record>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<&'a Record> {
        loop {
            if let Some(record) = self.records.next() {
                return Some(record);
            }
            if let Some(records) = self.types.as_mut().and_then(Iterator::next) {
                self.records = records.iter();
                continue;
            }
            self.types = Some(self.groups.next()?.values());
        }
    }
}

impl<'a> IntoIterator for &'a Idf {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
