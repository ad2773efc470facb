//! Object schemas and the schema registry.
//!
//! Schemas describe every IDF object type: its category ("group"), the layout
//! the writer uses for it, and its ordered fields. They are produced from the
//! EnergyPlus data dictionary by an external generator; this crate only reads
//! them. The serde names follow the generator's keys (`min-fields`,
//! `extensible-fields`, `required-field`, ...), so a dump loads directly:
//!
//! ```rust
//! use idf_core::{Format, SchemaRegistry};
//!
//! let registry: SchemaRegistry = serde_json::from_str(r#"[{
//!     "name": "Version",
//!     "group": "Simulation Parameters",
//!     "format": "singleline",
//!     "unique-object": true,
//!     "fields": {"version identifier": {"name": "Version Identifier", "type": "alpha"}}
//! }]"#).unwrap();
//!
//! let version = registry.lookup("VERSION").unwrap();
//! assert_eq!(version.format, Format::SingleLine);
//! assert_eq!(version.field_name(0).as_deref(), Some("Version Identifier"));
//! ```
//!
//! ## Extensible fields
//!
//! Objects such as surfaces or compact schedules repeat a group of fields
//! without bound. The schema stores one template group whose names carry the
//! group number `1`; group `g` substitutes `g` for that first `1`
//! (`Vertex 1 X-coordinate`, `Vertex 2 X-coordinate`, ...).

use crate::Value;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

/// Lowercases and trims a type or field name for lookups.
pub(crate) fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Layout strategy the writer applies to an object type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// One field per line, each with its field name as comment.
    #[default]
    Default,
    /// The whole object on one line.
    SingleLine,
    /// `x`, `y`, `z` coordinate triplets share a line.
    Vertices,
    /// `Until:` entries share a line with the values that follow them.
    CompactSchedule,
    /// Runs of up to seven numbered values share a line.
    FluidProperty,
    /// Runs of up to four unnamed values share a line.
    Spectral,
}

/// Value type declared for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    #[default]
    Alpha,
    Real,
    Integer,
    Choice,
    Node,
    ObjectList,
    ExternalList,
    #[serde(other)]
    Other,
}

/// Description of one field of an object type.
#[derive(Clone, Debug, PartialEq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldSchema {
    /// Display name, also the lookup key (case-insensitive).
    pub name: String,
    /// Program name from the generator. Carried for callers, never interpreted here.
    #[serde(default)]
    pub pyname: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required_field: bool,
    /// Default from the data dictionary. Records never fill it in on their own.
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub accepted_values: Vec<String>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(rename = "minimum>", default)]
    pub minimum_exclusive: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(rename = "maximum<", default)]
    pub maximum_exclusive: Option<f64>,
    #[serde(default)]
    pub autosizable: bool,
    #[serde(default)]
    pub autocalculatable: bool,
    /// Unit label, carried for callers.
    #[serde(default)]
    pub unit: Option<String>,
}

impl FieldSchema {
    /// Creates an optional alpha field.
    #[must_use]
    pub fn new(name: &str) -> Self {
        FieldSchema {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required_field = true;
        self
    }

    #[must_use]
    pub fn with_accepted_values(mut self, values: &[&str]) -> Self {
        self.accepted_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Sets inclusive bounds.
    #[must_use]
    pub fn with_bounds(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    #[must_use]
    pub fn autosizable(mut self) -> Self {
        self.autosizable = true;
        self
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(self.field_type, FieldType::Real | FieldType::Integer)
    }
}

/// Description of one object type.
///
/// Declared fields are keyed by their lowercased display name, in file order.
#[derive(Clone, Debug, PartialEq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObjectSchema {
    pub name: String,
    /// Program name from the generator, empty when built in code.
    #[serde(default)]
    pub pyname: String,
    /// Category the object is filed and written under.
    pub group: String,
    #[serde(default, deserialize_with = "format_or_default")]
    pub format: Format,
    #[serde(default)]
    pub min_fields: usize,
    #[serde(default, deserialize_with = "lowercase_keys")]
    pub fields: IndexMap<String, FieldSchema>,
    #[serde(default, deserialize_with = "lowercase_keys")]
    pub extensible_fields: IndexMap<String, FieldSchema>,
    #[serde(default)]
    pub required_object: bool,
    #[serde(default)]
    pub unique_object: bool,
}

fn format_or_default<'de, D>(deserializer: D) -> Result<Format, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Format>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn lowercase_keys<'de, D>(deserializer: D) -> Result<IndexMap<String, FieldSchema>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = IndexMap::<String, FieldSchema>::deserialize(deserializer)?;
    Ok(fields
        .into_iter()
        .map(|(key, field)| (normalize(&key), field))
        .collect())
}

impl ObjectSchema {
    /// Creates an empty schema with the default format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use idf_core::{FieldSchema, Format, ObjectSchema};
    ///
    /// let schema = ObjectSchema::new("Timestep", "Simulation Parameters")
    ///     .with_field(FieldSchema::new("Number of Timesteps per Hour"))
    ///     .unique();
    /// assert!(schema.unique_object);
    /// assert_eq!(schema.format, Format::Default);
    /// ```
    #[must_use]
    pub fn new(name: &str, group: &str) -> Self {
        ObjectSchema {
            name: name.to_string(),
            group: group.to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_min_fields(mut self, min_fields: usize) -> Self {
        self.min_fields = min_fields;
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.insert(normalize(&field.name), field);
        self
    }

    /// Adds a member to the extensible template group. Its name should carry the group number `1`.
    #[must_use]
    pub fn with_extensible_field(mut self, field: FieldSchema) -> Self {
        self.extensible_fields.insert(normalize(&field.name), field);
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required_object = true;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique_object = true;
        self
    }

    /// Lowercased type name, the key the registry and containers use.
    pub fn key(&self) -> String {
        normalize(&self.name)
    }

    pub fn is_extensible(&self) -> bool {
        !self.extensible_fields.is_empty()
    }

    /// Returns the field schema at `index`, following the extensible template past the declared fields.
    pub fn field(&self, index: usize) -> Option<&FieldSchema> {
        if index < self.fields.len() {
            return self.fields.get_index(index).map(|(_, field)| field);
        }
        if !self.is_extensible() {
            return None;
        }
        let member = (index - self.fields.len()) % self.extensible_fields.len();
        self.extensible_fields.get_index(member).map(|(_, field)| field)
    }

    /// Returns the display name of the field at `index`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use idf_core::{FieldSchema, ObjectSchema};
    ///
    /// let schema = ObjectSchema::new("Schedule:Compact", "Schedules")
    ///     .with_field(FieldSchema::new("Name"))
    ///     .with_extensible_field(FieldSchema::new("Field 1"));
    ///
    /// assert_eq!(schema.field_name(0).as_deref(), Some("Name"));
    /// assert_eq!(schema.field_name(3).as_deref(), Some("Field 3"));
    /// ```
    pub fn field_name(&self, index: usize) -> Option<String> {
        if index < self.fields.len() {
            return self.fields.get_index(index).map(|(_, field)| field.name.clone());
        }
        let template = self.field(index)?;
        let group = (index - self.fields.len()) / self.extensible_fields.len() + 1;
        Some(extensible_name(&template.name, group))
    }

    /// Returns the position of a field given its display name, case-insensitively.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        let key = normalize(name);
        if let Some(index) = self.fields.get_index_of(&key) {
            return Some(index);
        }
        let width = self.extensible_fields.len();
        self.extensible_fields
            .keys()
            .enumerate()
            .find_map(|(member, template)| {
                extensible_group(template, &key)
                    .map(|group| self.fields.len() + (group - 1) * width + member)
            })
    }
}

fn extensible_name(template: &str, group: usize) -> String {
    if template.contains('1') {
        template.replacen('1', &group.to_string(), 1)
    } else {
        format!("{} {}", template, group)
    }
}

/// Inverse of [`extensible_name`] on lowercased names.
fn extensible_group(template: &str, key: &str) -> Option<usize> {
    let (prefix, suffix) = match template.split_once('1') {
        Some((prefix, suffix)) => (prefix.to_string(), suffix),
        None => (format!("{} ", template), ""),
    };
    if key.len() < prefix.len() + suffix.len() {
        return None;
    }
    let middle = key.strip_prefix(prefix.as_str())?.strip_suffix(suffix)?;
    if middle.is_empty() || !middle.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    middle.parse::<usize>().ok().filter(|group| *group >= 1)
}

/// Dispatch table from lowercased type name to schema.
///
/// Built once and shared: records hold `Arc`s into it.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Arc<ObjectSchema>>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema, replacing any earlier schema with the same (case-insensitive) name.
    pub fn register(&mut self, schema: ObjectSchema) -> Option<Arc<ObjectSchema>> {
        self.schemas.insert(schema.key(), Arc::new(schema))
    }

    /// Looks a type up by name, case-insensitively.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Arc<ObjectSchema>> {
        self.schemas.get(&normalize(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ObjectSchema>> {
        self.schemas.values()
    }

    /// Names of the types flagged `required-object`.
    pub fn required_objects(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|schema| schema.required_object)
            .map(|schema| schema.name.as_str())
    }

    /// Names of the types flagged `unique-object`.
    pub fn unique_objects(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|schema| schema.unique_object)
            .map(|schema| schema.name.as_str())
    }
}

impl FromIterator<ObjectSchema> for SchemaRegistry {
    fn from_iter<T: IntoIterator<Item = ObjectSchema>>(iter: T) -> Self {
        let mut registry = SchemaRegistry::new();
        for schema in iter {
            registry.register(schema);
        }
        registry
    }
}

impl<'de> Deserialize<'de> for SchemaRegistry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<ObjectSchema>::deserialize(deserializer).map(|schemas| schemas.into_iter().collect())
    }
}

/// The required-type and unique-type sets a container enforces.
///
/// Names are stored lowercased.
///
/// # Examples
///
/// ```rust
/// use idf_core::ObjectConstraints;
///
/// let constraints = ObjectConstraints::new()
///     .with_required("Building")
///     .with_unique("Building");
/// assert!(constraints.is_required("BUILDING"));
/// assert!(constraints.is_unique("building"));
/// assert!(!constraints.is_unique("Zone"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectConstraints {
    required: IndexSet<String>,
    unique: IndexSet<String>,
}

impl ObjectConstraints {
    /// Creates empty constraint sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the sets from the `required-object` and `unique-object` flags of a registry.
    #[must_use]
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        ObjectConstraints {
            required: registry.required_objects().map(normalize).collect(),
            unique: registry.unique_objects().map(normalize).collect(),
        }
    }

    #[must_use]
    pub fn with_required(mut self, name: &str) -> Self {
        self.required.insert(normalize(name));
        self
    }

    #[must_use]
    pub fn with_unique(mut self, name: &str) -> Self {
        self.unique.insert(normalize(name));
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(&normalize(name))
    }

    pub fn is_unique(&self, name: &str) -> bool {
        self.unique.contains(&normalize(name))
    }

    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    pub fn unique(&self) -> impl Iterator<Item = &str> {
        self.unique.iter().map(String::as_str)
    }
}
