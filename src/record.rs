//! Typed IDF records.
//!
//! A [`Record`] is one data object: an ordered map from field name to
//! [`Value`], tied to the [`ObjectSchema`] of its type. Fields are addressed
//! by display name (case-insensitive) or by position; unset fields are simply
//! absent.
//!
//! ```rust
//! use idf_core::{FieldSchema, ObjectSchema, Record, Value};
//! use std::sync::Arc;
//!
//! let schema = ObjectSchema::new("Material", "Surface Construction Elements")
//!     .with_field(FieldSchema::new("Name"))
//!     .with_field(FieldSchema::new("Roughness"));
//! let mut record = Record::new(Arc::new(schema));
//!
//! record.set("Name", "Concrete").unwrap();
//! record.set("ROUGHNESS", "Rough").unwrap();
//!
//! assert_eq!(record.get("roughness"), Some(&Value::from("Rough")));
//! assert!(record.set("Density", 2200).is_err());
//! ```

use crate::schema::normalize;
use crate::{Error, FieldType, Format, ObjectSchema, Result, Value};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// One field as it is written out: display name and text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,
    pub value: String,
}

/// An instance of an IDF object type.
#[derive(Clone, Debug)]
pub struct Record {
    schema: Arc<ObjectSchema>,
    data: IndexMap<String, Value>,
}

impl Record {
    /// Creates an empty record. Most callers go through [`Factory::create`](crate::Factory::create).
    #[must_use]
    pub fn new(schema: Arc<ObjectSchema>) -> Self {
        Record {
            schema,
            data: IndexMap::new(),
        }
    }

    pub fn schema(&self) -> &Arc<ObjectSchema> {
        &self.schema
    }

    /// The type name as the schema spells it, e.g. `BuildingSurface:Detailed`.
    pub fn type_name(&self) -> &str {
        &self.schema.name
    }

    pub fn group(&self) -> &str {
        &self.schema.group
    }

    pub fn format(&self) -> Format {
        self.schema.format
    }

    /// Returns the value of a field by display name, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.get_index(self.schema.field_index(name)?)
    }

    /// Returns the value of the field at `index` in schema order.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        let name = self.schema.field_name(index)?;
        self.data.get(&normalize(&name))
    }

    /// Sets a field by display name and returns the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the schema has no field with that name,
    /// and [`Error::InvalidValue`] for text that cannot be written back as one field.
    pub fn set<V: Into<Value>>(&mut self, name: &str, value: V) -> Result<Option<Value>> {
        let index = self
            .schema
            .field_index(name)
            .ok_or_else(|| Error::unknown_field(&self.schema.name, name))?;
        self.set_index(index, value)
    }

    /// Sets the field at `index` in schema order and returns the previous value.
    ///
    /// A blank value unsets the field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if `index` is past the declared fields of a
    /// type without extensible fields, and [`Error::InvalidValue`] for text that
    /// cannot be written back as one field.
    pub fn set_index<V: Into<Value>>(&mut self, index: usize, value: V) -> Result<Option<Value>> {
        let name = self
            .schema
            .field_name(index)
            .ok_or_else(|| Error::unknown_field(&self.schema.name, &format!("#{}", index + 1)))?;
        let value = value.into();
        if value.is_blank() {
            return Ok(self.data.shift_remove(&normalize(&name)));
        }
        self.check_text(&name, &value)?;
        Ok(self.data.insert(normalize(&name), value))
    }

    /// Removes a field, leaving it unset.
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        let name = self.schema.field_name(self.schema.field_index(name)?)?;
        self.data.shift_remove(&normalize(&name))
    }

    /// Text must come back as the same single field after a write and re-read.
    fn check_text(&self, field: &str, value: &Value) -> Result<()> {
        let Some(text) = value.as_str() else {
            return Ok(());
        };
        let msg = if text.contains([',', ';', '!']) {
            "text must not contain ',', ';' or '!'"
        } else if text.contains(['\n', '\r']) {
            "text must fit on one line"
        } else if text.trim() != text {
            "text must not start or end with whitespace"
        } else {
            return Ok(());
        };
        Err(Error::invalid_value(&self.schema.name, field, msg))
    }

    /// Assigns values positionally from the first field on.
    ///
    /// Blank values leave their field unset. Values past the last nameable
    /// field are dropped; the number dropped is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for text that cannot be written back as
    /// one field. Nothing is assigned in that case.
    pub fn set_values<I, V>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut named = Vec::new();
        let mut dropped = 0;
        for (index, value) in values.into_iter().enumerate() {
            let value = value.into();
            if value.is_blank() {
                continue;
            }
            match self.schema.field_name(index) {
                Some(name) => {
                    self.check_text(&name, &value)?;
                    named.push((normalize(&name), value));
                }
                None => dropped += 1,
            }
        }
        self.data.extend(named);
        Ok(dropped)
    }

    /// Number of set fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates set fields in the order they were assigned, keyed by lowercased name.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.data.iter()
    }

    /// Position of the last set field.
    pub fn last_index(&self) -> Option<usize> {
        self.data
            .keys()
            .filter_map(|key| self.schema.field_index(key))
            .max()
    }

    /// Number of extensible groups in use, counting partially filled ones.
    pub fn extensible_groups(&self) -> usize {
        let declared = self.schema.fields.len();
        let width = self.schema.extensible_fields.len();
        match self.last_index() {
            Some(last) if width > 0 && last >= declared => (last - declared) / width + 1,
            _ => 0,
        }
    }

    /// Appends one extensible group after the last group in use.
    ///
    /// # Errors
    ///
    /// Fails if the type has no extensible fields.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use idf_core::{FieldSchema, ObjectSchema, Record};
    /// use std::sync::Arc;
    ///
    /// let schema = ObjectSchema::new("BranchList", "Node-Branch Management")
    ///     .with_field(FieldSchema::new("Name"))
    ///     .with_extensible_field(FieldSchema::new("Branch 1 Name"));
    /// let mut record = Record::new(Arc::new(schema));
    /// record.set("Name", "Supply Branches").unwrap();
    /// record.add_extensible(["Supply Inlet Branch"]).unwrap();
    /// record.add_extensible(["Supply Outlet Branch"]).unwrap();
    ///
    /// assert_eq!(record.extensible_groups(), 2);
    /// assert!(record.get("Branch 2 Name").is_some());
    /// ```
    pub fn add_extensible<I, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        if !self.schema.is_extensible() {
            return Err(Error::custom(format!(
                "{} has no extensible fields",
                self.schema.name
            )));
        }
        let start =
            self.schema.fields.len() + self.extensible_groups() * self.schema.extensible_fields.len();
        for (offset, value) in values.into_iter().enumerate() {
            self.set_index(start + offset, value)?;
        }
        Ok(())
    }

    /// Lists the fields to write, in schema order.
    ///
    /// Covers every position up to the last set field, and at least the
    /// schema's `min-fields`; unset positions in between come out empty so
    /// that positions survive a re-read.
    pub fn export(&self) -> Vec<FieldEntry> {
        let count = self
            .last_index()
            .map_or(0, |last| last + 1)
            .max(self.schema.min_fields);
        (0..count)
            .map_while(|index| self.schema.field_name(index))
            .map(|name| {
                let value = self
                    .data
                    .get(&normalize(&name))
                    .map(Value::to_string)
                    .unwrap_or_default();
                FieldEntry { name, value }
            })
            .collect()
    }

    /// Checks set values against their field schemas and that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for the first violation found.
    pub fn validate(&self) -> Result<()> {
        for field in self.schema.fields.values() {
            let missing = self.get(&field.name).map_or(true, Value::is_blank);
            if field.required_field && missing {
                return Err(Error::invalid_value(
                    &self.schema.name,
                    &field.name,
                    "required field is not set",
                ));
            }
        }

        for (key, value) in &self.data {
            let Some(field) = self
                .schema
                .field_index(key)
                .and_then(|index| self.schema.field(index))
            else {
                continue;
            };
            if value.is_blank() {
                continue;
            }
            let fail = |msg: String| Error::invalid_value(&self.schema.name, &field.name, &msg);

            if field.is_numeric() {
                if (field.autosizable && value.is_keyword("autosize"))
                    || (field.autocalculatable && value.is_keyword("autocalculate"))
                {
                    continue;
                }
                let number = value
                    .as_f64()
                    .ok_or_else(|| fail(format!("value {} is not a number", value)))?;
                if field.field_type == FieldType::Integer && value.as_i64().is_none() {
                    return Err(fail(format!("value {} is not an integer", value)));
                }
                if let Some(min) = field.minimum {
                    if number < min {
                        return Err(fail(format!("value {} must be >= {}", value, min)));
                    }
                }
                if let Some(min) = field.minimum_exclusive {
                    if number <= min {
                        return Err(fail(format!("value {} must be > {}", value, min)));
                    }
                }
                if let Some(max) = field.maximum {
                    if number > max {
                        return Err(fail(format!("value {} must be <= {}", value, max)));
                    }
                }
                if let Some(max) = field.maximum_exclusive {
                    if number >= max {
                        return Err(fail(format!("value {} must be < {}", value, max)));
                    }
                }
            } else if !field.accepted_values.is_empty() {
                let text = value.to_string();
                let accepted = field
                    .accepted_values
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(text.trim()));
                if !accepted {
                    return Err(fail(format!(
                        "value {} is not one of {}",
                        text,
                        field.accepted_values.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.key() == other.schema.key() && self.data == other.data
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.data.len()))?;
        for (key, value) in &self.data {
            let name = self
                .schema
                .field_index(key)
                .and_then(|index| self.schema.field_name(index))
                .unwrap_or_else(|| key.clone());
            map.serialize_entry(&name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldSchema;

    fn material() -> Arc<ObjectSchema> {
        Arc::new(
            ObjectSchema::new("Material", "Surface Construction Elements")
                .with_min_fields(3)
                .with_field(FieldSchema::new("Name").required())
                .with_field(
                    FieldSchema::new("Roughness")
                        .required()
                        .with_accepted_values(&["VeryRough", "Rough", "Smooth"]),
                )
                .with_field(
                    FieldSchema::new("Thickness")
                        .with_type(FieldType::Real)
                        .with_bounds(Some(0.0), Some(3.0)),
                )
                .with_field(FieldSchema::new("Conductivity").with_type(FieldType::Real))
                .with_field(
                    FieldSchema::new("Layers")
                        .with_type(FieldType::Integer)
                        .autosizable(),
                ),
        )
    }

    #[test]
    fn test_set_values_skips_blanks_and_drops_overflow() {
        let mut record = Record::new(material());
        let dropped = record
            .set_values(["Concrete", "", "0.2", "1.7", "3", "extra", "more"])
            .unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(record.len(), 4);
        assert!(record.get("Roughness").is_none());
        assert_eq!(record.get_index(2), Some(&Value::from("0.2")));
    }

    #[test]
    fn test_export_fills_gaps_and_min_fields() {
        let mut record = Record::new(material());
        record.set("Name", "Board").unwrap();
        let exported = record.export();
        assert_eq!(exported.len(), 3);
        assert_eq!(exported[0].value, "Board");
        assert_eq!(exported[2].name, "Thickness");
        assert_eq!(exported[2].value, "");

        record.set("Conductivity", 0.5).unwrap();
        let exported = record.export();
        assert_eq!(exported.len(), 4);
        assert_eq!(exported[3].value, "0.5");
    }

    #[test]
    fn test_equality_ignores_assignment_order() {
        let mut a = Record::new(material());
        a.set("Name", "A").unwrap();
        a.set("Thickness", "0.1").unwrap();
        let mut b = Record::new(material());
        b.set("thickness", "0.1").unwrap();
        b.set("NAME", "A").unwrap();
        assert_eq!(a, b);
        b.unset("thickness");
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_reports_field_problems() {
        let mut record = Record::new(material());
        record.set("Name", "Concrete").unwrap();
        assert!(matches!(
            record.validate(),
            Err(Error::InvalidValue { field, .. }) if field == "Roughness"
        ));

        record.set("Roughness", "rough").unwrap();
        record.set("Thickness", "0.2").unwrap();
        record.set("Layers", "Autosize").unwrap();
        assert!(record.validate().is_ok());

        record.set("Thickness", "4").unwrap();
        assert!(record.validate().is_err());
        record.set("Thickness", "thick").unwrap();
        assert!(record.validate().is_err());
        record.set("Thickness", 0.1).unwrap();

        record.set("Layers", "2.5").unwrap();
        assert!(record.validate().is_err());
        record.set("Layers", 2).unwrap();

        record.set("Roughness", "Glossy").unwrap();
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_add_extensible_requires_extensible_schema() {
        let mut record = Record::new(material());
        assert!(record.add_extensible(["x"]).is_err());
    }

    #[test]
    fn test_serialize_uses_display_names() {
        let mut record = Record::new(material());
        record.set("name", "Concrete").unwrap();
        record.set("thickness", 0.2).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Name":"Concrete","Thickness":0.2}"#);
    }

    #[test]
    fn test_text_that_would_split_is_rejected() {
        let mut record = Record::new(material());
        for text in ["West, Zone", "a;b", "note ! here", "two\nlines", " padded", "padded "] {
            let err = record.set("Name", text).unwrap_err();
            println!("{}", err);
            assert!(matches!(err, Error::InvalidValue { ref field, .. } if field == "Name"));
        }
        assert!(record.is_empty());

        assert!(record.set_values(["Concrete", "Rough", "0.1; 0.2"]).is_err());
        assert!(record.is_empty());

        record.set("Name", "Concrete slab 200mm").unwrap();
        record.set("Thickness", -0.5).unwrap();
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_blank_value_unsets_field() {
        let mut record = Record::new(material());
        record.set("Name", "Concrete").unwrap();
        assert_eq!(record.set("Name", "  ").unwrap(), Some(Value::from("Concrete")));
        assert!(record.get("Name").is_none());
        assert!(record.is_empty());
    }

    #[test]
    fn test_lookup_resolves_names_like_set() {
        let schema = Arc::new(
            ObjectSchema::new("Schedule:Compact", "Schedules")
                .with_field(FieldSchema::new("Name"))
                .with_extensible_field(FieldSchema::new("Field 1")),
        );
        let mut record = Record::new(schema);
        record.set("Field 02", "For: AllDays").unwrap();
        assert_eq!(record.get("Field 02"), Some(&Value::from("For: AllDays")));
        assert_eq!(record.get(" field 2 "), Some(&Value::from("For: AllDays")));
        assert_eq!(record.unset("FIELD 002"), Some(Value::from("For: AllDays")));
        assert!(record.is_empty());
        assert!(record.get("Field 0").is_none());
    }
}
