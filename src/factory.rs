//! Record construction by type name.

use crate::{Error, Record, Result, SchemaRegistry};
use std::sync::Arc;

/// Builds empty records for the types a [`SchemaRegistry`] knows.
///
/// # Examples
///
/// ```rust
/// use idf_core::{Error, Factory, ObjectSchema, SchemaRegistry};
/// use std::sync::Arc;
///
/// let registry: SchemaRegistry = vec![ObjectSchema::new("Zone", "Thermal Zones and Surfaces")]
///     .into_iter()
///     .collect();
/// let factory = Factory::new(Arc::new(registry));
///
/// let zone = factory.create("ZONE").unwrap();
/// assert_eq!(zone.type_name(), "Zone");
/// assert!(zone.is_empty());
///
/// assert!(matches!(factory.create("notatype"), Err(Error::UnknownType { .. })));
/// ```
#[derive(Clone, Debug)]
pub struct Factory {
    registry: Arc<SchemaRegistry>,
}

impl Factory {
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Factory { registry }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Creates an empty record of the named type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if the registry has no such type.
    pub fn create(&self, type_name: &str) -> Result<Record> {
        self.registry
            .lookup(type_name)
            .map(|schema| Record::new(Arc::clone(schema)))
            .ok_or_else(|| Error::unknown_type(type_name))
    }
}
