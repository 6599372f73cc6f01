//! The [`Record`] trait: a typed struct bound to its schema table.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::options::ValidationOptions;
use crate::schema::ObjectSchema;
use crate::validate::{validate, ValidationError};

/// A typed API record with a declarative schema.
///
/// [`Record::parse`] is the validation entry point for the record: it runs the
/// schema interpreter over the untyped input and decodes the normalized result.
pub trait Record: Serialize + DeserializeOwned {
    /// Table the input is validated against.
    const SCHEMA: &'static ObjectSchema;

    /// Validate and decode with default options.
    fn parse(value: &Value) -> Result<Self, ValidationError> {
        Self::parse_with(value, &ValidationOptions::default())
    }

    fn parse_with(value: &Value, options: &ValidationOptions) -> Result<Self, ValidationError> {
        let normalized = validate(value, Self::SCHEMA, options)?;
        serde_json::from_value(normalized)
            .map_err(|e| ValidationError::undecodable(Self::SCHEMA.name(), &e))
    }

    /// Encode back into the untyped tree form accepted by [`Record::parse`].
    fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Validate, decode, and re-encode `value`, yielding the record's tree form.
    /// An encode failure is reported as an `undecodable` issue.
    fn normalize_with(value: &Value, options: &ValidationOptions) -> Result<Value, ValidationError> {
        Self::parse_with(value, options)?
            .to_value()
            .map_err(|e| ValidationError::undecodable(Self::SCHEMA.name(), &e))
    }
}
