//! # Three-State Fields
//!
//! `Option<T>` cannot tell "key absent" from "key present with `null`" once a
//! payload is decoded. [`Tristate`] keeps the two apart for fields that are
//! both optional and nullable.
//!
//! Use it with `#[serde(default, skip_serializing_if = "Tristate::is_absent")]`
//! so an absent key decodes to [`Tristate::Absent`] and stays absent when the
//! record is encoded again.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field that may be absent, explicitly `null`, or hold a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tristate<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> Default for Tristate<T> {
    fn default() -> Self {
        Tristate::Absent
    }
}

impl<T> Tristate<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Tristate::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Tristate::Null)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Tristate::Present(_))
    }

    /// The value, if any. Collapses `Absent` and `Null`.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Tristate::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Tristate::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Tristate<U> {
        match self {
            Tristate::Absent => Tristate::Absent,
            Tristate::Null => Tristate::Null,
            Tristate::Present(value) => Tristate::Present(f(value)),
        }
    }
}

/// `None` maps to `Null`: a decoded `Option` has already seen the key.
impl<T> From<Option<T>> for Tristate<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Tristate::Null, Tristate::Present)
    }
}

impl<T: Serialize> Serialize for Tristate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tristate::Present(value) => serializer.serialize_some(value),
            Tristate::Absent | Tristate::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Tristate<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Tristate::from)
    }
}
