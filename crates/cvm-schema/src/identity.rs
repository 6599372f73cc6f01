//! # Identifier Newtypes
//!
//! The management API encodes its hashed identifiers as opaque strings. They
//! are wrapped so a project id cannot be passed where a VM name is expected,
//! but no format is imposed on their contents.

use serde::{Deserialize, Serialize};

/// Opaque hashed identifier (KMS ids, project ids).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedId(String);

impl HashedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for HashedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HashedId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for HashedId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for HashedId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
