//! # Schema Tables
//!
//! Declarative descriptions of every record returned by the CVM management
//! API. Each [`ObjectSchema`] is a `const` table of [`FieldSpec`]s and holds no
//! behavior of its own; [`crate::validate::validate`] interprets the tables.
//!
//! ## Field semantics
//!
//! Presence and nullability are independent:
//!
//! | presence   | nullable | key absent | `null`   |
//! |------------|----------|------------|----------|
//! | `Required` | no       | rejected   | rejected |
//! | `Required` | yes      | rejected   | accepted |
//! | `Optional` | no       | accepted   | rejected |
//! | `Optional` | yes      | accepted   | accepted |
//!
//! A field with a [`FieldDefault`] is filled in when absent and is never
//! reported missing. A partial schema (see [`ObjectSchema::partial`]) treats
//! every one of its own fields as `Optional`; embedded schemas keep their
//! strict rules.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

/// Whether a key must appear in the input object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Required,
    Optional,
}

/// Value substituted for an absent key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldDefault {
    Bool(bool),
}

impl FieldDefault {
    /// The default as a JSON value.
    pub fn to_value(self) -> Value {
        match self {
            FieldDefault::Bool(b) => Value::Bool(b),
        }
    }
}

/// Shape accepted for a field's value when it is not `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    /// A JSON number representable as `i64`.
    Integer,
    /// Any JSON number.
    Number,
    Boolean,
    /// Opaque value, accepted without inspection (including `null`).
    Any,
    Object(&'static ObjectSchema),
    Array(&'static Kind),
}

impl Kind {
    /// Short name used in type-mismatch diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Any => "any",
            Kind::Object(_) => "object",
            Kind::Array(_) => "array",
        }
    }
}

/// One row of a schema table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub presence: Presence,
    pub nullable: bool,
    pub kind: Kind,
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    /// A key that must be present with a non-null value.
    pub const fn required(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            presence: Presence::Required,
            nullable: false,
            kind,
            default: None,
        }
    }

    /// A key that may be absent but must not be `null` when present.
    pub const fn optional(name: &'static str, kind: Kind) -> Self {
        Self {
            presence: Presence::Optional,
            ..Self::required(name, kind)
        }
    }

    /// Additionally accept an explicit `null`.
    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// Fill in `default` when the key is absent.
    pub const fn with_default(self, default: FieldDefault) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }
}

/// A named record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSchema {
    name: &'static str,
    fields: &'static [FieldSpec],
    partial: bool,
}

impl ObjectSchema {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self {
            name,
            fields,
            partial: false,
        }
    }

    /// Derive the partial variant: same fields, every key optional at this
    /// level. The receiver is left untouched.
    pub const fn partial(self) -> Self {
        Self {
            partial: true,
            ..self
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Look up a field by its wire name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Presence of `field` once this schema's partial flag is applied.
    pub fn presence_of(&self, field: &FieldSpec) -> Presence {
        if self.partial {
            Presence::Optional
        } else {
            field.presence
        }
    }
}

// ---------------------------------------------------------------------------
// Leaf schemas
// ---------------------------------------------------------------------------

const VM_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", Kind::String),
    FieldSpec::required("name", Kind::String),
    FieldSpec::required("status", Kind::String),
    FieldSpec::required("uptime", Kind::String),
    FieldSpec::required("app_url", Kind::String).nullable(),
    FieldSpec::required("app_id", Kind::String),
    FieldSpec::required("instance_id", Kind::String).nullable(),
    // TODO: replace with a VmConfiguration schema once the API documents it.
    FieldSpec::optional("configuration", Kind::Any),
    FieldSpec::required("exited_at", Kind::String).nullable(),
    FieldSpec::required("boot_progress", Kind::String).nullable(),
    FieldSpec::required("boot_error", Kind::String).nullable(),
    FieldSpec::required("shutdown_progress", Kind::String).nullable(),
    FieldSpec::required("image_version", Kind::String).nullable(),
];

/// Hosting provider's raw view of a VM.
pub const VM_INFO: ObjectSchema = ObjectSchema::new("VmInfo", VM_INFO_FIELDS);

const MANAGED_USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", Kind::Integer),
    FieldSpec::required("username", Kind::String),
];

pub const MANAGED_USER: ObjectSchema = ObjectSchema::new("ManagedUser", MANAGED_USER_FIELDS);

const CVM_NODE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", Kind::Integer),
    FieldSpec::required("name", Kind::String),
    FieldSpec::optional("region_identifier", Kind::String),
];

/// Node a CVM is placed on.
pub const CVM_NODE: ObjectSchema = ObjectSchema::new("CvmNode", CVM_NODE_FIELDS);

const CVM_NETWORK_URLS_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("app", Kind::String),
    FieldSpec::required("instance", Kind::String),
];

pub const CVM_NETWORK_URLS: ObjectSchema =
    ObjectSchema::new("CvmNetworkUrls", CVM_NETWORK_URLS_FIELDS);

const KMS_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", Kind::String),
    FieldSpec::required("slug", Kind::String),
    FieldSpec::required("url", Kind::String),
    FieldSpec::required("version", Kind::String),
    FieldSpec::optional("chain_id", Kind::Integer),
    FieldSpec::optional("kms_contract_address", Kind::String),
    FieldSpec::optional("gateway_app_id", Kind::String),
];

/// Key management service backing a CVM.
pub const KMS_INFO: ObjectSchema = ObjectSchema::new("KMSInfo", KMS_INFO_FIELDS);

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

const PUBLIC_URL: Kind = Kind::Object(&CVM_NETWORK_URLS);

const CVM_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("hosted", Kind::Object(&VM_INFO)),
    FieldSpec::required("name", Kind::String),
    FieldSpec::optional("managed_user", Kind::Object(&MANAGED_USER)).nullable(),
    FieldSpec::optional("node", Kind::Object(&CVM_NODE)).nullable(),
    FieldSpec::required("listed", Kind::Boolean).with_default(FieldDefault::Bool(false)),
    FieldSpec::required("status", Kind::String),
    FieldSpec::required("in_progress", Kind::Boolean).with_default(FieldDefault::Bool(false)),
    FieldSpec::required("dapp_dashboard_url", Kind::String).nullable(),
    FieldSpec::required("syslog_endpoint", Kind::String).nullable(),
    FieldSpec::required("allow_upgrade", Kind::Boolean).with_default(FieldDefault::Bool(false)),
    FieldSpec::required("project_id", Kind::String).nullable(),
    FieldSpec::required("project_type", Kind::String).nullable(),
    FieldSpec::required("billing_period", Kind::String).nullable(),
    FieldSpec::required("kms_info", Kind::Object(&KMS_INFO)).nullable(),
    FieldSpec::required("vcpu", Kind::Number).nullable(),
    FieldSpec::required("memory", Kind::Number).nullable(),
    FieldSpec::required("disk_size", Kind::Number).nullable(),
    FieldSpec::required("gateway_domain", Kind::String).nullable(),
    FieldSpec::required("public_urls", Kind::Array(&PUBLIC_URL)),
];

/// `CvmInfo` with each field's own presence rule. Not what the API
/// contract promises; kept for callers that need the strict shape.
pub const CVM_INFO_STRICT: ObjectSchema = ObjectSchema::new("CvmInfo", CVM_INFO_FIELDS);

/// `CvmInfo` as returned by the API: any top-level field may be omitted.
pub const CVM_INFO: ObjectSchema = CVM_INFO_STRICT.partial();

// ---------------------------------------------------------------------------
// Lookup by name
// ---------------------------------------------------------------------------

/// Every schema exposed by this crate, addressable by a kebab-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    VmInfo,
    ManagedUser,
    CvmNode,
    CvmNetworkUrls,
    KmsInfo,
    CvmInfo,
    CvmInfoStrict,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 7] = [
        SchemaKind::VmInfo,
        SchemaKind::ManagedUser,
        SchemaKind::CvmNode,
        SchemaKind::CvmNetworkUrls,
        SchemaKind::KmsInfo,
        SchemaKind::CvmInfo,
        SchemaKind::CvmInfoStrict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::VmInfo => "vm-info",
            SchemaKind::ManagedUser => "managed-user",
            SchemaKind::CvmNode => "cvm-node",
            SchemaKind::CvmNetworkUrls => "cvm-network-urls",
            SchemaKind::KmsInfo => "kms-info",
            SchemaKind::CvmInfo => "cvm-info",
            SchemaKind::CvmInfoStrict => "cvm-info-strict",
        }
    }

    pub fn schema(&self) -> &'static ObjectSchema {
        match self {
            SchemaKind::VmInfo => &VM_INFO,
            SchemaKind::ManagedUser => &MANAGED_USER,
            SchemaKind::CvmNode => &CVM_NODE,
            SchemaKind::CvmNetworkUrls => &CVM_NETWORK_URLS,
            SchemaKind::KmsInfo => &KMS_INFO,
            SchemaKind::CvmInfo => &CVM_INFO,
            SchemaKind::CvmInfoStrict => &CVM_INFO_STRICT,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a schema name does not match any [`SchemaKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown schema {0:?}; expected one of vm-info, managed-user, cvm-node, cvm-network-urls, kms-info, cvm-info, cvm-info-strict")]
pub struct UnknownSchemaKind(pub String);

impl FromStr for SchemaKind {
    type Err = UnknownSchemaKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        SchemaKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownSchemaKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_derivation_leaves_strict_schema_intact() {
        assert!(!CVM_INFO_STRICT.is_partial());
        assert!(CVM_INFO.is_partial());
        assert_eq!(CVM_INFO.name(), CVM_INFO_STRICT.name());
        assert_eq!(CVM_INFO.fields(), CVM_INFO_STRICT.fields());

        let name = CVM_INFO_STRICT.field("name").unwrap();
        assert_eq!(CVM_INFO_STRICT.presence_of(name), Presence::Required);
        assert_eq!(CVM_INFO.presence_of(name), Presence::Optional);
    }

    #[test]
    fn vm_info_distinguishes_nullable_from_optional() {
        let app_url = VM_INFO.field("app_url").unwrap();
        assert_eq!(app_url.presence, Presence::Required);
        assert!(app_url.nullable);

        let configuration = VM_INFO.field("configuration").unwrap();
        assert_eq!(configuration.presence, Presence::Optional);
        assert_eq!(configuration.kind, Kind::Any);
    }

    #[test]
    fn cvm_node_region_is_optional_not_nullable() {
        let region = CVM_NODE.field("region_identifier").unwrap();
        assert_eq!(region.presence, Presence::Optional);
        assert!(!region.nullable);
    }

    #[test]
    fn cvm_info_booleans_default_to_false() {
        for name in ["listed", "in_progress", "allow_upgrade"] {
            let field = CVM_INFO.field(name).unwrap();
            assert_eq!(field.kind, Kind::Boolean);
            assert_eq!(field.default, Some(FieldDefault::Bool(false)), "{name}");
        }
    }

    #[test]
    fn public_urls_embeds_network_urls() {
        let field = CVM_INFO.field("public_urls").unwrap();
        match field.kind {
            Kind::Array(Kind::Object(element)) => assert_eq!(element.name(), "CvmNetworkUrls"),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn field_names_are_unique() {
        for kind in SchemaKind::ALL {
            let schema = kind.schema();
            let mut names: Vec<_> = schema.fields().iter().map(|f| f.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), schema.fields().len(), "{kind}");
        }
    }

    #[test]
    fn schema_kind_parses_its_own_names() {
        for kind in SchemaKind::ALL {
            assert_eq!(kind.as_str().parse::<SchemaKind>().unwrap(), kind);
        }
        assert_eq!("KMS_INFO".parse::<SchemaKind>().unwrap(), SchemaKind::KmsInfo);
        assert!("vm".parse::<SchemaKind>().is_err());
    }
}
