//! # cvm-schema — CVM Management API Schemas
//!
//! Data shapes exchanged with a confidential VM management API, plus the
//! runtime validation that turns an untyped, already-decoded JSON payload into
//! a typed record or a structured [`ValidationError`].
//!
//! ## Records
//!
//! | Record | Schema | Notes |
//! |--------|--------|-------|
//! | [`VmInfo`] | [`schema::VM_INFO`] | hosting provider view of a VM |
//! | [`ManagedUser`] | [`schema::MANAGED_USER`] | |
//! | [`CvmNode`] | [`schema::CVM_NODE`] | |
//! | [`CvmNetworkUrls`] | [`schema::CVM_NETWORK_URLS`] | |
//! | [`KmsInfo`] | [`schema::KMS_INFO`] | |
//! | [`CvmInfo`] | [`schema::CVM_INFO`] | partial aggregate of the above |
//!
//! ## Design
//!
//! Schemas are `const` tables ([`ObjectSchema`]) read by one interpreter
//! ([`validate()`]). Each record implements [`Record`], whose `parse` runs the
//! interpreter and then decodes the normalized value with serde. The partial
//! `CvmInfo` schema is derived from the strict one with
//! [`ObjectSchema::partial`], so the strict contract stays available.
//!
//! ## Crate Policy
//!
//! - Validation is pure: no I/O, no shared state, safe to call from any thread.
//! - Every issue in a payload is reported, never only the first.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod identity;
pub mod json_schema;
pub mod options;
pub mod record;
pub mod schema;
pub mod tristate;
pub mod types;
pub mod validate;

// Re-export primary types.
pub use identity::HashedId;
pub use json_schema::to_json_schema;
pub use options::{ConfigError, UnknownKeys, ValidationOptions};
pub use record::Record;
pub use schema::{FieldSpec, Kind, ObjectSchema, Presence, SchemaKind};
pub use tristate::Tristate;
pub use types::{CvmInfo, CvmNetworkUrls, CvmNode, KmsInfo, ManagedUser, VmInfo};
pub use validate::{validate, FieldPath, IssueKind, PathSegment, ValidationError, ValidationIssue};
