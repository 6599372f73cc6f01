//! # Runtime Validation
//!
//! A single interpreter for the tables in [`crate::schema`]. [`validate`] walks
//! an untyped [`serde_json::Value`] against an [`ObjectSchema`], records every
//! violation it finds in one pass, and on success returns a normalized copy of
//! the input: declared fields only, with defaults filled in.
//!
//! Violations are reported as [`ValidationIssue`]s, each carrying the
//! [`FieldPath`] from the record root (`public_urls[0].instance`) and an
//! [`IssueKind`]. Issues found inside an array element are wrapped in
//! [`IssueKind::ElementValidationFailed`] so callers can tell element failures
//! from failures of the field itself.

use std::fmt;

use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::options::{UnknownKeys, ValidationOptions};
use crate::schema::{Kind, ObjectSchema, Presence};

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// One step from a container to a child value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value relative to the record root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The record root itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// A required key is absent.
    RequiredFieldMissing,
    /// The value has the wrong JSON type. Strings are never coerced.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// The value is `null` but the field is not nullable.
    NullNotPermitted,
    /// An element of an array failed its element schema.
    ElementValidationFailed { cause: Box<IssueKind> },
    /// A key the schema does not declare, under [`UnknownKeys::Reject`].
    UnknownField,
    /// The validated value could not be decoded into its typed record.
    Undecodable { message: String },
}

impl IssueKind {
    /// Stable kebab-case identifier for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::RequiredFieldMissing => "required-field-missing",
            IssueKind::TypeMismatch { .. } => "type-mismatch",
            IssueKind::NullNotPermitted => "null-not-permitted",
            IssueKind::ElementValidationFailed { .. } => "element-validation-failed",
            IssueKind::UnknownField => "unknown-field",
            IssueKind::Undecodable { .. } => "undecodable",
        }
    }

    /// The innermost cause, unwrapping element failures.
    pub fn root_cause(&self) -> &IssueKind {
        match self {
            IssueKind::ElementValidationFailed { cause } => cause.root_cause(),
            other => other,
        }
    }

    fn within_element(self) -> Self {
        match self {
            wrapped @ IssueKind::ElementValidationFailed { .. } => wrapped,
            cause => IssueKind::ElementValidationFailed {
                cause: Box::new(cause),
            },
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::RequiredFieldMissing => f.write_str("required field is missing"),
            IssueKind::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            IssueKind::NullNotPermitted => f.write_str("null is not permitted"),
            IssueKind::ElementValidationFailed { cause } => {
                write!(f, "array element failed validation: {cause}")
            }
            IssueKind::UnknownField => f.write_str("field is not part of the schema"),
            IssueKind::Undecodable { message } => {
                write!(f, "value could not be decoded: {message}")
            }
        }
    }
}

/// A single violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: FieldPath,
    pub kind: IssueKind,
}

impl ValidationIssue {
    fn within_element(self) -> Self {
        Self {
            path: self.path,
            kind: self.kind.within_element(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// A payload did not conform to its schema.
///
/// Carries every issue found, in input traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{schema} failed validation with {} issue(s)", .issues.len())]
pub struct ValidationError {
    schema: &'static str,
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(schema: &'static str, issues: Vec<ValidationIssue>) -> Self {
        Self { schema, issues }
    }

    /// Wrap a decode failure of an already-validated value.
    pub(crate) fn undecodable(schema: &'static str, err: &serde_json::Error) -> Self {
        Self::new(
            schema,
            vec![ValidationIssue {
                path: FieldPath::root(),
                kind: IssueKind::Undecodable {
                    message: err.to_string(),
                },
            }],
        )
    }

    /// Name of the schema that was violated.
    pub fn schema(&self) -> &'static str {
        self.schema
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    /// First issue whose rendered path equals `path` (e.g. `"public_urls[0].app"`).
    pub fn issue_at(&self, path: &str) -> Option<&ValidationIssue> {
        self.issues.iter().find(|issue| issue.path.to_string() == path)
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// Validate `value` against `schema`.
///
/// Returns the normalized object on success. Keys the schema does not declare
/// are dropped under [`UnknownKeys::Ignore`] and reported under
/// [`UnknownKeys::Reject`].
pub fn validate(
    value: &Value,
    schema: &ObjectSchema,
    options: &ValidationOptions,
) -> Result<Value, ValidationError> {
    let mut walker = Walker {
        options,
        path: FieldPath::root(),
        issues: Vec::new(),
    };
    let normalized = walker.object(value, schema);

    if walker.issues.is_empty() {
        debug!(schema = schema.name(), "payload accepted");
        Ok(normalized)
    } else {
        debug!(
            schema = schema.name(),
            issues = walker.issues.len(),
            "payload rejected"
        );
        Err(ValidationError::new(schema.name(), walker.issues))
    }
}

struct Walker<'a> {
    options: &'a ValidationOptions,
    path: FieldPath,
    issues: Vec<ValidationIssue>,
}

impl Walker<'_> {
    fn report(&mut self, kind: IssueKind) {
        self.issues.push(ValidationIssue {
            path: self.path.clone(),
            kind,
        });
    }

    fn mismatch(&mut self, expected: &Kind, found: &Value) {
        self.report(IssueKind::TypeMismatch {
            expected: expected.describe(),
            found: json_type(found),
        });
    }

    fn object(&mut self, value: &Value, schema: &ObjectSchema) -> Value {
        let Value::Object(input) = value else {
            self.report(IssueKind::TypeMismatch {
                expected: "object",
                found: json_type(value),
            });
            return Value::Null;
        };

        let mut out = Map::new();
        for field in schema.fields() {
            self.path.push(PathSegment::Key(field.name.to_string()));
            match input.get(field.name) {
                None => {
                    if let Some(default) = field.default {
                        out.insert(field.name.to_string(), default.to_value());
                    } else if schema.presence_of(field) == Presence::Required {
                        self.report(IssueKind::RequiredFieldMissing);
                    }
                }
                Some(Value::Null) if field.nullable || matches!(field.kind, Kind::Any) => {
                    out.insert(field.name.to_string(), Value::Null);
                }
                Some(Value::Null) => self.report(IssueKind::NullNotPermitted),
                Some(present) => {
                    let checked = self.value(present, &field.kind);
                    out.insert(field.name.to_string(), checked);
                }
            }
            self.path.pop();
        }

        for key in input.keys().filter(|key| schema.field(key).is_none()) {
            match self.options.unknown_keys {
                UnknownKeys::Ignore => {
                    trace!(schema = schema.name(), key = %key, "ignoring unknown key");
                }
                UnknownKeys::Reject => {
                    self.path.push(PathSegment::Key(key.clone()));
                    self.report(IssueKind::UnknownField);
                    self.path.pop();
                }
            }
        }

        Value::Object(out)
    }

    fn value(&mut self, value: &Value, kind: &Kind) -> Value {
        match (kind, value) {
            (Kind::Any, _)
            | (Kind::String, Value::String(_))
            | (Kind::Number, Value::Number(_))
            | (Kind::Boolean, Value::Bool(_)) => value.clone(),
            (Kind::Integer, Value::Number(n)) if n.is_i64() => value.clone(),
            (Kind::Integer, Value::Number(n)) => match whole_i64(n) {
                Some(whole) => Value::from(whole),
                None => {
                    self.mismatch(kind, value);
                    Value::Null
                }
            },
            (Kind::Object(schema), Value::Object(_)) => self.object(value, schema),
            (Kind::Array(element), Value::Array(items)) => self.array(items, element),
            (_, Value::Null) => {
                self.report(IssueKind::NullNotPermitted);
                Value::Null
            }
            _ => {
                self.mismatch(kind, value);
                Value::Null
            }
        }
    }

    fn array(&mut self, items: &[Value], element: &Kind) -> Value {
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            self.path.push(PathSegment::Index(index));
            let first_new = self.issues.len();
            out.push(self.value(item, element));
            if self.issues.len() > first_new {
                let nested: Vec<_> = self.issues.drain(first_new..).collect();
                self.issues
                    .extend(nested.into_iter().map(ValidationIssue::within_element));
            }
            self.path.pop();
        }
        Value::Array(out)
    }
}

/// A float with no fractional part inside the `i64` range, as an `i64`.
fn whole_i64(n: &Number) -> Option<i64> {
    let f = n.as_f64()?;
    // -2^63 is exact in f64; 2^63 is the first value past i64::MAX.
    let in_range = (-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&f);
    (n.is_f64() && f.fract() == 0.0 && in_range).then(|| f as i64)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(n) if n.is_u64() => "integer out of range",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CVM_INFO, CVM_INFO_STRICT, CVM_NODE, KMS_INFO, MANAGED_USER, VM_INFO};
    use serde_json::json;

    fn vm_info() -> Value {
        json!({
            "id": "vm-1",
            "name": "demo",
            "status": "running",
            "uptime": "3h",
            "app_url": null,
            "app_id": "app-1",
            "instance_id": null,
            "exited_at": null,
            "boot_progress": null,
            "boot_error": null,
            "shutdown_progress": null,
            "image_version": null
        })
    }

    fn defaults() -> ValidationOptions {
        ValidationOptions::default()
    }

    #[test]
    fn missing_required_field_reported_at_its_path() {
        let mut input = vm_info();
        input.as_object_mut().unwrap().remove("id");

        let err = validate(&input, &VM_INFO, &defaults()).unwrap_err();
        assert_eq!(err.schema(), "VmInfo");
        assert_eq!(err.issues().len(), 1);
        let issue = err.issue_at("id").unwrap();
        assert_eq!(issue.kind, IssueKind::RequiredFieldMissing);
    }

    #[test]
    fn nullable_field_accepts_null_but_not_absence() {
        assert!(validate(&vm_info(), &VM_INFO, &defaults()).is_ok());

        let mut input = vm_info();
        input.as_object_mut().unwrap().remove("app_url");
        let err = validate(&input, &VM_INFO, &defaults()).unwrap_err();
        assert_eq!(
            err.issue_at("app_url").unwrap().kind,
            IssueKind::RequiredFieldMissing
        );
    }

    #[test]
    fn null_rejected_for_non_nullable_field() {
        let mut input = vm_info();
        input["name"] = Value::Null;
        let err = validate(&input, &VM_INFO, &defaults()).unwrap_err();
        assert_eq!(err.issue_at("name").unwrap().kind, IssueKind::NullNotPermitted);
    }

    #[test]
    fn optional_field_rejects_null() {
        let input = json!({"id": 1, "name": "node-a", "region_identifier": null});
        let err = validate(&input, &CVM_NODE, &defaults()).unwrap_err();
        assert_eq!(
            err.issue_at("region_identifier").unwrap().kind,
            IssueKind::NullNotPermitted
        );
    }

    #[test]
    fn opaque_configuration_accepts_any_shape() {
        for configuration in [json!(null), json!({"cpu": 2}), json!([1, "x"]), json!("raw")] {
            let mut input = vm_info();
            input["configuration"] = configuration.clone();
            let normalized = validate(&input, &VM_INFO, &defaults()).unwrap();
            assert_eq!(normalized["configuration"], configuration);
        }
    }

    #[test]
    fn numbers_are_not_coerced_from_strings() {
        let input = json!({"id": "7", "username": "alice"});
        let err = validate(&input, &MANAGED_USER, &defaults()).unwrap_err();
        assert_eq!(
            err.issue_at("id").unwrap().kind,
            IssueKind::TypeMismatch {
                expected: "integer",
                found: "string"
            }
        );
    }

    #[test]
    fn integer_field_rejects_fractional_number() {
        let input = json!({"id": 1.5, "username": "alice"});
        let err = validate(&input, &MANAGED_USER, &defaults()).unwrap_err();
        assert_eq!(
            err.issue_at("id").unwrap().kind,
            IssueKind::TypeMismatch {
                expected: "integer",
                found: "number"
            }
        );
    }

    #[test]
    fn integer_field_accepts_whole_float_as_i64() {
        let input = json!({"id": 7.0, "username": "alice"});
        let normalized = validate(&input, &MANAGED_USER, &defaults()).unwrap();
        assert!(normalized["id"].is_i64());
        assert_eq!(normalized["id"], json!(7));
    }

    #[test]
    fn integer_field_rejects_u64_beyond_i64() {
        let input = json!({"id": u64::MAX, "username": "alice"});
        let err = validate(&input, &MANAGED_USER, &defaults()).unwrap_err();
        assert_eq!(
            err.issue_at("id").unwrap().kind,
            IssueKind::TypeMismatch {
                expected: "integer",
                found: "integer out of range"
            }
        );
    }

    #[test]
    fn integer_field_rejects_whole_float_beyond_i64() {
        let input = json!({"id": 1.0e19, "username": "alice"});
        let err = validate(&input, &MANAGED_USER, &defaults()).unwrap_err();
        assert_eq!(err.issue_at("id").unwrap().kind.code(), "type-mismatch");
    }

    #[test]
    fn all_issues_collected_in_one_pass() {
        let input = json!({"slug": 5, "url": null, "chain_id": "x"});
        let err = validate(&input, &KMS_INFO, &defaults()).unwrap_err();
        let codes: Vec<_> = err
            .issues()
            .iter()
            .map(|i| (i.path.to_string(), i.kind.code()))
            .collect();
        assert_eq!(
            codes,
            vec![
                ("id".to_string(), "required-field-missing"),
                ("slug".to_string(), "type-mismatch"),
                ("url".to_string(), "null-not-permitted"),
                ("version".to_string(), "required-field-missing"),
                ("chain_id".to_string(), "type-mismatch"),
            ]
        );
    }

    #[test]
    fn non_object_root_is_a_type_mismatch() {
        let err = validate(&json!([1, 2]), &CVM_NODE, &defaults()).unwrap_err();
        let issue = &err.issues()[0];
        assert!(issue.path.is_root());
        assert_eq!(issue.path.to_string(), "(root)");
        assert_eq!(
            issue.kind,
            IssueKind::TypeMismatch {
                expected: "object",
                found: "array"
            }
        );
    }

    #[test]
    fn unknown_keys_ignored_and_dropped_by_default() {
        let input = json!({"id": 1, "name": "node-a", "rack": "r7"});
        let normalized = validate(&input, &CVM_NODE, &defaults()).unwrap();
        assert_eq!(normalized, json!({"id": 1, "name": "node-a"}));
    }

    #[test]
    fn unknown_keys_reported_under_reject() {
        let options = ValidationOptions::new(UnknownKeys::Reject);
        let input = json!({"id": 1, "name": "node-a", "rack": "r7"});
        let err = validate(&input, &CVM_NODE, &options).unwrap_err();
        assert_eq!(err.issue_at("rack").unwrap().kind, IssueKind::UnknownField);
    }

    #[test]
    fn element_failures_are_wrapped_with_cause() {
        let input = json!({"public_urls": [{"app": "a1", "instance": "i1"}, {"app": "a2"}]});
        let err = validate(&input, &CVM_INFO, &defaults()).unwrap_err();
        let issue = err.issue_at("public_urls[1].instance").unwrap();
        assert_eq!(issue.kind.code(), "element-validation-failed");
        assert_eq!(issue.kind.root_cause(), &IssueKind::RequiredFieldMissing);
    }

    #[test]
    fn null_array_element_is_wrapped_null_not_permitted() {
        let input = json!({"public_urls": [null]});
        let err = validate(&input, &CVM_INFO, &defaults()).unwrap_err();
        let issue = err.issue_at("public_urls[0]").unwrap();
        assert_eq!(
            issue.kind,
            IssueKind::ElementValidationFailed {
                cause: Box::new(IssueKind::NullNotPermitted)
            }
        );
    }

    #[test]
    fn nested_leaf_stays_strict_inside_partial_aggregate() {
        let input = json!({"hosted": {"id": "vm-1"}});
        let err = validate(&input, &CVM_INFO, &defaults()).unwrap_err();
        assert!(err.issue_at("hosted.name").is_some());
        assert!(err.issue_at("name").is_none());
    }

    #[test]
    fn strict_aggregate_still_requires_top_level_fields() {
        let err = validate(&json!({}), &CVM_INFO_STRICT, &defaults()).unwrap_err();
        for path in ["hosted", "name", "status", "kms_info", "public_urls"] {
            assert_eq!(
                err.issue_at(path).map(|i| &i.kind),
                Some(&IssueKind::RequiredFieldMissing),
                "{path}"
            );
        }
        assert!(err.issue_at("listed").is_none());
        assert!(err.issue_at("managed_user").is_none());
    }

    #[test]
    fn defaults_filled_into_normalized_value() {
        let normalized = validate(&json!({}), &CVM_INFO, &defaults()).unwrap();
        assert_eq!(
            normalized,
            json!({"listed": false, "in_progress": false, "allow_upgrade": false})
        );
    }

    #[test]
    fn path_display_joins_keys_and_indices() {
        let path = FieldPath::from_segments(vec![
            PathSegment::Key("public_urls".into()),
            PathSegment::Index(0),
            PathSegment::Key("instance".into()),
        ]);
        assert_eq!(path.to_string(), "public_urls[0].instance");
    }

    #[test]
    fn error_display_counts_issues() {
        let err = validate(&json!({}), &MANAGED_USER, &defaults()).unwrap_err();
        assert_eq!(err.to_string(), "ManagedUser failed validation with 2 issue(s)");
        assert_eq!(
            err.issues()[0].to_string(),
            "id: required field is missing"
        );
    }
}
