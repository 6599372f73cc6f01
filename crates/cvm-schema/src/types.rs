//! # Typed Records
//!
//! Rust views of the CVM management API responses. Each struct implements
//! [`Record`], binding it to its table in [`crate::schema`]; decode them with
//! [`Record::parse`] rather than `serde_json::from_value` so the schema rules
//! and defaults apply.
//!
//! Field representation follows the schema flags:
//!
//! - required: plain type
//! - required + nullable: `Option<T>`, always encoded (`null` when `None`)
//! - optional: `Option<T>`, omitted when `None`
//! - optional + nullable: [`Tristate<T>`], omitted only when `Absent`
//!
//! `VmInfo::configuration` is opaque and admits `null`, so it is a
//! `Tristate<Value>` as well.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::HashedId;
use crate::record::Record;
use crate::schema::{
    ObjectSchema, CVM_INFO, CVM_NETWORK_URLS, CVM_NODE, KMS_INFO, MANAGED_USER, VM_INFO,
};
use crate::tristate::Tristate;

/// Hosting provider's raw view of a VM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmInfo {
    pub id: String,
    pub name: String,
    pub status: String,
    pub uptime: String,
    pub app_url: Option<String>,
    pub app_id: String,
    pub instance_id: Option<String>,
    /// Opaque VM configuration, passed through unvalidated. An explicit
    /// `null` is kept apart from an absent key.
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub configuration: Tristate<Value>,
    pub exited_at: Option<String>,
    pub boot_progress: Option<String>,
    pub boot_error: Option<String>,
    pub shutdown_progress: Option<String>,
    pub image_version: Option<String>,
}

impl Record for VmInfo {
    const SCHEMA: &'static ObjectSchema = &VM_INFO;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedUser {
    pub id: i64,
    pub username: String,
}

impl Record for ManagedUser {
    const SCHEMA: &'static ObjectSchema = &MANAGED_USER;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CvmNode {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_identifier: Option<String>,
}

impl Record for CvmNode {
    const SCHEMA: &'static ObjectSchema = &CVM_NODE;
}

/// Reachable endpoints of one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CvmNetworkUrls {
    pub app: String,
    pub instance: String,
}

impl Record for CvmNetworkUrls {
    const SCHEMA: &'static ObjectSchema = &CVM_NETWORK_URLS;
}

/// Key management service metadata (`KMSInfo` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KmsInfo {
    pub id: HashedId,
    pub slug: String,
    pub url: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_contract_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_app_id: Option<String>,
}

impl Record for KmsInfo {
    const SCHEMA: &'static ObjectSchema = &KMS_INFO;
}

/// Aggregate CVM record returned to application code.
///
/// Every field may be missing from the payload. Booleans default to `false`;
/// everything else keeps track of whether it was sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvmInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted: Option<VmInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub managed_user: Tristate<ManagedUser>,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub node: Tristate<CvmNode>,
    #[serde(default)]
    pub listed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub in_progress: bool,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub dapp_dashboard_url: Tristate<String>,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub syslog_endpoint: Tristate<String>,
    #[serde(default)]
    pub allow_upgrade: bool,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub project_id: Tristate<HashedId>,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub project_type: Tristate<String>,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub billing_period: Tristate<String>,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub kms_info: Tristate<KmsInfo>,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub vcpu: Tristate<f64>,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub memory: Tristate<f64>,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub disk_size: Tristate<f64>,
    #[serde(default, skip_serializing_if = "Tristate::is_absent")]
    pub gateway_domain: Tristate<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_urls: Option<Vec<CvmNetworkUrls>>,
}

impl CvmInfo {
    /// Application id of the hosted VM, when the hosted view was sent.
    pub fn app_id(&self) -> Option<&str> {
        self.hosted.as_ref().map(|vm| vm.app_id.as_str())
    }

    /// Public endpoints, empty when none were sent.
    pub fn urls(&self) -> &[CvmNetworkUrls] {
        self.public_urls.as_deref().unwrap_or_default()
    }
}

impl Record for CvmInfo {
    const SCHEMA: &'static ObjectSchema = &CVM_INFO;
}
