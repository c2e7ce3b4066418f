use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared quota limit — every amount is a quantity string such as `"2"`
/// or `"10Gi"`. Unset fields are omitted when encoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceQuotaLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pods: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_controllers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_maps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claims: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services_node_ports: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services_load_balancers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits_memory: Option<String>,
    /// Requested storage per storage class name.
    #[serde(
        default,
        rename = "requestsStorageClassStorage",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub requests_storage_class_storage: BTreeMap<String, String>,
    /// Persistent volume claim count per storage class name.
    #[serde(
        default,
        rename = "requestsStorageClassPVC",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub requests_storage_class_pvc: BTreeMap<String, String>,
    /// Fields this version does not know about, kept as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Project-wide quota: the limit and how much of it namespaces already hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResourceQuota {
    #[serde(default)]
    pub limit: ResourceQuotaLimit,
    #[serde(default)]
    pub used_limit: ResourceQuotaLimit,
}

/// Quota applied to a single namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceResourceQuota {
    #[serde(default)]
    pub limit: ResourceQuotaLimit,
}

/// Quota section of a project spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuotaSpec {
    #[serde(default)]
    pub resource_quota: Option<ProjectResourceQuota>,
    #[serde(default)]
    pub namespace_default_resource_quota: Option<NamespaceResourceQuota>,
}
