//! Resource quota naming constants.
//!
//! These must match the field names and resource suffixes used by the
//! upstream admission configuration exactly.

/// Field carrying per-storage-class requested storage (bytes).
pub const STORAGE_CLASS_STORAGE_QUOTA_KEY: &str = "requestsStorageClassStorage";

/// Field carrying per-storage-class persistent volume claim counts.
pub const STORAGE_CLASS_PVC_QUOTA_KEY: &str = "requestsStorageClassPVC";

/// Suffix appended to a storage class name for storage-byte quotas.
pub const STORAGE_CLASS_STORAGE_QUOTA_SUFFIX: &str = "storageclass.storage.k8s.io/requests.storage";

/// Suffix appended to a storage class name for PVC-count quotas.
pub const STORAGE_CLASS_PVC_QUOTA_SUFFIX: &str =
    "storageclass.storage.k8s.io/persistentvolumeclaims";

/// Built-in field → suffix table. Map-valued fields not listed here
/// flatten to their bare sub-keys.
pub const STORAGE_CLASS_QUOTA_SUFFIXES: &[(&str, &str)] = &[
    (
        STORAGE_CLASS_STORAGE_QUOTA_KEY,
        STORAGE_CLASS_STORAGE_QUOTA_SUFFIX,
    ),
    (STORAGE_CLASS_PVC_QUOTA_KEY, STORAGE_CLASS_PVC_QUOTA_SUFFIX),
];
