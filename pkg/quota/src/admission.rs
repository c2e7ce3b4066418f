//! Project and namespace quota admission checks.
//!
//! Each check normalizes the limits involved, runs [`quota_fits`] and turns
//! the first problem found into a [`FieldViolation`] for the rejection
//! response.

use pkg_types::quota::{ProjectQuotaSpec, ProjectResourceQuota, ResourceQuotaLimit};
use pkg_types::resource::{ResourceList, format_resource_list, resource_names, subtract};
use std::fmt;
use tracing::info;

use crate::fit::quota_fits;
use crate::normalize::LimitNormalizer;

const RESOURCE_QUOTA_PATH: &str = "spec.resourceQuota";
const RESOURCE_QUOTA_LIMIT_PATH: &str = "spec.resourceQuota.limit";
const RESOURCE_QUOTA_USED_LIMIT_PATH: &str = "spec.resourceQuota.usedLimit";
const NAMESPACE_DEFAULT_QUOTA_PATH: &str = "spec.namespaceDefaultResourceQuota";
const NAMESPACE_DEFAULT_QUOTA_LIMIT_PATH: &str = "spec.namespaceDefaultResourceQuota.limit";
const NAMESPACE_QUOTA_LIMIT_PATH: &str = "resourceQuota.limit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldViolation {
    Required { field: String, message: String },
    Invalid { field: String, message: String },
    Forbidden { field: String, message: String },
}

impl FieldViolation {
    fn required(field: &str, message: impl Into<String>) -> Self {
        FieldViolation::Required {
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn invalid(field: &str, message: impl Into<String>) -> Self {
        FieldViolation::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn forbidden(field: &str, message: impl Into<String>) -> Self {
        FieldViolation::Forbidden {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            FieldViolation::Required { field, .. }
            | FieldViolation::Invalid { field, .. }
            | FieldViolation::Forbidden { field, .. } => field,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FieldViolation::Required { message, .. }
            | FieldViolation::Invalid { message, .. }
            | FieldViolation::Forbidden { message, .. } => message,
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field(), self.message())
    }
}

impl std::error::Error for FieldViolation {}

/// Validates project quota specs and namespace quota requests.
#[derive(Debug, Clone, Default)]
pub struct ProjectQuotaValidator {
    normalizer: LimitNormalizer,
}

impl ProjectQuotaValidator {
    pub fn new(normalizer: LimitNormalizer) -> Self {
        Self { normalizer }
    }

    fn normalize(
        &self,
        limit: &ResourceQuotaLimit,
        field: &str,
    ) -> Result<ResourceList, FieldViolation> {
        self.normalizer
            .normalize(limit)
            .map_err(|e| FieldViolation::invalid(field, e.to_string()))
    }

    /// Validate the quota section of a project.
    ///
    /// Both quotas must be set together and name the same resources; the
    /// namespace default and the used limit must each fit the project limit.
    pub fn validate_project(&self, spec: &ProjectQuotaSpec) -> Result<(), FieldViolation> {
        let (project, ns_default) = match (
            &spec.resource_quota,
            &spec.namespace_default_resource_quota,
        ) {
            (None, None) => return Ok(()),
            (Some(_), None) => {
                return Err(reject(FieldViolation::required(
                    NAMESPACE_DEFAULT_QUOTA_PATH,
                    "required when spec.resourceQuota is set",
                )));
            }
            (None, Some(_)) => {
                return Err(reject(FieldViolation::required(
                    RESOURCE_QUOTA_PATH,
                    "required when spec.namespaceDefaultResourceQuota is set",
                )));
            }
            (Some(p), Some(n)) => (p, n),
        };

        let project_limit = self
            .normalize(&project.limit, RESOURCE_QUOTA_LIMIT_PATH)
            .map_err(reject)?;
        let ns_limit = self
            .normalize(&ns_default.limit, NAMESPACE_DEFAULT_QUOTA_LIMIT_PATH)
            .map_err(reject)?;

        let project_names = resource_names(&project_limit);
        let ns_names = resource_names(&ns_limit);
        if project_names != ns_names {
            let mismatched: Vec<&str> = project_names
                .symmetric_difference(&ns_names)
                .map(String::as_str)
                .collect();
            return Err(reject(FieldViolation::invalid(
                NAMESPACE_DEFAULT_QUOTA_LIMIT_PATH,
                format!(
                    "resource quota and namespace default quota must set the same resources, mismatched: {}",
                    mismatched.join(", ")
                ),
            )));
        }

        let (fits, exceeded) = quota_fits(&ns_limit, &project_limit);
        if !fits {
            return Err(reject(FieldViolation::forbidden(
                NAMESPACE_DEFAULT_QUOTA_LIMIT_PATH,
                format!(
                    "namespace default quota limit exceeds project limit on fields: {}",
                    format_resource_list(&exceeded)
                ),
            )));
        }

        let used = self
            .normalize(&project.used_limit, RESOURCE_QUOTA_USED_LIMIT_PATH)
            .map_err(reject)?;
        let (fits, exceeded) = quota_fits(&used, &project_limit);
        if !fits {
            return Err(reject(FieldViolation::forbidden(
                RESOURCE_QUOTA_LIMIT_PATH,
                format!(
                    "resource quota limit is lower than the used limit on fields: {}",
                    format_resource_list(&exceeded)
                ),
            )));
        }

        Ok(())
    }

    /// Check a namespace quota against what the project has left
    /// (`limit - usedLimit`).
    pub fn validate_namespace(
        &self,
        requested: &ResourceQuotaLimit,
        project: &ProjectResourceQuota,
    ) -> Result<(), FieldViolation> {
        let requested = self
            .normalize(requested, NAMESPACE_QUOTA_LIMIT_PATH)
            .map_err(reject)?;
        let project_limit = self
            .normalize(&project.limit, RESOURCE_QUOTA_LIMIT_PATH)
            .map_err(reject)?;
        let used = self
            .normalize(&project.used_limit, RESOURCE_QUOTA_USED_LIMIT_PATH)
            .map_err(reject)?;

        // Only names the project constrains bound the namespace.
        let mut remaining = subtract(&project_limit, &used);
        remaining.retain(|name, _| project_limit.contains_key(name));

        let (fits, exceeded) = quota_fits(&requested, &remaining);
        if !fits {
            return Err(reject(FieldViolation::forbidden(
                NAMESPACE_QUOTA_LIMIT_PATH,
                format!(
                    "namespace quota exceeds the remaining project quota on fields: {}",
                    format_resource_list(&exceeded)
                ),
            )));
        }
        Ok(())
    }
}

fn reject(violation: FieldViolation) -> FieldViolation {
    info!("Rejected quota: {}", violation);
    violation
}
