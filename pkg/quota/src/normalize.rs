use pkg_constants::quota::STORAGE_CLASS_QUOTA_SUFFIXES;
use pkg_types::config::{QuotaConfigFile, load_config_file};
use pkg_types::quantity::{ParseQuantityError, Quantity};
use pkg_types::quota::ResourceQuotaLimit;
use pkg_types::resource::ResourceList;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("failed to encode quota limit: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid quantity {value:?} for {resource}: {source}")]
    Quantity {
        resource: String,
        value: String,
        source: ParseQuantityError,
    },
}

/// Field name → suffix appended to each sub-key of that map-valued field.
#[derive(Debug, Clone)]
pub struct SuffixRules {
    rules: BTreeMap<String, String>,
}

impl SuffixRules {
    /// Extend the built-in rules. Built-in fields keep their suffix.
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut rules = Self::default();
        for (field, suffix) in extra {
            if rules.rules.contains_key(field) {
                warn!("Ignoring suffix rule for built-in field {}", field);
                continue;
            }
            rules.rules.insert(field.clone(), suffix.clone());
        }
        rules
    }

    pub fn suffix_for(&self, field: &str) -> Option<&str> {
        self.rules.get(field).map(String::as_str)
    }

    /// `<sub_key>.<suffix>` for fields with a rule, the bare sub-key otherwise.
    pub fn resource_name(&self, field: &str, sub_key: &str) -> String {
        match self.suffix_for(field) {
            Some(suffix) => format!("{}.{}", sub_key, suffix),
            None => sub_key.to_string(),
        }
    }
}

impl Default for SuffixRules {
    fn default() -> Self {
        Self {
            rules: STORAGE_CLASS_QUOTA_SUFFIXES
                .iter()
                .map(|(field, suffix)| (field.to_string(), suffix.to_string()))
                .collect(),
        }
    }
}

/// Shape of one encoded limit field.
enum EncodedValue<'a> {
    Scalar(&'a str),
    SubMap(&'a Map<String, Value>),
    Other,
}

impl<'a> From<&'a Value> for EncodedValue<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(s) => EncodedValue::Scalar(s),
            Value::Object(m) => EncodedValue::SubMap(m),
            _ => EncodedValue::Other,
        }
    }
}

fn parse(resource: &str, value: &str) -> Result<Quantity, ConvertError> {
    Quantity::parse(value).map_err(|source| ConvertError::Quantity {
        resource: resource.to_string(),
        value: value.to_string(),
        source,
    })
}

/// Flattens a [`ResourceQuotaLimit`] into a [`ResourceList`].
///
/// Scalar fields keep their field name. Map-valued fields contribute one
/// entry per sub-key, named by [`SuffixRules`]. Values of any other shape
/// are skipped, as are sub-map entries that are not strings. When two
/// fields produce the same name, the later one wins.
#[derive(Debug, Clone, Default)]
pub struct LimitNormalizer {
    rules: SuffixRules,
}

impl LimitNormalizer {
    pub fn new(rules: SuffixRules) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &QuotaConfigFile) -> Self {
        Self::new(SuffixRules::with_extra(&config.suffix_rules))
    }

    /// Build from a YAML config file; a missing file means built-in rules only.
    pub fn from_config_file(path: &str) -> anyhow::Result<Self> {
        let config: QuotaConfigFile = load_config_file(path)?;
        Ok(Self::from_config(&config))
    }

    pub fn rules(&self) -> &SuffixRules {
        &self.rules
    }

    /// Convert a limit into a flat resource list. Fails on the first value
    /// that is not a valid quantity.
    pub fn normalize(&self, limit: &ResourceQuotaLimit) -> Result<ResourceList, ConvertError> {
        let encoded = match serde_json::to_value(limit)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };

        let mut list = ResourceList::new();
        for (field, value) in &encoded {
            match EncodedValue::from(value) {
                EncodedValue::Scalar(s) => {
                    list.insert(field.clone(), parse(field, s)?);
                }
                EncodedValue::SubMap(entries) => {
                    for (sub_key, v) in entries {
                        let Some(s) = v.as_str() else {
                            continue;
                        };
                        let name = self.rules.resource_name(field, sub_key);
                        let quantity = parse(&name, s)?;
                        list.insert(name, quantity);
                    }
                }
                EncodedValue::Other => {}
            }
        }

        debug!("Normalized quota limit: {:?}", list);
        Ok(list)
    }
}

/// [`LimitNormalizer::normalize`] with the built-in suffix rules.
pub fn convert_limit_to_resource_list(
    limit: &ResourceQuotaLimit,
) -> Result<ResourceList, ConvertError> {
    LimitNormalizer::default().normalize(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_constants::quota::{
        STORAGE_CLASS_PVC_QUOTA_KEY, STORAGE_CLASS_PVC_QUOTA_SUFFIX,
        STORAGE_CLASS_STORAGE_QUOTA_KEY, STORAGE_CLASS_STORAGE_QUOTA_SUFFIX,
    };
    use serde_json::json;

    fn q(s: &str) -> Quantity {
        Quantity::parse(s).unwrap()
    }

    fn limit(value: Value) -> ResourceQuotaLimit {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn scalar_fields_keep_their_names() {
        let list = convert_limit_to_resource_list(&limit(json!({
            "pods": "10",
            "requestsCpu": "500m",
            "limitsMemory": "2Gi",
        })))
        .unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list["pods"], q("10"));
        assert_eq!(list["requestsCpu"], q("500m"));
        assert_eq!(list["limitsMemory"], q("2Gi"));
    }

    #[test]
    fn storage_class_storage_gets_storage_suffix() {
        let list = convert_limit_to_resource_list(&limit(json!({
            STORAGE_CLASS_STORAGE_QUOTA_KEY: { "gold": "10Gi" },
        })))
        .unwrap();
        let name = format!("gold.{}", STORAGE_CLASS_STORAGE_QUOTA_SUFFIX);
        assert_eq!(list.len(), 1);
        assert_eq!(list[&name], q("10Gi"));
    }

    #[test]
    fn storage_class_pvc_gets_pvc_suffix() {
        let list = convert_limit_to_resource_list(&limit(json!({
            STORAGE_CLASS_PVC_QUOTA_KEY: { "gold": "3", "bronze": "1" },
        })))
        .unwrap();
        assert_eq!(
            list[&format!("gold.{}", STORAGE_CLASS_PVC_QUOTA_SUFFIX)],
            q("3")
        );
        assert_eq!(
            list[&format!("bronze.{}", STORAGE_CLASS_PVC_QUOTA_SUFFIX)],
            q("1")
        );
    }

    #[test]
    fn invalid_scalar_fails_whole_conversion() {
        let err = convert_limit_to_resource_list(&limit(json!({
            "pods": "10",
            "requestsCpu": "lots",
        })))
        .unwrap_err();
        match err {
            ConvertError::Quantity {
                resource, value, ..
            } => {
                assert_eq!(resource, "requestsCpu");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_sub_map_value_fails_whole_conversion() {
        let err = convert_limit_to_resource_list(&limit(json!({
            "pods": "10",
            STORAGE_CLASS_STORAGE_QUOTA_KEY: { "gold": "10Gx" },
        })))
        .unwrap_err();
        assert!(err.to_string().contains("gold."));
    }

    // Unrecognized shapes are treated as absent so newer schemas still load.
    #[test]
    fn unrecognized_shapes_are_skipped_intentionally() {
        let list = convert_limit_to_resource_list(&limit(json!({
            "pods": "10",
            "replicas": 3,
            "enabled": true,
            "zones": ["a", "b"],
            "requestsGpuByModel": { "a100": 3, "h100": "2" },
        })))
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list["pods"], q("10"));
        assert_eq!(list["h100"], q("2"));
    }

    #[test]
    fn unknown_map_fields_use_bare_sub_keys() {
        let list = convert_limit_to_resource_list(&limit(json!({
            "requestsGpuByModel": { "a100": "4" },
        })))
        .unwrap();
        assert_eq!(list["a100"], q("4"));
    }

    // Colliding names resolve last-write-wins without an error.
    #[test]
    fn colliding_names_overwrite_intentionally() {
        // Fields are visited in name order, so "zz" is written after "pods".
        let list = convert_limit_to_resource_list(&limit(json!({
            "pods": "10",
            "zzPodsByClass": { "pods": "99" },
        })))
        .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list["pods"], q("99"));
    }

    #[test]
    fn empty_limit_gives_empty_list() {
        let list = convert_limit_to_resource_list(&ResourceQuotaLimit::default()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn normalize_is_repeatable() {
        let record = limit(json!({
            "limitsCpu": "4",
            "requestsStorageClassPVC": { "silver": "5" },
        }));
        let normalizer = LimitNormalizer::default();
        let first = normalizer.normalize(&record).unwrap();
        let second = normalizer.normalize(&record).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            vec![
                "limitsCpu",
                "silver.storageclass.storage.k8s.io/persistentvolumeclaims"
            ]
        );
    }

    #[test]
    fn extra_rules_add_suffixes() {
        let mut extra = BTreeMap::new();
        extra.insert(
            "requestsStorageClassSnapshots".to_string(),
            "storageclass.storage.k8s.io/volumesnapshots".to_string(),
        );
        extra.insert(
            STORAGE_CLASS_PVC_QUOTA_KEY.to_string(),
            "overridden".to_string(),
        );
        let normalizer = LimitNormalizer::new(SuffixRules::with_extra(&extra));
        assert_eq!(
            normalizer.rules().suffix_for(STORAGE_CLASS_PVC_QUOTA_KEY),
            Some(STORAGE_CLASS_PVC_QUOTA_SUFFIX)
        );

        let list = normalizer
            .normalize(&limit(json!({
                "requestsStorageClassSnapshots": { "gold": "7" },
            })))
            .unwrap();
        assert_eq!(
            list["gold.storageclass.storage.k8s.io/volumesnapshots"],
            q("7")
        );
    }

    #[test]
    fn missing_config_file_uses_built_in_rules() {
        let normalizer = LimitNormalizer::from_config_file("/nonexistent/quota.yaml").unwrap();
        assert_eq!(
            normalizer.rules().suffix_for(STORAGE_CLASS_STORAGE_QUOTA_KEY),
            Some(STORAGE_CLASS_STORAGE_QUOTA_SUFFIX)
        );
        assert_eq!(normalizer.rules().suffix_for("pods"), None);
    }
}
