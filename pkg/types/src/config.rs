use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quota admission configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// suffix-rules:
///   requestsStorageClassSnapshots: storageclass.storage.k8s.io/volumesnapshots
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaConfigFile {
    /// Extra map-valued limit fields and the suffix appended to each sub-key.
    #[serde(default, alias = "suffix-rules")]
    pub suffix_rules: BTreeMap<String, String>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    let config: T = serde_yaml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("invalid config file {}: {}", path, e))?;
    Ok(config)
}
