use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Service address used when none is given on the command line
pub const DEFAULT_SERVICE_ADDRESS: &str = "http://argocd-touch-extension.svc.cluster.local:8080";

static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[A-Za-z0-9_]{3,}$").expect("resource key pattern is valid")
});

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("resource key {key:?} must match pattern {pattern:?}")]
    InvalidKey { key: String, pattern: String },
}

/// Runtime configuration of the touch service
#[derive(Debug, Clone, Default)]
pub struct TouchConfig {
    pub service_address: String,
    /// Optional file overriding the built-in UI extension template
    pub extension_template: Option<PathBuf>,
    pub resources: Resources,
}

/// A Kubernetes resource type that can be touched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    pub kind: String,
    /// Plural resource name as served by the API server, e.g. "configmaps"
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ui_extension: Option<UiExtension>,
}

/// Display settings of the UI extension tab
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiExtension {
    #[serde(default)]
    pub tab_title: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Resource {
    pub fn new(group: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    /// True when discovery still has to fill in the plural name or the version
    pub fn is_incomplete(&self) -> bool {
        self.name.is_empty() || self.version.is_empty()
    }
}

/// Configured resources keyed by their extension key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resources(BTreeMap<String, Resource>);

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, resource: Resource) -> Option<Resource> {
        self.0.insert(key.into(), resource)
    }

    pub fn get(&self, key: &str) -> Option<&Resource> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Resource> {
        self.0.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Resource)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Resource)> {
        self.0.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn needs_resolution(&self) -> bool {
        self.0.values().any(Resource::is_incomplete)
    }

    /// Checks every key against the allowed key pattern
    pub fn validate_keys(&self) -> Result<(), ConfigError> {
        for key in self.0.keys() {
            if !KEY_PATTERN.is_match(key) {
                return Err(ConfigError::InvalidKey {
                    key: key.clone(),
                    pattern: KEY_PATTERN.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Groups the plural resource names by API group, names sorted
    pub fn names_by_group(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for resource in self.0.values() {
            grouped
                .entry(resource.group.clone())
                .or_default()
                .push(resource.name.clone());
        }
        for names in grouped.values_mut() {
            names.sort();
        }
        grouped
    }
}

impl FromIterator<(String, Resource)> for Resources {
    fn from_iter<I: IntoIterator<Item = (String, Resource)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Resources {
    type Item = (&'a String, &'a Resource);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Loads the resource configuration from a JSON, YAML or TOML file
pub fn load(path: &Path) -> Result<TouchConfig, ConfigError> {
    info!("Loading resource configuration from: {:?}", path);

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let resources = parse_resources(&content, extension)?;
    resources.validate_keys()?;
    debug!("Loaded {} resources", resources.len());

    Ok(TouchConfig {
        service_address: DEFAULT_SERVICE_ADDRESS.to_string(),
        extension_template: None,
        resources,
    })
}

/// Parses resources using the format implied by a file extension
pub fn parse_resources(content: &str, extension: &str) -> Result<Resources, ConfigError> {
    match extension {
        "json" => Ok(serde_json::from_str(content)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(content)?),
        "toml" => Ok(toml::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(format!(".{other}"))),
    }
}
