use thiserror::Error;
use tracing::debug;

use crate::config::Resources;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no preferred version found for group {group} and kind {kind}")]
    NotFound { group: String, kind: String },
}

/// A namespaced resource type in the server's preferred version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredResource {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

/// Looks up the plural name and preferred version of `group`/`kind`
pub fn find_name_and_version(
    discovered: &[DiscoveredResource],
    group: &str,
    kind: &str,
) -> Result<(String, String), ResolveError> {
    discovered
        .iter()
        .find(|r| r.group == group && r.kind == kind)
        .map(|r| (r.plural.clone(), r.version.clone()))
        .ok_or_else(|| ResolveError::NotFound {
            group: group.to_string(),
            kind: kind.to_string(),
        })
}

/// Fills in missing names and versions from discovery results.
/// A configured version wins, the plural name is always taken from the server.
pub fn resolve_with(
    mut resources: Resources,
    discovered: &[DiscoveredResource],
) -> Result<Resources, ResolveError> {
    for (key, resource) in resources.iter_mut() {
        let (name, version) = find_name_and_version(discovered, &resource.group, &resource.kind)?;
        if resource.version.is_empty() {
            resource.version = version;
        }
        resource.name = name;
        debug!(
            "Resolved {} to {}/{} {}",
            key, resource.group, resource.version, resource.name
        );
    }
    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resource;

    fn discovered() -> Vec<DiscoveredResource> {
        vec![
            DiscoveredResource {
                group: "".into(),
                version: "v1".into(),
                kind: "ConfigMap".into(),
                plural: "configmaps".into(),
            },
            DiscoveredResource {
                group: "apps".into(),
                version: "v1".into(),
                kind: "Deployment".into(),
                plural: "deployments".into(),
            },
        ]
    }

    #[test]
    fn test_find_core_group() {
        let (name, version) = find_name_and_version(&discovered(), "", "ConfigMap").unwrap();
        assert_eq!(name, "configmaps");
        assert_eq!(version, "v1");
    }

    #[test]
    fn test_find_unknown_kind() {
        let err = find_name_and_version(&discovered(), "apps", "Pod").unwrap_err();
        assert_eq!(
            err.to_string(),
            "no preferred version found for group apps and kind Pod"
        );
    }

    #[test]
    fn test_configured_version_is_kept() {
        let mut resources = Resources::new();
        resources.insert(
            "deploy",
            Resource {
                group: "apps".into(),
                version: "v1beta2".into(),
                kind: "Deployment".into(),
                ..Default::default()
            },
        );

        let resolved = resolve_with(resources, &discovered()).unwrap();
        let deploy = resolved.get("deploy").unwrap();
        assert_eq!(deploy.version, "v1beta2");
        assert_eq!(deploy.name, "deployments");
    }
}
