use async_trait::async_trait;
use kube::api::{Api, DynamicObject, Patch, PatchParams};
use kube::core::GroupVersionKind;
use kube::discovery::{ApiResource, Discovery, Scope};
use kube::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use super::discovery::{resolve_with, DiscoveredResource, ResolveError};
use crate::config::{Resource, Resources};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { code: u16, message: String },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("kubernetes request failed: {0}")]
    Kube(kube::Error),
}

impl ClientError {
    /// HTTP status reported by the API server, if the request got that far
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<kube::Error> for ClientError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => ClientError::Api {
                code: response.code,
                message: response.message,
            },
            other => ClientError::Kube(other),
        }
    }
}

/// JSON merge patch setting a single annotation
pub fn annotation_patch(key: &str, value: &str) -> Value {
    let mut annotations = serde_json::Map::new();
    annotations.insert(key.to_string(), Value::String(value.to_string()));
    json!({ "metadata": { "annotations": annotations } })
}

/// Cluster operations the touch service depends on
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Sets a single annotation with a JSON merge patch
    async fn patch_annotation(
        &self,
        resource: &Resource,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ClientError>;

    /// Completes plural names and versions of the configured resources
    async fn resolve_names_and_versions(&self, resources: Resources) -> Result<Resources, ClientError>;
}

/// `ResourceClient` talking to a live API server through kube
#[derive(Clone)]
pub struct KubeResourceClient {
    client: Client,
}

impl KubeResourceClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn discover(&self) -> Result<Vec<DiscoveredResource>, ClientError> {
        let discovery = Discovery::new(self.client.clone()).run().await?;
        let mut discovered = Vec::new();
        for group in discovery.groups() {
            for (resource, caps) in group.recommended_resources() {
                if !matches!(caps.scope, Scope::Namespaced) {
                    continue;
                }
                discovered.push(DiscoveredResource {
                    group: resource.group,
                    version: resource.version,
                    kind: resource.kind,
                    plural: resource.plural,
                });
            }
        }
        debug!("Discovered {} namespaced resource types", discovered.len());
        Ok(discovered)
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn patch_annotation(
        &self,
        resource: &Resource,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ClientError> {
        let gvk = GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind);
        let api_resource = ApiResource::from_gvk_with_plural(&gvk, &resource.name);
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &api_resource);

        let patch = annotation_patch(key, value);
        api.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }

    async fn resolve_names_and_versions(&self, resources: Resources) -> Result<Resources, ClientError> {
        if !resources.needs_resolution() {
            return Ok(resources);
        }
        info!("Resolving resource names and versions from the API server");
        let discovered = self.discover().await?;
        Ok(resolve_with(resources, &discovered)?)
    }
}
