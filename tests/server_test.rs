use argo_touch::bundle::ExtensionBundle;
use argo_touch::config::{Resource, Resources, TouchConfig};
use argo_touch::k8s::{ClientError, ResourceClient};
use argo_touch::server::handlers::{touch_value, TOUCH_ANNOTATION};
use argo_touch::server::{build_router, AppState};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Debug, Clone, PartialEq)]
struct Patched {
    kind: String,
    namespace: String,
    name: String,
    key: String,
    value: String,
}

/// Records patches and answers with a configured API status
#[derive(Default)]
struct FakeClient {
    fail_with: Option<u16>,
    patched: Mutex<Vec<Patched>>,
}

#[async_trait]
impl ResourceClient for FakeClient {
    async fn patch_annotation(
        &self,
        resource: &Resource,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ClientError> {
        if let Some(code) = self.fail_with {
            return Err(ClientError::Api {
                code,
                message: format!("{} \"{}\" not found", resource.name, name),
            });
        }
        self.patched.lock().unwrap().push(Patched {
            kind: resource.kind.clone(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn resolve_names_and_versions(&self, resources: Resources) -> Result<Resources, ClientError> {
        Ok(resources)
    }
}

fn config() -> TouchConfig {
    let mut configmaps = Resource::new("", "ConfigMap");
    configmaps.version = "v1".to_string();
    configmaps.name = "configmaps".to_string();

    let mut resources = Resources::new();
    resources.insert("configmaps", configmaps);

    TouchConfig {
        service_address: "http://touch.test:8080".to_string(),
        extension_template: None,
        resources,
    }
}

fn router(client: Arc<FakeClient>) -> (Router, Arc<ExtensionBundle>) {
    let bundle = ExtensionBundle::new(&config()).unwrap();
    let state = AppState::new(client, bundle);
    let bundle = state.bundle.clone();
    (build_router(state, false), bundle)
}

fn touch_request(path: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("PUT").uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

const VALID_HEADERS: [(&str, &str); 3] = [
    ("Argocd-Application-Name", "argocd:demo"),
    ("Argocd-Project-Name", "default"),
    ("Argocd-Touch-Extension-Name", "configmaps"),
];

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_touch_patches_annotation() {
    let client = Arc::new(FakeClient::default());
    let (app, _) = router(client.clone());

    let mut headers = VALID_HEADERS.to_vec();
    headers.push(("Argocd-Username", "alice"));
    let response = app
        .oneshot(touch_request("/v1/touch/configmaps/default/settings", &headers))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let patched = client.patched.lock().unwrap().clone();
    assert_eq!(patched.len(), 1);
    assert_eq!(patched[0].kind, "ConfigMap");
    assert_eq!(patched[0].namespace, "default");
    assert_eq!(patched[0].name, "settings");
    assert_eq!(patched[0].key, TOUCH_ANNOTATION);
    assert!(patched[0].value.ends_with(" by: alice"), "{}", patched[0].value);
}

#[tokio::test]
async fn test_missing_headers_are_rejected() {
    for missing in 0..VALID_HEADERS.len() {
        let client = Arc::new(FakeClient::default());
        let (app, _) = router(client.clone());

        let headers: Vec<_> = VALID_HEADERS
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != missing)
            .map(|(_, h)| *h)
            .collect();
        let response = app
            .oneshot(touch_request("/v1/touch/configmaps/default/settings", &headers))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(
            body.contains(&format!("Missing required header: {}", VALID_HEADERS[missing].0)),
            "{body}"
        );
        assert!(client.patched.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_extension_name_must_match_path() {
    let client = Arc::new(FakeClient::default());
    let (app, _) = router(client.clone());

    let headers = [
        ("Argocd-Application-Name", "argocd:demo"),
        ("Argocd-Project-Name", "default"),
        ("Argocd-Touch-Extension-Name", "pods"),
    ];
    let response = app
        .oneshot(touch_request("/v1/touch/configmaps/default/settings", &headers))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("Invalid extension name: pods"));
    assert!(client.patched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_resource_key() {
    let (app, _) = router(Arc::new(FakeClient::default()));

    let headers = [
        ("Argocd-Application-Name", "argocd:demo"),
        ("Argocd-Project-Name", "default"),
        ("Argocd-Touch-Extension-Name", "secrets"),
    ];
    let response = app
        .oneshot(touch_request("/v1/touch/secrets/default/token", &headers))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_error_status_is_passed_through() {
    let client = Arc::new(FakeClient {
        fail_with: Some(404),
        ..Default::default()
    });
    let (app, _) = router(client);

    let response = app
        .oneshot(touch_request("/v1/touch/configmaps/default/missing", &VALID_HEADERS))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_string(response).await;
    assert!(body.contains("configmaps \\\"missing\\\" not found"), "{body}");
}

#[tokio::test]
async fn test_extension_artifacts() {
    let (app, bundle) = router(Arc::new(FakeClient::default()));

    let get = |path: &str| Request::builder().uri(path).body(Body::empty()).unwrap();

    let response = app.clone().oneshot(get("/v1/extension/extension-touch.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=extension-touch.js"
    );
    assert_eq!(body_string(response).await, bundle.extension_js());

    let response = app.clone().oneshot(get("/v1/extension/extension_checksum.txt")).await.unwrap();
    assert_eq!(body_string(response).await, bundle.checksum_file());

    let response = app.clone().oneshot(get("/v1/extension/extension.tar.gz")).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.as_ref(), bundle.archive());

    for (path, expected) in [
        ("/v1/extension/config", bundle.argocd_config()),
        ("/v1/extension/deployment", bundle.argocd_deployment()),
        ("/v1/extension/rbac", bundle.proxy_rbac()),
    ] {
        let response = app.clone().oneshot(get(path)).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/yaml");
        assert_eq!(body_string(response).await, expected);
    }
}

#[tokio::test]
async fn test_touch_requires_put() {
    let (app, _) = router(Arc::new(FakeClient::default()));

    let mut request = touch_request("/v1/touch/configmaps/default/settings", &VALID_HEADERS);
    *request.method_mut() = axum::http::Method::GET;
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
fn test_touch_value_format() {
    let anonymous = touch_value(None);
    assert!(chrono::DateTime::parse_from_rfc3339(&anonymous).is_ok(), "{anonymous}");

    let by_user = touch_value(Some("admin"));
    let (timestamp, user) = by_user.split_once(" by: ").unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert_eq!(user, "admin");
}
