use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use tracing::{error, info};

use super::headers::{error_response, header_value, HEADER_ARGOCD_USERNAME};
use super::AppState;
use crate::bundle::{EXTENSION_ARCHIVE, EXTENSION_CHECKSUM, EXTENSION_JS};

/// Annotation written on every touched object
pub const TOUCH_ANNOTATION: &str = "argocd.bakito.ch/touch";

const CONTENT_TYPE_YAML: &str = "application/yaml";
const CONTENT_TYPE_JS: &str = "application/javascript";
const CONTENT_TYPE_TAR: &str = "application/x-tar";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

fn attachment(content_type: &'static str, file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={file_name}"),
            ),
        ],
        body,
    )
        .into_response()
}

fn yaml(body: &str) -> Response {
    ([(header::CONTENT_TYPE, CONTENT_TYPE_YAML)], body.to_string()).into_response()
}

pub async fn archive_handler(State(state): State<AppState>) -> Response {
    attachment(CONTENT_TYPE_TAR, EXTENSION_ARCHIVE, state.bundle.archive().to_vec())
}

pub async fn script_handler(State(state): State<AppState>) -> Response {
    attachment(
        CONTENT_TYPE_JS,
        EXTENSION_JS,
        state.bundle.extension_js().as_bytes().to_vec(),
    )
}

pub async fn checksum_handler(State(state): State<AppState>) -> Response {
    attachment(
        CONTENT_TYPE_TEXT,
        EXTENSION_CHECKSUM,
        state.bundle.checksum_file().into_bytes(),
    )
}

pub async fn config_handler(State(state): State<AppState>) -> Response {
    yaml(state.bundle.argocd_config())
}

pub async fn deployment_handler(State(state): State<AppState>) -> Response {
    yaml(state.bundle.argocd_deployment())
}

pub async fn rbac_handler(State(state): State<AppState>) -> Response {
    yaml(state.bundle.proxy_rbac())
}

/// Value of the touch annotation: the current time, plus the user when known
pub fn touch_value(user: Option<&str>) -> String {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    match user {
        Some(user) => format!("{now} by: {user}"),
        None => now,
    }
}

pub async fn touch_handler(
    State(state): State<AppState>,
    Path((key, namespace, name)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(resource) = state.bundle.resources().get(&key) else {
        return error_response(StatusCode::NOT_FOUND, format!("Unknown resource: {key}"));
    };

    let user = header_value(&headers, HEADER_ARGOCD_USERNAME);
    let value = touch_value(user);

    if let Err(err) = state
        .client
        .patch_annotation(resource, &namespace, &name, TOUCH_ANNOTATION, &value)
        .await
    {
        error!(
            resource = %resource.name,
            namespace = %namespace,
            name = %name,
            user = user.unwrap_or_default(),
            "Failed to touch resource: {}",
            err
        );
        let status = err
            .status_code()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::BAD_REQUEST);
        return error_response(status, err.to_string());
    }

    info!(
        resource = %resource.name,
        namespace = %namespace,
        name = %name,
        user = user.unwrap_or_default(),
        "Resource touched"
    );
    StatusCode::OK.into_response()
}
