use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::TOUCH_API_PATH;

pub const HEADER_ARGOCD_APP_NAME: &str = "Argocd-Application-Name";
pub const HEADER_ARGOCD_PROJECT_NAME: &str = "Argocd-Project-Name";
pub const HEADER_ARGOCD_EXTENSION_NAME: &str = "Argocd-Touch-Extension-Name";
pub const HEADER_ARGOCD_USERNAME: &str = "Argocd-Username";

/// JSON error body shared by all handlers
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

fn require_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, Response> {
    header_value(headers, name).ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Missing required header: {name}"),
        )
    })
}

/// Rejects touch requests that did not come through the Argo CD proxy extension.
/// The extension name header must match the resource key in the path.
pub async fn validate_argocd_headers(request: Request, next: Next) -> Response {
    let headers = request.headers();
    let checked = require_header(headers, HEADER_ARGOCD_APP_NAME)
        .and_then(|_| require_header(headers, HEADER_ARGOCD_PROJECT_NAME))
        .and_then(|_| require_header(headers, HEADER_ARGOCD_EXTENSION_NAME));

    let extension_name = match checked {
        Ok(name) => name.to_string(),
        Err(response) => return response,
    };

    let expected_prefix = format!("{TOUCH_API_PATH}/{extension_name}/");
    if !request.uri().path().starts_with(&expected_prefix) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid extension name: {extension_name}"),
        );
    }

    next.run(request).await
}
