use argo_touch::config::{self, ConfigError, Resource};
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, file: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(file);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_yaml() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "touch.yaml",
        r#"
configmaps:
  group: ""
  kind: ConfigMap
pods:
  kind: Pod
  version: v1
  uiExtension:
    tabTitle: Touch Pod
    icon: fa-box
"#,
    );

    let cfg = config::load(&path).unwrap();
    assert_eq!(cfg.resources.len(), 2);
    assert_eq!(cfg.service_address, config::DEFAULT_SERVICE_ADDRESS);
    assert!(cfg.resources.needs_resolution());

    let pods = cfg.resources.get("pods").unwrap();
    assert_eq!(pods.group, "");
    assert_eq!(pods.version, "v1");
    let ui = pods.ui_extension.as_ref().unwrap();
    assert_eq!(ui.tab_title.as_deref(), Some("Touch Pod"));
    assert_eq!(ui.icon.as_deref(), Some("fa-box"));
}

#[test]
fn test_load_json() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "touch.json",
        r#"{"deployments": {"group": "apps", "version": "v1", "kind": "Deployment", "name": "deployments"}}"#,
    );

    let cfg = config::load(&path).unwrap();
    let expected = Resource {
        group: "apps".into(),
        version: "v1".into(),
        kind: "Deployment".into(),
        name: "deployments".into(),
        ui_extension: None,
    };
    assert_eq!(cfg.resources.get("deployments"), Some(&expected));
    assert!(!cfg.resources.needs_resolution());
}

#[test]
fn test_load_toml() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "touch.toml",
        r#"
[serviceaccounts]
kind = "ServiceAccount"

[serviceaccounts.uiExtension]
icon = "fa-user"
"#,
    );

    let cfg = config::load(&path).unwrap();
    let sa = cfg.resources.get("serviceaccounts").unwrap();
    assert_eq!(sa.kind, "ServiceAccount");
    assert_eq!(sa.ui_extension.as_ref().and_then(|ui| ui.icon.as_deref()), Some("fa-user"));
}

#[test]
fn test_invalid_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "touch.yaml", "config-maps:\n  kind: ConfigMap\n");

    let err = config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidKey { ref key, .. } if key == "config-maps"));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "touch.ini", "[configmaps]\n");

    let err = config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == ".ini"));
}

#[test]
fn test_missing_file() {
    let err = config::load(std::path::Path::new("/nonexistent/touch.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_kind_is_required() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "touch.yaml", "configmaps:\n  group: \"\"\n");

    assert!(matches!(config::load(&path), Err(ConfigError::Yaml(_))));
}
