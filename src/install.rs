use reqwest::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::bundle::{sha256_hex, EXTENSION_CHECKSUM, EXTENSION_JS};
use crate::server::EXTENSION_API_PATH;

pub const ENV_EXTENSION_BASE_URL: &str = "EXTENSION_BASE_URL";
pub const ENV_EXTENSION_INSTALLATION_DIR: &str = "EXTENSION_INSTALLATION_DIR";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("missing environment variable: '{0}'")]
    MissingEnv(&'static str),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("no checksum found for {0}")]
    ChecksumNotFound(String),
    #[error("checksum mismatch. Expected: {expected}, got: {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a verified download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    pub extension_url: String,
    pub checksum_url: String,
    pub checksum: String,
    pub path: Option<PathBuf>,
}

/// Reads the base URL and target directory from the environment and installs
pub async fn install_from_env() -> Result<Installed, InstallError> {
    let base_url = std::env::var(ENV_EXTENSION_BASE_URL)
        .map_err(|_| InstallError::MissingEnv(ENV_EXTENSION_BASE_URL))?;
    let target_dir = std::env::var_os(ENV_EXTENSION_INSTALLATION_DIR).map(PathBuf::from);
    install(&base_url, target_dir.as_deref()).await
}

/// Downloads the UI extension and its checksum file, verifies the script and
/// writes it to `target_dir` when one is given
pub async fn install(base_url: &str, target_dir: Option<&Path>) -> Result<Installed, InstallError> {
    let base = base_url.trim_end_matches('/');
    let extension_url = format!("{base}{EXTENSION_API_PATH}/{EXTENSION_JS}");
    let checksum_url = format!("{base}{EXTENSION_API_PATH}/{EXTENSION_CHECKSUM}");

    let client = Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|source| InstallError::Request {
            url: base.to_string(),
            source,
        })?;

    let (script, checksums) = futures::try_join!(
        read_all_from_url(&client, &extension_url),
        read_all_from_url(&client, &checksum_url),
    )?;

    let actual = sha256_hex(&script);
    let checksums = String::from_utf8_lossy(&checksums);
    let expected = extract_checksum_for(&checksums, EXTENSION_JS)
        .ok_or_else(|| InstallError::ChecksumNotFound(EXTENSION_JS.to_string()))?;

    if actual != expected {
        return Err(InstallError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    info!("Verified {} (sha256 {})", extension_url, actual);

    let path = match target_dir {
        Some(dir) => Some(write_extension(dir, &script)?),
        None => None,
    };

    Ok(Installed {
        extension_url,
        checksum_url,
        checksum: actual,
        path,
    })
}

fn write_extension(dir: &Path, script: &[u8]) -> Result<PathBuf, InstallError> {
    let path = dir.join(EXTENSION_JS);
    let write = |source| InstallError::Write {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(write)?;
    fs::write(&path, script).map_err(write)?;
    info!("Installed extension to {:?}", path);
    Ok(path)
}

async fn read_all_from_url(client: &Client, url: &str) -> Result<Vec<u8>, InstallError> {
    debug!("Downloading {}", url);
    let request_error = |source| InstallError::Request {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(InstallError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.bytes().await.map_err(request_error)?;
    Ok(body.to_vec())
}

/// Finds the checksum of `target` in sha256sum style content.
/// Blank lines and `#` comments are skipped; the first field is the digest,
/// the last field the file name.
pub fn extract_checksum_for<'a>(content: &'a str, target: &str) -> Option<&'a str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match (fields.first(), fields.last()) {
                (Some(sum), Some(file)) if *file == target => Some(*sum),
                _ => None,
            }
        })
}
