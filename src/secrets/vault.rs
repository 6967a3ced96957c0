//! HashiCorp Vault secret reader over the HTTP API.
//!
//! Reads use the logical read endpoint (`GET /v1/<path>`), the same call the
//! `vault read` command makes. Connection settings come from the standard
//! Vault client environment variables.

use super::provider::{SecretData, SecretReader};
use crate::error::GenerateError;
use crate::traits::{Environment, FileSystem};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const DEFAULT_ADDRESS: &str = "https://127.0.0.1:8200";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const TOKEN_FILE: &str = ".vault-token";

/// Connection settings for the Vault client
#[derive(Debug, Clone, PartialEq)]
pub struct VaultConfig {
    /// Vault server address
    pub address: String,
    /// Authentication token
    pub token: Option<String>,
    /// Vault namespace (Enterprise)
    pub namespace: Option<String>,
    /// Accept invalid TLS certificates
    pub skip_verify: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            token: None,
            namespace: None,
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl VaultConfig {
    /// Load configuration from environment variables
    ///
    /// Uses:
    /// - `VAULT_ADDR` (default: `https://127.0.0.1:8200`)
    /// - `VAULT_TOKEN`, falling back to `~/.vault-token`
    /// - `VAULT_NAMESPACE`
    /// - `VAULT_SKIP_VERIFY`
    /// - `VAULT_CLIENT_TIMEOUT` in seconds (default: 60)
    pub fn from_env(env: &dyn Environment, fs: &dyn FileSystem) -> Result<Self> {
        let address = env
            .var("VAULT_ADDR")
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

        let token = match env.var("VAULT_TOKEN").filter(|t| !t.is_empty()) {
            Some(token) => Some(token),
            None => token_from_file(fs)?,
        };

        let namespace = env.var("VAULT_NAMESPACE").filter(|n| !n.is_empty());

        let skip_verify = env
            .var("VAULT_SKIP_VERIFY")
            .map(|v| parse_bool(&v))
            .transpose()?
            .unwrap_or(false);

        let timeout = match env.var("VAULT_CLIENT_TIMEOUT").filter(|t| !t.is_empty()) {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            address,
            token,
            namespace,
            skip_verify,
            timeout,
        })
    }
}

fn token_from_file(fs: &dyn FileSystem) -> Result<Option<String>> {
    let Some(home) = dirs::home_dir() else {
        return Ok(None);
    };

    let path = home.join(TOKEN_FILE);
    if !fs.exists(&path) {
        return Ok(None);
    }

    let token = fs
        .read_to_string(&path)
        .context("Failed to read Vault token file")?;
    let token = token.trim();

    Ok((!token.is_empty()).then(|| token.to_string()))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" => Ok(true),
        "0" | "f" | "false" | "no" | "" => Ok(false),
        other => Err(GenerateError::VaultConfig(format!(
            "VAULT_SKIP_VERIFY must be a boolean, got '{}'",
            other
        ))
        .into()),
    }
}

/// Bare seconds, or a duration made of `ms`, `s`, `m` and `h` parts (`90s`, `1h30m`)
fn parse_timeout(raw: &str) -> Result<Duration> {
    let invalid = || {
        GenerateError::VaultConfig(format!(
            "VAULT_CLIENT_TIMEOUT must be seconds or a duration such as 30s, 5m or 1h30m, got '{}'",
            raw
        ))
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid().into());
    }
    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let mut total = Duration::ZERO;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => Some(Duration::from_millis(value)),
            "s" => Some(Duration::from_secs(value)),
            "m" => value.checked_mul(60).map(Duration::from_secs),
            "h" => value.checked_mul(3600).map(Duration::from_secs),
            _ => None,
        };
        total = part
            .and_then(|part| total.checked_add(part))
            .ok_or_else(invalid)?;
        rest = &rest[unit_len..];
    }

    Ok(total)
}

/// Minimal HTTP response used by the Vault client
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP transport trait for testing
pub trait VaultHttp: Send + Sync {
    fn get(&self, url: &Url, headers: &[(&'static str, String)]) -> Result<HttpResponse>;
}

/// Real HTTP transport using reqwest
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.skip_verify)
            .build()
            .map_err(|e| GenerateError::VaultConfig(e.to_string()))?;

        Ok(Self { client })
    }
}

impl VaultHttp for ReqwestTransport {
    fn get(&self, url: &Url, headers: &[(&'static str, String)]) -> Result<HttpResponse> {
        let mut request = self.client.get(url.as_str());
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request
            .send()
            .with_context(|| format!("Failed to reach Vault at {}", url))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .with_context(|| format!("Failed to read response body from: {}", url))?;

        Ok(HttpResponse { status, body })
    }
}

#[derive(Debug, Deserialize)]
struct ReadResponse {
    #[serde(default)]
    data: Option<SecretData>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// Vault client performing logical reads
pub struct VaultClient<H: VaultHttp = ReqwestTransport> {
    base: Url,
    token: Option<String>,
    namespace: Option<String>,
    http: H,
}

impl VaultClient<ReqwestTransport> {
    /// Create a client with the default reqwest transport
    pub fn new(config: VaultConfig) -> Result<Self> {
        let http = ReqwestTransport::new(&config)?;
        Self::with_transport(config, http)
    }
}

impl<H: VaultHttp> VaultClient<H> {
    /// Create a client with a custom HTTP transport (for testing)
    pub fn with_transport(config: VaultConfig, http: H) -> Result<Self> {
        let mut address = config.address.trim().to_string();
        if !address.ends_with('/') {
            address.push('/');
        }

        let base = Url::parse(&address).map_err(|e| {
            GenerateError::VaultConfig(format!("invalid address '{}': {}", config.address, e))
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            bail!(GenerateError::VaultConfig(format!(
                "unsupported address scheme '{}'",
                base.scheme()
            )));
        }

        Ok(Self {
            base,
            token: config.token,
            namespace: config.namespace,
            http,
        })
    }

    fn read_url(&self, path: &str) -> Result<Url> {
        self.base
            .join(&format!("v1/{}", path.trim_start_matches('/')))
            .with_context(|| format!("Invalid Vault path: {}", path))
    }
}

impl<H: VaultHttp> SecretReader for VaultClient<H> {
    fn read(&self, path: &str) -> Result<Option<SecretData>> {
        let url = self.read_url(path)?;

        let mut headers = Vec::new();
        if let Some(token) = &self.token {
            headers.push(("X-Vault-Token", token.clone()));
        }
        if let Some(namespace) = &self.namespace {
            headers.push(("X-Vault-Namespace", namespace.clone()));
        }

        let response = self.http.get(&url, &headers)?;

        match response.status {
            200 => {
                let parsed: ReadResponse = serde_json::from_str(&response.body)
                    .with_context(|| format!("Invalid Vault response for path: {}", path))?;
                Ok(parsed.data.filter(|d| !d.is_empty()))
            }
            204 | 404 => Ok(None),
            status => {
                let errors = serde_json::from_str::<ErrorResponse>(&response.body)
                    .unwrap_or_default()
                    .errors;
                if errors.is_empty() {
                    bail!("Vault returned status {}", status);
                }
                bail!("Vault returned status {}: {}", status, errors.join("; "));
            }
        }
    }
}
