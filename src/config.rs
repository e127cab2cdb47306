//! Configuration loading via `ortho-config`.

use std::fmt;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Connection settings for a Ganeti remote API endpoint, derived from
/// environment variables, configuration files, and CLI flags.
#[derive(Clone, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "GANETI")]
pub struct RapiConfig {
    /// Hostname or address of the cluster master running the remote API.
    pub host: String,
    /// TCP port of the remote API. Defaults to `5080`.
    #[ortho_config(default = 5080)]
    pub port: u16,
    /// Version segment of the API path. Defaults to `2`.
    #[ortho_config(default = 2)]
    pub api_version: u32,
    /// User name for HTTP Basic authentication.
    pub username: String,
    /// Password for HTTP Basic authentication.
    pub password: String,
    /// Whether to talk HTTPS rather than plain HTTP. Defaults to `true`.
    #[ortho_config(default = true)]
    pub use_ssl: bool,
    /// Whether server certificates are verified. Ganeti clusters commonly
    /// run with self-signed certificates, so this defaults to `false`.
    #[ortho_config(default = false)]
    pub ssl_verify: bool,
}

impl fmt::Debug for RapiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RapiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_version", &self.api_version)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("use_ssl", &self.use_ssl)
            .field("ssl_verify", &self.ssl_verify)
            .finish()
    }
}

/// Immutable connection parameters shared by every call made through a
/// client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Versioned base URL, for example `https://cluster.example:5080/2`.
    pub base_url: String,
    /// User name for HTTP Basic authentication.
    pub username: String,
    /// Password for HTTP Basic authentication.
    pub password: String,
    /// Whether TLS certificates presented by the server are verified.
    pub verify_tls: bool,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to ganeti-rapi.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

impl RapiConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(metadata.missing());
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("ganeti-rapi")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Renders the versioned base URL, for example
    /// `https://cluster.example:5080/2`.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!(
            "{scheme}://{}:{}/{}",
            self.host.trim(),
            self.port,
            self.api_version
        )
    }

    /// Builds the immutable [`ClientSettings`] handed to the client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails.
    pub fn client_settings(&self) -> Result<ClientSettings, ConfigError> {
        self.validate()?;
        Ok(ClientSettings {
            base_url: self.base_url(),
            username: self.username.clone(),
            password: self.password.clone(),
            verify_tls: self.ssl_verify,
        })
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values via environment variables or
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.host,
            &FieldMetadata::new("remote API host", "GANETI_HOST", "host"),
        )?;
        Self::require_field(
            &self.username,
            &FieldMetadata::new("remote API user name", "GANETI_USERNAME", "username"),
        )?;
        Self::require_field(
            &self.password,
            &FieldMetadata::new("remote API password", "GANETI_PASSWORD", "password"),
        )?;
        if self.port == 0 {
            return Err(FieldMetadata::new("remote API port", "GANETI_PORT", "port").missing());
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
