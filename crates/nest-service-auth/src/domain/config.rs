//! Trust gate configuration with validation.
//!
//! Loaded once at startup from TOML plus environment overrides. Nothing in
//! here is mutable after the gate is built.

use axum::http::HeaderName;
use nest_crypto::{CryptoError, KeyPair, KeyStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default lifetime of an issued service token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(10);

/// Default header carrying the gateway-sealed identity.
pub const DEFAULT_GATEWAY_HEADER: &str = "X-Verified-By-Gateway";

/// Default header carrying the service token.
pub const DEFAULT_TOKEN_HEADER: &str = "X-Service-Auth";

/// Main trust configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Key material
    pub keys: KeyConfig,
    /// Service token settings
    pub token: TokenConfig,
    /// Gateway assertion settings
    pub gateway: GatewayConfig,
    /// Header names
    pub headers: HeaderConfig,
    /// Allow every request without checks. Only honoured in builds with the
    /// `debug-bypass` feature.
    pub debug_bypass: bool,
}

impl TrustConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Apply environment overrides.
    ///
    /// # Environment Variables
    ///
    /// - `NEST_AUTH_PUBLIC_KEY_PATH`: SPKI PEM file
    /// - `NEST_AUTH_PRIVATE_KEY_PATH`: PKCS#1 PEM file
    /// - `NEST_AUTH_TOKEN_TTL`: token lifetime (`10s`, `500ms`, `2m`)
    /// - `NEST_AUTH_DEBUG_BYPASS`: `true`/`1` to request the bypass
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = lookup("NEST_AUTH_PUBLIC_KEY_PATH") {
            self.keys.public_key_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("NEST_AUTH_PRIVATE_KEY_PATH") {
            self.keys.private_key_path = Some(PathBuf::from(path));
        }
        if let Some(ttl) = lookup("NEST_AUTH_TOKEN_TTL") {
            self.token.ttl = parse_duration(&ttl).map_err(ConfigError::InvalidTtl)?;
        }
        if let Some(flag) = lookup("NEST_AUTH_DEBUG_BYPASS") {
            self.debug_bypass = flag.eq_ignore_ascii_case("true") || flag == "1";
        }
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.ttl.is_zero() {
            return Err(ConfigError::InvalidTtl("token ttl cannot be 0".into()));
        }

        if let Some(max_age) = self.gateway.max_age {
            if max_age.is_zero() {
                return Err(ConfigError::InvalidTtl(
                    "gateway max_age cannot be 0".into(),
                ));
            }
        }

        let gateway = self.headers.gateway_header()?;
        let token = self.headers.token_header()?;
        if gateway == token {
            return Err(ConfigError::InvalidHeaderName(
                "gateway and token headers must differ".into(),
            ));
        }

        if self.debug_bypass && !cfg!(feature = "debug-bypass") {
            return Err(ConfigError::BypassNotPermitted);
        }

        if self.keys.public_key_path.is_some() && self.keys.public_key_pem.is_some() {
            return Err(ConfigError::Key(
                "set either public_key_path or public_key_pem, not both".into(),
            ));
        }
        if self.keys.private_key_path.is_some() && self.keys.private_key_pem.is_some() {
            return Err(ConfigError::Key(
                "set either private_key_path or private_key_pem, not both".into(),
            ));
        }

        Ok(())
    }

    /// Build the key store. Any PEM problem surfaces here, at startup.
    pub fn load_key_store(&self) -> Result<KeyStore, ConfigError> {
        let mut builder = KeyPair::builder();

        let public = match (&self.keys.public_key_pem, &self.keys.public_key_path) {
            (Some(pem), _) => Some(pem.clone()),
            (None, Some(path)) => Some(read_key_file(path)?),
            (None, None) => None,
        };
        if let Some(pem) = public {
            builder = builder.with_public_pem(&pem)?;
        }

        let private = match (&self.keys.private_key_pem, &self.keys.private_key_path) {
            (Some(pem), _) => Some(pem.clone()),
            (None, Some(path)) => Some(read_key_file(path)?),
            (None, None) => None,
        };
        if let Some(pem) = private {
            builder = builder.with_private_pem(&pem)?;
        }

        Ok(KeyStore::new(builder.build()))
    }
}

fn read_key_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))
}

/// Key material sources. Inline PEM wins over paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// SPKI PEM file
    pub public_key_path: Option<PathBuf>,
    /// PKCS#1 PEM file
    pub private_key_path: Option<PathBuf>,
    /// Inline SPKI PEM
    pub public_key_pem: Option<String>,
    /// Inline PKCS#1 PEM
    pub private_key_pem: Option<String>,
}

/// Service token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Lifetime of issued tokens
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

/// Gateway assertion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Consult the gateway header at all
    pub enabled: bool,
    /// Oldest acceptable assertion (None = no age check)
    #[serde(with = "humantime_serde::option")]
    pub max_age: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age: None,
        }
    }
}

/// Header names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Header carrying the gateway envelope
    pub gateway: String,
    /// Header carrying the service token
    pub token: String,
    /// Fall back to a query parameter of the same name
    pub query_fallback: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_GATEWAY_HEADER.to_string(),
            token: DEFAULT_TOKEN_HEADER.to_string(),
            query_fallback: true,
        }
    }
}

impl HeaderConfig {
    /// Parsed gateway header name.
    pub fn gateway_header(&self) -> Result<HeaderName, ConfigError> {
        parse_header_name(&self.gateway)
    }

    /// Parsed token header name.
    pub fn token_header(&self) -> Result<HeaderName, ConfigError> {
        parse_header_name(&self.token)
    }
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ConfigError::InvalidHeaderName(name.to_string()))
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid token lifetime or gateway age
    #[error("invalid ttl: {0}")]
    InvalidTtl(String),
    /// Header name is not a valid HTTP header
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),
    /// Bypass requested in a build that does not allow it
    #[error("debug_bypass is not permitted in this build")]
    BypassNotPermitted,
    /// Key file could not be read
    #[error("io error: {0}")]
    Io(String),
    /// TOML could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
    /// Key material is malformed or contradictory
    #[error("key error: {0}")]
    Key(String),
}

impl From<CryptoError> for ConfigError {
    fn from(err: CryptoError) -> Self {
        ConfigError::Key(err.to_string())
    }
}

/// Parse a duration such as `10s`, `500ms`, `2m` or plain seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| format!("invalid milliseconds: {}", s))
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| format!("invalid seconds: {}", s))
    } else if let Some(mins) = s.strip_suffix('m') {
        let mins = mins
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("invalid minutes: {}", s))?;
        mins.checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("minutes overflow: {}", s))
    } else {
        s.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| format!("invalid duration format: {}", s))
    }
}

fn format_duration(duration: &Duration) -> String {
    if duration.subsec_millis() != 0 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{}s", duration.as_secs())
    }
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_duration(duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => serializer.serialize_some(&super::super::format_duration(d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = Option::<String>::deserialize(deserializer)?;
            s.map(|s| super::super::parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
