//! Client configuration and well-known BIGSdb endpoints.

use std::env;
use std::time::Duration;

use crate::error::{BigsdbError, Result};

/// PubMLST REST root.
pub const PUBMLST_URL: &str = "https://rest.pubmlst.org/";

/// Institut Pasteur BIGSdb REST root.
pub const PASTEUR_URL: &str = "https://bigsdb.pasteur.fr/api";

/// Public rMLST species-identification query endpoint.
pub const RMLST_QUERY_URL: &str =
    "https://rest.pubmlst.org/db/pubmlst_rmlst_seqdef_kiosk/schemes/1/sequence";

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Transport settings shared by every request a client makes.
///
/// Nothing here describes traversal state; each navigation step takes the
/// previous step's entity as input.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root URL used for the resource index and for resolving relative links.
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    /// Verify TLS certificates.
    pub ssl_verify: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Extra headers attached to every request.
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::pubmlst()
    }
}

impl ClientConfig {
    /// Configuration for an arbitrary BIGSdb REST root.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            ssl_verify: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            headers: Vec::new(),
        }
    }

    /// PubMLST preset.
    pub fn pubmlst() -> Self {
        Self::new(PUBMLST_URL)
    }

    /// Institut Pasteur preset.
    pub fn pasteur() -> Self {
        Self::new(PASTEUR_URL)
    }

    /// Load configuration from the environment.
    ///
    /// - `BIGSDB_API_URL` (optional) - REST root, defaults to PubMLST
    /// - `BIGSDB_API_KEY` (optional) - bearer token
    /// - `BIGSDB_SSL_VERIFY` (optional) - `false`, `0` or `no` disables verification
    /// - `BIGSDB_TIMEOUT_SECS` (optional) - request timeout, defaults to 300
    ///
    /// # Errors
    ///
    /// Returns an error if `BIGSDB_TIMEOUT_SECS` is not a number.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("BIGSDB_API_URL").unwrap_or_else(|_| PUBMLST_URL.to_string());
        let mut config = Self::new(base_url);

        config.api_key = env::var("BIGSDB_API_KEY").ok().filter(|k| !k.is_empty());

        if let Ok(verify) = env::var("BIGSDB_SSL_VERIFY") {
            config.ssl_verify = parse_flag(&verify);
        }

        if let Ok(secs) = env::var("BIGSDB_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                BigsdbError::ConfigInvalid(format!("BIGSDB_TIMEOUT_SECS must be a number, got '{secs}'"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_ssl_verify(mut self, ssl_verify: bool) -> Self {
        self.ssl_verify = ssl_verify;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}
