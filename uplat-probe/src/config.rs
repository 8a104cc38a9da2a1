use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::error::ProbeError;

/// Probe connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Base WebSocket URL (`ws://` or `wss://`).
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Text sent right after connecting. Empty = send nothing.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Header carrying a fresh UUIDv4 per connection.
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_url() -> String { "ws://127.0.0.1:8080/ws".into() }
fn default_greeting() -> String { "hello".into() }
fn default_request_id_header() -> String { "X-Request-ID".into() }

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            session_id: None,
            token: None,
            greeting: default_greeting(),
            request_id_header: default_request_id_header(),
        }
    }
}

impl ProbeConfig {
    /// Load from a YAML file plus `UPLAT_PROBE_*` env overrides. A missing
    /// file contributes nothing; env still applies.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: ProbeConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("UPLAT_PROBE_"))
            .extract()?;
        Ok(config)
    }

    /// Final connect URL: base URL plus `session_id` / `token` query params.
    pub fn endpoint(&self) -> Result<Url, ProbeError> {
        let mut url = Url::parse(&self.url)?;
        match url.scheme() {
            "ws" | "wss" => {}
            other => return Err(ProbeError::UnsupportedScheme(other.to_string())),
        }

        if self.session_id.is_some() || self.token.is_some() {
            let mut query = url.query_pairs_mut();
            if let Some(session_id) = &self.session_id {
                query.append_pair("session_id", session_id);
            }
            if let Some(token) = &self.token {
                query.append_pair("token", token);
            }
        }
        Ok(url)
    }
}
