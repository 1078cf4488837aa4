use serde::{Deserialize, Serialize};

/// DOM id of the `<script type="application/json">` block the host writes the
/// configuration into.
pub const CONFIG_ELEMENT_ID: &str = "client-config";

pub const DEFAULT_NOTICE_TIMEOUT_MS: u32 = 5000;
pub const DEFAULT_TOKEN_STORAGE_KEY: &str = "adminToken";

/// Runtime settings for the signup client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for every API path. Empty means same origin.
    pub api_base: String,
    pub token_storage_key: String,
    pub notice_timeout_ms: u32,
    /// Drop refresh responses that are older than the last one applied.
    pub discard_stale_refreshes: bool,
    /// Discard a stored token older than `token_ttl_secs` at startup.
    pub enforce_token_expiry: bool,
    pub token_ttl_secs: u64,
    /// Ask `/auth/status` whether a stored token is still good before the first render.
    pub verify_session_on_start: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base: String::new(),
            token_storage_key: DEFAULT_TOKEN_STORAGE_KEY.to_string(),
            notice_timeout_ms: DEFAULT_NOTICE_TIMEOUT_MS,
            discard_stale_refreshes: true,
            enforce_token_expiry: false,
            token_ttl_secs: 86400,
            verify_session_on_start: false,
        }
    }
}

impl ClientConfig {
    pub fn stored_at_key(&self) -> String {
        format!("{}StoredAt", self.token_storage_key)
    }

    pub fn teacher_name_key(&self) -> String {
        format!("{}Name", self.token_storage_key)
    }

    /// Joins `path` onto the configured base.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    /// Builds the configuration from any `key -> value` lookup, using defaults for
    /// missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ClientConfig::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(default)
        };
        ClientConfig {
            api_base: lookup("ACTIVITY_API_BASE").unwrap_or(defaults.api_base),
            token_storage_key: lookup("TOKEN_STORAGE_KEY")
                .filter(|k| !k.is_empty())
                .unwrap_or(defaults.token_storage_key),
            notice_timeout_ms: lookup("NOTICE_TIMEOUT_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.notice_timeout_ms),
            discard_stale_refreshes: flag("DISCARD_STALE_REFRESHES", defaults.discard_stale_refreshes),
            enforce_token_expiry: flag("ENFORCE_TOKEN_EXPIRY", defaults.enforce_token_expiry),
            token_ttl_secs: lookup("TOKEN_TTL_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.token_ttl_secs),
            verify_session_on_start: flag("VERIFY_SESSION_ON_START", defaults.verify_session_on_start),
        }
    }

    /// Reads `.env` (if present) and the process environment.
    #[cfg(feature = "ssr")]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        ClientConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parses the JSON embedded in the page, falling back to defaults.
    pub fn from_embedded(json: Option<&str>) -> Self {
        json.and_then(|j| serde_json::from_str(j).ok())
            .unwrap_or_default()
    }

    /// JSON suitable for embedding inside a `<script>` element.
    pub fn to_embedded(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| "{}".to_string())
            .replace("</", "<\\/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.notice_timeout_ms, 5000);
        assert_eq!(config.token_storage_key, "adminToken");
        assert!(!config.enforce_token_expiry);
        assert!(!config.verify_session_on_start);
        assert_eq!(config.url("/activities"), "/activities");
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("ACTIVITY_API_BASE", "http://localhost:8000/"),
            ("NOTICE_TIMEOUT_MS", "2500"),
            ("ENFORCE_TOKEN_EXPIRY", "true"),
            ("DISCARD_STALE_REFRESHES", "0"),
            ("TOKEN_TTL_SECS", "not a number"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.url("/activities"), "http://localhost:8000/activities");
        assert_eq!(config.notice_timeout_ms, 2500);
        assert!(config.enforce_token_expiry);
        assert!(!config.discard_stale_refreshes);
        assert_eq!(config.token_ttl_secs, 86400);
        assert_eq!(config.token_storage_key, "adminToken");
    }

    #[test]
    fn test_embedded_roundtrip_and_fallback() {
        let config = ClientConfig {
            api_base: "</script>".to_string(),
            ..ClientConfig::default()
        };
        let embedded = config.to_embedded();
        assert!(!embedded.contains("</script>"));
        assert_eq!(ClientConfig::from_embedded(Some(&embedded)), config);

        assert_eq!(ClientConfig::from_embedded(None), ClientConfig::default());
        assert_eq!(ClientConfig::from_embedded(Some("garbage")), ClientConfig::default());
        // Missing fields take their defaults.
        let partial = ClientConfig::from_embedded(Some(r#"{"notice_timeout_ms": 100}"#));
        assert_eq!(partial.notice_timeout_ms, 100);
        assert_eq!(partial.token_storage_key, "adminToken");
    }
}
