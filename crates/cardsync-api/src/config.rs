use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;

use cardsync_core::config::{
    required_trimmed, value_or_default, Collections, ConfigError, DEFAULT_MEDIA_DIR,
};
use cardsync_core::util::is_http_url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CARD_LIMIT: usize = 50;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Service token for the origin store.
    pub notion_token: String,
    /// Public base URL media links are built from.
    pub domain: String,
    /// Origin collections.
    pub collections: Collections,
    /// Cards created per `/sync` call at most.
    pub card_limit: usize,
    pub media_dir: PathBuf,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("notion_token", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("collections", &self.collections)
            .field("card_limit", &self.card_limit)
            .field("media_dir", &self.media_dir)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = value_or_default(&lookup, "PORT", &DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid("PORT must be a valid port number".to_string()))?;

        let notion_token = required_trimmed(&lookup, "NOTION_KEY")?;
        let domain = required_trimmed(&lookup, "DOMAIN")?;
        if !is_http_url(&domain) {
            return Err(ConfigError::Invalid(
                "DOMAIN must start with http:// or https://".to_string(),
            ));
        }

        let card_limit = value_or_default(&lookup, "LIMIT", &DEFAULT_CARD_LIMIT.to_string())
            .parse::<usize>()
            .map_err(|_| ConfigError::Invalid("LIMIT must be a non-negative integer".to_string()))?;

        Ok(Self {
            bind_addr: format!("0.0.0.0:{port}"),
            notion_token,
            domain,
            collections: Collections::from_lookup(&lookup)?,
            card_limit,
            media_dir: PathBuf::from(value_or_default(&lookup, "MEDIA_DIR", DEFAULT_MEDIA_DIR)),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn minimal() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("NOTION_KEY", "secret-service-token"),
            ("DOMAIN", "https://cards.example.com"),
            ("DATABASE_CARD_ID", "cards"),
            ("DATABASE_TYPE_ID", "types"),
            ("DATABASE_RARITY_ID", "rarities"),
            ("DATABASE_EXPANSION_ID", "expansions"),
            ("DATABASE_PACK_ID", "packs"),
        ])
    }

    fn load(map: &HashMap<&str, &str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn config_requires_service_token() {
        let mut map = minimal();
        map.remove("NOTION_KEY");
        let err = load(&map).unwrap_err();
        assert!(err.to_string().contains("NOTION_KEY"));
    }

    #[test]
    fn config_applies_defaults() {
        let config = load(&minimal()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.card_limit, 50);
        assert_eq!(config.media_dir, PathBuf::from("medias"));
        assert_eq!(config.collections.packs, "packs");
    }

    #[test]
    fn config_reads_port_and_limit() {
        let mut map = minimal();
        map.insert("PORT", "8088");
        map.insert("LIMIT", "10");
        let config = load(&map).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8088");
        assert_eq!(config.card_limit, 10);
    }

    #[test]
    fn config_rejects_non_http_domain() {
        let mut map = minimal();
        map.insert("DOMAIN", "cards.example.com");
        assert!(matches!(load(&map), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn config_rejects_malformed_limit() {
        let mut map = minimal();
        map.insert("LIMIT", "fifty");
        let err = load(&map).unwrap_err();
        assert!(err.to_string().contains("LIMIT"));
    }

    #[test]
    fn config_redacts_sensitive_debug_fields() {
        let config = load(&minimal()).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("secret-service-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
