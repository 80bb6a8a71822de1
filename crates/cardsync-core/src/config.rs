//! Environment-sourced configuration shared by the API server and the CLI.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::catalog::TCGDEX_API_URL;
use crate::models::{ReferenceTier, SyncId};
use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_MEDIA_DIR: &str = "medias";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Collection ids of the service-owned store, one per tier plus cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub cards: String,
    pub types: String,
    pub rarities: String,
    pub expansions: String,
    pub packs: String,
}

impl Collections {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            cards: required_trimmed(&lookup, "DATABASE_CARD_ID")?,
            types: required_trimmed(&lookup, "DATABASE_TYPE_ID")?,
            rarities: required_trimmed(&lookup, "DATABASE_RARITY_ID")?,
            expansions: required_trimmed(&lookup, "DATABASE_EXPANSION_ID")?,
            packs: required_trimmed(&lookup, "DATABASE_PACK_ID")?,
        })
    }

    pub fn tier(&self, tier: ReferenceTier) -> &str {
        match tier {
            ReferenceTier::Type => &self.types,
            ReferenceTier::Rarity => &self.rarities,
            ReferenceTier::Expansion => &self.expansions,
            ReferenceTier::Pack => &self.packs,
        }
    }
}

/// Settings of one external catalog import run.
#[derive(Clone)]
pub struct ImportConfig {
    pub notion_token: String,
    pub collections: Collections,
    pub set_id: String,
    pub start_number: u32,
    pub end_number: u32,
    pub sync_start_id: SyncId,
    pub default_pack: Option<String>,
    pub catalog_api_url: String,
    pub media_dir: PathBuf,
}

impl fmt::Debug for ImportConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ImportConfig")
            .field("notion_token", &"[REDACTED]")
            .field("collections", &self.collections)
            .field("set_id", &self.set_id)
            .field("start_number", &self.start_number)
            .field("end_number", &self.end_number)
            .field("sync_start_id", &self.sync_start_id)
            .field("default_pack", &self.default_pack)
            .field("catalog_api_url", &self.catalog_api_url)
            .field("media_dir", &self.media_dir)
            .finish()
    }
}

impl ImportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let notion_token = required_trimmed(&lookup, "NOTION_KEY")?;
        let collections = Collections::from_lookup(&lookup)?;
        let set_id = required_trimmed(&lookup, "TCG_SET_ID")?;
        let start_number = required_number::<u32>(&lookup, "TCG_START_NUMBER")?;
        let end_number = required_number::<u32>(&lookup, "TCG_END_NUMBER")?;
        if start_number > end_number {
            return Err(ConfigError::Invalid(
                "TCG_START_NUMBER must not exceed TCG_END_NUMBER".to_string(),
            ));
        }
        let sync_start_id = required_number::<SyncId>(&lookup, "SYNC_START_ID")?;

        let catalog_api_url = value_or_default(&lookup, "TCG_API_URL", TCGDEX_API_URL)
            .trim_end_matches('/')
            .to_string();
        if !is_http_url(&catalog_api_url) {
            return Err(ConfigError::Invalid(
                "TCG_API_URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            notion_token,
            collections,
            set_id,
            start_number,
            end_number,
            sync_start_id,
            default_pack: optional_trimmed(&lookup, "DEFAULT_PACK"),
            catalog_api_url,
            media_dir: PathBuf::from(value_or_default(&lookup, "MEDIA_DIR", DEFAULT_MEDIA_DIR)),
        })
    }
}

pub fn value_or_default(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

pub fn required_trimmed(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional_trimmed(lookup, name).ok_or(ConfigError::MissingVar(name))
}

pub fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    normalize_text_option(lookup(name))
}

pub fn required_number<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<T, ConfigError> {
    required_trimmed(lookup, name)?
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be an integer")))
}
