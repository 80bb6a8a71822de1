//! External card catalog: fetching and importing.
//!
//! The catalog is read-only and noisy, so everything here degrades instead of
//! failing: a card that cannot be fetched is skipped, an image that cannot be
//! downloaded is left out, and a name with no local counterpart becomes an
//! empty relation.

mod fetcher;
mod import;
mod rarity;

use serde::{Deserialize, Serialize};

pub use fetcher::{CatalogFetcher, CatalogTransport, RetryPolicy, USER_AGENT};
pub use import::{
    build_catalog_record, import_catalog, CatalogImport, ImportTally, RelationSnapshot,
};
pub use rarity::local_rarity;

pub const TCGDEX_API_URL: &str = "https://api.tcgdex.net/v2/en";

/// A card as the external catalog describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCard {
    pub id: String,
    #[serde(default)]
    pub illustrator: Option<String>,
    /// Image base URL; quality and format are appended when downloading.
    #[serde(default)]
    pub image: Option<String>,
    pub local_id: String,
    pub name: String,
    pub rarity: String,
    pub set: CatalogSet,
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub boosters: Option<Vec<CatalogBooster>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSet {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBooster {
    pub name: String,
}

impl CatalogCard {
    /// Numeric prefix of the set-local number ("007" is 7).
    pub fn local_number(&self) -> Option<i64> {
        let digits: String = self
            .local_id
            .trim()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }

    pub fn types(&self) -> &[String] {
        self.types.as_deref().unwrap_or_default()
    }

    pub fn boosters(&self) -> &[CatalogBooster] {
        self.boosters.as_deref().unwrap_or_default()
    }
}
