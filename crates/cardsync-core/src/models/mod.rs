//! Data models for cardsync

mod card;
mod reference;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use card::OriginCard;
pub use reference::{ReferenceRecord, TierDetail};

/// Position of a card in import order; the incremental import cursor.
pub type SyncId = i64;

/// Property names shared by every store instance.
pub mod property {
    pub const NAME: &str = "Name";
    pub const RELEASED_DATE: &str = "Released Date";
    pub const COVER: &str = "Cover";
    pub const EXPANSION: &str = "Expansion";
    pub const CARD_ID: &str = "Card ID";
    pub const SYNC_ID: &str = "Sync ID";
    pub const HP: &str = "HP";
    pub const TYPE: &str = "Type";
    pub const RARITY: &str = "Rarity";
    pub const PACKS: &str = "Packs";
    pub const SYNC: &str = "Sync";
    pub const ILLUSTRATION: &str = "Illustration";
    pub const FLAVOR: &str = "Flavor";
    pub const RARITY_DISPLAY: &str = "Rarity Display";
    pub const ORIGIN_MAX_ID: &str = "Origin Max ID";
}

/// One of the four category tiers that cards relate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTier {
    Type,
    Rarity,
    Expansion,
    Pack,
}

impl ReferenceTier {
    pub const ALL: [Self; 4] = [Self::Type, Self::Rarity, Self::Expansion, Self::Pack];

    /// Media folder name, also used in asset URLs.
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Type => "types",
            Self::Rarity => "rarities",
            Self::Expansion => "expansions",
            Self::Pack => "packs",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Rarity => "rarity",
            Self::Expansion => "expansion",
            Self::Pack => "pack",
        }
    }
}

impl fmt::Display for ReferenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
