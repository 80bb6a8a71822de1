//! Public asset links served by the API's static media routes.

use crate::models::{ReferenceTier, SyncId};
use crate::util::underscored;

/// Builds links under the public base URL the media routes are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLinks {
    domain: String,
}

impl MediaLinks {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Icon (and expansion cover) for a reference record.
    pub fn tier_icon(&self, tier: ReferenceTier, name: &str) -> String {
        format!(
            "{}/images-{}/{}.png",
            self.domain,
            tier.media_type(),
            underscored(name)
        )
    }

    pub fn card_image(&self, sync_id: SyncId) -> String {
        format!("{}/images-cards/{sync_id}.webp", self.domain)
    }

    pub fn rarity_badge(&self, rarity_name: &str) -> String {
        format!(
            "{}/images-rarities/{}_display.png",
            self.domain,
            underscored(rarity_name)
        )
    }
}
