//! Store-to-store reconciliation.
//!
//! A run resolves the four reference tiers by name, then copies cards past the
//! caller's watermark with every relation remapped through the tier maps.
//! Both stages abort on the first error: a half-built identity map would
//! corrupt every relation written after it.

mod cards;
mod identity;
mod tiers;
mod watermark;

use crate::config::Collections;
use crate::error::Result;
use crate::links::MediaLinks;
use crate::models::SyncId;
use crate::store::RecordStore;

pub use cards::{build_card_record, import_cards, CardImportReport};
pub use identity::{resolve_tier, IdentityMap, MappedRecord, PropertyBuilder};
pub use tiers::{sync_reference_tiers, TierMaps};
pub use watermark::check_watermark;

/// Stores and link settings shared by every stage of a run.
#[derive(Clone, Copy)]
pub struct SyncContext<'a> {
    /// Service-credentialed store the reference data is read from.
    pub origin: &'a dyn RecordStore,
    /// Caller-credentialed store that receives the copies.
    pub destination: &'a dyn RecordStore,
    pub links: &'a MediaLinks,
}

/// Parameters of one `/sync` run.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub origin: Collections,
    pub destination: Collections,
    /// Coordinating record every copied card is related to.
    pub sync_record: String,
    /// Highest Sync ID the destination already holds.
    pub watermark: SyncId,
    /// Hard cap on cards created by this run.
    pub limit: usize,
}

/// Reference tiers first, then the capped card import.
pub async fn run_sync(ctx: SyncContext<'_>, request: &SyncRequest) -> Result<CardImportReport> {
    let maps = sync_reference_tiers(ctx, &request.origin, &request.destination).await?;
    tracing::info!(
        types = maps.types.len(),
        rarities = maps.rarities.len(),
        expansions = maps.expansions.len(),
        packs = maps.packs.len(),
        "Reference tiers resolved"
    );
    import_cards(ctx, request, &maps).await
}
