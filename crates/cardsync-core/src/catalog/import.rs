use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use super::{local_rarity, CatalogCard, CatalogFetcher, CatalogTransport};
use crate::config::{Collections, ImportConfig};
use crate::models::{property, ReferenceTier, SyncId};
use crate::store::{NewRecord, PropertyValue, RecordQuery, RecordStore, RichText};
use crate::util::sanitize;

const DEFAULT_PAUSE: Duration = Duration::from_secs(2);

/// Name to record id, per tier, read once before an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationSnapshot {
    pub types: HashMap<String, String>,
    pub rarities: HashMap<String, String>,
    pub expansions: HashMap<String, String>,
    pub packs: HashMap<String, String>,
}

impl RelationSnapshot {
    /// Read every tier. A tier that cannot be read stays empty.
    pub async fn load(store: &dyn RecordStore, collections: &Collections) -> Self {
        let mut snapshot = Self::default();
        for tier in ReferenceTier::ALL {
            match store.query(collections.tier(tier), &RecordQuery::all()).await {
                Ok(records) => {
                    *snapshot.tier_mut(tier) = records
                        .iter()
                        .filter_map(|record| {
                            record
                                .text(property::NAME)
                                .map(|name| (name.to_string(), record.id.clone()))
                        })
                        .collect();
                }
                Err(error) => {
                    warn!(%tier, error = %sanitize(&error), "reference snapshot unavailable");
                }
            }
        }
        info!(
            types = snapshot.types.len(),
            rarities = snapshot.rarities.len(),
            expansions = snapshot.expansions.len(),
            packs = snapshot.packs.len(),
            "reference snapshot loaded"
        );
        snapshot
    }

    pub fn tier(&self, tier: ReferenceTier) -> &HashMap<String, String> {
        match tier {
            ReferenceTier::Type => &self.types,
            ReferenceTier::Rarity => &self.rarities,
            ReferenceTier::Expansion => &self.expansions,
            ReferenceTier::Pack => &self.packs,
        }
    }

    fn tier_mut(&mut self, tier: ReferenceTier) -> &mut HashMap<String, String> {
        match tier {
            ReferenceTier::Type => &mut self.types,
            ReferenceTier::Rarity => &mut self.rarities,
            ReferenceTier::Expansion => &mut self.expansions,
            ReferenceTier::Pack => &mut self.packs,
        }
    }

    pub fn lookup(&self, tier: ReferenceTier, name: &str) -> Option<&str> {
        self.tier(tier).get(name).map(String::as_str)
    }

    /// Relation holding the ids of every known name; unknown names drop out.
    fn relation<'n>(&self, tier: ReferenceTier, names: impl IntoIterator<Item = &'n str>) -> PropertyValue {
        PropertyValue::relation(names.into_iter().filter_map(|name| self.lookup(tier, name)))
    }
}

/// One import run over a range of set-local card numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogImport {
    pub set_id: String,
    pub start_number: u32,
    pub end_number: u32,
    pub sync_start_id: SyncId,
    pub default_pack: Option<String>,
    pub media_dir: PathBuf,
    pub pause: Duration,
}

impl CatalogImport {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            set_id: config.set_id.clone(),
            start_number: config.start_number,
            end_number: config.end_number,
            sync_start_id: config.sync_start_id,
            default_pack: config.default_pack.clone(),
            media_dir: config.media_dir.clone(),
            pause: DEFAULT_PAUSE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportTally {
    pub imported: u32,
    pub fetch_errors: u32,
    pub insert_errors: u32,
    pub next_sync_id: SyncId,
}

/// Build the destination record for one catalog card.
pub fn build_catalog_record(
    cards_collection: &str,
    card: &CatalogCard,
    sync_id: SyncId,
    snapshot: &RelationSnapshot,
    default_pack: Option<&str>,
) -> NewRecord {
    let rarity = local_rarity(&card.rarity);
    let packs = if card.boosters().is_empty() {
        snapshot.relation(ReferenceTier::Pack, default_pack)
    } else {
        snapshot.relation(
            ReferenceTier::Pack,
            card.boosters().iter().map(|booster| booster.name.as_str()),
        )
    };

    NewRecord::new(cards_collection)
        .property(property::NAME, PropertyValue::title(card.name.as_str()))
        .property(property::CARD_ID, PropertyValue::integer(card.local_number()))
        .property(property::RARITY, snapshot.relation(ReferenceTier::Rarity, [rarity]))
        .property(
            property::EXPANSION,
            snapshot.relation(ReferenceTier::Expansion, [card.set.name.as_str()]),
        )
        .property(
            property::HP,
            PropertyValue::integer(card.hp.filter(|hp| *hp != 0).map(i64::from)),
        )
        .property(
            property::TYPE,
            snapshot.relation(ReferenceTier::Type, card.types().iter().map(String::as_str)),
        )
        .property(
            property::FLAVOR,
            PropertyValue::RichText(vec![RichText::plain(
                card.description.as_deref().unwrap_or_default(),
            )]),
        )
        .property(
            property::ILLUSTRATION,
            PropertyValue::RichText(vec![RichText::bold(
                card.illustrator.as_deref().unwrap_or_default(),
            )]),
        )
        .property(property::PACKS, packs)
        .property(property::SYNC_ID, PropertyValue::integer(Some(sync_id)))
}

/// Walk the number range, creating one record per fetched card.
///
/// Never fails: fetch and insert problems are counted in the tally.
pub async fn import_catalog<T: CatalogTransport>(
    store: &dyn RecordStore,
    fetcher: &CatalogFetcher<T>,
    collections: &Collections,
    plan: &CatalogImport,
) -> ImportTally {
    info!(
        set_id = %plan.set_id,
        start = plan.start_number,
        end = plan.end_number,
        "starting catalog import"
    );
    let snapshot = RelationSnapshot::load(store, collections).await;
    let mut tally = ImportTally {
        next_sync_id: plan.sync_start_id,
        ..ImportTally::default()
    };

    for number in plan.start_number..=plan.end_number {
        if let Some(card) = fetcher.fetch_card(&plan.set_id, number).await {
            let sync_id = tally.next_sync_id;
            match &card.image {
                Some(image) => {
                    fetcher.download_image(image, sync_id, &plan.media_dir).await;
                }
                None => warn!(card = %card.id, sync_id, "catalog card has no image"),
            }

            let record = build_catalog_record(
                &collections.cards,
                &card,
                sync_id,
                &snapshot,
                plan.default_pack.as_deref(),
            );
            match store.create(record).await {
                Ok(_) => {
                    tally.imported += 1;
                    info!(card = %card.id, name = %card.name, sync_id, "catalog card imported");
                }
                Err(error) => {
                    tally.insert_errors += 1;
                    error!(card = %card.id, sync_id, error = %sanitize(&error), "catalog card insert failed");
                }
            }
            tally.next_sync_id += 1;
        } else {
            tally.fetch_errors += 1;
        }

        tokio::time::sleep(plan.pause).await;
    }

    info!(
        imported = tally.imported,
        fetch_errors = tally.fetch_errors,
        insert_errors = tally.insert_errors,
        next_sync_id = tally.next_sync_id,
        "catalog import finished"
    );
    tally
}
