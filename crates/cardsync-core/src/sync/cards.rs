use serde::Serialize;

use crate::error::Result;
use crate::links::MediaLinks;
use crate::models::{property, OriginCard, ReferenceTier, SyncId};
use crate::store::{Block, NewRecord, PropertyValue, RecordQuery, RichText, SortDirection};
use crate::sync::identity::resolve;
use crate::sync::tiers::TierMaps;
use crate::sync::{SyncContext, SyncRequest};

/// Outcome of one capped card import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardImportReport {
    pub created: usize,
    /// Sync ID of the last card created, if any.
    pub last_sync_id: Option<SyncId>,
}

/// Copy origin cards past the watermark into the destination, in ascending
/// Sync ID order, stopping after `request.limit` creates.
///
/// A relation with no counterpart in `maps` aborts the whole run; cards
/// created before it stay created.
pub async fn import_cards(
    ctx: SyncContext<'_>,
    request: &SyncRequest,
    maps: &TierMaps,
) -> Result<CardImportReport> {
    let query = RecordQuery::all()
        .greater_than(property::SYNC_ID, request.watermark)
        .sorted(property::SYNC_ID, SortDirection::Ascending)
        .limit(request.limit);
    let records = ctx.origin.query(&request.origin.cards, &query).await?;

    let mut report = CardImportReport::default();
    for record in &records {
        if report.created >= request.limit {
            break;
        }

        let card = OriginCard::from_record(record)?;
        let new_record = build_card_record(
            ctx.links,
            &request.destination.cards,
            &request.sync_record,
            maps,
            &card,
        )?;

        tracing::info!(card = %card.name, sync_id = card.sync_id, "Adding card to destination");
        ctx.destination.create(new_record).await?;
        report.created += 1;
        report.last_sync_id = Some(card.sync_id);
    }

    tracing::info!(
        created = report.created,
        watermark = request.watermark,
        limit = request.limit,
        "Card import finished"
    );
    Ok(report)
}

/// Destination record for an origin card, relations remapped through `maps`.
pub fn build_card_record(
    links: &MediaLinks,
    destination_cards: &str,
    sync_record: &str,
    maps: &TierMaps,
    card: &OriginCard,
) -> Result<NewRecord> {
    let card_type = resolve(&maps.types, ReferenceTier::Type, &card.type_id)?;
    let rarity = resolve(&maps.rarities, ReferenceTier::Rarity, &card.rarity_id)?;
    let expansion = resolve(&maps.expansions, ReferenceTier::Expansion, &card.expansion_id)?;
    let packs = card
        .pack_ids
        .iter()
        .map(|id| resolve(&maps.packs, ReferenceTier::Pack, id).map(|pack| pack.id.clone()))
        .collect::<Result<Vec<_>>>()?;
    let image_url = links.card_image(card.sync_id);

    let mut record = NewRecord::new(destination_cards)
        .property(property::NAME, PropertyValue::title(&card.name))
        .property(property::CARD_ID, PropertyValue::integer(card.card_id))
        .property(property::SYNC_ID, PropertyValue::integer(Some(card.sync_id)))
        .property(property::HP, PropertyValue::integer(card.hp))
        .property(property::TYPE, PropertyValue::relation([card_type.id.as_str()]))
        .property(property::RARITY, PropertyValue::relation([rarity.id.as_str()]))
        .property(
            property::EXPANSION,
            PropertyValue::relation([expansion.id.as_str()]),
        )
        .property(property::PACKS, PropertyValue::Relation(packs))
        .property(property::SYNC, PropertyValue::relation([sync_record]))
        .property(
            property::ILLUSTRATION,
            PropertyValue::RichText(vec![RichText::bold(&card.illustrator)]),
        )
        .property(
            property::COVER,
            PropertyValue::external_file(&card.name, &image_url),
        )
        .property(
            property::RARITY_DISPLAY,
            PropertyValue::external_file(&rarity.name, links.rarity_badge(&rarity.name)),
        )
        .child(Block::Image { url: image_url });

    if let Some(flavor) = &card.flavor {
        record = record.child(Block::Quote(vec![RichText::italic(flavor)]));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;
    use crate::store::{ExternalFile, MemoryStore};
    use crate::sync::fixtures::{card, collections, origin_store};
    use crate::sync::sync_reference_tiers;

    const LINKS: &str = "https://media.example.com";

    fn request(watermark: SyncId, limit: usize) -> SyncRequest {
        SyncRequest {
            origin: collections("origin"),
            destination: collections("dest"),
            sync_record: "sync-marker".into(),
            watermark,
            limit,
        }
    }

    fn created_sync_ids(store: &MemoryStore) -> Vec<i64> {
        store
            .created()
            .iter()
            .filter(|record| record.collection == "dest-cards")
            .filter_map(|record| {
                record
                    .properties
                    .get(property::SYNC_ID)
                    .and_then(PropertyValue::as_integer)
            })
            .collect()
    }

    #[tokio::test]
    async fn cap_splits_import_across_runs_in_ascending_order() {
        // Seeded out of order to prove the sort.
        let origin = origin_store([12, 15, 11, 14, 13, 10].map(|id| card(id, "")));
        let destination = MemoryStore::new();
        let links = MediaLinks::new(LINKS);
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };
        let first = request(10, 3);
        let maps = sync_reference_tiers(ctx, &first.origin, &first.destination)
            .await
            .unwrap();

        let report = import_cards(ctx, &first, &maps).await.unwrap();
        assert_eq!(
            report,
            CardImportReport {
                created: 3,
                last_sync_id: Some(13)
            }
        );
        assert_eq!(created_sync_ids(&destination), vec![11, 12, 13]);

        let report = import_cards(ctx, &request(13, 3), &maps).await.unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(created_sync_ids(&destination), vec![11, 12, 13, 14, 15]);
    }

    #[tokio::test]
    async fn card_record_remaps_relations_and_builds_media() {
        let origin = origin_store([card(21, "It sleeps in the sun.")]);
        let destination = MemoryStore::new();
        let links = MediaLinks::new(LINKS);
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };
        let request = request(20, 10);
        let maps = sync_reference_tiers(ctx, &request.origin, &request.destination)
            .await
            .unwrap();

        import_cards(ctx, &request, &maps).await.unwrap();

        let created = destination.created();
        let card = created
            .iter()
            .find(|record| record.collection == "dest-cards")
            .unwrap();
        assert_eq!(
            card.properties[property::TYPE],
            PropertyValue::relation([maps.types["o-type-grass"].id.as_str()])
        );
        assert_eq!(
            card.properties[property::PACKS],
            PropertyValue::relation([maps.packs["o-pack-mewtwo"].id.as_str()])
        );
        assert_eq!(
            card.properties[property::SYNC],
            PropertyValue::relation(["sync-marker"])
        );
        assert_eq!(
            card.properties[property::ILLUSTRATION],
            PropertyValue::RichText(vec![RichText::bold("Kouki Saitou")])
        );
        assert_eq!(
            card.properties[property::RARITY_DISPLAY],
            PropertyValue::Files(vec![ExternalFile {
                name: "Common".into(),
                url: format!("{LINKS}/images-rarities/Common_display.png"),
            }])
        );
        assert_eq!(
            card.children,
            vec![
                Block::Image {
                    url: format!("{LINKS}/images-cards/21.webp")
                },
                Block::Quote(vec![RichText::italic("It sleeps in the sun.")]),
            ]
        );
    }

    #[test]
    fn empty_flavor_renders_image_only() {
        let mut maps = TierMaps::default();
        for (map, origin_id) in [
            (&mut maps.types, "t"),
            (&mut maps.rarities, "r"),
            (&mut maps.expansions, "e"),
        ] {
            map.insert(
                origin_id.into(),
                crate::sync::MappedRecord {
                    id: format!("d-{origin_id}"),
                    name: "Name".into(),
                },
            );
        }
        let card = OriginCard {
            id: "c".into(),
            name: "Ditto".into(),
            card_id: None,
            sync_id: 5,
            hp: None,
            type_id: "t".into(),
            rarity_id: "r".into(),
            expansion_id: "e".into(),
            pack_ids: Vec::new(),
            illustrator: "Someone".into(),
            flavor: None,
        };

        let record =
            build_card_record(&MediaLinks::new(LINKS), "cards", "sync", &maps, &card).unwrap();
        assert_eq!(record.children.len(), 1);
        assert_eq!(record.properties[property::PACKS], PropertyValue::Relation(vec![]));
        assert_eq!(record.properties[property::HP], PropertyValue::Number(None));
    }

    #[tokio::test]
    async fn unmapped_relation_aborts_the_run() {
        // Card 2 points at a pack the origin pack collection never listed.
        let mut broken = card(2, "");
        broken.properties.insert(
            property::PACKS.to_string(),
            PropertyValue::relation(["o-pack-unknown"]),
        );
        let origin = origin_store([card(1, ""), broken, card(3, "")]);

        let destination = MemoryStore::new();
        let links = MediaLinks::new(LINKS);
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };
        let request = request(0, 10);
        let maps = sync_reference_tiers(ctx, &request.origin, &request.destination)
            .await
            .unwrap();

        let err = import_cards(ctx, &request, &maps).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvedRelation {
                tier: ReferenceTier::Pack,
                ..
            }
        ));
        assert_eq!(created_sync_ids(&destination), vec![1]);
    }

    #[tokio::test]
    async fn zero_limit_creates_nothing() {
        let origin = origin_store([card(1, "")]);
        let destination = MemoryStore::new();
        let links = MediaLinks::new(LINKS);
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };
        let request = request(0, 0);

        let report = import_cards(ctx, &request, &TierMaps::default())
            .await
            .unwrap();
        assert_eq!(report, CardImportReport::default());
        assert!(destination.created().is_empty());
    }
}
