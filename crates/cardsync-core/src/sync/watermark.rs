use crate::error::Result;
use crate::models::{property, SyncId};
use crate::store::{PropertyMap, PropertyValue, RecordQuery};
use crate::sync::SyncContext;

/// Recompute the highest Sync ID of the origin card collection and store it
/// as `Origin Max ID` on the destination's coordinating record.
///
/// Cards without a Sync ID count as 0, and so does an empty collection.
pub async fn check_watermark(
    ctx: SyncContext<'_>,
    origin_cards: &str,
    sync_record: &str,
) -> Result<SyncId> {
    let cards = ctx.origin.query(origin_cards, &RecordQuery::all()).await?;
    let highest = cards
        .iter()
        .map(|card| card.integer(property::SYNC_ID).unwrap_or(0))
        .max()
        .unwrap_or(0);

    let mut properties = PropertyMap::new();
    properties.insert(
        property::ORIGIN_MAX_ID.to_string(),
        PropertyValue::integer(Some(highest)),
    );
    ctx.destination.update(sync_record, properties).await?;

    tracing::info!(highest, sync_record, "Watermark recorded");
    Ok(highest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::MediaLinks;
    use crate::store::{MemoryStore, Record};

    #[tokio::test]
    async fn writes_highest_sync_id_onto_sync_record() {
        let origin = MemoryStore::new();
        for sync_id in [4, 19, 7] {
            origin.seed(
                "cards",
                Record::new(format!("c{sync_id}"))
                    .with(property::SYNC_ID, PropertyValue::integer(Some(sync_id))),
            );
        }
        origin.seed("cards", Record::new("unnumbered"));
        let destination = MemoryStore::new();
        destination.seed("sync", Record::new("marker"));
        let links = MediaLinks::new("https://media.example.com");
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };

        let highest = check_watermark(ctx, "cards", "marker").await.unwrap();

        assert_eq!(highest, 19);
        assert_eq!(
            destination.records("sync")[0].integer(property::ORIGIN_MAX_ID),
            Some(19)
        );
    }

    #[tokio::test]
    async fn empty_collection_records_zero() {
        let origin = MemoryStore::new();
        let destination = MemoryStore::new();
        destination.seed("sync", Record::new("marker"));
        let links = MediaLinks::new("https://media.example.com");
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };

        assert_eq!(check_watermark(ctx, "cards", "marker").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_sync_record_is_an_error() {
        let origin = MemoryStore::new();
        let destination = MemoryStore::new();
        let links = MediaLinks::new("https://media.example.com");
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };

        assert!(check_watermark(ctx, "cards", "marker").await.is_err());
    }
}
