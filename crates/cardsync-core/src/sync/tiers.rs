use crate::config::Collections;
use crate::error::{Error, Result};
use crate::models::{property, ReferenceRecord, ReferenceTier, TierDetail};
use crate::store::{PropertyMap, PropertyValue};
use crate::sync::identity::{resolve, resolve_tier, IdentityMap};
use crate::sync::SyncContext;

/// Identity maps of all four reference tiers for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierMaps {
    pub types: IdentityMap,
    pub rarities: IdentityMap,
    pub expansions: IdentityMap,
    pub packs: IdentityMap,
}

impl TierMaps {
    pub const fn tier(&self, tier: ReferenceTier) -> &IdentityMap {
        match tier {
            ReferenceTier::Type => &self.types,
            ReferenceTier::Rarity => &self.rarities,
            ReferenceTier::Expansion => &self.expansions,
            ReferenceTier::Pack => &self.packs,
        }
    }
}

/// Resolve types, rarities and expansions concurrently, then packs.
///
/// Packs wait for the expansion map: each created pack's `Expansion`
/// relation is looked up in it while the record is built.
pub async fn sync_reference_tiers(
    ctx: SyncContext<'_>,
    origin: &Collections,
    destination: &Collections,
) -> Result<TierMaps> {
    let expansion_properties = |record: &ReferenceRecord| -> Result<PropertyMap> {
        let TierDetail::Expansion { released } = &record.detail else {
            return Err(Error::invalid_record(&record.id, "not an expansion"));
        };
        let mut properties = PropertyMap::new();
        properties.insert(
            property::RELEASED_DATE.to_string(),
            PropertyValue::Date(Some(released.clone())),
        );
        properties.insert(
            property::COVER.to_string(),
            PropertyValue::external_file(
                &record.name,
                ctx.links.tier_icon(ReferenceTier::Expansion, &record.name),
            ),
        );
        Ok(properties)
    };

    let (types, rarities, expansions) = tokio::try_join!(
        resolve_tier(
            ctx,
            ReferenceTier::Type,
            &origin.types,
            &destination.types,
            None
        ),
        resolve_tier(
            ctx,
            ReferenceTier::Rarity,
            &origin.rarities,
            &destination.rarities,
            None
        ),
        resolve_tier(
            ctx,
            ReferenceTier::Expansion,
            &origin.expansions,
            &destination.expansions,
            Some(&expansion_properties)
        ),
    )?;

    let pack_properties = |record: &ReferenceRecord| -> Result<PropertyMap> {
        let TierDetail::Pack { expansion_id } = &record.detail else {
            return Err(Error::invalid_record(&record.id, "not a pack"));
        };
        let expansion = resolve(&expansions, ReferenceTier::Expansion, expansion_id)?;
        let mut properties = PropertyMap::new();
        properties.insert(
            property::EXPANSION.to_string(),
            PropertyValue::relation([expansion.id.as_str()]),
        );
        Ok(properties)
    };

    let packs = resolve_tier(
        ctx,
        ReferenceTier::Pack,
        &origin.packs,
        &destination.packs,
        Some(&pack_properties),
    )
    .await?;

    Ok(TierMaps {
        types,
        rarities,
        expansions,
        packs,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::links::MediaLinks;
    use crate::store::{ExternalFile, MemoryStore};
    use crate::sync::fixtures::{collections, expansion, named, origin_store, pack};

    #[tokio::test]
    async fn creates_all_tiers_and_links_packs_to_destination_expansions() {
        let origin = origin_store([]);
        let destination = MemoryStore::new();
        let links = MediaLinks::new("https://media.example.com");
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };
        let dest_ids = collections("dest");

        let maps = sync_reference_tiers(ctx, &collections("origin"), &dest_ids)
            .await
            .unwrap();

        for tier in ReferenceTier::ALL {
            assert_eq!(maps.tier(tier).len(), 1, "{tier}");
        }

        let expansion_id = &maps.expansions["o-exp-a1"].id;
        let packs = destination.records(&dest_ids.packs);
        assert_eq!(packs.len(), 1);
        assert_eq!(packs[0].relation(property::EXPANSION), [expansion_id.clone()]);

        let expansions = destination.records(&dest_ids.expansions);
        assert_eq!(expansions[0].date(property::RELEASED_DATE), Some("2024-10-30"));
        assert_eq!(
            expansions[0].property(property::COVER),
            Some(&PropertyValue::Files(vec![ExternalFile {
                name: "Genetic Apex".into(),
                url: "https://media.example.com/images-expansions/Genetic_Apex.png".into(),
            }]))
        );
    }

    #[tokio::test]
    async fn existing_expansion_is_reused_for_new_packs() {
        let origin = origin_store([]);
        let destination = MemoryStore::new();
        let dest_ids = collections("dest");
        destination.seed(
            &dest_ids.expansions,
            expansion("d-exp", "Genetic Apex", "2024-10-30"),
        );
        let links = MediaLinks::new("https://media.example.com");
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };

        let maps = sync_reference_tiers(ctx, &collections("origin"), &dest_ids)
            .await
            .unwrap();

        assert_eq!(maps.expansions["o-exp-a1"].id, "d-exp");
        let packs = destination.records(&dest_ids.packs);
        assert_eq!(packs[0].relation(property::EXPANSION), ["d-exp".to_string()]);
    }

    #[tokio::test]
    async fn pack_with_unknown_expansion_fails_the_run() {
        let origin = origin_store([]);
        let origin_ids = collections("origin");
        origin.seed(&origin_ids.packs, pack("o-pack-orphan", "Orphan", "o-exp-gone"));
        let destination = MemoryStore::new();
        let dest_ids = collections("dest");
        let links = MediaLinks::new("https://media.example.com");
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };

        let err = sync_reference_tiers(ctx, &origin_ids, &dest_ids)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::UnresolvedRelation {
                tier: ReferenceTier::Expansion,
                ref origin_id,
            } if origin_id == "o-exp-gone"
        ));
        let dangling = destination
            .records(&dest_ids.packs)
            .into_iter()
            .filter(|record| record.text(property::NAME) == Some("Orphan"))
            .count();
        assert_eq!(dangling, 0);
    }

    #[tokio::test]
    async fn existing_pack_is_matched_by_name() {
        let origin = origin_store([]);
        let destination = MemoryStore::new();
        let dest_ids = collections("dest");
        destination.seed(&dest_ids.packs, named("d-pack", "Mewtwo"));
        let links = MediaLinks::new("https://media.example.com");
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };

        let maps = sync_reference_tiers(ctx, &collections("origin"), &dest_ids)
            .await
            .unwrap();

        assert_eq!(maps.packs["o-pack-mewtwo"].id, "d-pack");
        assert_eq!(destination.records(&dest_ids.packs).len(), 1);
    }

    #[tokio::test]
    async fn failing_independent_tier_aborts_before_packs() {
        let origin = origin_store([]);
        let destination = MemoryStore::new();
        let dest_ids = collections("dest");
        destination.fail_queries_for(&dest_ids.rarities);
        let links = MediaLinks::new("https://media.example.com");
        let ctx = SyncContext {
            origin: &origin,
            destination: &destination,
            links: &links,
        };

        assert!(sync_reference_tiers(ctx, &collections("origin"), &dest_ids)
            .await
            .is_err());
        assert!(destination.records(&dest_ids.packs).is_empty());
    }
}
