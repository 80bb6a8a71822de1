use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{property, ReferenceRecord, ReferenceTier};
use crate::store::{NewRecord, PropertyMap, PropertyValue, RecordQuery};
use crate::sync::SyncContext;

/// Destination counterpart of an origin reference record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRecord {
    pub id: String,
    pub name: String,
}

/// Origin record id to its destination counterpart, for one tier.
pub type IdentityMap = HashMap<String, MappedRecord>;

/// Extra properties for a reference record created in the destination.
pub type PropertyBuilder<'a> = dyn Fn(&ReferenceRecord) -> Result<PropertyMap> + Send + Sync + 'a;

/// Look up an origin id in a tier map, failing when it has no counterpart.
pub(crate) fn resolve<'m>(
    map: &'m IdentityMap,
    tier: ReferenceTier,
    origin_id: &str,
) -> Result<&'m MappedRecord> {
    map.get(origin_id)
        .ok_or_else(|| Error::unresolved(tier, origin_id))
}

/// Match every origin record of a tier to a destination record by name,
/// creating the destination record when none matches.
///
/// Names are compared exactly; the first destination record with an equal
/// name wins. Creates run one at a time in origin order, and any error aborts
/// the tier.
pub async fn resolve_tier(
    ctx: SyncContext<'_>,
    tier: ReferenceTier,
    origin_collection: &str,
    destination_collection: &str,
    extra_properties: Option<&PropertyBuilder<'_>>,
) -> Result<IdentityMap> {
    let everything = RecordQuery::all();
    let (origin_records, destination_records) = tokio::try_join!(
        ctx.origin.query(origin_collection, &everything),
        ctx.destination.query(destination_collection, &everything),
    )?;

    let mut map = IdentityMap::with_capacity(origin_records.len());
    let mut created = 0_usize;

    for record in &origin_records {
        let origin = ReferenceRecord::from_record(tier, record)?;
        let existing = destination_records
            .iter()
            .find(|candidate| candidate.text(property::NAME) == Some(origin.name.as_str()));

        let destination_id = if let Some(existing) = existing {
            existing.id.clone()
        } else {
            let mut new_record = NewRecord::new(destination_collection)
                .icon(ctx.links.tier_icon(tier, &origin.name))
                .property(property::NAME, PropertyValue::title(&origin.name));
            if let Some(build) = extra_properties {
                new_record = new_record.properties(build(&origin)?);
            }

            let id = ctx.destination.create(new_record).await?;
            tracing::info!(tier = tier.label(), name = %origin.name, "Created reference record");
            created += 1;
            id
        };

        map.insert(
            origin.id,
            MappedRecord {
                id: destination_id,
                name: origin.name,
            },
        );
    }

    tracing::debug!(
        tier = tier.label(),
        matched = map.len() - created,
        created,
        "Resolved tier"
    );
    Ok(map)
}
