//! Reference tier records (types, rarities, expansions, packs)

use crate::error::{Error, Result};
use crate::models::{property, ReferenceTier};
use crate::store::Record;

/// Tier-specific attributes of a reference record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierDetail {
    Type,
    Rarity,
    Expansion {
        /// Start of the release date, as stored.
        released: String,
    },
    Pack {
        /// Origin id of the parent expansion.
        expansion_id: String,
    },
}

/// A reference record read from the origin store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub id: String,
    pub name: String,
    pub detail: TierDetail,
}

impl ReferenceRecord {
    /// Validate an origin record of `tier`.
    ///
    /// The name is the business key, so a record without one is rejected
    /// instead of being matched against nothing.
    pub fn from_record(tier: ReferenceTier, record: &Record) -> Result<Self> {
        let name = record
            .text(property::NAME)
            .ok_or_else(|| Error::invalid_record(&record.id, format!("{tier} has no name")))?
            .to_string();

        let detail = match tier {
            ReferenceTier::Type => TierDetail::Type,
            ReferenceTier::Rarity => TierDetail::Rarity,
            ReferenceTier::Expansion => TierDetail::Expansion {
                released: record
                    .date(property::RELEASED_DATE)
                    .ok_or_else(|| {
                        Error::invalid_record(&record.id, "expansion has no release date")
                    })?
                    .to_string(),
            },
            ReferenceTier::Pack => TierDetail::Pack {
                expansion_id: record
                    .relation(property::EXPANSION)
                    .first()
                    .ok_or_else(|| Error::invalid_record(&record.id, "pack has no expansion"))?
                    .clone(),
            },
        };

        Ok(Self {
            id: record.id.clone(),
            name,
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PropertyValue;

    #[test]
    fn expansion_requires_release_date() {
        let record = Record::new("exp-1").with(property::NAME, PropertyValue::title("Genetic Apex"));
        let err = ReferenceRecord::from_record(ReferenceTier::Expansion, &record).unwrap_err();
        assert!(err.to_string().contains("release date"));

        let record = record.with(
            property::RELEASED_DATE,
            PropertyValue::Date(Some("2024-10-30".into())),
        );
        let parsed = ReferenceRecord::from_record(ReferenceTier::Expansion, &record).unwrap();
        assert_eq!(
            parsed.detail,
            TierDetail::Expansion {
                released: "2024-10-30".into()
            }
        );
    }

    #[test]
    fn pack_takes_first_expansion_relation() {
        let record = Record::new("pack-1")
            .with(property::NAME, PropertyValue::title("Mewtwo"))
            .with(property::EXPANSION, PropertyValue::relation(["exp-1", "exp-2"]));
        let parsed = ReferenceRecord::from_record(ReferenceTier::Pack, &record).unwrap();
        assert_eq!(
            parsed.detail,
            TierDetail::Pack {
                expansion_id: "exp-1".into()
            }
        );
    }

    #[test]
    fn nameless_records_are_rejected() {
        let record = Record::new("type-1");
        assert!(ReferenceRecord::from_record(ReferenceTier::Type, &record).is_err());
    }
}
