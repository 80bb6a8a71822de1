//! Card records read from the origin store

use crate::error::{Error, Result};
use crate::models::{property, SyncId};
use crate::store::Record;

/// A leaf card record as stored in the origin collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginCard {
    pub id: String,
    pub name: String,
    pub card_id: Option<i64>,
    pub sync_id: SyncId,
    pub hp: Option<i64>,
    pub type_id: String,
    pub rarity_id: String,
    pub expansion_id: String,
    pub pack_ids: Vec<String>,
    pub illustrator: String,
    /// Flavor text; `None` when absent or empty.
    pub flavor: Option<String>,
}

impl OriginCard {
    pub fn from_record(record: &Record) -> Result<Self> {
        let required_text = |name: &str| {
            record
                .text(name)
                .map(ToString::to_string)
                .ok_or_else(|| Error::invalid_record(&record.id, format!("card has no {name}")))
        };
        let first_relation = |name: &str| {
            record
                .relation(name)
                .first()
                .cloned()
                .ok_or_else(|| Error::invalid_record(&record.id, format!("card has no {name}")))
        };

        Ok(Self {
            id: record.id.clone(),
            name: required_text(property::NAME)?,
            card_id: record.integer(property::CARD_ID),
            sync_id: record.integer(property::SYNC_ID).ok_or_else(|| {
                Error::invalid_record(&record.id, "card has no integral Sync ID")
            })?,
            hp: record.integer(property::HP),
            type_id: first_relation(property::TYPE)?,
            rarity_id: first_relation(property::RARITY)?,
            expansion_id: first_relation(property::EXPANSION)?,
            pack_ids: record.relation(property::PACKS).to_vec(),
            illustrator: required_text(property::ILLUSTRATION)?,
            flavor: record
                .text(property::FLAVOR)
                .filter(|text| !text.is_empty())
                .map(ToString::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{PropertyValue, RichText};

    fn full_record() -> Record {
        Record::new("card-1")
            .with(property::NAME, PropertyValue::title("Bulbasaur"))
            .with(property::CARD_ID, PropertyValue::integer(Some(1)))
            .with(property::SYNC_ID, PropertyValue::integer(Some(101)))
            .with(property::HP, PropertyValue::integer(Some(70)))
            .with(property::TYPE, PropertyValue::relation(["t-grass"]))
            .with(property::RARITY, PropertyValue::relation(["r-common"]))
            .with(property::EXPANSION, PropertyValue::relation(["e-a1"]))
            .with(property::PACKS, PropertyValue::relation(["p-1", "p-2"]))
            .with(
                property::ILLUSTRATION,
                PropertyValue::RichText(vec![RichText::plain("Narumi Sato")]),
            )
            .with(property::FLAVOR, PropertyValue::RichText(vec![RichText::plain("")]))
    }

    #[test]
    fn parses_complete_card_and_drops_empty_flavor() {
        let card = OriginCard::from_record(&full_record()).unwrap();
        assert_eq!(card.sync_id, 101);
        assert_eq!(card.hp, Some(70));
        assert_eq!(card.pack_ids, vec!["p-1".to_string(), "p-2".to_string()]);
        assert_eq!(card.illustrator, "Narumi Sato");
        assert_eq!(card.flavor, None);
    }

    #[test]
    fn missing_rarity_is_invalid() {
        let mut record = full_record();
        record.properties.remove(property::RARITY);
        let err = OriginCard::from_record(&record).unwrap_err();
        assert!(err.to_string().contains("Rarity"));
    }
}
