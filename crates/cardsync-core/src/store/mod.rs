//! Record store abstraction.
//!
//! Both sides of a reconciliation run (and the catalog importer's target) are
//! collections of records with named, typed properties. The engines only ever
//! query, create, and update, so that is all the trait exposes.

mod memory;
mod notion;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryStore;
pub use notion::{NotionClient, NOTION_API_URL, NOTION_VERSION};

/// Property name to value, ordered so request bodies are stable.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Query, create, and update operations over named collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Return every record of `collection` matching `query`, in store order
    /// unless the query asks for a sort.
    async fn query(&self, collection: &str, query: &RecordQuery) -> Result<Vec<Record>>;

    /// Create a record and return its store-assigned id.
    async fn create(&self, record: NewRecord) -> Result<String>;

    /// Overwrite the given properties of an existing record.
    async fn update(&self, record_id: &str, properties: PropertyMap) -> Result<()>;
}

/// One segment of rich text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RichText {
    pub content: String,
    pub bold: bool,
    pub italic: bool,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn bold(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            bold: true,
            italic: false,
        }
    }

    pub fn italic(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            bold: false,
            italic: true,
        }
    }
}

/// A file hosted outside the store, referenced by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFile {
    pub name: String,
    pub url: String,
}

/// Typed value of a single record property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(Vec<RichText>),
    RichText(Vec<RichText>),
    Number(Option<f64>),
    Relation(Vec<String>),
    /// Start of a date property, as the store formats it.
    Date(Option<String>),
    Files(Vec<ExternalFile>),
    /// Property kinds the engines never read or write.
    Unsupported,
}

impl PropertyValue {
    pub fn title(content: impl Into<String>) -> Self {
        Self::Title(vec![RichText::plain(content)])
    }

    #[allow(clippy::cast_precision_loss)] // ids and card numbers stay far below 2^53
    pub fn integer(value: Option<i64>) -> Self {
        Self::Number(value.map(|value| value as f64))
    }

    pub fn relation<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Relation(ids.into_iter().map(Into::into).collect())
    }

    pub fn external_file(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Files(vec![ExternalFile {
            name: name.into(),
            url: url.into(),
        }])
    }

    /// Content of the first text segment of a title or rich text value.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            Self::Title(segments) | Self::RichText(segments) => {
                segments.first().map(|segment| segment.content.as_str())
            }
            _ => None,
        }
    }

    /// Numeric value when it is integral.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(Some(value)) if value.fract() == 0.0 && value.is_finite() => {
                Some(*value as i64)
            }
            _ => None,
        }
    }

    pub fn relation_ids(&self) -> &[String] {
        match self {
            Self::Relation(ids) => ids,
            _ => &[],
        }
    }

    pub fn date_start(&self) -> Option<&str> {
        match self {
            Self::Date(start) => start.as_deref(),
            _ => None,
        }
    }
}

/// A record as returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub properties: PropertyMap,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: PropertyMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// First text segment of a title or rich text property.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::first_text)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.property(name).and_then(PropertyValue::as_integer)
    }

    pub fn relation(&self, name: &str) -> &[String] {
        self.property(name).map_or(&[], PropertyValue::relation_ids)
    }

    pub fn date(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::date_start)
    }
}

/// Content block appended to a record's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Image { url: String },
    Quote(Vec<RichText>),
}

/// A record to be created in `collection`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub collection: String,
    pub icon_url: Option<String>,
    pub properties: PropertyMap,
    pub children: Vec<Block>,
}

impl NewRecord {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            icon_url: None,
            properties: PropertyMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn icon(mut self, url: impl Into<String>) -> Self {
        self.icon_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn properties(mut self, properties: PropertyMap) -> Self {
        self.properties.extend(properties);
        self
    }

    #[must_use]
    pub fn child(mut self, block: Block) -> Self {
        self.children.push(block);
        self
    }

    /// First text segment of the `name` property, if set.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(PropertyValue::first_text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

/// Keep records whose numeric `property` is strictly greater than the bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFilter {
    pub property: String,
    pub greater_than: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub filter: Option<NumberFilter>,
    pub sort: Option<Sort>,
    /// Stop reading once this many records were collected.
    pub limit: Option<usize>,
}

impl RecordQuery {
    /// Every record of the collection.
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn greater_than(mut self, property: impl Into<String>, bound: i64) -> Self {
        self.filter = Some(NumberFilter {
            property: property.into(),
            greater_than: bound,
        });
        self
    }

    #[must_use]
    pub fn sorted(mut self, property: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(Sort {
            property: property.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
