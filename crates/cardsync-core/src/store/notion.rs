//! Notion-compatible record store client.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{
    Block, ExternalFile, NewRecord, PropertyMap, PropertyValue, Record, RecordQuery, RecordStore,
    RichText, SortDirection,
};
use crate::error::{Error, Result};
use crate::util::compact_text;

pub const NOTION_API_URL: &str = "https://api.notion.com";
pub const NOTION_VERSION: &str = "2022-06-28";

/// Largest page the query endpoint hands out.
const MAX_PAGE_SIZE: usize = 100;

/// HTTP client for one set of store credentials.
#[derive(Clone)]
pub struct NotionClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(NOTION_API_URL, token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::builder().build()?,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store {
                status: status.as_u16(),
                message: parse_api_error(status, &body),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn query(&self, collection: &str, query: &RecordQuery) -> Result<Vec<Record>> {
        let url = format!("{}/v1/databases/{collection}/query", self.base_url);
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let remaining = query
                .limit
                .map_or(MAX_PAGE_SIZE, |limit| limit.saturating_sub(records.len()));
            if remaining == 0 {
                break;
            }

            let body = query_body(query, cursor.as_deref(), remaining.min(MAX_PAGE_SIZE));
            let payload = self.send(self.client.post(&url).json(&body)).await?;
            let page: QueryPage = serde_json::from_value(payload)?;

            records.extend(page.results.into_iter().map(Record::from));
            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        tracing::debug!(collection, count = records.len(), "Queried collection");
        Ok(records)
    }

    async fn create(&self, record: NewRecord) -> Result<String> {
        let url = format!("{}/v1/pages", self.base_url);
        let payload = self
            .send(self.client.post(&url).json(&create_body(&record)))
            .await?;
        let created: CreatedPage = serde_json::from_value(payload)?;
        Ok(created.id)
    }

    async fn update(&self, record_id: &str, properties: PropertyMap) -> Result<()> {
        let url = format!("{}/v1/pages/{record_id}", self.base_url);
        let body = json!({ "properties": properties_json(&properties) });
        self.send(self.client.patch(&url).json(&body)).await?;
        Ok(())
    }
}

fn query_body(query: &RecordQuery, cursor: Option<&str>, page_size: usize) -> Value {
    let mut body = Map::new();
    if let Some(filter) = &query.filter {
        body.insert(
            "filter".to_string(),
            json!({
                "property": filter.property,
                "number": { "greater_than": filter.greater_than },
            }),
        );
    }
    if let Some(sort) = &query.sort {
        let direction = match sort.direction {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        };
        body.insert(
            "sorts".to_string(),
            json!([{ "property": sort.property, "direction": direction }]),
        );
    }
    body.insert("page_size".to_string(), json!(page_size));
    if let Some(cursor) = cursor {
        body.insert("start_cursor".to_string(), json!(cursor));
    }
    Value::Object(body)
}

fn create_body(record: &NewRecord) -> Value {
    let mut body = Map::new();
    body.insert(
        "parent".to_string(),
        json!({ "type": "database_id", "database_id": record.collection }),
    );
    if let Some(url) = &record.icon_url {
        body.insert(
            "icon".to_string(),
            json!({ "type": "external", "external": { "url": url } }),
        );
    }
    body.insert(
        "properties".to_string(),
        properties_json(&record.properties),
    );
    if !record.children.is_empty() {
        body.insert(
            "children".to_string(),
            Value::Array(record.children.iter().map(block_json).collect()),
        );
    }
    Value::Object(body)
}

fn properties_json(properties: &PropertyMap) -> Value {
    let map = properties
        .iter()
        .filter_map(|(name, value)| property_json(value).map(|json| (name.clone(), json)))
        .collect::<Map<String, Value>>();
    Value::Object(map)
}

fn property_json(value: &PropertyValue) -> Option<Value> {
    let json = match value {
        PropertyValue::Title(segments) => json!({ "title": rich_text_json(segments) }),
        PropertyValue::RichText(segments) => json!({ "rich_text": rich_text_json(segments) }),
        PropertyValue::Number(number) => json!({ "number": number }),
        PropertyValue::Relation(ids) => {
            let ids: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
            json!({ "relation": ids })
        }
        PropertyValue::Date(Some(start)) => json!({ "date": { "start": start } }),
        PropertyValue::Date(None) => json!({ "date": null }),
        PropertyValue::Files(files) => {
            let files: Vec<Value> = files
                .iter()
                .map(|file| {
                    json!({
                        "name": file.name,
                        "type": "external",
                        "external": { "url": file.url },
                    })
                })
                .collect();
            json!({ "files": files })
        }
        PropertyValue::Unsupported => return None,
    };
    Some(json)
}

fn rich_text_json(segments: &[RichText]) -> Value {
    Value::Array(
        segments
            .iter()
            .map(|segment| {
                json!({
                    "type": "text",
                    "text": { "content": segment.content },
                    "annotations": { "bold": segment.bold, "italic": segment.italic },
                })
            })
            .collect(),
    )
}

fn block_json(block: &Block) -> Value {
    match block {
        Block::Image { url } => json!({
            "object": "block",
            "type": "image",
            "image": { "type": "external", "external": { "url": url } },
        }),
        Block::Quote(segments) => json!({
            "object": "block",
            "type": "quote",
            "quote": { "rich_text": rich_text_json(segments) },
        }),
    }
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    results: Vec<RawPage>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    id: String,
    #[serde(default)]
    properties: HashMap<String, RawProperty>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawProperty {
    Title {
        title: Vec<RawRichText>,
    },
    RichText {
        rich_text: Vec<RawRichText>,
    },
    Number {
        number: Option<f64>,
    },
    Relation {
        relation: Vec<RawRelation>,
    },
    Date {
        date: Option<RawDate>,
    },
    Files {
        files: Vec<RawFile>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct RawRichText {
    plain_text: Option<String>,
    text: Option<RawTextContent>,
    annotations: Option<RawAnnotations>,
}

#[derive(Debug, Deserialize)]
struct RawTextContent {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawAnnotations {
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    italic: bool,
}

#[derive(Debug, Deserialize)]
struct RawRelation {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RawDate {
    start: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    name: Option<String>,
    external: Option<RawFileUrl>,
    file: Option<RawFileUrl>,
}

#[derive(Debug, Deserialize)]
struct RawFileUrl {
    url: String,
}

impl From<RawPage> for Record {
    fn from(page: RawPage) -> Self {
        Self {
            id: page.id,
            properties: page
                .properties
                .into_iter()
                .map(|(name, value)| (name, PropertyValue::from(value)))
                .collect(),
        }
    }
}

impl From<RawProperty> for PropertyValue {
    fn from(raw: RawProperty) -> Self {
        match raw {
            RawProperty::Title { title } => Self::Title(title.into_iter().map(Into::into).collect()),
            RawProperty::RichText { rich_text } => {
                Self::RichText(rich_text.into_iter().map(Into::into).collect())
            }
            RawProperty::Number { number } => Self::Number(number),
            RawProperty::Relation { relation } => {
                Self::Relation(relation.into_iter().map(|item| item.id).collect())
            }
            RawProperty::Date { date } => Self::Date(date.and_then(|date| date.start)),
            RawProperty::Files { files } => Self::Files(
                files
                    .into_iter()
                    .filter_map(|file| {
                        let url = file.external.or(file.file)?.url;
                        Some(ExternalFile {
                            name: file.name.unwrap_or_default(),
                            url,
                        })
                    })
                    .collect(),
            ),
            RawProperty::Other => Self::Unsupported,
        }
    }
}

impl From<RawRichText> for RichText {
    fn from(raw: RawRichText) -> Self {
        let annotations = raw.annotations.unwrap_or_default();
        Self {
            content: raw
                .text
                .map(|text| text.content)
                .or(raw.plain_text)
                .unwrap_or_default(),
            bold: annotations.bold,
            italic: annotations.italic,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoreErrorBody {
    message: Option<String>,
    code: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<StoreErrorBody>(body) {
        if let Some(message) = payload.message {
            return match payload.code {
                Some(code) => format!("{} [{code}]", message.trim()),
                None => message.trim().to_string(),
            };
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}
