use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use cardsync_core::config::Collections;
use cardsync_core::store::{NotionClient, RecordStore};
use cardsync_core::sync::{check_watermark, run_sync, SyncContext, SyncRequest};
use cardsync_core::{MediaLinks, ReferenceTier, SyncId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::AppError;

/// Opens a destination store with a caller-supplied token.
pub type StoreConnector =
    Arc<dyn Fn(&str) -> cardsync_core::Result<Arc<dyn RecordStore>> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    origin: Arc<dyn RecordStore>,
    links: Arc<MediaLinks>,
    connect: StoreConnector,
}

impl AppState {
    pub fn from_config(config: Arc<AppConfig>) -> cardsync_core::Result<Self> {
        let origin: Arc<dyn RecordStore> =
            Arc::new(NotionClient::new(config.notion_token.as_str())?);
        let connect: StoreConnector = Arc::new(
            |token: &str| -> cardsync_core::Result<Arc<dyn RecordStore>> {
                Ok(Arc::new(NotionClient::new(token)?))
            },
        );
        Ok(Self::new(config, origin, connect))
    }

    pub fn new(
        config: Arc<AppConfig>,
        origin: Arc<dyn RecordStore>,
        connect: StoreConnector,
    ) -> Self {
        Self {
            links: Arc::new(MediaLinks::new(config.domain.as_str())),
            config,
            origin,
            connect,
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    let media_dir = state.config.media_dir.clone();
    let mut router = Router::new()
        .route("/healthz", get(healthz))
        .route("/check", get(check))
        .route("/sync", get(sync));

    for category in ReferenceTier::ALL
        .iter()
        .map(|tier| tier.media_type())
        .chain(["cards"])
    {
        router = router.nest_service(
            &format!("/images-{category}"),
            ServeDir::new(media_dir.join(category)),
        );
    }

    router
        .route_service("/assets", ServeFile::new(media_dir.join("assets.zip")))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
    })
}

#[derive(Debug, Deserialize)]
struct CheckQuery {
    sync: Option<String>,
    secret: Option<String>,
}

async fn check(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<&'static str>, AppError> {
    let sync_record = required(query.sync, "sync")?;
    let token = required(query.secret, "secret")?;
    let destination = (state.connect)(token.as_str())?;

    let ctx = SyncContext {
        origin: state.origin.as_ref(),
        destination: destination.as_ref(),
        links: &state.links,
    };
    let highest = check_watermark(ctx, &state.config.collections.cards, &sync_record).await?;
    tracing::info!(endpoint = "check", origin_max_id = highest, "Watermark published");
    Ok(Json("Sync checked"))
}

#[derive(Debug, Deserialize)]
struct SyncQuery {
    secret: Option<String>,
    card: Option<String>,
    expansion: Option<String>,
    pack: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    rarity: Option<String>,
    sync: Option<String>,
    max_id: Option<String>,
}

async fn sync(
    State(state): State<AppState>,
    Query(query): Query<SyncQuery>,
) -> Result<Json<&'static str>, AppError> {
    let watermark = parse_watermark(query.max_id.as_deref())?;
    let request = SyncRequest {
        origin: state.config.collections.clone(),
        destination: Collections {
            cards: required(query.card, "card")?,
            types: required(query.kind, "type")?,
            rarities: required(query.rarity, "rarity")?,
            expansions: required(query.expansion, "expansion")?,
            packs: required(query.pack, "pack")?,
        },
        sync_record: required(query.sync, "sync")?,
        watermark,
        limit: state.config.card_limit,
    };
    let token = required(query.secret, "secret")?;
    let destination = (state.connect)(token.as_str())?;

    let ctx = SyncContext {
        origin: state.origin.as_ref(),
        destination: destination.as_ref(),
        links: &state.links,
    };
    let report = run_sync(ctx, &request).await?;
    tracing::info!(
        endpoint = "sync",
        watermark,
        created = report.created,
        last_sync_id = ?report.last_sync_id,
        "Sync finished"
    );
    Ok(Json("Sync ok"))
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::bad_request(format!("missing query parameter `{name}`")))
}

fn parse_watermark(value: Option<&str>) -> Result<SyncId, AppError> {
    let value = value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::bad_request("missing query parameter `max_id`"))?;
    value
        .parse()
        .map_err(|_| AppError::bad_request(format!("max_id must be an integer, got `{value}`")))
}
