use std::collections::HashMap;

use cardsync_core::catalog::{import_catalog, CatalogFetcher, CatalogImport};
use cardsync_core::config::{ConfigError, ImportConfig};
use cardsync_core::store::NotionClient;

use crate::cli::ImportArgs;
use crate::error::CliError;

pub async fn run_import(args: &ImportArgs, env: &HashMap<String, String>) -> Result<(), CliError> {
    let config = import_config(args, env)?;
    tracing::info!("Starting catalog import with config: {:?}", config);

    let store = NotionClient::new(config.notion_token.as_str())?;
    let fetcher = CatalogFetcher::new(config.catalog_api_url.as_str());
    let plan = CatalogImport::from_config(&config);

    let tally = import_catalog(&store, &fetcher, &config.collections, &plan).await;
    println!(
        "Imported {} cards ({} fetch errors, {} insert errors); next sync id: {}",
        tally.imported, tally.fetch_errors, tally.insert_errors, tally.next_sync_id
    );
    Ok(())
}

/// Environment values with command-line flags layered on top.
pub fn import_config(
    args: &ImportArgs,
    env: &HashMap<String, String>,
) -> Result<ImportConfig, ConfigError> {
    let overrides: HashMap<&str, String> = [
        ("TCG_SET_ID", args.set.clone()),
        ("TCG_START_NUMBER", args.start.map(|n| n.to_string())),
        ("TCG_END_NUMBER", args.end.map(|n| n.to_string())),
        ("SYNC_START_ID", args.sync_start_id.map(|id| id.to_string())),
        ("DEFAULT_PACK", args.default_pack.clone()),
        (
            "MEDIA_DIR",
            args.media_dir
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned()),
        ),
        ("TCG_API_URL", args.api_url.clone()),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|value| (name, value)))
    .collect();

    ImportConfig::from_lookup(|name| {
        overrides
            .get(name)
            .or_else(|| env.get(name))
            .cloned()
    })
}
