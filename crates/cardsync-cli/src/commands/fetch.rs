use std::collections::HashMap;

use cardsync_core::catalog::{CatalogFetcher, TCGDEX_API_URL};

use crate::cli::FetchArgs;
use crate::error::CliError;

pub async fn run_fetch(args: &FetchArgs, env: &HashMap<String, String>) -> Result<(), CliError> {
    let base_url = args
        .api_url
        .as_deref()
        .or_else(|| env.get("TCG_API_URL").map(String::as_str))
        .unwrap_or(TCGDEX_API_URL);
    let fetcher = CatalogFetcher::new(base_url);

    let Some(card) = fetcher.fetch_card(&args.set, args.number).await else {
        return Err(CliError::CardNotFound {
            set: args.set.clone(),
            number: args.number,
        });
    };
    println!("{}", serde_json::to_string_pretty(&card)?);
    Ok(())
}
