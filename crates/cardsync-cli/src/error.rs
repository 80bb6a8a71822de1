use cardsync_core::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] cardsync_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid log directive: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Card {set}-{number:03} could not be fetched from the catalog")]
    CardNotFound { set: String, number: u32 },
}
