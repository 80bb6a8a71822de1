use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cardsync")]
#[command(about = "Import cards from the external catalog into the record store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a range of catalog cards, assigning sync ids as they land
    Import(ImportArgs),
    /// Fetch one catalog card and print it as JSON
    Fetch(FetchArgs),
}

/// Every flag overrides the environment variable named in its help.
#[derive(Debug, Default, Args)]
pub struct ImportArgs {
    /// Catalog set id (TCG_SET_ID)
    #[arg(long, value_name = "SET")]
    pub set: Option<String>,
    /// First card number, inclusive (TCG_START_NUMBER)
    #[arg(long, value_name = "N")]
    pub start: Option<u32>,
    /// Last card number, inclusive (TCG_END_NUMBER)
    #[arg(long, value_name = "N")]
    pub end: Option<u32>,
    /// Sync id given to the first imported card (SYNC_START_ID)
    #[arg(long, value_name = "ID")]
    pub sync_start_id: Option<i64>,
    /// Pack used when a card lists no boosters (DEFAULT_PACK)
    #[arg(long, value_name = "NAME")]
    pub default_pack: Option<String>,
    /// Directory card images are written under (MEDIA_DIR)
    #[arg(long, value_name = "PATH")]
    pub media_dir: Option<PathBuf>,
    /// Catalog base URL (TCG_API_URL)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Catalog set id
    pub set: String,
    /// Card number within the set
    pub number: u32,
    /// Catalog base URL (TCG_API_URL)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn import_flags_parse() {
        let cli = Cli::try_parse_from([
            "cardsync",
            "import",
            "--set",
            "A1",
            "--start",
            "1",
            "--end",
            "286",
            "--sync-start-id",
            "1000",
        ])
        .unwrap();

        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.set.as_deref(), Some("A1"));
        assert_eq!(args.start, Some(1));
        assert_eq!(args.end, Some(286));
        assert_eq!(args.sync_start_id, Some(1000));
        assert_eq!(args.default_pack, None);
    }

    #[test]
    fn fetch_requires_set_and_number() {
        assert!(Cli::try_parse_from(["cardsync", "fetch", "A1"]).is_err());

        let cli = Cli::try_parse_from(["cardsync", "fetch", "A1", "7"]).unwrap();
        let Commands::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.set, "A1");
        assert_eq!(args.number, 7);
    }

    #[test]
    fn negative_card_numbers_are_rejected() {
        assert!(Cli::try_parse_from(["cardsync", "import", "--start", "-1"]).is_err());
    }
}
