use std::fmt;

use clap::{Parser, Subcommand};
use colored::Colorize;
use error_stack::fmt::{Charset, ColorMode};
use error_stack::{FutureExt, Report, ResultExt};

use crate::config::PorterConfig;
use crate::copy::commands::CopyCommands;

mod config;
mod copy;
mod dialoguer;
mod matching;
mod plex;

#[derive(Debug)]
pub struct PorterError;
impl fmt::Display for PorterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Plex Porter error")
    }
}
impl std::error::Error for PorterError {}

pub type PorterResult<T> = error_stack::Result<T, PorterError>;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Copy playlists and collections between Plex servers")]
struct Cli {
    #[command(subcommand)]
    command: PorterCommands,
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
enum PorterCommands {
    /// Sign in to plex.tv and store the auth token
    Login,
    /// Reads the current config file
    Config,
    /// Copy a playlist to another server
    Playlist,
    /// Copy a collection to another server
    Collection,
    /// Pick what to copy from a menu
    Copy,
}

impl PorterCommands {
    pub async fn execute(&self) -> PorterResult<()> {
        return match self {
            PorterCommands::Login => {
                let config = PorterConfig::login_and_store()
                    .await
                    .change_context(PorterError)?;
                println!(
                    "Signed in as {}, token stored in the config file",
                    config.username.green()
                );
                Ok(())
            }
            PorterCommands::Config => {
                let mut config = PorterConfig::new();
                config.read_config_file().change_context(PorterError)?;
                println!("Current config:\n{:#?}", config.redacted());
                Ok(())
            }
            PorterCommands::Playlist => CopyCommands::copy_playlist()
                .change_context(PorterError)
                .await,
            PorterCommands::Collection => CopyCommands::copy_collection()
                .change_context(PorterError)
                .await,
            PorterCommands::Copy => CopyCommands::execute().change_context(PorterError).await,
        };
    }
}

pub struct Suggestion(String);

impl Suggestion {
    pub fn set_report() {
        Report::set_charset(Charset::Utf8);
        Report::set_color_mode(ColorMode::Color);
        Report::install_debug_hook::<Self>(|Self(value), context| {
            context.push_body(format!("{}: {value}", "suggestion".yellow()))
        });
    }
}

async fn run() -> PorterResult<()> {
    let cli = Cli::parse();

    Suggestion::set_report();

    cli.command.execute().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> PorterResult<()> {
    run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_flows_have_direct_subcommands() {
        let cli = Cli::try_parse_from(["plex-porter", "playlist"]).unwrap();
        assert_eq!(cli.command, PorterCommands::Playlist);
        let cli = Cli::try_parse_from(["plex-porter", "collection"]).unwrap();
        assert_eq!(cli.command, PorterCommands::Collection);
        let cli = Cli::try_parse_from(["plex-porter", "copy"]).unwrap();
        assert_eq!(cli.command, PorterCommands::Copy);
    }
}
