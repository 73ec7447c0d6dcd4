use error_stack::{Report, ResultExt};
use inflector::Inflector;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::config::PorterConfig;
use crate::copy::items::{match_items, report_unmatched};
use crate::copy::{banner, clear_screen, CopyError, CopyResult};
use crate::dialoguer::Dialoguer;
use crate::matching::selector::PromptSelector;
use crate::plex::account::{PlexAccount, PlexResource};
use crate::plex::collection::PlexCollection;
use crate::plex::item::SearchKind;
use crate::plex::playlist::PlexPlaylist;
use crate::plex::section::{PlexSection, SectionCatalog};
use crate::plex::server::PlexServer;

#[derive(Debug, Deserialize, Serialize, Clone, strum_macros::Display, strum_macros::EnumIter)]
pub enum CopyCommands {
    CopyPlaylist,
    CopyCollection,
}

impl CopyCommands {
    pub async fn execute() -> CopyResult<()> {
        let options = Self::get_options();
        let selection = Dialoguer::select("What do you want to copy?".to_string(), options, None)
            .change_context(CopyError)?;
        return match Self::get_selection(selection) {
            CopyCommands::CopyPlaylist => Self::copy_playlist().await,
            CopyCommands::CopyCollection => Self::copy_collection().await,
        };
    }

    fn get_options() -> Vec<String> {
        Self::iter()
            .map(|element| element.to_string().to_sentence_case())
            .collect::<Vec<_>>()
    }

    fn get_selection(selection: usize) -> Self {
        let options = Self::iter().collect::<Vec<_>>();
        options[selection].clone()
    }

    /// Uses the stored token when a config file exists; otherwise falls
    /// back to a one-off interactive sign-in.
    async fn resolve_account() -> CopyResult<PlexAccount> {
        if PorterConfig::config_file_exists().change_context(CopyError)? {
            let mut config = PorterConfig::new();
            config.read_config_file().change_context(CopyError)?;
            return Ok(PlexAccount::from_token(
                config.username,
                config.auth_token,
                config.client_identifier,
            ));
        }
        println!("No stored credentials found. Run `plex-porter login` to keep the token around.");
        PlexAccount::interactive_signin(&PorterConfig::generate_client_identifier())
            .await
            .change_context(CopyError)
    }

    fn select_server(resources: &[PlexResource], prompt: &str) -> CopyResult<usize> {
        let names = resources
            .iter()
            .map(|resource| resource.name.clone())
            .collect::<Vec<_>>();
        Dialoguer::select(prompt.to_string(), names, None).change_context(CopyError)
    }

    async fn select_section(server: &PlexServer, prompt: &str) -> CopyResult<PlexSection> {
        let sections = PlexSection::all(server).await.change_context(CopyError)?;
        if sections.is_empty() {
            return Err(Report::new(CopyError)
                .attach_printable(format!("Server {} has no library sections", server.name)));
        }
        let titles = sections
            .iter()
            .map(|section| section.title.clone())
            .collect::<Vec<_>>();
        let selection =
            Dialoguer::select(prompt.to_string(), titles, None).change_context(CopyError)?;
        Ok(sections[selection].clone())
    }

    pub async fn copy_playlist() -> CopyResult<()> {
        clear_screen();
        banner("Plex Playlist Copy");
        let account = Self::resolve_account().await?;
        let resources = account.servers().await.change_context(CopyError)?;
        if resources.is_empty() {
            return Err(Report::new(CopyError)
                .attach_printable("No media servers are available on this account"));
        }

        clear_screen();
        banner("Select source server");
        let source_index =
            Self::select_server(&resources, "Select the server to copy a playlist from")?;
        let source_server = account
            .connect(&resources[source_index])
            .await
            .change_context(CopyError)?;

        let playlists = PlexPlaylist::all(&source_server)
            .await
            .change_context(CopyError)?;
        if playlists.is_empty() {
            return Err(Report::new(CopyError).attach_printable(format!(
                "Server {} has no audio playlists",
                source_server.name
            )));
        }
        let titles = playlists
            .iter()
            .map(|playlist| playlist.title.clone())
            .collect::<Vec<_>>();
        let selection = Dialoguer::select("Select the playlist to copy".to_string(), titles, None)
            .change_context(CopyError)?;
        let source_playlist = &playlists[selection];
        let source_items = source_playlist
            .fetch_items(&source_server)
            .await
            .change_context(CopyError)?;

        clear_screen();
        banner("Select destination server");
        let target_index =
            Self::select_server(&resources, "Select the server to copy the playlist to")?;
        let target_server = account
            .connect(&resources[target_index])
            .await
            .change_context(CopyError)?;

        let target_title = Dialoguer::input("Name for the target playlist".to_string())
            .change_context(CopyError)?;
        let target_playlist = PlexPlaylist::by_title(&target_server, &target_title)
            .await
            .change_context(CopyError)?;
        match &target_playlist {
            Some(_) => println!("Target playlist already exists, all missing items will be added."),
            None => println!("Target playlist does not exist, a new playlist will be created."),
        }

        clear_screen();
        banner("Finding items");
        let existing = target_playlist.as_ref().map(|playlist| playlist.items.as_slice());
        let mut selector = PromptSelector;
        let summary = match_items(
            &source_items,
            &target_server,
            &mut selector,
            SearchKind::Track,
            existing,
        )
        .await?;

        clear_screen();
        banner("Done!");
        if !summary.matched.is_empty() {
            match &target_playlist {
                Some(playlist) => {
                    playlist
                        .add_items(&target_server, &summary.matched)
                        .await
                        .change_context(CopyError)?;
                    println!("Updated playlist on the target server!");
                }
                None => {
                    PlexPlaylist::create(&target_server, &target_title, &summary.matched)
                        .await
                        .change_context(CopyError)?;
                    println!("Added new playlist to the target server!");
                }
            }
        } else {
            println!("Playlist could not be copied because no matching items could be found.");
        }
        if summary.skipped > 0 {
            println!("{} items were already present and skipped.", summary.skipped);
        }
        report_unmatched(&summary.unmatched, SearchKind::Track);
        Ok(())
    }

    pub async fn copy_collection() -> CopyResult<()> {
        clear_screen();
        banner("Plex Collection Copy");
        let account = Self::resolve_account().await?;
        let mut resources = account.servers().await.change_context(CopyError)?;
        if resources.len() < 2 {
            return Err(Report::new(CopyError).attach_printable(
                "Copying a collection needs at least two media servers on the account",
            ));
        }

        clear_screen();
        banner("Select source server");
        let source_index =
            Self::select_server(&resources, "Select the server to copy a collection from")?;
        let source_server = account
            .connect(&resources[source_index])
            .await
            .change_context(CopyError)?;
        // The source server is not offered as a destination.
        resources.remove(source_index);

        clear_screen();
        banner("Select section");
        let source_section =
            Self::select_section(&source_server, "Select the section the collection is part of")
                .await?;

        clear_screen();
        banner("Select destination server");
        let target_index =
            Self::select_server(&resources, "Select the server to copy the collection to")?;
        let target_server = account
            .connect(&resources[target_index])
            .await
            .change_context(CopyError)?;

        clear_screen();
        banner("Select destination section");
        let target_section = Self::select_section(
            &target_server,
            "Select the section the collection should be copied into",
        )
        .await?;

        clear_screen();
        banner("Select collection");
        let collections = PlexCollection::all(&source_server, &source_section)
            .await
            .change_context(CopyError)?;
        if collections.is_empty() {
            return Err(Report::new(CopyError).attach_printable(format!(
                "Section {} has no collections",
                source_section.title
            )));
        }
        let titles = collections
            .iter()
            .map(|collection| collection.title.clone())
            .collect::<Vec<_>>();
        let selection =
            Dialoguer::select("Select the collection to copy".to_string(), titles, None)
                .change_context(CopyError)?;
        let source_collection = &collections[selection];
        let source_items = source_collection
            .fetch_items(&source_server)
            .await
            .change_context(CopyError)?;

        clear_screen();
        banner("Name selection");
        let keep_name = Dialoguer::select_yes_or_no(format!(
            "Keep the name {} on the destination server?",
            source_collection.title
        ))
        .change_context(CopyError)?;
        let target_title = if keep_name {
            source_collection.title.clone()
        } else {
            Dialoguer::input("Name for the copied collection".to_string())
                .change_context(CopyError)?
        };

        let target_collection =
            PlexCollection::by_title(&target_server, &target_section, &target_title)
                .await
                .change_context(CopyError)?;
        match &target_collection {
            Some(_) => {
                println!("Target collection already exists, all missing items will be added.")
            }
            None => println!("Target collection does not exist, a new collection will be created."),
        }

        clear_screen();
        banner("Finding items");
        let existing = target_collection
            .as_ref()
            .map(|collection| collection.items.as_slice());
        let catalog = SectionCatalog {
            server: &target_server,
            section: &target_section,
        };
        let mut selector = PromptSelector;
        let summary = match_items(
            &source_items,
            &catalog,
            &mut selector,
            SearchKind::Album,
            existing,
        )
        .await?;

        clear_screen();
        banner("Done!");
        if !summary.matched.is_empty() {
            match &target_collection {
                Some(collection) => {
                    collection
                        .add_items(&target_server, &summary.matched)
                        .await
                        .change_context(CopyError)?;
                    println!("Updated collection on the target server!");
                }
                None => {
                    PlexCollection::create(
                        &target_server,
                        &target_section,
                        &target_title,
                        &summary.matched,
                    )
                    .await
                    .change_context(CopyError)?;
                    println!("Added new collection to the target server!");
                }
            }
        } else {
            println!("Collection could not be copied because no matching items could be found.");
        }
        if summary.skipped > 0 {
            println!("{} items were already present and skipped.", summary.skipped);
        }
        report_unmatched(&summary.unmatched, SearchKind::Album);
        Ok(())
    }
}
