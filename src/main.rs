use chrono::Local;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use game_board::{
    config::{database, defaults, session},
    core::{board, library::Library, local_store},
    errors::Result,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "game-board")]
#[command(about = "Organize a game library by friends, categories and status")]
struct Cli {
    /// What to do with the board after loading it; without one the board is summarized
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a timestamped export of the board
    Export {
        /// Directory to write into (defaults to the working directory)
        dir: Option<PathBuf>,
    },

    /// Replace the board with an exported file
    Import {
        /// Exported board JSON
        file: PathBuf,
    },
}

fn log_summary(library: &Library) {
    let data = library.data();
    info!(
        "Board has {} games, {} tags and {} reminders",
        data.games().len(),
        data.all_tags().count(),
        data.reminders().len()
    );
    let today = Local::now().date_naive();
    for reminder in data.upcoming_reminders(today).into_iter().take(5) {
        let title = data
            .game(&reminder.game_id)
            .map_or("?", |g| g.title.as_str());
        info!("Upcoming {}: {} - {}", reminder.date, title, reminder.message);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    let cli = Cli::parse();

    // 3. Load the starter board configuration
    let config = defaults::load_default_config().unwrap_or_else(|e| {
        warn!("No usable board config, starting empty: {}", e);
        defaults::Config::default()
    });

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Load the user's board, seeding a new one on first run
    let user_id = session::get_user_id();
    let mut library = match local_store::load_board(&db, &user_id).await? {
        Some((library, report)) => {
            for skipped in &report.skipped {
                warn!("Dropped while loading: {}", skipped);
            }
            library
        }
        None => defaults::seed_library(&config),
    };

    // 6. Run the requested command
    match cli.command {
        None => {}
        Some(Command::Export { dir }) => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            let path = board::export_to_dir(&library, &dir, Local::now().naive_local())?;
            info!("Board exported to {}", path.display());
        }
        Some(Command::Import { file }) => {
            let report = board::import_from_file(&mut library, &file)
                .inspect_err(|e| error!("Import of {} failed: {}", file.display(), e))?;
            info!(
                "Imported {} ({} records skipped, {} tag references dropped, {} parties re-keyed)",
                file.display(),
                report.skipped.len(),
                report.dropped_tag_refs,
                report.reassigned_party_ids
            );
        }
    }

    // 7. Report and persist
    log_summary(&library);
    local_store::save_board(&db, &user_id, &library).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        assert!(Cli::try_parse_from(["game-board"]).unwrap().command.is_none());

        let cli = Cli::try_parse_from(["game-board", "export"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Export { dir: None })));

        let cli = Cli::try_parse_from(["game-board", "export", "backups"]).unwrap();
        let Some(Command::Export { dir: Some(dir) }) = cli.command else {
            panic!("expected export with a directory");
        };
        assert_eq!(dir, PathBuf::from("backups"));

        let cli = Cli::try_parse_from(["game-board", "import", "board.json"]).unwrap();
        let Some(Command::Import { file }) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(file, PathBuf::from("board.json"));
    }

    #[test]
    fn test_import_needs_a_file() {
        assert!(Cli::try_parse_from(["game-board", "import"]).is_err());
        assert!(Cli::try_parse_from(["game-board", "sync"]).is_err());
    }
}
