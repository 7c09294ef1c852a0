use anyhow::Context;
use clap::{Parser, Subcommand};

use vhs_tap_api::config::AppConfig;
use vhs_tap_api::database::{self, NewTape, TapeStore};

#[derive(Parser)]
#[command(name = "vhstapctl", about = "VHS Tap maintenance commands")]
struct Cli {
    /// Path to the SQLite database (defaults to DB_PATH or ./vhs_nfc.db)
    #[arg(long)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create tables and seed a sample tape if the registry is empty
    Initdb,
    /// Print all registered tapes
    ListTapes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let path = cli
        .database
        .unwrap_or_else(|| AppConfig::from_env().database_path);

    let pool = database::connect(&path)
        .await
        .with_context(|| format!("failed to open database at {}", path))?;
    let store = TapeStore::new(pool);

    match cli.command {
        Command::Initdb => {
            println!("Database initialized at {}", path);
            if store.list().await?.is_empty() {
                let sample = store
                    .create(&NewTape {
                        token: "SAMPLE-TOKEN-123".to_string(),
                        media_item_id: "jellyfin-movie-id-here".to_string(),
                        title: "Sample Movie".to_string(),
                        year: Some(1985),
                        cover_art_path: None,
                    })
                    .await?;
                println!("Seeded sample tape: {} -> {}", sample.token, sample.title);
            }
        }
        Command::ListTapes => {
            let tapes = store.list().await?;
            if tapes.is_empty() {
                println!("No tapes registered.");
            }
            for tape in tapes {
                println!(
                    "{:>4}  {:<20}  {:<30}  {}",
                    tape.id,
                    tape.token,
                    tape.title,
                    tape.year.map_or(String::new(), |y| y.to_string())
                );
            }
        }
    }

    Ok(())
}
