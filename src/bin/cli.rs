use std::path::PathBuf;
use mapstore::sdk::{self, Options};
use mapstore::{MapSource, NEW_MAP_ID};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, env = "MAPSTORE_DATA_DIR", default_value = "data")]
    data_dir: String,

    #[arg(short, long, env = "MAPSTORE_PREFIX", default_value = sdk::discovery::DEFAULT_PREFIX)]
    prefix: String,

    /// Byte quota for local storage.
    #[arg(short, long, env = "MAPSTORE_QUOTA")]
    quota: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// List map ids with their descriptions and timestamps.
    List,
    Load { id: String },
    SaveNew { content: String },
    Save { id: String, content: String },
    /// Import a map file, keeping its file name as the description.
    Import {
        file: PathBuf,
        #[arg(long, default_value = NEW_MAP_ID)]
        id: String,
    },
    Remove { id: String },
}

/// Treats `raw` as JSON when it parses, otherwise as an opaque string.
fn parse_content(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let adapter = sdk::open(Options {
        data_dir: Some(cli.data_dir.into()),
        prefix: cli.prefix,
        quota: cli.quota,
    })?;
    let index = adapter.index().clone();

    match cli.command {
        Commands::List => {
            let list = index.list()?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Commands::Load { id } => {
            let loaded = adapter.load_map(&id).await?;
            println!("{}", serde_json::to_string_pretty(&loaded.content)?);
        }
        Commands::SaveNew { content } => {
            let id = index.save_new(parse_content(content))?;
            println!("{}", id);
        }
        Commands::Save { id, content } => {
            index.save(&id, parse_content(content))?;
            println!("OK");
        }
        Commands::Import { file, id } => {
            let content = std::fs::read_to_string(&file)?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let id = adapter.save_map(Value::String(content), &id, &file_name).await?;
            println!("{}", id);
        }
        Commands::Remove { id } => {
            index.remove(&id)?;
            println!("OK");
        }
    }

    Ok(())
}
