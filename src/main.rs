//! fragstore CLI - command line interface to the fragment service
//!
//! The HTTP transport lives elsewhere; this binary is the in-repo consumer,
//! useful for poking at a store directory and for end-to-end testing.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use fragstore::{Config, FragmentService};

#[derive(Parser)]
#[command(name = "fragstore")]
#[command(about = "Per-owner fragment storage with content negotiation")]
#[command(version)]
struct Cli {
    /// Root directory for the disk backend; without it, backend selection
    /// falls back to FRAGSTORE_BACKEND / FRAGSTORE_DATA_DIR
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Owner id to operate as (normally supplied by the auth layer)
    #[arg(short, long)]
    owner: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fragment from a file or stdin
    Create {
        /// Declared Content-Type (must be on the supported list)
        #[arg(short = 't', long)]
        content_type: String,
        /// Read the payload from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print a fragment's payload; append an extension to convert
    /// (e.g. `get <id>.html`)
    Get {
        /// Fragment id, optionally with a target extension
        name: String,
    },

    /// Print a fragment's metadata record
    Info {
        /// Fragment id
        id: String,
    },

    /// List fragment ids (or full records with --expand)
    List {
        #[arg(long)]
        expand: bool,
    },

    /// Replace a fragment's payload (same Content-Type only)
    Update {
        /// Fragment id
        id: String,
        /// Declared Content-Type; must match the stored type
        #[arg(short = 't', long)]
        content_type: String,
        /// Read the payload from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a fragment's metadata and payload
    Delete {
        /// Fragment id
        id: String,
    },
}

/// An explicit `--data-dir` wins; otherwise the environment decides.
fn resolve_config(data_dir: Option<&PathBuf>) -> fragstore::Result<Config> {
    match data_dir {
        Some(dir) => Ok(Config::disk(dir)),
        None => Config::from_env(),
    }
}

fn read_body(file: Option<&PathBuf>) -> anyhow::Result<Bytes> {
    let body = match file {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("reading payload from {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading payload from stdin")?;
            buf
        }
    };
    Ok(Bytes::from(body))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = FragmentService::from_config(&resolve_config(cli.data_dir.as_ref())?);

    match cli.command {
        Commands::Create { content_type, file } => {
            let body = read_body(file.as_ref())?;
            let fragment = service.create(&cli.owner, &content_type, body).await?;
            println!("{}", serde_json::to_string_pretty(&fragment)?);
        }
        Commands::Get { name } => {
            let (_mime, body) = service.get(&cli.owner, &name).await?;
            std::io::stdout().write_all(&body)?;
        }
        Commands::Info { id } => {
            let fragment = service.get_info(&cli.owner, &id).await?;
            println!("{}", serde_json::to_string_pretty(&fragment)?);
        }
        Commands::List { expand } => {
            let listing = service.list(&cli.owner, expand).await?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Commands::Update {
            id,
            content_type,
            file,
        } => {
            let body = read_body(file.as_ref())?;
            let fragment = service.update(&cli.owner, &id, &content_type, body).await?;
            println!("{}", serde_json::to_string_pretty(&fragment)?);
        }
        Commands::Delete { id } => {
            service.delete(&cli.owner, &id).await?;
            println!("{{\"status\":\"ok\"}}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fragstore::StorageBackend;

    // The environment is process-global; serialize tests that touch it.
    use std::sync::Mutex;
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_explicit_data_dir_selects_disk() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var(fragstore::config::BACKEND_ENV, "memory");
        let dir = PathBuf::from("/tmp/frags");
        let config = resolve_config(Some(&dir)).unwrap();
        assert_eq!(config.backend, StorageBackend::Disk(dir));
        std::env::remove_var(fragstore::config::BACKEND_ENV);
    }

    #[test]
    fn test_no_data_dir_falls_back_to_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var(fragstore::config::BACKEND_ENV, "memory");
        let config = resolve_config(None).unwrap();
        assert_eq!(config.backend, StorageBackend::Memory);
        std::env::remove_var(fragstore::config::BACKEND_ENV);
    }
}
