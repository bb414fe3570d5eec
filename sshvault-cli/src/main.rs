//! `sshvault`: open vaults and look up recipients' public keys.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sshvault_crypto::{FileKeyLoader, TerminalPassphrase, VaultDecryptPipeline, VaultInput};
use sshvault_keys::{HttpKeyFetcher, KeyCache, KeysConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "sshvault", version, about = "Decrypt vaults sealed for your SSH key")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decrypt a vault and write the plaintext to stdout.
    ///
    /// Reads the vault from stdin when data is piped in.
    View {
        /// Vault file.
        vault: Option<PathBuf>,

        /// Private key (a `.pub` path is mapped to its private key).
        #[arg(short, long, env = "SSHVAULT_KEY")]
        key: Option<PathBuf>,
    },

    /// Print the cache path of a user's public key, fetching it if needed.
    Key {
        /// User identity on the key host.
        user: String,

        /// Which of the user's keys, starting at 1.
        #[arg(short = 'k', long, default_value_t = 1)]
        index: usize,

        /// Key host base URL.
        #[arg(long, env = "SSHVAULT_KEY_HOST")]
        host: Option<String>,

        /// Cache directory.
        #[arg(long, env = "SSHVAULT_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Extra key type prefixes to accept besides `ssh-rsa`.
        #[arg(long = "accept-type")]
        accept_types: Vec<String>,

        /// Print the key itself instead of its path.
        #[arg(long)]
        print: bool,
    },
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_private_key() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ssh")
        .join("id_rsa")
}

fn view(vault: Option<PathBuf>, key: Option<PathBuf>) -> Result<()> {
    let raw = VaultInput::from_stdin_or_file(vault)?.read()?;
    let key_path = key.unwrap_or_else(default_private_key);
    debug!("opening vault with {}", key_path.display());

    let plaintext = VaultDecryptPipeline::new()
        .decrypt_with_key_file(&raw, &key_path, &FileKeyLoader, &TerminalPassphrase::default())
        .context("could not open vault")?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}

async fn key(
    user: String,
    index: usize,
    host: Option<String>,
    cache_dir: Option<PathBuf>,
    accept_types: Vec<String>,
    print: bool,
) -> Result<()> {
    let mut config = KeysConfig {
        cache_dir,
        ..KeysConfig::default()
    };
    if let Some(host) = host {
        config.key_host_url = host;
    }
    config.key_prefixes.extend(accept_types);

    let fetcher = HttpKeyFetcher::new(&config)?;
    let cache = KeyCache::from_config(&config, fetcher).await?;

    let lookup = cache
        .lookup(&user, index)
        .await
        .with_context(|| format!("could not resolve key {index} for {user}"))?;
    debug!("resolved {} ({:?})", lookup.path.display(), lookup.source);

    if print {
        let key = tokio::fs::read_to_string(&lookup.path)
            .await
            .with_context(|| format!("reading {}", lookup.path.display()))?;
        println!("{key}");
    } else {
        println!("{}", lookup.path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    match Cli::parse().command {
        Command::View { vault, key } => view(vault, key),
        Command::Key {
            user,
            index,
            host,
            cache_dir,
            accept_types,
            print,
        } => key(user, index, host, cache_dir, accept_types, print).await,
    }
}
