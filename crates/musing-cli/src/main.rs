//! # Musing
//!
//! A daily inspirational quote in the terminal, with the same cache,
//! prefetch and theme preferences as the new-tab page.

mod cli;
mod config;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Command, FavoriteCommand, SettingsCommand};
use config::AppConfig;
use musing_service::{PrefetchHandle, QuoteService};
use musing_sources::{QuoteGardenClient, ZenQuotesClient};
use musing_storage::{MemoryBackend, StorageBackend, StorageService};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEV_FILTER: &str = "musing=debug,musing_service=debug,musing_sources=debug,musing_storage=debug";
const QUIET_FILTER: &str = "error";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                if config.dev_mode {
                    DEV_FILTER.into()
                } else {
                    QUIET_FILTER.into()
                }
            }),
        )
        .init();

    info!("Starting Musing v{}", env!("CARGO_PKG_VERSION"));
    debug!(?config, "Loaded config");

    let storage = StorageService::new(open_backend(&config));
    let service = QuoteService::standard(
        storage,
        ZenQuotesClient::with_config(&config.zenquotes_base_url, &config.http_config())?,
        QuoteGardenClient::with_config(&config.quote_garden_base_url, &config.http_config())?,
    );

    run(&service, args.command.unwrap_or(Command::Show)).await
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let path = args.config.clone().or_else(AppConfig::default_path);
    let mut config = match path {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };
    config.apply_env();

    if args.dev {
        config.dev_mode = true;
    }
    if let Some(kind) = args.storage {
        config.storage = kind;
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    Ok(config)
}

/// Open the configured backend, falling back to memory so quotes still show.
fn open_backend(config: &AppConfig) -> Arc<dyn StorageBackend> {
    let opened = config
        .data_dir()
        .and_then(|dir| config.storage.open(&dir).map_err(anyhow::Error::from));
    match opened {
        Ok(backend) => backend,
        Err(e) => {
            warn!("Storage unavailable ({e:#}); settings will not persist");
            Arc::new(MemoryBackend::new())
        }
    }
}

async fn run(service: &QuoteService, command: Command) -> Result<()> {
    let storage = service.storage();

    match command {
        Command::Show => {
            let quote = service.current_quote().await;
            print!("{}", output::render_quote(&quote, storage.show_source()));
            if storage.prefetched_quote().is_none() {
                finish_prefetch(service.prefetch_next_quote()).await;
            }
        }
        Command::Next => {
            let quote = service.next_quote().await;
            print!("{}", output::render_quote(&quote, storage.show_source()));
            finish_prefetch(service.prefetch_next_quote()).await;
        }
        Command::Refresh => {
            let (quote, prefetch) = service.daily_refresh().await;
            print!("{}", output::render_quote(&quote, storage.show_source()));
            finish_prefetch(prefetch).await;
        }
        Command::Random => {
            let quote = service.random_quote().await;
            print!("{}", output::render_quote(&quote, storage.show_source()));
        }
        Command::Status => {
            let prefetched = storage.prefetched_quote();
            print!(
                "{}",
                output::render_status(
                    storage.backend_name(),
                    storage.cached_entry().as_ref(),
                    storage.freshness_window(),
                    prefetched.as_ref(),
                    storage.should_fetch_new_quote(),
                    storage.now(),
                )
            );
            println!("Sources:        {}", service.source_names().join(", "));
        }
        Command::Settings(SettingsCommand::Show) => {
            print!("{}", output::render_settings(&storage.settings()));
        }
        Command::Settings(SettingsCommand::Set(set)) => {
            let patch = set.to_patch(&storage.settings())?;
            storage
                .try_save_settings(&patch)
                .context("Failed to save settings")?;
            print!("{}", output::render_settings(&storage.settings()));
        }
        Command::Settings(SettingsCommand::Reset) => {
            storage.reset_settings();
            println!("Preferences restored to defaults.");
        }
        Command::Themes => print!("{}", output::render_themes()),
        Command::Fonts => print!("{}", output::render_fonts()),
        Command::Favorite(FavoriteCommand::Add { text }) => {
            let text = match text {
                Some(text) => text,
                None => storage
                    .cached_quote()
                    .map(|q| q.text)
                    .context("No current quote to favorite; run `musing show` first")?,
            };
            if storage.add_favorite(&text) {
                println!("Added to favorites.");
            } else {
                println!("Already a favorite.");
            }
        }
        Command::Favorite(FavoriteCommand::Remove { text }) => {
            if storage.remove_favorite(&text) {
                println!("Removed from favorites.");
            } else {
                println!("Not in favorites.");
            }
        }
        Command::Favorite(FavoriteCommand::List) => {
            let favorites = storage.favorite_quotes();
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            for text in favorites {
                println!("\u{2022} {text}");
            }
        }
    }

    Ok(())
}

/// Let the prefetch land before the process exits.
async fn finish_prefetch(prefetch: PrefetchHandle) {
    match prefetch.wait().await {
        Ok(quote) => debug!("Prefetched quote by {}", quote.author),
        Err(e) => debug!("Prefetch not stored: {e}"),
    }
}
