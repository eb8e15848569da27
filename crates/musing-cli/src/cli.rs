//! Command-line arguments.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use musing_core::theme::{self, ThemeMode};
use musing_core::{ExtensionSettings, QuoteFont, SemanticTheme, SettingsPatch, UiFont};
use musing_storage::StorageKind;

/// A daily inspirational quote, with themes and instant refresh.
#[derive(Parser, Debug)]
#[command(name = "musing")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log fetch and storage failures
    #[arg(long, global = true)]
    pub dev: bool,

    /// Storage backend (sqlite, file, memory)
    #[arg(long, global = true)]
    pub storage: Option<StorageKind>,

    /// Directory holding the settings store
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file to read instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show today's quote (cached for 24 hours)
    Show,

    /// Swap to the next quote, using the prefetched one when ready
    Next,

    /// Fetch today's quote into the cache and prefetch the next one
    Refresh,

    /// Print a random quote without touching the cache
    Random,

    /// Show cache and prefetch state
    Status,

    /// View or change preferences
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// List available palettes and themes
    Themes,

    /// List available fonts
    Fonts,

    /// Manage favorite quotes
    #[command(subcommand)]
    Favorite(FavoriteCommand),
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the current preferences
    Show,

    /// Change one or more preferences
    Set(SetArgs),

    /// Restore every preference to its default
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum FavoriteCommand {
    /// Add a quote text (defaults to the current quote)
    Add { text: Option<String> },

    /// Remove a quote text
    Remove { text: String },

    /// List favorites
    List,
}

#[derive(ClapArgs, Debug, Default)]
pub struct SetArgs {
    /// Background palette (default, sepia, sage, rose)
    #[arg(long)]
    pub palette: Option<String>,

    /// Theme used in light mode
    #[arg(long)]
    pub light_theme: Option<String>,

    /// Theme used in dark mode
    #[arg(long)]
    pub dark_theme: Option<String>,

    /// Theme mode (system, light, dark)
    #[arg(long, conflicts_with = "cycle_mode")]
    pub mode: Option<ThemeMode>,

    /// Advance the theme mode: system, light, dark
    #[arg(long)]
    pub cycle_mode: bool,

    /// Saturation percentage (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub saturation: Option<u8>,

    /// Lightness percentage (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub lightness: Option<u8>,

    /// Author emphasis color (primary, secondary, accent, neutral)
    #[arg(long)]
    pub semantic: Option<SemanticTheme>,

    /// Quote font (classic, modern, elegant, minimal, poetry, monospace)
    #[arg(long)]
    pub quote_font: Option<QuoteFont>,

    /// Interface font (readable, clean, system)
    #[arg(long)]
    pub ui_font: Option<UiFont>,

    /// Show where each quote came from
    #[arg(long)]
    pub show_source: Option<bool>,
}

impl SetArgs {
    /// Validate against the theme catalog and build the patch.
    pub fn to_patch(&self, current: &ExtensionSettings) -> Result<SettingsPatch> {
        let mut patch = SettingsPatch::new();

        if let Some(palette) = &self.palette {
            if theme::palette(palette).is_none() {
                bail!("Unknown palette '{palette}'");
            }
            patch = patch.selected_theme(palette.as_str());
        }
        if let Some(id) = &self.light_theme {
            if !theme::is_light_theme(id) {
                bail!("'{id}' is not a light theme");
            }
            patch = patch.selected_light_theme(id.as_str());
        }
        if let Some(id) = &self.dark_theme {
            if !theme::is_dark_theme(id) {
                bail!("'{id}' is not a dark theme");
            }
            patch = patch.selected_dark_theme(id.as_str());
        }

        if self.cycle_mode {
            patch = patch.theme_mode(current.theme_mode.cycle());
        } else if let Some(mode) = self.mode {
            patch = patch.theme_mode(mode);
        }

        patch.saturation = self.saturation;
        patch.lightness = self.lightness;
        patch.semantic_theme = self.semantic;
        patch.quote_font = self.quote_font;
        patch.ui_font = self.ui_font;
        patch.show_source = self.show_source;

        if patch.is_empty() {
            bail!("Nothing to change; pass at least one option (see --help)");
        }
        Ok(patch)
    }
}
