//! The persisted settings record and partial updates to it.

use serde::{Deserialize, Serialize};

use super::quote::CachedQuote;
use super::theme::{self, PaletteColors, QuoteFont, SemanticTheme, ThemeMode, UiFont};

/// Storage key holding the whole settings record.
pub const SETTINGS_KEY: &str = "settings";

/// Slider bounds for saturation and lightness, in percent.
pub const SLIDER_MIN: u8 = 0;
pub const SLIDER_MAX: u8 = 100;

/// All user preferences plus the quote cache, stored as one record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionSettings {
    pub show_source: bool,
    pub favorite_quotes: Vec<String>,
    /// Unix milliseconds of the last successful cache write.
    pub last_fetch_time: i64,
    /// Background palette id.
    pub selected_theme: String,
    pub selected_light_theme: String,
    pub selected_dark_theme: String,
    pub theme_mode: ThemeMode,
    pub saturation: u8,
    pub lightness: u8,
    pub semantic_theme: SemanticTheme,
    pub quote_font: QuoteFont,
    pub ui_font: UiFont,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_quote: Option<CachedQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetched_quote: Option<CachedQuote>,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            show_source: true,
            favorite_quotes: Vec::new(),
            last_fetch_time: 0,
            selected_theme: "default".to_string(),
            selected_light_theme: "light".to_string(),
            selected_dark_theme: "dark".to_string(),
            theme_mode: ThemeMode::System,
            saturation: 40,
            lightness: 90,
            semantic_theme: SemanticTheme::Primary,
            quote_font: QuoteFont::Classic,
            ui_font: UiFont::Readable,
            cached_quote: None,
            prefetched_quote: None,
        }
    }
}

impl ExtensionSettings {
    /// Theme id to render with, given the host's color-scheme preference.
    pub fn active_theme(&self, system_prefers_dark: bool) -> &str {
        if self.theme_mode.is_dark(system_prefers_dark) {
            &self.selected_dark_theme
        } else {
            &self.selected_light_theme
        }
    }

    /// Background colors for the selected palette, falling back to the default palette.
    pub fn palette_colors(&self, system_prefers_dark: bool) -> PaletteColors {
        let palette = theme::palette(&self.selected_theme).unwrap_or(&theme::PALETTES[0]);
        palette.colors(self.theme_mode.is_dark(system_prefers_dark))
    }
}

/// A partial settings update. `None` fields are left untouched by a merge.
///
/// The cache slots use a nested option so a patch can clear a slot
/// (`Some(None)` serializes to `null`).
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_source: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_quotes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fetch_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_light_theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_dark_theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_mode: Option<ThemeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lightness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_theme: Option<SemanticTheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_font: Option<QuoteFont>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_font: Option<UiFont>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_quote: Option<Option<CachedQuote>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetched_quote: Option<Option<CachedQuote>>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Serialize to a JSON object containing only the fields being set.
    /// Slider values are clamped to their bounds.
    pub fn to_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut clamped = self.clone();
        clamped.saturation = clamped.saturation.map(clamp_slider);
        clamped.lightness = clamped.lightness.map(clamp_slider);

        match serde_json::to_value(clamped) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn show_source(mut self, show: bool) -> Self {
        self.show_source = Some(show);
        self
    }

    #[must_use]
    pub fn favorite_quotes(mut self, favorites: Vec<String>) -> Self {
        self.favorite_quotes = Some(favorites);
        self
    }

    #[must_use]
    pub fn selected_theme(mut self, theme: impl Into<String>) -> Self {
        self.selected_theme = Some(theme.into());
        self
    }

    #[must_use]
    pub fn selected_light_theme(mut self, theme: impl Into<String>) -> Self {
        self.selected_light_theme = Some(theme.into());
        self
    }

    #[must_use]
    pub fn selected_dark_theme(mut self, theme: impl Into<String>) -> Self {
        self.selected_dark_theme = Some(theme.into());
        self
    }

    #[must_use]
    pub const fn theme_mode(mut self, mode: ThemeMode) -> Self {
        self.theme_mode = Some(mode);
        self
    }

    #[must_use]
    pub const fn saturation(mut self, value: u8) -> Self {
        self.saturation = Some(value);
        self
    }

    #[must_use]
    pub const fn lightness(mut self, value: u8) -> Self {
        self.lightness = Some(value);
        self
    }

    #[must_use]
    pub const fn semantic_theme(mut self, theme: SemanticTheme) -> Self {
        self.semantic_theme = Some(theme);
        self
    }

    #[must_use]
    pub const fn quote_font(mut self, font: QuoteFont) -> Self {
        self.quote_font = Some(font);
        self
    }

    #[must_use]
    pub const fn ui_font(mut self, font: UiFont) -> Self {
        self.ui_font = Some(font);
        self
    }
}

fn clamp_slider(value: u8) -> u8 {
    value.clamp(SLIDER_MIN, SLIDER_MAX)
}
