//! Terminal rendering.

use std::fmt::Write;

use chrono::{DateTime, Duration, Utc};
use musing_core::theme::{self, PALETTES};
use musing_core::{CachedQuote, ExtensionSettings, Quote, QuoteFont, UiFont};

/// Format a quote the way the new-tab page lays it out.
pub fn render_quote(quote: &Quote, show_source: bool) -> String {
    let mut out = format!("\n  \u{201c}{}\u{201d}\n\n    \u{2014} {}\n", quote.text, quote.author);
    if show_source {
        if let Some(source) = &quote.source {
            let _ = writeln!(out, "    via {source}");
        }
    }
    out
}

pub fn render_settings(settings: &ExtensionSettings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Palette:        {}", settings.selected_theme);
    let _ = writeln!(out, "Light theme:    {}", settings.selected_light_theme);
    let _ = writeln!(out, "Dark theme:     {}", settings.selected_dark_theme);
    let _ = writeln!(out, "Theme mode:     {}", settings.theme_mode);
    let _ = writeln!(out, "Saturation:     {}%", settings.saturation);
    let _ = writeln!(out, "Lightness:      {}%", settings.lightness);
    let _ = writeln!(out, "Author color:   {}", settings.semantic_theme.id());
    let _ = writeln!(
        out,
        "Quote font:     {} ({})",
        settings.quote_font.id(),
        settings.quote_font.name()
    );
    let _ = writeln!(
        out,
        "UI font:        {} ({})",
        settings.ui_font.id(),
        settings.ui_font.name()
    );
    let _ = writeln!(out, "Show source:    {}", settings.show_source);
    let _ = writeln!(out, "Favorites:      {}", settings.favorite_quotes.len());
    out
}

pub fn render_status(
    backend: &str,
    cached: Option<&CachedQuote>,
    window: Duration,
    prefetched: Option<&Quote>,
    fetch_due: bool,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Storage:        {backend}");
    match cached {
        Some(entry) => {
            let age = entry.age(now);
            let state = if entry.is_fresh(now, window) {
                "fresh"
            } else {
                "stale"
            };
            let _ = writeln!(
                out,
                "Cached quote:   {} ({state}, fetched {} ago)",
                entry.quote.author,
                format_age(age)
            );
        }
        None => {
            let _ = writeln!(out, "Cached quote:   none");
        }
    }
    let _ = writeln!(
        out,
        "Prefetched:     {}",
        prefetched.map_or("none", |q| q.author.as_str())
    );
    let _ = writeln!(out, "Fetch due:      {}", if fetch_due { "yes" } else { "no" });
    out
}

pub fn render_themes() -> String {
    let mut out = String::from("Palettes:\n");
    for palette in &PALETTES {
        let _ = writeln!(
            out,
            "  {:<10} {:<8} light {} / dark {}",
            palette.id, palette.name, palette.light.primary, palette.dark.primary
        );
    }
    out.push_str("\nLight themes:\n");
    for (id, name) in theme::LIGHT_THEMES {
        let _ = writeln!(out, "  {id:<10} {name}");
    }
    out.push_str("\nDark themes:\n");
    for (id, name) in theme::DARK_THEMES {
        let _ = writeln!(out, "  {id:<10} {name}");
    }
    out
}

pub fn render_fonts() -> String {
    let mut out = String::from("Quote fonts:\n");
    for font in QuoteFont::ALL {
        let _ = writeln!(out, "  {:<10} {:<16} {}", font.id(), font.name(), font.family());
    }
    out.push_str("\nUI fonts:\n");
    for font in UiFont::ALL {
        let _ = writeln!(out, "  {:<10} {:<16} {}", font.id(), font.name(), font.family());
    }
    out
}

/// Human-readable age such as `3h 12m`.
fn format_age(age: Duration) -> String {
    let minutes = age.num_minutes().max(0);
    let hours = minutes / 60;
    if hours >= 48 {
        format!("{}d", hours / 24)
    } else if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else {
        format!("{minutes}m")
    }
}
