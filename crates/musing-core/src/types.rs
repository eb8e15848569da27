//! Core domain types for Musing.

pub mod quote;
pub mod settings;
pub mod theme;

pub use quote::{CachedQuote, Quote};
pub use settings::{ExtensionSettings, SettingsPatch};
pub use theme::{ColorPalette, PaletteColors, QuoteFont, SemanticTheme, ThemeMode, UiFont};
