//! Theme catalog: color palettes, light/dark themes, fonts and display modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Light/dark preference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Follow the host's color scheme.
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeMode {
    /// Next mode in the toggle order: system, light, dark.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::System => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
        }
    }

    /// Resolve the mode against the host's preference.
    pub const fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            Self::System => system_prefers_dark,
            Self::Light => false,
            Self::Dark => true,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ThemeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(Error::InvalidArgument(format!("unknown theme mode: {other}"))),
        }
    }
}

/// Text emphasis color used for the quote author line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SemanticTheme {
    #[default]
    Primary,
    Secondary,
    Accent,
    Neutral,
}

impl SemanticTheme {
    pub const ALL: [Self; 4] = [Self::Primary, Self::Secondary, Self::Accent, Self::Neutral];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Accent => "accent",
            Self::Neutral => "neutral",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Primary => "Main brand color emphasis",
            Self::Secondary => "Supporting color emphasis",
            Self::Accent => "Accent color emphasis",
            Self::Neutral => "Subtle text that matches main content",
        }
    }
}

impl FromStr for SemanticTheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown semantic theme: {s}")))
    }
}

/// Typeface used for the quote body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteFont {
    #[default]
    Classic,
    Modern,
    Elegant,
    Minimal,
    Poetry,
    Monospace,
}

impl QuoteFont {
    pub const ALL: [Self; 6] = [
        Self::Classic,
        Self::Modern,
        Self::Elegant,
        Self::Minimal,
        Self::Poetry,
        Self::Monospace,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
            Self::Elegant => "elegant",
            Self::Minimal => "minimal",
            Self::Poetry => "poetry",
            Self::Monospace => "monospace",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Classic => "Garamond",
            Self::Modern => "Inter",
            Self::Elegant => "Playfair",
            Self::Minimal => "Source Sans Pro",
            Self::Poetry => "Lora",
            Self::Monospace => "Ubuntu",
        }
    }

    /// CSS font-family stack.
    pub const fn family(self) -> &'static str {
        match self {
            Self::Classic => "Cormorant Garamond, serif",
            Self::Modern => "Inter, sans-serif",
            Self::Elegant => "Playfair Display, serif",
            Self::Minimal => "Source Sans Pro, sans-serif",
            Self::Poetry => "Lora, serif",
            Self::Monospace => "Ubuntu Mono, monospace",
        }
    }
}

impl FromStr for QuoteFont {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown quote font: {s}")))
    }
}

/// Typeface used for controls and labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UiFont {
    #[default]
    Readable,
    Clean,
    System,
}

impl UiFont {
    pub const ALL: [Self; 3] = [Self::Readable, Self::Clean, Self::System];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Readable => "readable",
            Self::Clean => "clean",
            Self::System => "system",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Readable => "Readable",
            Self::Clean => "Clean",
            Self::System => "System",
        }
    }

    pub const fn family(self) -> &'static str {
        match self {
            Self::Readable => "Inter, sans-serif",
            Self::Clean => "Source Sans Pro, sans-serif",
            Self::System => {
                "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif"
            }
        }
    }
}

impl FromStr for UiFont {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown UI font: {s}")))
    }
}

/// Background color pair for one brightness variant of a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColors {
    pub primary: &'static str,
    pub secondary: &'static str,
}

/// Named background palette with light and dark variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub id: &'static str,
    pub name: &'static str,
    pub light: PaletteColors,
    pub dark: PaletteColors,
}

impl ColorPalette {
    pub const fn colors(&self, dark: bool) -> PaletteColors {
        if dark {
            self.dark
        } else {
            self.light
        }
    }
}

/// Built-in background palettes. The first entry is the default.
pub const PALETTES: [ColorPalette; 4] = [
    ColorPalette {
        id: "default",
        name: "Classic",
        light: PaletteColors {
            primary: "#fdfdf8",
            secondary: "#f5f5f0",
        },
        dark: PaletteColors {
            primary: "#0f0f0f",
            secondary: "#1a1a1a",
        },
    },
    ColorPalette {
        id: "sepia",
        name: "Sepia",
        light: PaletteColors {
            primary: "#f5f1e8",
            secondary: "#ede4d3",
        },
        dark: PaletteColors {
            primary: "#2a2218",
            secondary: "#342b1f",
        },
    },
    ColorPalette {
        id: "sage",
        name: "Sage",
        light: PaletteColors {
            primary: "#f2f5f1",
            secondary: "#e6ebe4",
        },
        dark: PaletteColors {
            primary: "#1a2118",
            secondary: "#242d21",
        },
    },
    ColorPalette {
        id: "rose",
        name: "Rose",
        light: PaletteColors {
            primary: "#f5f1f2",
            secondary: "#ebe4e6",
        },
        dark: PaletteColors {
            primary: "#2a1a1c",
            secondary: "#342024",
        },
    },
];

/// Look up a palette by id.
pub fn palette(id: &str) -> Option<&'static ColorPalette> {
    PALETTES.iter().find(|p| p.id == id)
}

/// Themes offered while the page renders light.
pub const LIGHT_THEMES: [(&str, &str); 18] = [
    ("light", "Light"),
    ("cupcake", "Cupcake"),
    ("emerald", "Emerald"),
    ("corporate", "Corporate"),
    ("retro", "Retro"),
    ("valentine", "Valentine"),
    ("garden", "Garden"),
    ("lofi", "Lo-Fi"),
    ("pastel", "Pastel"),
    ("fantasy", "Fantasy"),
    ("wireframe", "Wireframe"),
    ("cmyk", "CMYK"),
    ("autumn", "Autumn"),
    ("nord", "Nord"),
    ("cyberpunk", "Cyberpunk"),
    ("acid", "Acid"),
    ("lemonade", "Lemonade"),
    ("winter", "Winter"),
];

/// Themes offered while the page renders dark.
pub const DARK_THEMES: [(&str, &str); 13] = [
    ("dark", "Dark"),
    ("synthwave", "Synthwave"),
    ("halloween", "Halloween"),
    ("forest", "Forest"),
    ("aqua", "Aqua"),
    ("black", "Black"),
    ("luxury", "Luxury"),
    ("dracula", "Dracula"),
    ("night", "Night"),
    ("coffee", "Coffee"),
    ("dim", "Dim"),
    ("sunset", "Sunset"),
    ("business", "Business"),
];

pub fn is_light_theme(id: &str) -> bool {
    LIGHT_THEMES.iter().any(|(theme, _)| *theme == id)
}

pub fn is_dark_theme(id: &str) -> bool {
    DARK_THEMES.iter().any(|(theme, _)| *theme == id)
}
