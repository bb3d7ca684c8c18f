use std::collections::BTreeMap;

use anyhow::{Result, bail};
use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::config::DashboardConfig;
use crate::data::model::Genre;

// ---------------------------------------------------------------------------
// Hex parsing
// ---------------------------------------------------------------------------

/// Parse `#RRGGBB` (the leading `#` is optional).
pub fn parse_hex(s: &str) -> Result<Color32> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("'{s}' is not a #RRGGBB colour");
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Theme: configured colours plus one colour per genre
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color32,
    pub background: Color32,
    genre_colors: BTreeMap<Genre, Color32>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(Color32::GOLD, Color32::BLACK)
    }
}

impl Theme {
    fn new(accent: Color32, background: Color32) -> Self {
        let genre_colors = Genre::ALL
            .into_iter()
            .zip(generate_palette(Genre::ALL.len()))
            .collect();
        Theme {
            accent,
            background,
            genre_colors,
        }
    }

    /// Colours from config. Values are validated when the config is loaded,
    /// so a parse failure here only falls back to the defaults.
    pub fn from_config(config: &DashboardConfig) -> Self {
        let fallback = Theme::default();
        let accent = parse_hex(&config.accent_color).unwrap_or(fallback.accent);
        let background = parse_hex(&config.background_color).unwrap_or(fallback.background);
        Self::new(accent, background)
    }

    /// Bar colour for a genre.
    pub fn genre_color(&self, genre: Genre) -> Color32 {
        self.genre_colors.get(&genre).copied().unwrap_or(self.accent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#FFD700").unwrap(), Color32::from_rgb(255, 215, 0));
        assert_eq!(parse_hex("000000").unwrap(), Color32::BLACK);
        assert!(parse_hex("#FFD7").is_err());
        assert!(parse_hex("gold").is_err());
    }

    #[test]
    fn test_palette_is_distinct() {
        let colors = generate_palette(19);
        assert_eq!(colors.len(), 19);
        let unique: std::collections::BTreeSet<[u8; 4]> = colors.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 19);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_theme_from_config() {
        let config = DashboardConfig {
            accent_color: "#FF0000".into(),
            ..DashboardConfig::default()
        };
        let theme = Theme::from_config(&config);
        assert_eq!(theme.accent, Color32::RED);
        assert_eq!(theme.background, Color32::BLACK);
        assert_ne!(theme.genre_color(Genre::Action), theme.genre_color(Genre::Drama));
    }
}
