use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::data::aggregate::Aggregator;
use crate::data::model::Genre;
use crate::views::ViewKind;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "reel-panda.toml";

/// Whether "Movies by Tags" also honours the year and genre selectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagFilterMode {
    /// Tag predicate only.
    #[default]
    Independent,
    /// Year and genre filters first, then the tag predicate.
    Compose,
}

/// How the view selector is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    Tabs,
    #[default]
    Dropdown,
}

/// Per-deployment dashboard settings.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Reduction used by the rank-ordered movie views.
    pub rating_aggregator: Aggregator,

    /// Reduction used by genre popularity.
    pub genre_aggregator: Aggregator,

    pub tag_filter: TagFilterMode,

    /// Bars in "Top Movies".
    pub top_limit: usize,

    /// Bars in "Trending Now".
    pub trending_limit: usize,

    /// Bars in "Movies by Tags".
    pub tag_limit: usize,

    /// Years before the newest one that still count as trending.
    pub trending_window: i32,

    /// Genre columns to use. `None` means every genre column in the file;
    /// an explicit list makes each listed column required.
    pub genres: Option<Vec<Genre>>,

    /// Views offered, in selector order.
    pub views: Vec<ViewKind>,

    pub navigation: Navigation,

    /// `#RRGGBB` colour for bars, lines and headings.
    pub accent_color: String,

    /// `#RRGGBB` chart background.
    pub background_color: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            rating_aggregator: Aggregator::Sum,
            genre_aggregator: Aggregator::Sum,
            tag_filter: TagFilterMode::Independent,
            top_limit: 6,
            trending_limit: 10,
            tag_limit: 10,
            trending_window: 5,
            genres: None,
            views: ViewKind::ALL.to_vec(),
            navigation: Navigation::Dropdown,
            accent_color: "#FFD700".to_string(),
            background_color: "#000000".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load from `path` if given, else from [`DEFAULT_CONFIG_FILE`] if it
    /// exists, else fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            return Self::load_from_path(&fallback);
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        log::info!("Loading config from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.views.is_empty() {
            bail!("'views' must list at least one view");
        }
        if let Some(view) = first_repeat(&self.views) {
            bail!("'views' lists '{}' more than once", view.label());
        }
        if let Some(genre) = self.genres.as_deref().and_then(first_repeat) {
            bail!("'genres' lists '{genre}' more than once");
        }
        if self.trending_window < 0 {
            bail!("'trending_window' must not be negative");
        }
        for (name, limit) in [
            ("top_limit", self.top_limit),
            ("trending_limit", self.trending_limit),
            ("tag_limit", self.tag_limit),
        ] {
            if limit == 0 {
                bail!("'{name}' must be at least 1");
            }
        }
        crate::color::parse_hex(&self.accent_color).context("'accent_color'")?;
        crate::color::parse_hex(&self.background_color).context("'background_color'")?;
        Ok(())
    }
}

/// First entry that also appears earlier in `items`.
fn first_repeat<T: PartialEq + Copy>(items: &[T]) -> Option<T> {
    items
        .iter()
        .enumerate()
        .find(|&(i, item)| items[..i].contains(item))
        .map(|(_, item)| *item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.top_limit, 6);
        assert_eq!(config.trending_limit, 10);
        assert_eq!(config.views.len(), 7);
    }

    #[test]
    fn test_parse_full_config() {
        let config = DashboardConfig::from_toml(
            r##"
            rating_aggregator = "count"
            tag_filter = "compose"
            top_limit = 3
            genres = ["Action", "Comedy", "Sci-Fi", "Film-Noir"]
            views = ["top_movies", "movies_by_tags"]
            navigation = "tabs"
            accent_color = "#FF0000"
            "##,
        )
        .unwrap();

        assert_eq!(config.rating_aggregator, Aggregator::Count);
        assert_eq!(config.genre_aggregator, Aggregator::Sum);
        assert_eq!(config.tag_filter, TagFilterMode::Compose);
        assert_eq!(config.top_limit, 3);
        assert_eq!(
            config.genres,
            Some(vec![Genre::Action, Genre::Comedy, Genre::SciFi, Genre::FilmNoir])
        );
        assert_eq!(config.views, vec![ViewKind::TopMovies, ViewKind::MoviesByTags]);
        assert_eq!(config.navigation, Navigation::Tabs);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_values() {
        assert!(DashboardConfig::from_toml("colour = \"red\"").is_err());
        assert!(DashboardConfig::from_toml("rating_aggregator = \"mean\"").is_err());
        assert!(DashboardConfig::from_toml("views = []").is_err());
        assert!(DashboardConfig::from_toml("top_limit = 0").is_err());
        assert!(DashboardConfig::from_toml("accent_color = \"gold\"").is_err());
    }

    #[test]
    fn test_rejects_repeated_views_and_genres() {
        let err = DashboardConfig::from_toml(r#"views = ["trending", "top_movies", "trending"]"#).unwrap_err();
        assert!(err.to_string().contains("'views' lists 'Trending Now' more than once"), "{err}");

        let err = DashboardConfig::from_toml(r#"genres = ["Drama", "Sci-Fi", "Drama"]"#).unwrap_err();
        assert!(err.to_string().contains("'genres' lists 'Drama' more than once"), "{err}");

        assert_eq!(first_repeat(&[1, 2, 3]), None);
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.toml");
        std::fs::write(&path, "trending_window = 3\n").unwrap();

        let config = DashboardConfig::load(Some(&path)).unwrap();
        assert_eq!(config.trending_window, 3);

        assert!(DashboardConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
