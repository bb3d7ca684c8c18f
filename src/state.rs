use std::path::Path;
use std::sync::Arc;

use crate::color::Theme;
use crate::config::DashboardConfig;
use crate::data::filter::{GenreFilter, YearFilter, filter_by_year_and_genre};
use crate::data::loader::load_file;
use crate::data::model::MovieDataset;
use crate::views::{Selection, ViewKind, ViewResult, compute_view};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded). Read-only once set.
    pub dataset: Option<Arc<MovieDataset>>,

    pub config: DashboardConfig,

    pub theme: Theme,

    /// Sidebar selections.
    pub selection: Selection,

    /// View currently shown in the central panel.
    pub active_view: ViewKind,

    /// Table (or notice) for `active_view` under the current selection (cached).
    pub result: Option<ViewResult>,

    /// Records passing the year and genre selectors (cached).
    pub visible_count: usize,

    /// Text typed into the tag search box.
    pub tag_search: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let active_view = config.views.first().copied().unwrap_or(ViewKind::TopMovies);
        Self {
            dataset: None,
            theme: Theme::from_config(&config),
            config,
            selection: Selection::default(),
            active_view,
            result: None,
            visible_count: 0,
            tag_search: String::new(),
            status_message: None,
        }
    }

    /// Load a file and make it the current dataset. Failures leave the
    /// previous dataset in place and surface in `status_message`.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path, self.config.genres.as_deref()) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records from {} ({} years, {} tags, {} genre columns)",
                    dataset.len(),
                    path.display(),
                    dataset.years.len(),
                    dataset.tags.len(),
                    dataset.genres.len()
                );
                if dataset.is_empty() {
                    log::warn!("{} contains no records", path.display());
                }
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, reset selections and recompute.
    pub fn set_dataset(&mut self, dataset: MovieDataset) {
        self.dataset = Some(Arc::new(dataset));
        self.selection = Selection::default();
        self.tag_search.clear();
        self.status_message = None;
        self.recompute();
    }

    /// Recompute the cached result for the active view.
    pub fn recompute(&mut self) {
        let Some(ds) = self.dataset.clone() else {
            self.result = None;
            self.visible_count = 0;
            return;
        };
        self.visible_count =
            filter_by_year_and_genre(&ds.records, self.selection.year, self.selection.genre).len();
        let result = compute_view(&ds, &self.selection, &self.config, self.active_view);
        log::debug!(
            "{:?} (year={}, genre={}, tags={}): {} rows",
            self.active_view,
            self.selection.year,
            self.selection.genre,
            self.selection.tags.len(),
            result.len()
        );
        self.result = Some(result);
    }

    pub fn set_year(&mut self, year: YearFilter) {
        if self.selection.year != year {
            self.selection.year = year;
            self.recompute();
        }
    }

    pub fn set_genre(&mut self, genre: GenreFilter) {
        if self.selection.genre != genre {
            self.selection.genre = genre;
            self.recompute();
        }
    }

    pub fn set_view(&mut self, view: ViewKind) {
        if self.active_view != view {
            self.active_view = view;
            self.recompute();
        }
    }

    /// Toggle a single tag in the multi-select.
    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.selection.tags.remove(tag) {
            self.selection.tags.insert(tag.to_string());
        }
        self.recompute();
    }

    /// Select every tag matching the current search text.
    pub fn select_matching_tags(&mut self) {
        let matching = self.matching_tags();
        self.selection.tags.extend(matching);
        self.recompute();
    }

    /// Deselect all tags.
    pub fn clear_tags(&mut self) {
        self.selection.tags.clear();
        self.recompute();
    }

    /// Tags containing the search text, case-insensitively.
    pub fn matching_tags(&self) -> Vec<String> {
        let Some(ds) = &self.dataset else {
            return Vec::new();
        };
        let needle = self.tag_search.trim().to_lowercase();
        ds.tags
            .iter()
            .filter(|t| needle.is_empty() || t.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}
