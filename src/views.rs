use std::collections::BTreeSet;

use chrono::{Month, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::{DashboardConfig, TagFilterMode};
use crate::data::aggregate::{
    GenreTotal, PeriodCount, RankedRow, YearAverage, average_rating_by_year, genre_popularity,
    monthly_counts, top_by_rating_count, trending_window, weekly_counts,
};
use crate::data::filter::{GenreFilter, YearFilter, filter_by_tag, filter_by_year_and_genre};
use crate::data::model::{MovieDataset, MovieRecord};
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// View catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    TopMovies,
    Trending,
    AverageRating,
    GenrePopularity,
    MoviesByTags,
    MonthlyTrends,
    WeeklyTrends,
}

impl ViewKind {
    pub const ALL: [ViewKind; 7] = [
        ViewKind::TopMovies,
        ViewKind::Trending,
        ViewKind::AverageRating,
        ViewKind::GenrePopularity,
        ViewKind::MoviesByTags,
        ViewKind::MonthlyTrends,
        ViewKind::WeeklyTrends,
    ];

    /// Label in the view selector.
    pub fn label(self) -> &'static str {
        match self {
            ViewKind::TopMovies => "Top Movies",
            ViewKind::Trending => "Trending Now",
            ViewKind::AverageRating => "Average Rating Over Years",
            ViewKind::GenrePopularity => "Genre Popularity",
            ViewKind::MoviesByTags => "Movies by Tags",
            ViewKind::MonthlyTrends => "Monthly Trends",
            ViewKind::WeeklyTrends => "Weekly Trends",
        }
    }

    /// Heading drawn above the chart.
    pub fn chart_title(self, config: &DashboardConfig) -> String {
        match self {
            ViewKind::TopMovies => "Top Movies by Rating Count".to_string(),
            ViewKind::Trending => format!("Trending Movies (Last {} Years)", config.trending_window),
            ViewKind::AverageRating => "Average Rating Over Years".to_string(),
            ViewKind::GenrePopularity => "Genre Popularity".to_string(),
            ViewKind::MoviesByTags => "Movies by Selected Tags".to_string(),
            ViewKind::MonthlyTrends => "Monthly Rating Count".to_string(),
            ViewKind::WeeklyTrends => "Weekly Rating Count".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Selection and results
// ---------------------------------------------------------------------------

/// What the user picked in the side panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub year: YearFilter,
    pub genre: GenreFilter,
    pub tags: BTreeSet<String>,
}

/// Shown instead of a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The view's input was empty after filtering.
    NoData(&'static str),
    /// Tags have not been chosen yet.
    SelectTags,
    /// The dataset has no column this view needs.
    Unavailable(&'static str),
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NoData(msg) | Notice::Unavailable(msg) => msg,
            Notice::SelectTags => "Select at least one tag to view results.",
        }
    }
}

/// The table a view renders, or the notice replacing it.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewResult {
    Ranked(Vec<RankedRow>),
    YearTrend(Vec<YearAverage>),
    Genres(Vec<GenreTotal>),
    Monthly(Vec<PeriodCount<Month>>),
    Weekly(Vec<PeriodCount<Weekday>>),
    Notice(Notice),
}

impl ViewResult {
    /// Number of table rows; zero for notices.
    pub fn len(&self) -> usize {
        match self {
            ViewResult::Ranked(rows) => rows.len(),
            ViewResult::YearTrend(rows) => rows.len(),
            ViewResult::Genres(rows) => rows.len(),
            ViewResult::Monthly(rows) => rows.len(),
            ViewResult::Weekly(rows) => rows.len(),
            ViewResult::Notice(_) => 0,
        }
    }
}

const NO_DATA_FILTERS: &str = "No data found for selected filters.";
const NO_DATA_TAGS: &str = "No data for selected tag(s).";
const NO_DATA_YEARS: &str = "No rated movies with a known year.";
const NO_MONTH: &str = "Month column not found in dataset.";
const NO_DAY_OF_WEEK: &str = "Day of week column not found in dataset.";

/// Wrap a table, turning an empty one into a "no data" notice.
fn table_or_notice<T>(rows: Vec<T>, wrap: fn(Vec<T>) -> ViewResult, empty: &'static str) -> ViewResult {
    if rows.is_empty() {
        ViewResult::Notice(Notice::NoData(empty))
    } else {
        wrap(rows)
    }
}

// ---------------------------------------------------------------------------
// Pipeline wiring per view
// ---------------------------------------------------------------------------

/// Compute the table for one view.
///
/// Views are independent: each picks the filters it honours and recovers
/// from its own empty or missing input with a notice.
pub fn compute_view(
    dataset: &MovieDataset,
    selection: &Selection,
    config: &DashboardConfig,
    kind: ViewKind,
) -> ViewResult {
    let records = &dataset.records;

    match kind {
        ViewKind::TopMovies => {
            let filtered = filter_by_year_and_genre(records, selection.year, selection.genre);
            table_or_notice(
                top_by_rating_count(filtered, config.rating_aggregator, config.top_limit),
                ViewResult::Ranked,
                NO_DATA_FILTERS,
            )
        }
        ViewKind::Trending => match trending_window(records, config.trending_window) {
            Ok(recent) => table_or_notice(
                top_by_rating_count(recent, config.rating_aggregator, config.trending_limit),
                ViewResult::Ranked,
                NO_DATA_YEARS,
            ),
            Err(e) => {
                log::debug!("trending view: {e}");
                ViewResult::Notice(Notice::NoData(NO_DATA_YEARS))
            }
        },
        ViewKind::AverageRating => {
            let filtered = filter_by_year_and_genre(records, YearFilter::All, selection.genre);
            table_or_notice(average_rating_by_year(filtered), ViewResult::YearTrend, NO_DATA_FILTERS)
        }
        ViewKind::GenrePopularity => {
            let filtered = filter_by_year_and_genre(records, selection.year, GenreFilter::All);
            table_or_notice(
                genre_popularity(filtered, &dataset.genres, config.genre_aggregator),
                ViewResult::Genres,
                NO_DATA_FILTERS,
            )
        }
        ViewKind::MoviesByTags => {
            let base: Vec<&MovieRecord> = match config.tag_filter {
                TagFilterMode::Independent => records.iter().collect(),
                TagFilterMode::Compose => filter_by_year_and_genre(records, selection.year, selection.genre),
            };
            match filter_by_tag(base, &selection.tags) {
                Ok(tagged) => table_or_notice(
                    top_by_rating_count(tagged, config.rating_aggregator, config.tag_limit),
                    ViewResult::Ranked,
                    NO_DATA_TAGS,
                ),
                Err(PipelineError::EmptySelection) => ViewResult::Notice(Notice::SelectTags),
                Err(e) => {
                    log::debug!("tag view: {e}");
                    ViewResult::Notice(Notice::NoData(NO_DATA_TAGS))
                }
            }
        }
        ViewKind::MonthlyTrends if !dataset.has_month => ViewResult::Notice(Notice::Unavailable(NO_MONTH)),
        ViewKind::MonthlyTrends => table_or_notice(monthly_counts(records), ViewResult::Monthly, NO_DATA_FILTERS),
        ViewKind::WeeklyTrends if !dataset.has_day_of_week => {
            ViewResult::Notice(Notice::Unavailable(NO_DAY_OF_WEEK))
        }
        ViewKind::WeeklyTrends => table_or_notice(weekly_counts(records), ViewResult::Weekly, NO_DATA_FILTERS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Genre;

    fn dataset() -> MovieDataset {
        MovieDataset::from_records(vec![
            MovieRecord::new("A", Some(2020), 4.0, 10)
                .with_genres(&[Genre::Action])
                .with_tag("funny")
                .with_period(Some(Month::May), Some(Weekday::Sat)),
            MovieRecord::new("B", Some(2020), 2.0, 5)
                .with_tag("dark")
                .with_period(Some(Month::May), Some(Weekday::Sun)),
            MovieRecord::new("A", Some(2021), 5.0, 3)
                .with_genres(&[Genre::Action])
                .with_tag("dark")
                .with_period(Some(Month::June), Some(Weekday::Sat)),
        ])
    }

    fn select(year: YearFilter, genre: GenreFilter, tags: &[&str]) -> Selection {
        Selection {
            year,
            genre,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn ranked_labels(result: &ViewResult) -> Vec<(String, i64)> {
        match result {
            ViewResult::Ranked(rows) => rows.iter().map(|r| (r.label.clone(), r.value)).collect(),
            other => panic!("expected ranked table, got {other:?}"),
        }
    }

    #[test]
    fn test_top_movies_honours_year_and_genre() {
        let ds = dataset();
        let config = DashboardConfig::default();
        let all = compute_view(&ds, &Selection::default(), &config, ViewKind::TopMovies);
        assert_eq!(ranked_labels(&all), vec![("A".into(), 13), ("B".into(), 5)]);

        let sel = select(YearFilter::Year(2021), GenreFilter::All, &[]);
        let one = compute_view(&ds, &sel, &config, ViewKind::TopMovies);
        assert_eq!(ranked_labels(&one), vec![("A".into(), 3)]);
    }

    #[test]
    fn test_top_movies_no_match_is_a_notice() {
        let ds = dataset();
        let sel = select(YearFilter::Year(1990), GenreFilter::All, &[]);
        let result = compute_view(&ds, &sel, &DashboardConfig::default(), ViewKind::TopMovies);
        assert_eq!(result, ViewResult::Notice(Notice::NoData(NO_DATA_FILTERS)));
        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_count_aggregator_from_config() {
        let ds = dataset();
        let config = DashboardConfig {
            rating_aggregator: crate::data::aggregate::Aggregator::Count,
            ..DashboardConfig::default()
        };
        let result = compute_view(&ds, &Selection::default(), &config, ViewKind::TopMovies);
        assert_eq!(ranked_labels(&result), vec![("A".into(), 2), ("B".into(), 1)]);
    }

    #[test]
    fn test_trending_ignores_selection() {
        let ds = dataset();
        let sel = select(YearFilter::Year(1990), GenreFilter::Genre(Genre::War), &[]);
        let result = compute_view(&ds, &sel, &DashboardConfig::default(), ViewKind::Trending);
        assert_eq!(ranked_labels(&result), vec![("A".into(), 13), ("B".into(), 5)]);
    }

    #[test]
    fn test_trending_without_years_is_a_notice() {
        let ds = MovieDataset::from_records(vec![MovieRecord::new("A", None, 4.0, 1)]);
        let result = compute_view(&ds, &Selection::default(), &DashboardConfig::default(), ViewKind::Trending);
        assert!(matches!(result, ViewResult::Notice(Notice::NoData(_))));
    }

    #[test]
    fn test_average_rating_ignores_year_selection() {
        let ds = dataset();
        let sel = select(YearFilter::Year(2020), GenreFilter::Genre(Genre::Action), &[]);
        let result = compute_view(&ds, &sel, &DashboardConfig::default(), ViewKind::AverageRating);
        assert_eq!(
            result,
            ViewResult::YearTrend(vec![
                YearAverage { year: 2020, avg_rating: 4.0 },
                YearAverage { year: 2021, avg_rating: 5.0 },
            ])
        );
    }

    #[test]
    fn test_genre_popularity_ignores_genre_selection() {
        let ds = dataset();
        let sel = select(YearFilter::Year(2020), GenreFilter::Genre(Genre::Drama), &[]);
        let ViewResult::Genres(totals) = compute_view(&ds, &sel, &DashboardConfig::default(), ViewKind::GenrePopularity)
        else {
            panic!("expected genre table");
        };
        assert_eq!(totals[0], GenreTotal { genre: Genre::Action, total: 10 });
        assert_eq!(totals.len(), Genre::ALL.len());
    }

    #[test]
    fn test_tags_prompt_until_selected() {
        let ds = dataset();
        let result = compute_view(&ds, &Selection::default(), &DashboardConfig::default(), ViewKind::MoviesByTags);
        assert_eq!(result, ViewResult::Notice(Notice::SelectTags));
        assert_eq!(Notice::SelectTags.message(), "Select at least one tag to view results.");
    }

    #[test]
    fn test_tag_filter_mode() {
        let ds = dataset();
        let sel = select(YearFilter::Year(2020), GenreFilter::All, &["dark"]);

        let independent = compute_view(&ds, &sel, &DashboardConfig::default(), ViewKind::MoviesByTags);
        assert_eq!(ranked_labels(&independent), vec![("B".into(), 5), ("A".into(), 3)]);

        let config = DashboardConfig {
            tag_filter: TagFilterMode::Compose,
            ..DashboardConfig::default()
        };
        let composed = compute_view(&ds, &sel, &config, ViewKind::MoviesByTags);
        assert_eq!(ranked_labels(&composed), vec![("B".into(), 5)]);

        let sel = select(YearFilter::Year(2021), GenreFilter::All, &["funny"]);
        let empty = compute_view(&ds, &sel, &config, ViewKind::MoviesByTags);
        assert_eq!(empty, ViewResult::Notice(Notice::NoData(NO_DATA_TAGS)));
    }

    #[test]
    fn test_temporal_views() {
        let ds = dataset();
        let config = DashboardConfig::default();
        assert_eq!(
            compute_view(&ds, &Selection::default(), &config, ViewKind::MonthlyTrends),
            ViewResult::Monthly(vec![
                PeriodCount { period: Month::May, count: 2 },
                PeriodCount { period: Month::June, count: 1 },
            ])
        );
        assert_eq!(
            compute_view(&ds, &Selection::default(), &config, ViewKind::WeeklyTrends),
            ViewResult::Weekly(vec![
                PeriodCount { period: Weekday::Sat, count: 2 },
                PeriodCount { period: Weekday::Sun, count: 1 },
            ])
        );
    }

    #[test]
    fn test_temporal_views_unavailable_without_columns() {
        let ds = MovieDataset::new(dataset().records, Genre::ALL.to_vec(), false, false);
        let config = DashboardConfig::default();
        assert_eq!(
            compute_view(&ds, &Selection::default(), &config, ViewKind::MonthlyTrends),
            ViewResult::Notice(Notice::Unavailable(NO_MONTH))
        );
        assert_eq!(
            compute_view(&ds, &Selection::default(), &config, ViewKind::WeeklyTrends),
            ViewResult::Notice(Notice::Unavailable(NO_DAY_OF_WEEK))
        );
    }
}
