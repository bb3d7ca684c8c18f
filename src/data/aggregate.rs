use std::collections::{BTreeMap, HashMap};

use chrono::{Month, Weekday};
use serde::{Deserialize, Serialize};

use super::model::{Genre, MovieRecord};
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Aggregator – how `rating_count` is reduced within a group
// ---------------------------------------------------------------------------

/// `Sum` treats `rating_count` as a weight carried by each row; `Count`
/// treats every row as one rating event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregator {
    #[default]
    Sum,
    Count,
}

impl Aggregator {
    fn contribution(self, record: &MovieRecord) -> i64 {
        match self {
            Aggregator::Sum => record.rating_count,
            Aggregator::Count => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Result tables
// ---------------------------------------------------------------------------

/// One bar of a rank-ordered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRow {
    pub label: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearAverage {
    pub year: i32,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreTotal {
    pub genre: Genre,
    pub total: i64,
}

/// A calendar bucket (month or weekday) with a display order.
pub trait Period: Copy {
    /// Position in display order, starting at 0.
    fn index(self) -> usize;
    fn label(self) -> &'static str;
}

impl Period for Month {
    fn index(self) -> usize {
        self.number_from_month() as usize - 1
    }

    fn label(self) -> &'static str {
        self.name()
    }
}

impl Period for Weekday {
    fn index(self) -> usize {
        self.num_days_from_monday() as usize
    }

    fn label(self) -> &'static str {
        match self {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodCount<P> {
    pub period: P,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Grouping and ranking
// ---------------------------------------------------------------------------

/// Group by `key`, reduce `rating_count` with `agg`, sort descending and keep
/// the first `limit` groups.
///
/// Records for which `key` returns `None` are skipped. Groups with equal
/// values stay in the order their key first appeared.
pub fn rank_by<'a, I, F>(records: I, key: F, agg: Aggregator, limit: usize) -> Vec<RankedRow>
where
    I: IntoIterator<Item = &'a MovieRecord>,
    F: Fn(&'a MovieRecord) -> Option<&'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<RankedRow> = Vec::new();

    for record in records {
        let Some(label) = key(record) else {
            continue;
        };
        let slot = *index.entry(label).or_insert_with(|| {
            rows.push(RankedRow {
                label: label.to_string(),
                value: 0,
            });
            rows.len() - 1
        });
        rows[slot].value = rows[slot].value.saturating_add(agg.contribution(record));
    }

    // `sort_by` is stable, which keeps first-occurrence order among ties.
    rows.sort_by(|a, b| b.value.cmp(&a.value));
    rows.truncate(limit);
    rows
}

/// Movies ranked by aggregated `rating_count`.
pub fn top_by_rating_count<'a, I>(records: I, agg: Aggregator, limit: usize) -> Vec<RankedRow>
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    rank_by(records, |r| Some(r.title.as_str()), agg, limit)
}

/// Keep records from the last `window` years relative to the newest year
/// present, inclusive of both ends.
pub fn trending_window<'a, I>(records: I, window: i32) -> Result<Vec<&'a MovieRecord>, PipelineError>
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    let records: Vec<&MovieRecord> = records.into_iter().collect();
    let max_year = records
        .iter()
        .filter_map(|r| r.year)
        .max()
        .ok_or_else(|| PipelineError::InsufficientData("no record has a year".to_string()))?;
    let cutoff = max_year.saturating_sub(window);

    Ok(records
        .into_iter()
        .filter(|r| r.year.is_some_and(|y| y >= cutoff))
        .collect())
}

/// Mean rating per year, ascending by year.
///
/// Records without a year or with a missing rating do not contribute, and a
/// year with no contributing record does not appear.
pub fn average_rating_by_year<'a, I>(records: I) -> Vec<YearAverage>
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    let mut acc: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for record in records {
        let Some(year) = record.year else {
            continue;
        };
        if record.rating.is_nan() {
            continue;
        }
        let entry = acc.entry(year).or_insert((0.0, 0));
        entry.0 += record.rating;
        entry.1 += 1;
    }

    acc.into_iter()
        .map(|(year, (sum, n))| YearAverage {
            year,
            avg_rating: sum / n as f64,
        })
        .collect()
}

/// Total per genre, descending. A record with several flags counts towards
/// each of them, so the totals can add up to more than the dataset total.
///
/// Empty input gives an empty table; otherwise every genre in `genres` is
/// listed, zero totals included, with ties kept in `genres` order.
pub fn genre_popularity<'a, I>(records: I, genres: &[Genre], agg: Aggregator) -> Vec<GenreTotal>
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    let records: Vec<&MovieRecord> = records.into_iter().collect();
    if records.is_empty() {
        return Vec::new();
    }

    let mut totals: Vec<GenreTotal> = genres
        .iter()
        .map(|&genre| GenreTotal {
            genre,
            total: records
                .iter()
                .filter(|r| r.genres.contains(genre))
                .fold(0i64, |total, r| total.saturating_add(agg.contribution(r))),
        })
        .collect();

    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}

// ---------------------------------------------------------------------------
// Temporal counts
// ---------------------------------------------------------------------------

fn count_by_period<'a, I, P, F, const N: usize>(records: I, first: P, next: fn(P) -> P, period: F) -> Vec<PeriodCount<P>>
where
    I: IntoIterator<Item = &'a MovieRecord>,
    P: Period,
    F: Fn(&MovieRecord) -> Option<P>,
{
    let mut counts = [0usize; N];
    for record in records {
        if record.rating.is_nan() {
            continue;
        }
        if let Some(p) = period(record) {
            counts[p.index()] += 1;
        }
    }

    let mut out = Vec::new();
    let mut current = first;
    for count in counts {
        if count > 0 {
            out.push(PeriodCount { period: current, count });
        }
        current = next(current);
    }
    out
}

/// Number of ratings per month, January first. Months without ratings are
/// left out.
pub fn monthly_counts<'a, I>(records: I) -> Vec<PeriodCount<Month>>
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    count_by_period::<_, _, _, 12>(records, Month::January, |m: Month| m.succ(), |r| r.month)
}

/// Number of ratings per weekday, Monday first. Days without ratings are
/// left out.
pub fn weekly_counts<'a, I>(records: I) -> Vec<PeriodCount<Weekday>>
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    count_by_period::<_, _, _, 7>(records, Weekday::Mon, |d: Weekday| d.succ(), |r| r.day_of_week)
}
