use std::collections::BTreeSet;
use std::fmt;

use super::model::{Genre, MovieRecord};
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Filter predicates: year, genre, tags
// ---------------------------------------------------------------------------

/// Year selector: the "All" sentinel or one concrete year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum YearFilter {
    #[default]
    All,
    Year(i32),
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => write!(f, "All"),
            YearFilter::Year(y) => write!(f, "{y}"),
        }
    }
}

impl YearFilter {
    fn matches(&self, record: &MovieRecord) -> bool {
        match self {
            YearFilter::All => true,
            YearFilter::Year(y) => record.year == Some(*y),
        }
    }
}

/// Genre selector: the "All" sentinel or one genre flag that must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenreFilter {
    #[default]
    All,
    Genre(Genre),
}

impl fmt::Display for GenreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenreFilter::All => write!(f, "All"),
            GenreFilter::Genre(g) => write!(f, "{g}"),
        }
    }
}

impl GenreFilter {
    fn matches(&self, record: &MovieRecord) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Genre(g) => record.genres.contains(*g),
        }
    }
}

/// Keep records matching both the year and the genre selector.
///
/// `(All, All)` is the identity. The two predicates are independent, so the
/// order they are applied in does not matter and re-applying is a no-op.
/// A year that matches nothing yields an empty view, not an error.
pub fn filter_by_year_and_genre<'a, I>(records: I, year: YearFilter, genre: GenreFilter) -> Vec<&'a MovieRecord>
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    records
        .into_iter()
        .filter(|r| year.matches(r) && genre.matches(r))
        .collect()
}

/// Keep records whose tag is one of `tags`.
///
/// An empty selection is not "match nothing": the caller has to ask the user
/// to pick tags first, so it comes back as [`PipelineError::EmptySelection`].
pub fn filter_by_tag<'a, I>(records: I, tags: &BTreeSet<String>) -> Result<Vec<&'a MovieRecord>, PipelineError>
where
    I: IntoIterator<Item = &'a MovieRecord>,
{
    if tags.is_empty() {
        return Err(PipelineError::EmptySelection);
    }
    Ok(records
        .into_iter()
        .filter(|r| r.tag.as_ref().is_some_and(|t| tags.contains(t)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<MovieRecord> {
        vec![
            MovieRecord::new("A", Some(2020), 4.0, 10).with_genres(&[Genre::Action]).with_tag("funny"),
            MovieRecord::new("B", Some(2020), 2.0, 5).with_genres(&[Genre::Drama]),
            MovieRecord::new("A", Some(2021), 5.0, 3)
                .with_genres(&[Genre::Action, Genre::Drama])
                .with_tag("dark"),
            MovieRecord::new("C", None, 3.0, 1).with_genres(&[Genre::Action]).with_tag("funny"),
        ]
    }

    #[test]
    fn test_all_all_is_identity() {
        let records = sample();
        let out = filter_by_year_and_genre(&records, YearFilter::All, GenreFilter::All);
        assert_eq!(out, records.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = sample();
        let year = YearFilter::Year(2020);
        let genre = GenreFilter::Genre(Genre::Action);
        let once = filter_by_year_and_genre(&records, year, genre);
        let twice = filter_by_year_and_genre(once.iter().copied(), year, genre);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filters_commute() {
        let records = sample();
        let year_first = filter_by_year_and_genre(
            filter_by_year_and_genre(&records, YearFilter::Year(2021), GenreFilter::All),
            YearFilter::All,
            GenreFilter::Genre(Genre::Drama),
        );
        let genre_first = filter_by_year_and_genre(
            filter_by_year_and_genre(&records, YearFilter::All, GenreFilter::Genre(Genre::Drama)),
            YearFilter::Year(2021),
            GenreFilter::All,
        );
        assert_eq!(year_first, genre_first);
        assert_eq!(year_first.len(), 1);
    }

    #[test]
    fn test_unknown_year_matches_nothing() {
        let records = sample();
        let out = filter_by_year_and_genre(&records, YearFilter::Year(1999), GenreFilter::All);
        assert!(out.is_empty());
    }

    #[test]
    fn test_year_filter_skips_records_without_year() {
        let records = sample();
        let out = filter_by_year_and_genre(&records, YearFilter::All, GenreFilter::Genre(Genre::Action));
        assert_eq!(out.len(), 3);
        let out = filter_by_year_and_genre(&records, YearFilter::Year(2020), GenreFilter::Genre(Genre::Action));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_empty_tag_selection_is_not_applicable() {
        let records = sample();
        assert_eq!(filter_by_tag(&records, &BTreeSet::new()), Err(PipelineError::EmptySelection));
    }

    #[test]
    fn test_tag_membership() {
        let records = sample();
        let tags: BTreeSet<String> = ["funny".to_string()].into();
        let out = filter_by_tag(&records, &tags).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.tag.as_deref() == Some("funny")));

        let tags: BTreeSet<String> = ["nonexistent".to_string()].into();
        assert!(filter_by_tag(&records, &tags).unwrap().is_empty());
    }
}
