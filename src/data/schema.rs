use anyhow::{Context, Result, bail};
use chrono::{Month, Weekday};

use super::model::{CellValue, Genre, GenreSet, MovieRecord};
use crate::error::PipelineError;

pub const TITLE: &str = "title";
pub const YEAR: &str = "year";
pub const RATING: &str = "rating";
pub const RATING_COUNT: &str = "rating_count";
pub const TAG: &str = "tag";
pub const MONTH: &str = "month";
pub const DAY_OF_WEEK: &str = "day_of_week";

static NULL_CELL: CellValue = CellValue::Null;

// ---------------------------------------------------------------------------
// Schema – column positions resolved once per file
// ---------------------------------------------------------------------------

/// Positions of the known columns inside a source's header.
///
/// Resolved once when a file is opened so that a missing column fails the
/// whole load instead of failing on every row.
#[derive(Debug, Clone)]
pub struct Schema {
    title: usize,
    year: usize,
    rating: usize,
    rating_count: usize,
    tag: usize,
    genres: Vec<(Genre, usize)>,
    month: Option<usize>,
    day_of_week: Option<usize>,
}

impl Schema {
    /// Match `headers` against the known columns.
    ///
    /// With `wanted_genres = None` every genre column found in the header is
    /// used. An explicit list makes each listed genre column required.
    pub fn resolve(headers: &[String], wanted_genres: Option<&[Genre]>) -> Result<Self, PipelineError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| PipelineError::MissingColumn(name.to_string()));

        let title = require(TITLE)?;
        let year = require(YEAR)?;
        let rating = require(RATING)?;
        let rating_count = require(RATING_COUNT)?;
        let tag = require(TAG)?;

        let genres = match wanted_genres {
            Some(list) => list
                .iter()
                .map(|g| require(g.column_name()).map(|idx| (*g, idx)))
                .collect::<Result<Vec<_>, _>>()?,
            None => Genre::ALL
                .into_iter()
                .filter_map(|g| find(g.column_name()).map(|idx| (g, idx)))
                .collect(),
        };

        Ok(Schema {
            title,
            year,
            rating,
            rating_count,
            tag,
            genres,
            month: find(MONTH),
            day_of_week: find(DAY_OF_WEEK),
        })
    }

    /// Genre columns present, in resolution order.
    pub fn genres(&self) -> Vec<Genre> {
        self.genres.iter().map(|(g, _)| *g).collect()
    }

    pub fn has_month(&self) -> bool {
        self.month.is_some()
    }

    pub fn has_day_of_week(&self) -> bool {
        self.day_of_week.is_some()
    }

    /// Decode one row of raw cells into a typed record.
    pub fn decode_row(&self, row: usize, cells: &[CellValue]) -> Result<MovieRecord> {
        let cell = |idx: usize| cells.get(idx).unwrap_or(&NULL_CELL);

        let title = cell(self.title)
            .as_text()
            .with_context(|| format!("Row {row}: empty '{TITLE}'"))?;

        // Unparseable years ("unknown", NaN) are kept as records without a year.
        let year = cell(self.year).as_i64().and_then(|y| i32::try_from(y).ok());

        let rating = match cell(self.rating) {
            missing if missing.is_null() => f64::NAN,
            other => other
                .as_f64()
                .with_context(|| format!("Row {row}: '{RATING}' value '{other}' is not a number"))?,
        };

        let rating_count = cell(self.rating_count).as_i64().with_context(|| {
            format!(
                "Row {row}: '{RATING_COUNT}' value '{}' is not an integer",
                cell(self.rating_count)
            )
        })?;

        let tag = cell(self.tag).as_text();

        let mut genres = GenreSet::default();
        for (genre, idx) in &self.genres {
            if decode_flag(cell(*idx)).with_context(|| format!("Row {row}, column '{genre}'"))? {
                genres.insert(*genre);
            }
        }

        let month = match self.month {
            Some(idx) => decode_month(cell(idx)).with_context(|| format!("Row {row}, column '{MONTH}'"))?,
            None => None,
        };
        let day_of_week = match self.day_of_week {
            Some(idx) => {
                decode_weekday(cell(idx)).with_context(|| format!("Row {row}, column '{DAY_OF_WEEK}'"))?
            }
            None => None,
        };

        Ok(MovieRecord {
            title,
            year,
            rating,
            rating_count,
            tag,
            genres,
            month,
            day_of_week,
        })
    }
}

// -- Cell decoders --

/// Genre flags must be 0/1. Missing cells count as 0.
fn decode_flag(cell: &CellValue) -> Result<bool> {
    match cell {
        missing if missing.is_null() => Ok(false),
        CellValue::Bool(b) => Ok(*b),
        CellValue::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        CellValue::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => match other.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => bail!("genre flag '{other}' is not 0 or 1"),
        },
    }
}

/// Months come either as numbers (1–12) or as English names.
fn decode_month(cell: &CellValue) -> Result<Option<Month>> {
    if cell.is_null() {
        return Ok(None);
    }
    if let Some(n) = cell.as_i64() {
        let n = u8::try_from(n).ok().and_then(|n| Month::try_from(n).ok());
        return n.map(Some).with_context(|| format!("month '{cell}' is out of range"));
    }
    match cell.as_text() {
        None => Ok(None),
        Some(s) => s
            .parse::<Month>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("'{s}' is not a month")),
    }
}

fn decode_weekday(cell: &CellValue) -> Result<Option<Weekday>> {
    match cell.as_text() {
        None => Ok(None),
        Some(s) => s
            .parse::<Weekday>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("'{s}' is not a day of the week")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    #[test]
    fn test_resolve_reports_first_missing_required_column() {
        let err = Schema::resolve(&headers(&["title", "year", "rating", "tag"]), None).unwrap_err();
        assert_eq!(err, PipelineError::MissingColumn("rating_count".into()));
    }

    #[test]
    fn test_resolve_picks_up_present_genres_only() {
        let h = headers(&["title", "year", "rating", "rating_count", "tag", "Drama", "Action", "Extra"]);
        let schema = Schema::resolve(&h, None).unwrap();
        assert_eq!(schema.genres(), vec![Genre::Action, Genre::Drama]);
        assert!(!schema.has_month());
        assert!(!schema.has_day_of_week());
    }

    #[test]
    fn test_resolve_requires_explicit_genres() {
        let h = headers(&["title", "year", "rating", "rating_count", "tag", "Action"]);
        let err = Schema::resolve(&h, Some(&[Genre::Action, Genre::Comedy])).unwrap_err();
        assert_eq!(err, PipelineError::MissingColumn("Comedy".into()));
    }

    #[test]
    fn test_decode_row() {
        let h = headers(&[
            "title", "year", "rating", "rating_count", "tag", "Action", "Comedy", "month", "day_of_week",
        ]);
        let schema = Schema::resolve(&h, None).unwrap();
        let cells = vec![
            text("Heat"),
            CellValue::Float(1995.0),
            CellValue::Float(4.5),
            CellValue::Integer(12),
            CellValue::Null,
            CellValue::Integer(1),
            CellValue::Integer(0),
            CellValue::Integer(3),
            text("Friday"),
        ];
        let rec = schema.decode_row(0, &cells).unwrap();
        assert_eq!(rec.title, "Heat");
        assert_eq!(rec.year, Some(1995));
        assert_eq!(rec.rating_count, 12);
        assert_eq!(rec.tag, None);
        assert!(rec.genres.contains(Genre::Action));
        assert!(!rec.genres.contains(Genre::Comedy));
        assert_eq!(rec.month, Some(Month::March));
        assert_eq!(rec.day_of_week, Some(Weekday::Fri));
    }

    #[test]
    fn test_decode_row_unknown_year_is_none() {
        let h = headers(&["title", "year", "rating", "rating_count", "tag"]);
        let schema = Schema::resolve(&h, None).unwrap();
        let cells = vec![text("Heat"), text("unknown"), CellValue::Float(4.0), CellValue::Integer(1), text("cops")];
        let rec = schema.decode_row(0, &cells).unwrap();
        assert_eq!(rec.year, None);
        assert_eq!(rec.tag.as_deref(), Some("cops"));
    }

    #[test]
    fn test_decode_row_rejects_bad_genre_flag() {
        let h = headers(&["title", "year", "rating", "rating_count", "tag", "Action"]);
        let schema = Schema::resolve(&h, None).unwrap();
        let cells = vec![
            text("Heat"),
            CellValue::Integer(1995),
            CellValue::Float(4.0),
            CellValue::Integer(1),
            CellValue::Null,
            CellValue::Integer(2),
        ];
        let err = schema.decode_row(7, &cells).unwrap_err();
        assert!(format!("{err:#}").contains("Row 7, column 'Action'"));
    }

    #[test]
    fn test_decode_month_names_and_numbers() {
        assert_eq!(decode_month(&text("January")).unwrap(), Some(Month::January));
        assert_eq!(decode_month(&CellValue::Integer(12)).unwrap(), Some(Month::December));
        assert_eq!(decode_month(&CellValue::Null).unwrap(), None);
        assert!(decode_month(&CellValue::Integer(13)).is_err());
        assert_eq!(decode_month(&text("NaN")).unwrap(), None);
        assert_eq!(decode_month(&text("3")).unwrap(), Some(Month::March));
    }

    #[test]
    fn test_decode_weekday_treats_null_spellings_as_missing() {
        assert_eq!(decode_weekday(&text("NA")).unwrap(), None);
        assert_eq!(decode_weekday(&text("Sunday")).unwrap(), Some(Weekday::Sun));
        assert!(decode_weekday(&text("Someday")).is_err());
    }
}
