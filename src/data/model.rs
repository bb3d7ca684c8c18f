use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Month, Weekday};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single raw cell before schema decoding
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common Pandas dtypes.
///
/// Every loader produces these; [`super::schema::Schema`] turns a row of them
/// into a typed [`MovieRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

fn whole(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

/// Text spellings Pandas reads back as a missing value.
const NULL_SPELLINGS: [&str; 6] = ["NaN", "nan", "NA", "N/A", "null", "None"];

impl CellValue {
    /// Missing value: an actual null, a blank string, or one of the Pandas
    /// null spellings (`NaN`, `NA`, `null`, ...).
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => {
                let s = s.trim();
                s.is_empty() || NULL_SPELLINGS.contains(&s)
            }
            _ => false,
        }
    }

    /// Numeric view of the cell. Numeric strings are accepted because CSV
    /// cells are kept as raw text until a column asks for a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Integer view of the cell. `1995.0` is accepted (Pandas writes integer
    /// columns containing NaN as floats), `1995.5` and non-finite values are not.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Bool(b) => Some(i64::from(*b)),
            CellValue::String(s) => s.trim().parse::<i64>().ok().or_else(|| whole(self.as_f64()?)),
            _ => whole(self.as_f64()?),
        }
    }

    /// Non-empty text content, if any. Text cells come back as written.
    pub fn as_text(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        match self {
            CellValue::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Genre – the fixed set of genre indicator columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Children,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Fantasy,
    #[serde(rename = "Film-Noir")]
    FilmNoir,
    Horror,
    #[serde(rename = "IMAX")]
    Imax,
    Musical,
    Mystery,
    Romance,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Thriller,
    War,
    Western,
}

impl Genre {
    /// Every genre, in dataset column order.
    pub const ALL: [Genre; 19] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Children,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Fantasy,
        Genre::FilmNoir,
        Genre::Horror,
        Genre::Imax,
        Genre::Musical,
        Genre::Mystery,
        Genre::Romance,
        Genre::SciFi,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    /// Header of the indicator column for this genre.
    pub fn column_name(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Children => "Children",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::FilmNoir => "Film-Noir",
            Genre::Horror => "Horror",
            Genre::Imax => "IMAX",
            Genre::Musical => "Musical",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|g| g.column_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown genre '{s}'"))
    }
}

/// The active genre flags of one record. Flags are not mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GenreSet(u32);

impl GenreSet {
    pub fn insert(&mut self, genre: Genre) {
        self.0 |= genre.bit();
    }

    pub fn contains(&self, genre: Genre) -> bool {
        self.0 & genre.bit() != 0
    }
}

impl FromIterator<Genre> for GenreSet {
    fn from_iter<I: IntoIterator<Item = Genre>>(iter: I) -> Self {
        let mut set = GenreSet::default();
        for g in iter {
            set.insert(g);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// MovieRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single rating/tag event for a movie.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    /// `None` when the cell was empty or not a number.
    pub year: Option<i32>,
    pub rating: f64,
    pub rating_count: i64,
    /// Never `Some("")`.
    pub tag: Option<String>,
    pub genres: GenreSet,
    pub month: Option<Month>,
    pub day_of_week: Option<Weekday>,
}

#[cfg(test)]
impl MovieRecord {
    /// Minimal record; the remaining fields are filled in with the `with_*` helpers.
    pub fn new(title: impl Into<String>, year: Option<i32>, rating: f64, rating_count: i64) -> Self {
        Self {
            title: title.into(),
            year,
            rating,
            rating_count,
            tag: None,
            genres: GenreSet::default(),
            month: None,
            day_of_week: None,
        }
    }

    pub fn with_genres(mut self, genres: &[Genre]) -> Self {
        self.genres = genres.iter().copied().collect();
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = (!tag.is_empty()).then(|| tag.to_string());
        self
    }

    pub fn with_period(mut self, month: Option<Month>, day_of_week: Option<Weekday>) -> Self {
        self.month = month;
        self.day_of_week = day_of_week;
        self
    }
}

// ---------------------------------------------------------------------------
// MovieDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed option lists.
///
/// Built once at load time and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct MovieDataset {
    pub records: Vec<MovieRecord>,
    /// Genre columns that exist in the source, in column order.
    pub genres: Vec<Genre>,
    /// Sorted distinct years (records without a year are not represented).
    pub years: Vec<i32>,
    /// Sorted distinct tags.
    pub tags: Vec<String>,
    pub has_month: bool,
    pub has_day_of_week: bool,
}

impl MovieDataset {
    /// Build the option lists from decoded records.
    pub fn new(records: Vec<MovieRecord>, genres: Vec<Genre>, has_month: bool, has_day_of_week: bool) -> Self {
        let years: BTreeSet<i32> = records.iter().filter_map(|r| r.year).collect();
        let tags: BTreeSet<String> = records.iter().filter_map(|r| r.tag.clone()).collect();

        MovieDataset {
            records,
            genres,
            years: years.into_iter().collect(),
            tags: tags.into_iter().collect(),
            has_month,
            has_day_of_week,
        }
    }

    /// Dataset with every genre column and both temporal columns, used in tests.
    #[cfg(test)]
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        Self::new(records, Genre::ALL.to_vec(), true, true)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
