use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const GENRES: [&str; 19] = [
    "Action", "Adventure", "Animation", "Children", "Comedy", "Crime", "Documentary", "Drama", "Fantasy",
    "Film-Noir", "Horror", "IMAX", "Musical", "Mystery", "Romance", "Sci-Fi", "Thriller", "War", "Western",
];

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
    "November", "December",
];

const WEEKDAYS: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

const TAGS: [&str; 10] = [
    "atmospheric",
    "classic",
    "dark comedy",
    "funny",
    "mindfuck",
    "plot twist",
    "quirky",
    "slow",
    "thought-provoking",
    "visually appealing",
];

/// (title, release year, genres, base rating)
const MOVIES: [(&str, i32, &[&str], f64); 16] = [
    ("Harbor Lights", 1996, &["Drama", "Romance"], 3.9),
    ("Steel Horizon", 2019, &["Action", "Sci-Fi", "IMAX"], 3.6),
    ("The Quiet Orchard", 2004, &["Drama"], 4.1),
    ("Paper Moon Parade", 2021, &["Animation", "Children", "Musical"], 3.8),
    ("Night Ledger", 1998, &["Crime", "Film-Noir", "Mystery"], 4.0),
    ("Dust Riders", 2017, &["Western", "Action"], 3.3),
    ("Laugh Track", 2022, &["Comedy"], 3.1),
    ("Cold Front", 2020, &["Thriller", "Horror"], 2.9),
    ("Lantern Bay", 2023, &["Fantasy", "Adventure"], 3.7),
    ("Field Notes", 2018, &["Documentary"], 4.2),
    ("Trench Line", 2009, &["War", "Drama"], 4.0),
    ("Second Helping", 2021, &["Comedy", "Romance"], 3.4),
    ("Orbital", 2022, &["Sci-Fi", "Thriller", "IMAX"], 3.9),
    ("The Last Waltz Home", 2000, &["Musical", "Drama"], 3.5),
    ("Haunt Street", 2019, &["Horror"], 2.7),
    ("Map of Small Things", 2016, &["Adventure", "Children"], 3.6),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

/// One generated row.
struct Row {
    title: &'static str,
    year: i32,
    rating: f64,
    rating_count: i64,
    tag: Option<&'static str>,
    genres: &'static [&'static str],
    month: &'static str,
    day_of_week: &'static str,
}

fn generate(rng: &mut SimpleRng, rows_per_movie: usize) -> Vec<Row> {
    let mut rows = Vec::new();
    for &(title, year, genres, base) in &MOVIES {
        for _ in 0..rows_per_movie {
            // Ratings are half stars between 0.5 and 5.0.
            let jitter = (rng.next_f64() - 0.5) * 2.0;
            let rating = ((base + jitter).clamp(0.5, 5.0) * 2.0).round() / 2.0;
            let tag = (rng.next_f64() < 0.2).then(|| TAGS[rng.below(TAGS.len())]);
            rows.push(Row {
                title,
                year,
                rating,
                rating_count: 1 + rng.below(40) as i64,
                tag,
                genres,
                month: MONTHS[rng.below(MONTHS.len())],
                day_of_week: WEEKDAYS[rng.below(WEEKDAYS.len())],
            });
        }
    }
    rows
}

fn header() -> Vec<&'static str> {
    let mut h = vec!["title", "year", "rating", "rating_count", "tag"];
    h.extend(GENRES);
    h.extend(["month", "day_of_week"]);
    h
}

fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(header())?;
    for row in rows {
        let mut record = vec![
            row.title.to_string(),
            row.year.to_string(),
            row.rating.to_string(),
            row.rating_count.to_string(),
            row.tag.unwrap_or("").to_string(),
        ];
        record.extend(GENRES.iter().map(|g| u8::from(row.genres.contains(g)).to_string()));
        record.push(row.month.to_string());
        record.push(row.day_of_week.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let mut fields = vec![
        Field::new("title", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("rating", DataType::Float64, false),
        Field::new("rating_count", DataType::Int64, false),
        Field::new("tag", DataType::Utf8, true),
    ];
    fields.extend(GENRES.iter().map(|g| Field::new(*g, DataType::Int32, false)));
    fields.push(Field::new("month", DataType::Utf8, false));
    fields.push(Field::new("day_of_week", DataType::Utf8, false));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(rows.iter().map(|r| r.title).collect::<Vec<_>>())),
        Arc::new(Int32Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.rating).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.rating_count).collect::<Vec<_>>())),
        Arc::new(StringArray::from(rows.iter().map(|r| r.tag).collect::<Vec<_>>())),
    ];
    for genre in GENRES {
        let flags: Vec<i32> = rows.iter().map(|r| i32::from(r.genres.contains(&genre))).collect();
        columns.push(Arc::new(Int32Array::from(flags)));
    }
    columns.push(Arc::new(StringArray::from(rows.iter().map(|r| r.month).collect::<Vec<_>>())));
    columns.push(Arc::new(StringArray::from(rows.iter().map(|r| r.day_of_week).collect::<Vec<_>>())));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 60);

    write_csv("sample_movies.csv", &rows)?;
    write_parquet("sample_movies.parquet", &rows)?;

    println!(
        "Wrote {} ratings for {} movies to sample_movies.csv and sample_movies.parquet",
        rows.len(),
        MOVIES.len()
    );
    Ok(())
}
