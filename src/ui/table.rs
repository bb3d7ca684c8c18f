use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::Period;
use crate::views::ViewResult;

// ---------------------------------------------------------------------------
// Result table (below the chart)
// ---------------------------------------------------------------------------

type Rows = ([&'static str; 2], Vec<[String; 2]>);

/// Column headers and formatted cells for a result; `None` for notices.
pub fn table_rows(result: &ViewResult) -> Option<Rows> {
    let rows = match result {
        ViewResult::Ranked(rows) => (
            ["title", "rating_count"],
            rows.iter().map(|r| [r.label.clone(), r.value.to_string()]).collect(),
        ),
        ViewResult::YearTrend(rows) => (
            ["year", "avg_rating"],
            rows.iter()
                .map(|r| [r.year.to_string(), format!("{:.2}", r.avg_rating)])
                .collect(),
        ),
        ViewResult::Genres(rows) => (
            ["Genre", "Rating Count"],
            rows.iter().map(|r| [r.genre.to_string(), r.total.to_string()]).collect(),
        ),
        ViewResult::Monthly(rows) => (
            ["month", "rating_count"],
            rows.iter()
                .map(|r| [r.period.label().to_string(), r.count.to_string()])
                .collect(),
        ),
        ViewResult::Weekly(rows) => (
            ["day_of_week", "rating_count"],
            rows.iter()
                .map(|r| [r.period.label().to_string(), r.count.to_string()])
                .collect(),
        ),
        ViewResult::Notice(_) => return None,
    };
    Some(rows)
}

/// Render the result as a two-column table.
pub fn result_table(ui: &mut Ui, result: &ViewResult) {
    let Some((headers, rows)) = table_rows(result) else {
        return;
    };

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::remainder().at_least(160.0))
        .column(Column::auto().at_least(100.0))
        .header(20.0, |mut header| {
            for h in headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|mut body| {
            for row in &rows {
                body.row(18.0, |mut tr| {
                    for cell in row {
                        tr.col(|ui: &mut Ui| {
                            ui.label(cell.as_str());
                        });
                    }
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::data::aggregate::{PeriodCount, YearAverage};
    use crate::views::Notice;

    #[test]
    fn test_table_rows_format_cells() {
        let (headers, rows) = table_rows(&ViewResult::YearTrend(vec![YearAverage {
            year: 2020,
            avg_rating: 10.0 / 3.0,
        }]))
        .unwrap();
        assert_eq!(headers, ["year", "avg_rating"]);
        assert_eq!(rows, vec![["2020".to_string(), "3.33".to_string()]]);

        let (_, rows) = table_rows(&ViewResult::Weekly(vec![PeriodCount {
            period: Weekday::Wed,
            count: 4,
        }]))
        .unwrap();
        assert_eq!(rows, vec![["Wednesday".to_string(), "4".to_string()]]);
    }

    #[test]
    fn test_notice_has_no_table() {
        assert!(table_rows(&ViewResult::Notice(Notice::SelectTags)).is_none());
    }
}
