use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points, uniform_grid_spacer};

use crate::color::Theme;
use crate::data::aggregate::Period;
use crate::state::AppState;
use crate::ui::table;
use crate::views::{Notice, ViewResult};

// ---------------------------------------------------------------------------
// Central panel: chart for the active view, table underneath
// ---------------------------------------------------------------------------

/// Render the active view in the central panel.
pub fn view_chart(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view ratings  (File → Open…)");
        });
        return;
    }
    let Some(result) = &state.result else {
        return;
    };

    let theme = &state.theme;
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(
            RichText::new(state.active_view.chart_title(&state.config))
                .color(theme.accent)
                .size(22.0),
        );
    });
    ui.add_space(4.0);

    if let ViewResult::Notice(notice) = result {
        notice_text(ui, notice);
        return;
    }

    let chart_height = (ui.available_height() * 0.65).max(200.0);
    ui.scope(|ui: &mut Ui| {
        ui.visuals_mut().extreme_bg_color = theme.background;
        match result {
            ViewResult::Ranked(rows) => {
                let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
                let values: Vec<f64> = rows.iter().map(|r| r.value as f64).collect();
                horizontal_bars(ui, "ranked", chart_height, labels, &values, |_| theme.accent, "rating_count");
            }
            ViewResult::Genres(rows) => {
                let labels: Vec<String> = rows.iter().map(|r| r.genre.to_string()).collect();
                let values: Vec<f64> = rows.iter().map(|r| r.total as f64).collect();
                horizontal_bars(
                    ui,
                    "genres",
                    chart_height,
                    labels,
                    &values,
                    |i| theme.genre_color(rows[i].genre),
                    "Rating Count",
                );
            }
            ViewResult::YearTrend(rows) => {
                let points: Vec<[f64; 2]> = rows.iter().map(|r| [r.year as f64, r.avg_rating]).collect();
                Plot::new("year_trend")
                    .height(chart_height)
                    .show_grid(false)
                    .x_axis_label("year")
                    .y_axis_label("avg_rating")
                    .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| whole_number(mark.value))
                    .show(ui, |plot_ui| {
                        line_with_markers(plot_ui, points, theme);
                    });
            }
            ViewResult::Monthly(rows) => {
                let points: Vec<[f64; 2]> = rows
                    .iter()
                    .map(|r| [r.period.index() as f64 + 1.0, r.count as f64])
                    .collect();
                let labels = period_labels(rows.iter().map(|r| r.period));
                Plot::new("monthly")
                    .height(chart_height)
                    .show_grid(false)
                    .x_axis_label("month")
                    .y_axis_label("rating_count")
                    .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 3.0, 6.0]))
                    .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                        category_label(&labels, mark.value - 1.0)
                    })
                    .show(ui, |plot_ui| {
                        line_with_markers(plot_ui, points, theme);
                    });
            }
            ViewResult::Weekly(rows) => {
                let labels = period_labels(rows.iter().map(|r| r.period));
                let bars: Vec<Bar> = rows
                    .iter()
                    .map(|r| {
                        Bar::new(r.period.index() as f64, r.count as f64)
                            .name(r.period.label())
                            .fill(theme.accent)
                            .width(0.7)
                    })
                    .collect();
                Plot::new("weekly")
                    .height(chart_height)
                    .show_grid(false)
                    .x_axis_label("day_of_week")
                    .y_axis_label("rating_count")
                    .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 7.0, 14.0]))
                    .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                        category_label(&labels, mark.value)
                    })
                    .show(ui, |plot_ui| {
                        plot_ui.bar_chart(BarChart::new(bars).color(theme.accent));
                    });
            }
            ViewResult::Notice(_) => {}
        }
    });

    ui.separator();
    table::result_table(ui, result);
}

fn notice_text(ui: &mut Ui, notice: &Notice) {
    let color = match notice {
        Notice::SelectTags => Color32::LIGHT_BLUE,
        Notice::NoData(_) | Notice::Unavailable(_) => Color32::YELLOW,
    };
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new(notice.message()).color(color).size(16.0));
    });
}

/// Horizontal bar chart with the first row on top. `color_of` receives the
/// row index.
fn horizontal_bars(
    ui: &mut Ui,
    id: &str,
    height: f32,
    labels: Vec<String>,
    values: &[f64],
    color_of: impl Fn(usize) -> Color32,
    value_axis: &str,
) {
    let n = values.len();
    let bars: Vec<Bar> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            Bar::new((n - 1 - i) as f64, v)
                .name(&labels[i])
                .fill(color_of(i))
                .width(0.7)
        })
        .collect();

    // Axis positions run bottom-up, labels are ordered top-down.
    let axis_labels: Vec<String> = labels.into_iter().rev().collect();

    Plot::new(id)
        .height(height)
        .show_grid(false)
        .include_x(0.0)
        .x_axis_label(value_axis.to_string())
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&axis_labels, mark.value)
        })
        .y_axis_min_width(120.0)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn line_with_markers(plot_ui: &mut egui_plot::PlotUi, points: Vec<[f64; 2]>, theme: &Theme) {
    plot_ui.line(
        Line::new(PlotPoints::from(points.clone()))
            .color(theme.accent)
            .width(2.0),
    );
    plot_ui.points(Points::new(PlotPoints::from(points)).radius(4.0).color(theme.accent));
}

fn period_labels<P: Period>(periods: impl Iterator<Item = P>) -> Vec<String> {
    let mut labels = Vec::new();
    for p in periods {
        let idx = p.index();
        if labels.len() <= idx {
            labels.resize(idx + 1, String::new());
        }
        labels[idx] = p.label().to_string();
    }
    labels
}

/// Label for a category axis tick; empty between categories.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

fn whole_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-6 {
        format!("{}", value.round() as i64)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Month;

    use super::*;

    #[test]
    fn test_category_label() {
        let labels = vec!["A".to_string(), "B".to_string()];
        assert_eq!(category_label(&labels, 1.0), "B");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 7.0), "");
    }

    #[test]
    fn test_period_labels_are_indexed_by_calendar_position() {
        let labels = period_labels([Month::March, Month::January].into_iter());
        assert_eq!(labels, vec!["January".to_string(), String::new(), "March".to_string()]);
    }

    #[test]
    fn test_whole_number() {
        assert_eq!(whole_number(2020.0), "2020");
        assert_eq!(whole_number(2020.5), "");
    }
}
