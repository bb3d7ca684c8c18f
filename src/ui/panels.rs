use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::Navigation;
use crate::data::filter::{GenreFilter, YearFilter};
use crate::state::AppState;

/// Selector changes picked up while drawing, applied once the dataset
/// borrow has ended.
enum Change {
    Year(YearFilter),
    Genre(GenreFilter),
    ToggleTag(String),
    AllTags,
    NoTags,
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut changes: Vec<Change> = Vec::new();

    // ---- Year ----
    ui.strong("Select Year");
    let current_year = state.selection.year;
    egui::ComboBox::from_id_salt("select_year")
        .selected_text(current_year.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            let options = std::iter::once(YearFilter::All).chain(dataset.years.iter().map(|y| YearFilter::Year(*y)));
            for option in options {
                if ui
                    .selectable_label(current_year == option, option.to_string())
                    .clicked()
                {
                    changes.push(Change::Year(option));
                }
            }
        });
    ui.add_space(6.0);

    // ---- Genre ----
    ui.strong("Select Genre");
    let current_genre = state.selection.genre;
    egui::ComboBox::from_id_salt("select_genre")
        .selected_text(current_genre.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            let options = std::iter::once(GenreFilter::All).chain(dataset.genres.iter().map(|g| GenreFilter::Genre(*g)));
            for option in options {
                if ui
                    .selectable_label(current_genre == option, option.to_string())
                    .clicked()
                {
                    changes.push(Change::Genre(option));
                }
            }
        });
    ui.separator();

    // ---- Tags (multi-select) ----
    let n_selected = state.selection.tags.len();
    let n_total = dataset.tags.len();
    ui.strong(format!("Select Tags  ({n_selected}/{n_total})"));
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search");
        ui.text_edit_singleline(&mut state.tag_search);
    });
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            changes.push(Change::AllTags);
        }
        if ui.small_button("None").clicked() {
            changes.push(Change::NoTags);
        }
    });

    let matching = state.matching_tags();
    ScrollArea::vertical()
        .id_salt("tag_list")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if matching.is_empty() {
                ui.weak("No tags match.");
            }
            for tag in &matching {
                let mut checked = state.selection.tags.contains(tag);
                if ui.checkbox(&mut checked, tag.as_str()).changed() {
                    changes.push(Change::ToggleTag(tag.clone()));
                }
            }
        });

    for change in changes {
        match change {
            Change::Year(y) => state.set_year(y),
            Change::Genre(g) => state.set_genre(g),
            Change::ToggleTag(t) => state.toggle_tag(&t),
            Change::AllTags => state.select_matching_tags(),
            Change::NoTags => state.clear_tags(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} ratings loaded, {} match year/genre",
                ds.len(),
                state.visible_count
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// View selector (tabs or dropdown, per config)
// ---------------------------------------------------------------------------

pub fn view_selector(ui: &mut Ui, state: &mut AppState) {
    let views = state.config.views.clone();
    let active = state.active_view;
    let mut picked = None;

    match state.config.navigation {
        Navigation::Tabs => {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for view in &views {
                    if ui.selectable_label(active == *view, view.label()).clicked() {
                        picked = Some(*view);
                    }
                }
            });
        }
        Navigation::Dropdown => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Select View");
                egui::ComboBox::from_id_salt("select_view")
                    .selected_text(active.label())
                    .show_ui(ui, |ui: &mut Ui| {
                        for view in &views {
                            if ui.selectable_label(active == *view, view.label()).clicked() {
                                picked = Some(*view);
                            }
                        }
                    });
            });
        }
    }

    if let Some(view) = picked {
        state.set_view(view);
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open rating data")
        .add_filter("Supported files", &["csv", "xls", "tsv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "xls", "tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
