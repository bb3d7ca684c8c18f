use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ReelPandaApp {
    pub state: AppState,
}

impl ReelPandaApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ReelPandaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: view selector, chart and table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_some() {
                panels::view_selector(ui, &mut self.state);
                ui.separator();
            }
            plot::view_chart(ui, &self.state);
        });
    }
}
