use eframe::egui;

use crate::state::ReportState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ReportApp {
    pub state: ReportState,
}

impl ReportApp {
    pub fn new(state: ReportState) -> Self {
        Self { state }
    }
}

impl eframe::App for ReportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: test metrics ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: run summary ----
        egui::SidePanel::left("summary_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Central panel: curves ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::training_curves(ui, &self.state);
        });
    }
}
