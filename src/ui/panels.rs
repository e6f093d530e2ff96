use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::ReportState;

// ---------------------------------------------------------------------------
// Left side panel – run summary
// ---------------------------------------------------------------------------

/// Render the shapes and settings printed during the run.
pub fn side_panel(ui: &mut Ui, state: &ReportState) {
    ui.heading("Run");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for line in &state.summary {
                ui.label(RichText::new(line).monospace());
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the test metrics bar.
pub fn top_bar(ui: &mut Ui, state: &ReportState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(format!("{} epochs", state.epochs()));

        ui.separator();

        ui.label(RichText::new(format!("test loss: {:.4}", state.test.loss)).strong());
        ui.label(RichText::new(format!("test accuracy: {:.4}", state.test.accuracy)).strong());
    });
}
