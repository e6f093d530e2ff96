use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints};

use crate::state::{Curve, ReportState};

// ---------------------------------------------------------------------------
// Training curves (central panel)
// ---------------------------------------------------------------------------

/// Accuracy on top, loss below, each training vs validation.
pub fn training_curves(ui: &mut Ui, state: &ReportState) {
    if state.epochs() == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No epochs were run");
        });
        return;
    }

    let height = (ui.available_height() / 2.0 - 40.0).max(120.0);

    ui.heading("Training and validation accuracy");
    curve_plot(
        ui,
        "accuracy_plot",
        "Accuracy",
        height,
        [
            ("Training acc", &state.acc, state.colors.training, true),
            ("Validation acc", &state.val_acc, state.colors.validation, false),
        ],
    );

    ui.separator();

    ui.heading("Training and validation loss");
    curve_plot(
        ui,
        "loss_plot",
        "Loss",
        height,
        [
            ("Training loss", &state.loss, state.colors.training, true),
            ("Validation loss", &state.val_loss, state.colors.validation, false),
        ],
    );
}

/// One plot with a dashed training series and a solid validation series.
fn curve_plot(
    ui: &mut Ui,
    id: &str,
    y_label: &str,
    height: f32,
    series: [(&str, &Curve, Color32, bool); 2],
) {
    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("Epochs")
        .y_axis_label(y_label)
        .height(height)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (name, curve, color, dashed) in series {
                if curve.is_empty() {
                    continue;
                }
                let points: PlotPoints = curve.iter().copied().collect();
                let style = if dashed {
                    LineStyle::dashed_loose()
                } else {
                    LineStyle::Solid
                };

                let line = Line::new(points)
                    .name(name)
                    .color(color)
                    .style(style)
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}
