mod app;
mod color;
mod config;
mod data;
mod error;
mod nn;
mod report;
mod state;
mod ui;

use anyhow::{Context, Result, anyhow};
use app::ReportApp;
use config::ExperimentConfig;
use data::assemble::{build_dataset, train_test_split};
use data::loader::{load_cepstral, load_spectrograms};
use data::model::{GroupKey, VoiceClass};
use eframe::egui;
use nn::classifier::LstmClassifier;
use nn::optimizer::RmsProp;
use state::ReportState;

fn main() -> Result<()> {
    env_logger::init();

    let config = ExperimentConfig::default();
    log::info!("config: {}", serde_json::to_string(&config)?);

    // ---- Load precomputed features ----
    let spectrograms = load_spectrograms(&config.data.dir)?;
    for (name, shape) in spectrograms.shapes() {
        log::info!("{name}: {shape:?}");
    }
    let cepstral = load_cepstral(&config.data.dir)?;
    let mut summary = report::feature_shapes(&cepstral);

    // ---- Assemble and split ----
    let features = if config.data.features == data::model::FeatureKind::Spectrogram {
        &spectrograms
    } else {
        &cepstral
    };
    let group = |class| GroupKey::new(config.data.features, class, config.data.condition);
    let normal = features.require(group(VoiceClass::Normal))?;
    let abnormal = features.require(group(VoiceClass::Abnormal))?;

    let dataset = build_dataset(normal, abnormal, config.data.width)
        .context("assembling dataset")?;
    let split = train_test_split(
        &dataset,
        config.data.test_fraction,
        config.data.split_seed,
        true,
    )
    .context("splitting dataset")?;
    summary.extend(report::split_shapes(&split));

    // ---- Build, compile, train ----
    let (_, steps, width) = split.x_train.dim();
    let model = LstmClassifier::new(steps, width, &config.model);
    log::info!("model has {} trainable parameters", model.parameter_count());
    let mut model = model.compile(RmsProp::new(config.optimizer));

    let epochs = config.fit.epochs;
    let history = model
        .fit(&split.x_train, &split.y_train, &config.fit, |epoch, metrics| {
            report::epoch(epoch, epochs, metrics)
        })
        .context("training")?;

    // ---- Evaluate ----
    let results = model
        .evaluate(&split.x_test, &split.y_test)
        .context("evaluating on the test partition")?;
    summary.extend(report::test_metrics(&results));

    // ---- Plot ----
    let state = ReportState::new(&history, results, summary);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "vocal-screen – training curves",
        options,
        Box::new(|_cc| Ok(Box::new(ReportApp::new(state)))),
    )
    .map_err(|e| anyhow!("rendering training curves: {e}"))
}
