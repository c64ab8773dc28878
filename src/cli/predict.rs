// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::Path;
use std::process;
use std::time::Instant;

use crate::classifier::load_classifier;
use crate::cli::args::PredictArgs;
use crate::{
    ClassCatalog, MoveNet, PipelineConfig, PredictionReport, VERSION, error, info, run_prediction,
    section, success, verbose, warn,
};

/// Build the pipeline configuration shared by the CLI commands.
pub(crate) const fn pipeline_config(
    conf: f32,
    inference_count: usize,
    imgsz: u32,
    float_input: bool,
    threads: usize,
) -> PipelineConfig {
    PipelineConfig {
        confidence_threshold: conf,
        inference_count,
        input_size: imgsz,
        int_input: !float_input,
        num_threads: threads,
    }
}

/// Run folder prediction.
pub fn run_predict(args: &PredictArgs) {
    let config = pipeline_config(
        args.conf,
        args.inference_count,
        args.imgsz,
        args.float_input,
        args.threads,
    );
    if let Err(e) = config.validate() {
        error!("{e}");
        process::exit(1);
    }

    let catalog = match ClassCatalog::read(&args.labels) {
        Ok(c) => c,
        Err(e) => {
            error!("Error loading labels: {e}");
            process::exit(1);
        }
    };

    let mut detector = match MoveNet::load(&args.model, &config) {
        Ok(d) => d,
        Err(e) => {
            error!("Error loading model: {e}");
            process::exit(1);
        }
    };

    let mut classifier = match load_classifier(&args.classifier, catalog.len(), config.num_threads) {
        Ok(c) => c,
        Err(e) => {
            error!("Error loading classifier: {e}");
            process::exit(1);
        }
    };

    println!("pose-action {VERSION} 🚀 Rust ONNX CPU");
    verbose!(
        "{} classes: {catalog}, mode={}, conf={}, inference_count={}",
        catalog.len(),
        args.mode,
        config.confidence_threshold,
        config.inference_count
    );

    let start = Instant::now();
    let report = match run_prediction(
        Path::new(&args.source),
        args.mode,
        &mut detector,
        &mut classifier,
        &catalog,
        &config,
    ) {
        Ok(r) => r,
        Err(e) => {
            error!("Prediction failed: {e}");
            process::exit(1);
        }
    };

    print_report(&report);
    verbose!("Done in {:.1}s", start.elapsed().as_secs_f64());
}

/// Print predictions, diagnostics and accuracy.
pub(crate) fn print_report(report: &PredictionReport) {
    section!("Predictions");
    for line in &report.lines {
        info!("{line}");
    }

    if !report.messages.is_empty() {
        section!("Messages");
        for message in &report.messages {
            warn!("{message}");
        }
    }

    success!("accuracy: {:.2}%", report.accuracy);
}
