// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::Path;
use std::process;

use crate::cli::args::{ExtractArgs, InitClassifierArgs};
use crate::cli::predict::pipeline_config;
use crate::{ClassCatalog, MlpClassifier, MoveNet, PoseExtractor, error, success, verbose, warn};

/// Extract a labeled dataset into a landmark table.
pub fn run_extract(args: &ExtractArgs) {
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

    let detector = match MoveNet::load(&args.model, &config) {
        Ok(d) => d,
        Err(e) => {
            error!("Error loading model: {e}");
            process::exit(1);
        }
    };

    let mut extractor = PoseExtractor::new(detector, config);
    let result = match extractor.extract_labeled_dataset(Path::new(&args.source), Some(Path::new(&args.output))) {
        Ok(r) => r,
        Err(e) => {
            error!("Extraction failed: {e}");
            process::exit(1);
        }
    };

    for message in &result.messages {
        warn!("{message}");
    }

    if let Some(labels_out) = &args.labels_out {
        if let Err(e) = result.catalog.write(labels_out) {
            error!("{e}");
            process::exit(1);
        }
        verbose!("Labels saved to {labels_out}");
    }

    success!(
        "{} records from {} classes saved to {}",
        result.table.len(),
        result.catalog.len(),
        args.output
    );
}

/// Write a freshly initialized classifier for a label file.
pub fn run_init_classifier(args: &InitClassifierArgs) {
    let catalog = match ClassCatalog::read(&args.labels) {
        Ok(c) => c,
        Err(e) => {
            error!("Error loading labels: {e}");
            process::exit(1);
        }
    };

    let classifier = match MlpClassifier::build(catalog.len(), args.seed) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    if let Err(e) = classifier.save(&args.output) {
        error!("{e}");
        process::exit(1);
    }

    success!(
        "Classifier for {} classes ({catalog}) saved to {}",
        catalog.len(),
        args.output
    );
}
