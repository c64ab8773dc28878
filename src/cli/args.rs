// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

use crate::mode::PredictionMode;

/// Default MoveNet model path.
pub const DEFAULT_DETECTOR: &str = "movenet_thunder.onnx";

/// Default classifier artifact path.
pub const DEFAULT_CLASSIFIER: &str = "pose_classifier.json";

/// Default label file path.
pub const DEFAULT_LABELS: &str = "labels.txt";

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    pose-action predict --source clips/ --mode video --model movenet_thunder.onnx
    pose-action predict -s photos/ --classifier pose_classifier.onnx --labels labels.txt
    pose-action extract --source dataset/train --output train.csv --labels-out labels.txt
    pose-action init-classifier --labels labels.txt --output pose_classifier.json --seed 42"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify the action in every image or video of a folder
    Predict(PredictArgs),
    /// Extract a landmark table from a labeled dataset folder
    Extract(ExtractArgs),
    /// Write a freshly initialized classifier for a label file
    InitClassifier(InitClassifierArgs),
}

/// Arguments for the predict command.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Folder of images or videos; file names start with `<class>_`
    #[arg(short, long)]
    pub source: String,

    /// How files in the source folder are read (image or video)
    #[arg(long, default_value_t = PredictionMode::Image)]
    pub mode: PredictionMode,

    /// Path to the MoveNet ONNX model
    #[arg(short, long, default_value = DEFAULT_DETECTOR)]
    pub model: String,

    /// Classifier artifact (`.onnx` export or JSON weights)
    #[arg(short, long, default_value = DEFAULT_CLASSIFIER)]
    pub classifier: String,

    /// Label file with one class name per line
    #[arg(short, long, default_value = DEFAULT_LABELS)]
    pub labels: String,

    /// Minimum score every keypoint must reach
    #[arg(long, default_value_t = 0.3)]
    pub conf: f32,

    /// Detector passes per image
    #[arg(long, default_value_t = 3)]
    pub inference_count: usize,

    /// MoveNet input size (192 for lightning, 256 for thunder)
    #[arg(long, default_value_t = 256)]
    pub imgsz: u32,

    /// Feed the detector float32 pixels (float MoveNet exports)
    #[arg(long)]
    pub float_input: bool,

    /// Intra-op threads for ONNX Runtime (0 lets the runtime decide)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the extract command.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Dataset root with one subfolder per class
    #[arg(short, long)]
    pub source: String,

    /// Path to the MoveNet ONNX model
    #[arg(short, long, default_value = DEFAULT_DETECTOR)]
    pub model: String,

    /// Output landmark table
    #[arg(short, long, default_value = "landmarks.csv")]
    pub output: String,

    /// Write the class names to this label file
    #[arg(long)]
    pub labels_out: Option<String>,

    /// Minimum score every keypoint must reach
    #[arg(long, default_value_t = 0.3)]
    pub conf: f32,

    /// Detector passes per image
    #[arg(long, default_value_t = 3)]
    pub inference_count: usize,

    /// MoveNet input size (192 for lightning, 256 for thunder)
    #[arg(long, default_value_t = 256)]
    pub imgsz: u32,

    /// Feed the detector float32 pixels (float MoveNet exports)
    #[arg(long)]
    pub float_input: bool,

    /// Intra-op threads for ONNX Runtime (0 lets the runtime decide)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the init-classifier command.
#[derive(Args, Debug)]
pub struct InitClassifierArgs {
    /// Label file with one class name per line
    #[arg(short, long, default_value = DEFAULT_LABELS)]
    pub labels: String,

    /// Output JSON weights
    #[arg(short, long, default_value = DEFAULT_CLASSIFIER)]
    pub output: String,

    /// Seed for weight initialization
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}
