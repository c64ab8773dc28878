// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! `pose-action` command-line entry point.

use clap::Parser;

use pose_action::cli::args::{Cli, Commands};
use pose_action::cli::extract::{run_extract, run_init_classifier};
use pose_action::cli::logging::set_verbose;
use pose_action::cli::predict::run_predict;

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Predict(args) => {
            set_verbose(args.verbose);
            run_predict(args);
        }
        Commands::Extract(args) => {
            set_verbose(args.verbose);
            run_extract(args);
        }
        Commands::InitClassifier(args) => run_init_classifier(args),
    }
}
