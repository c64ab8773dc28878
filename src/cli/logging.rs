// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Console output for the `pose-action` commands.
//!
//! Prediction lines and the final accuracy go to stdout so a run can be
//! piped into a file of `<file> is <label>` lines. Skipped images, skipped
//! frames and load failures go to stderr. Per-class progress and section
//! headers are silenced by `--verbose false`.

use std::sync::atomic::{AtomicBool, Ordering};

/// Set from `--verbose`; progress output is on until a command turns it off.
static VERBOSE: AtomicBool = AtomicBool::new(true);

/// Enable or disable progress output for the rest of the run.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Whether `verbose!` and `section!` print.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Print one result line, such as `run_01.jpg is run`, to stdout.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("{}", format!($($arg)*));
    }
}

/// Print a non-fatal diagnostic to stderr.
///
/// Used for `Skipped <item>. <reason>` lines, classes without a usable image
/// and file names whose prefix is not a known class.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
    }}
}

/// Print the failure that ends a command to stderr.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), format!($($arg)*));
    }}
}

/// Print a command's closing summary, such as the accuracy, to stdout.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        println!("{} {}", "✅".green(), format!($($arg)*));
    }}
}

/// Print progress such as `Preprocessing <class>` when verbose output is on.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::cli::logging::is_verbose() {
            println!("{}", format!($($arg)*));
        }
    }
}

/// Print a blank line and a colored header (`Predictions`, `Messages`)
/// when verbose output is on.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::cli::logging::is_verbose() {
            println!();
            println!("{}", format!($($arg)*).cyan().bold());
        }
    }}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_output_follows_verbose_flag() {
        set_verbose(false);
        assert!(!is_verbose());
        crate::verbose!("Preprocessing {}", "run");
        crate::section!("Predictions");

        set_verbose(true);
        assert!(is_verbose());
    }
}
