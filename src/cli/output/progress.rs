//! Spinner helpers for long-running CLI operations, built on indicatif.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate operations.
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .expect("Invalid spinner template")
            .tick_chars(SPINNER_CHARS),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Create a spinner with an initial message.
pub fn create_spinner_with_message(message: impl Into<String>) -> ProgressBar {
    let spinner = create_spinner();
    spinner.set_message(message.into());
    spinner
}
