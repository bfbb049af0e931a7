use std::future::Future;
use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["-", "\\", "|", "/"])
            .template("{msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Run `fut` behind a spinner when attached to a terminal.
pub async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    if !std::io::stderr().is_terminal() {
        return fut.await;
    }

    let spinner = create_spinner(message.to_string());
    let output = fut.await;
    spinner.finish_and_clear();
    output
}

pub fn stdin_is_interactive() -> bool {
    std::io::stdin().is_terminal()
}
