use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::Error;

/// Shared multi-bar display. Drawn to stderr so the report and the phase log
/// stay clean on stdout.
#[derive(Clone)]
pub struct Progress {
    multi: MultiProgress,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::stderr()),
        }
    }

    /// Adds a labelled bar to the display. Descriptions are padded so the
    /// bars of different phases line up.
    pub fn add_bar(&self, total: u64, description: &str, emoji: &str) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new(total));
        bar.set_style(
            ProgressStyle::with_template("{msg} {bar:40} {percent:>3}% [{pos}/{len}]")
                .expect("bar template is well-formed"),
        );
        bar.set_message(format!("{description:<15}{emoji}"));
        bar
    }

    /// Wipes every bar off the terminal.
    pub fn clear(&self) {
        let _ = self.multi.clear();
    }

    /// Registers the Ctrl-C hook: tear the display down, then leave with a
    /// non-zero status. Call once at startup; in-flight work is abandoned.
    pub fn install_interrupt_handler(&self) {
        let display = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                display.clear();
                std::process::exit(1);
            }
        });
    }

    /// Top-level error exit: tear the display down, surface the error and
    /// terminate with a non-zero status.
    pub fn fail(&self, error: &Error) -> ! {
        self.clear();
        eprintln!("{error}");
        std::process::exit(1);
    }
}
