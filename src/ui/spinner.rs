use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: &[&str] = &["⠋", "⠙", "⠚", "⠞", "⠖", "⠦", "⠴", "⠲", "⠳", "⠓"];

/// Spinner shown while a session runs. Inert when stdout is not a terminal.
pub struct Spinner {
    pb: Option<ProgressBar>,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        if !atty::is(atty::Stream::Stdout) {
            return Self { pb: None };
        }

        let style = ProgressStyle::default_spinner()
            .tick_strings(TICKS)
            .template("{spinner} {wide_msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let pb = ProgressBar::new_spinner().with_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { pb: Some(pb) }
    }

    /// Prints a line above the spinner without tearing it.
    pub fn println(&self, message: &str) {
        match &self.pb {
            Some(pb) => pb.println(message),
            None => println!("{}", message),
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(pb) = &self.pb {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}
