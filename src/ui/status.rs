use std::sync::Mutex;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::llm::{AnalysisStatus, StatusSink};

/// Terminal spinner shown while a request is in flight.
#[derive(Default)]
pub struct SpinnerStatus {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the spinner if one is still running.
    pub fn clear(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(bar) = bar.take() {
                bar.finish_and_clear();
            }
        }
    }

    fn start(&self, message: String) {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.bar.lock() {
            if let Some(previous) = slot.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }
}

impl StatusSink for SpinnerStatus {
    fn update(&self, status: &AnalysisStatus) {
        match status {
            AnalysisStatus::Sending { model } => {
                self.start(format!("Enviando solicitud a {}...", model).green().bold().to_string());
            }
            AnalysisStatus::Completed { .. } => self.clear(),
        }
    }
}
