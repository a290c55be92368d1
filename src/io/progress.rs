//! Progress display for point generation and animation frames

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;
use std::time::Duration;

/// What a progress bar counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUnit {
    /// Orbit points plotted into a still image
    Points,
    /// Rendered animation frames
    Frames,
}

static POINTS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] \
             {{human_pos}}/{{human_len}} points ({{eta}})"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static FRAMES_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] {{prefix}} \
             [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} frames"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Coordinates the bars of one command run
///
/// A hidden manager accepts every call and draws nothing.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    bar: Option<ProgressBar>,
    label: String,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Manager drawing to stderr
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            bar: None,
            label: String::new(),
        }
    }

    /// Manager that draws nothing
    pub fn hidden() -> Self {
        Self {
            multi_progress: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            bar: None,
            label: String::new(),
        }
    }

    /// Replace the current bar with one counting `total` units
    pub fn start(&mut self, label: &str, total: u64, unit: ProgressUnit) {
        if let Some(previous) = self.bar.take() {
            previous.finish_and_clear();
        }
        let bar = ProgressBar::new(total);
        bar.set_style(match unit {
            ProgressUnit::Points => POINTS_STYLE.clone(),
            ProgressUnit::Frames => FRAMES_STYLE.clone(),
        });
        bar.set_prefix(label.to_string());
        self.label = label.to_string();
        self.bar = Some(self.multi_progress.add(bar));
    }

    /// Move the current bar forward by `amount`
    pub fn advance(&self, amount: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(amount);
        }
    }

    /// Set the current bar's absolute position
    pub fn set_position(&self, position: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(position);
        }
    }

    /// Position of the current bar
    pub fn position(&self) -> Option<u64> {
        self.bar.as_ref().map(ProgressBar::position)
    }

    /// Fill the current bar and mark it done
    pub fn complete(&mut self, elapsed: Duration) {
        if let Some(bar) = &self.bar {
            if let Some(length) = bar.length() {
                bar.set_position(length);
            }
            bar.set_prefix(format!("✓ {} in {:.1}s", self.label, elapsed.as_secs_f64()));
            bar.finish();
        }
    }

    /// Remove every bar from the terminal
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        let _ = self.multi_progress.clear();
    }
}
