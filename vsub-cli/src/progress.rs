use indicatif::{ProgressBar, ProgressStyle};

/// Resolution of the fraction-based bar.
const SCALE: u64 = 1000;

fn download_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg}\n[{elapsed_precise}] [{bar:40.green/white}] {percent}% (eta {eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Progress bar for one episode, fed with completed fractions.
pub struct EpisodeProgress {
    bar: ProgressBar,
}

impl EpisodeProgress {
    pub fn new(message: String, hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(SCALE)
        };
        bar.set_style(download_style());
        bar.set_message(message);
        Self { bar }
    }

    pub fn set_fraction(&self, fraction: f64) {
        self.bar
            .set_position((fraction.clamp(0.0, 1.0) * SCALE as f64).round() as u64);
    }

    pub fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }

    pub fn abandon(&self, message: String) {
        self.bar.abandon_with_message(message);
    }
}
