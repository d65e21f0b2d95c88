//! Progress bar display for asset downloads

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Byte progress for a single download, drawn on stderr
pub struct DownloadProgress {
    pb: ProgressBar,
}

impl DownloadProgress {
    /// Create a bar for `name`; an unknown length shows a spinner instead
    pub fn new(name: &str, len: Option<u64>, visible: bool) -> Self {
        let pb = match len {
            Some(len) => {
                let pb = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("[{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                {
                    pb.set_style(style.progress_chars("#>-"));
                }
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                if let Ok(style) =
                    ProgressStyle::default_spinner().template("{spinner} {bytes} {msg}")
                {
                    pb.set_style(style);
                }
                pb
            }
        };
        if !visible {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_message(name.to_string());
        Self { pb }
    }

    pub fn inc(&self, bytes: u64) {
        self.pb.inc(bytes);
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.pb.abandon();
    }
}
