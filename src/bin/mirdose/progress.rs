/// Progress bar for building the DVHs of several structures
pub (super) struct Progress(ProgressBar);

impl Progress {

    pub (super) fn new(rois: &[String]) -> Self {
        let first = rois.first().cloned().unwrap_or_default();
        let bar = ProgressBar::new(rois.len() as u64).with_message(first);
        let style = ProgressStyle::default_bar()
            .template("DVH of: {msg}\n[{elapsed_precise}] {wide_bar} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.tick();
        Self(bar)
    }

    pub (super) fn roi_done(&self, roi: &str) {
        self.0.set_message(roi.to_string());
        self.0.inc(1);
    }

    pub (super) fn finish(&self) {
        self.0.finish_with_message("<finished>");
    }
}

// ----- Imports -----------------------------------------------------------------------------------------
use indicatif::{ProgressBar, ProgressStyle};
