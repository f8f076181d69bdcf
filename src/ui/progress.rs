use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::dispatch::DispatchEvent;
use crate::output;

const PREVIEW_CHARS: usize = 40;

/// Progress bar on stderr, fed by dispatcher events.
///
/// Hidden in quiet mode. Clears itself when dropped.
#[derive(Clone)]
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if output::is_quiet() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn handle(&self, event: &DispatchEvent) {
        match event {
            DispatchEvent::Progress { done, status, .. } => {
                self.bar.set_position(*done as u64);
                self.bar.set_message(status.clone());
            }
            DispatchEvent::ItemReady { index, text } => {
                self.bar
                    .set_message(format!("#{} {}", index + 1, preview(text)));
            }
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}
