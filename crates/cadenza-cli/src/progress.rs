//! Terminal progress bars for batch operations.

use std::path::Path;

use cadenza_library::Progress;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{elapsed_precise} [{bar:40.cyan/blue}] {pos}/{len} {prefix} {wide_msg}";

/// One bar per batch, drawn on stderr. indicatif hides it when stderr is
/// not a terminal.
#[derive(Default)]
pub struct Bar {
    current: Option<ProgressBar>,
}

impl Progress for Bar {
    fn start(&mut self, operation: &str, total: usize) {
        let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
        if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_prefix(operation.to_string());
        self.current = Some(bar);
    }

    fn advance(&mut self, path: &Path) {
        if let Some(bar) = &self.current {
            if let Some(name) = path.file_name() {
                bar.set_message(name.to_string_lossy().into_owned());
            }
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.current.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_follows_batch() {
        let mut progress = Bar::default();
        progress.start("copy", 2);
        progress.advance(Path::new("/music/Artist - One.mp3"));

        let bar = progress.current.clone().unwrap();
        assert_eq!(bar.length(), Some(2));
        assert_eq!(bar.position(), 1);
        assert_eq!(bar.message(), "Artist - One.mp3");
        assert_eq!(bar.prefix(), "copy");

        progress.finish();
        assert!(progress.current.is_none());
        assert!(bar.is_finished());
    }
}
