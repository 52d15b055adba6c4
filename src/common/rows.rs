use log::{info, warn};

/// Longest row error message that is logged.
const MAX_MESSAGE_CHARS: usize = 100;

/// Counts per-row failures; logs only the first few.
#[derive(Debug, Clone)]
pub(crate) struct RowErrors {
    tag: &'static str,
    max_logged: usize,
    count: usize,
}

impl RowErrors {
    pub(crate) fn new(tag: &'static str, max_logged: usize) -> Self {
        Self { tag, max_logged, count: 0 }
    }

    /// Record a failure on the zero-based row `index`.
    pub(crate) fn record(&mut self, index: usize, error: &anyhow::Error) {
        self.count += 1;
        if self.count <= self.max_logged {
            warn!("[{}] error on row {}: {}", self.tag, index + 1, truncate(&format!("{error:#}"), MAX_MESSAGE_CHARS));
        }
    }

    #[inline] pub(crate) fn count(&self) -> usize { self.count }
}

/// Log progress every `every` rows (0 disables it).
pub(crate) fn report_progress(tag: &str, index: usize, total: usize, every: usize) {
    if every > 0 && (index + 1) % every == 0 {
        info!("[{tag}] processed {}/{} rows", index + 1, total);
    }
}

/// First `max_chars` characters of `text`.
pub(crate) fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
