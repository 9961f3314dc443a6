//! Fixed texts sent to subscribers.

use crate::types::ChapterRelease;

/// Reply to `/start`, sent before the subscription is stored.
pub const WELCOME: &str = "Started watching for new chapters for you. \
You will be notified when a new chapter is out.";

/// `"<series> <chapterToken> is out at <url>"`
pub fn release(series: &str, release: &ChapterRelease) -> String {
    format!(
        "{series} {} is out at {}",
        release.chapter_token(),
        release.url
    )
}

/// Informational follow-up to `/start` pointing at the last known chapter.
pub fn latest_chapter(series: &str, url: &str) -> String {
    format!("Meanwhile you can read the latest chapter of {series} at {url}")
}
