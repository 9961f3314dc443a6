use std::sync::Arc;
use std::time::Duration;

use chapterwatch_core::config::ScrapeConfig;
use chapterwatch_core::types::ChapterRelease;
use chapterwatch_store::ChapterStore;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::detect::ChapterDetector;
use crate::error::{HandoffError, PollError};
use crate::handoff::ReleaseSender;
use crate::source::PageSource;

/// Static poller parameters, usually taken from [`ScrapeConfig`].
#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub series_slug: String,
    /// Joined with the matched fragment; no trailing `/`.
    pub base_url: String,
    pub interval: Duration,
}

impl PollerSettings {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            series_slug: config.series_slug.clone(),
            base_url: config.base_url().to_string(),
            interval: config.interval(),
        }
    }
}

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The next chapter was found, handed off, and the pointer advanced.
    Released(ChapterRelease),
    /// Page fetched, next chapter not on it yet.
    NoRelease,
    /// Shutdown was requested mid-cycle; nothing was written.
    Cancelled,
}

/// Periodically checks the page for the chapter after the stored pointer.
pub struct Poller {
    chapters: Arc<dyn ChapterStore>,
    source: Arc<dyn PageSource>,
    releases: ReleaseSender,
    settings: PollerSettings,
}

impl Poller {
    pub fn new(
        chapters: Arc<dyn ChapterStore>,
        source: Arc<dyn PageSource>,
        releases: ReleaseSender,
        settings: PollerSettings,
    ) -> Self {
        Self {
            chapters,
            source,
            releases,
            settings,
        }
    }

    /// Main loop. Polls once immediately, then every `interval`, until
    /// `cancel` fires. Cycle errors are logged and never end the loop.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            interval_secs = self.settings.interval.as_secs(),
            slug = %self.settings.series_slug,
            "poller started"
        );

        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            match self.poll_once(&cancel).await {
                Ok(PollOutcome::Released(release)) => {
                    info!(chapter = release.chapter_number, url = %release.url, "new chapter released");
                }
                Ok(PollOutcome::NoRelease) => {}
                Ok(PollOutcome::Cancelled) => break,
                Err(e) => warn!(error = %e, "poll cycle failed, retrying next interval"),
            }
        }
        info!("poller stopped");
    }

    /// Run a single detection cycle.
    ///
    /// On a match the release is pushed to the broadcaster first and the
    /// pointer is advanced afterwards, so a cancelled push leaves the
    /// pointer where it was and the chapter is detected again next run.
    pub async fn poll_once(&self, cancel: &CancellationToken) -> Result<PollOutcome, PollError> {
        let pointer = self.chapters.get()?;
        let next = pointer
            .next_chapter()
            .ok_or(PollError::NoNextChapter(pointer.chapter_number))?;
        let detector = ChapterDetector::new(&self.settings.series_slug, next)?;

        if cancel.is_cancelled() {
            return Ok(PollOutcome::Cancelled);
        }
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
            body = self.source.fetch() => body?,
        };

        let Some(fragment) = detector.find(&body) else {
            debug!(chapter = detector.chapter_number(), "next chapter not out yet");
            return Ok(PollOutcome::NoRelease);
        };

        let release = ChapterRelease {
            chapter_number: detector.chapter_number(),
            url: format!("{}{}", self.settings.base_url, fragment),
        };

        match self.releases.send(release.clone(), cancel).await {
            Ok(()) => {}
            Err(HandoffError::Cancelled) => return Ok(PollOutcome::Cancelled),
            Err(e) => return Err(e.into()),
        }

        if !self.chapters.advance(pointer.chapter_number, &release.url)? {
            warn!(
                expected = pointer.chapter_number,
                "chapter pointer moved concurrently, advance skipped"
            );
        }
        Ok(PollOutcome::Released(release))
    }
}
