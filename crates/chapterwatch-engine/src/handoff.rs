//! Single-slot handoff from the poller to the broadcaster.
//!
//! Backed by an mpsc channel of capacity 1: one release may wait in the
//! slot, and the next `send` waits until the broadcaster has taken it.
//! Both ends race the shutdown token so neither can hang on shutdown.

use chapterwatch_core::types::ChapterRelease;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::HandoffError;

pub fn handoff() -> (ReleaseSender, ReleaseReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (ReleaseSender { tx }, ReleaseReceiver { rx })
}

/// Poller side of the handoff.
pub struct ReleaseSender {
    tx: mpsc::Sender<ChapterRelease>,
}

impl ReleaseSender {
    /// Wait for the slot to free up, then place `release` in it.
    pub async fn send(
        &self,
        release: ChapterRelease,
        cancel: &CancellationToken,
    ) -> Result<(), HandoffError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(HandoffError::Cancelled),
            sent = self.tx.send(release) => sent.map_err(|_| HandoffError::Closed),
        }
    }
}

/// Broadcaster side of the handoff.
pub struct ReleaseReceiver {
    rx: mpsc::Receiver<ChapterRelease>,
}

impl ReleaseReceiver {
    /// Next release, or `None` once shutdown is requested or the poller is gone.
    pub async fn recv(&mut self, cancel: &CancellationToken) -> Option<ChapterRelease> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            release = self.rx.recv() => release,
        }
    }

    /// Take the queued release without waiting.
    pub fn try_recv(&mut self) -> Option<ChapterRelease> {
        self.rx.try_recv().ok()
    }
}
