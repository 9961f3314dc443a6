use std::sync::Arc;

use chapterwatch_core::messages;
use chapterwatch_core::types::{ChapterRelease, ChatId};
use chapterwatch_store::{StoreError, SubscriberRegistry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::handoff::ReleaseReceiver;
use crate::outbound::Outbound;

/// Who got a release and who did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<ChatId>,
    pub failed: Vec<ChatId>,
}

/// Fans each release out to every subscriber, best effort.
pub struct Broadcaster {
    registry: Arc<dyn SubscriberRegistry>,
    outbound: Arc<dyn Outbound>,
    series_name: String,
}

impl Broadcaster {
    pub fn new(
        registry: Arc<dyn SubscriberRegistry>,
        outbound: Arc<dyn Outbound>,
        series_name: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            outbound,
            series_name: series_name.into(),
        }
    }

    /// Drain the handoff until shutdown or until the poller goes away.
    pub async fn run(self, mut releases: ReleaseReceiver, cancel: CancellationToken) {
        info!("broadcaster started");
        while let Some(release) = releases.recv(&cancel).await {
            match self.deliver(&release).await {
                Ok(report) => info!(
                    chapter = release.chapter_number,
                    delivered = report.delivered.len(),
                    failed = report.failed.len(),
                    "release broadcast finished"
                ),
                Err(e) => error!(
                    chapter = release.chapter_number,
                    error = %e,
                    "could not read subscribers, release not broadcast"
                ),
            }
        }
        info!("broadcaster stopped");
    }

    /// Send `release` to a snapshot of the current subscribers.
    ///
    /// A failed send is logged and recorded in the report; it never stops
    /// delivery to the remaining chats. Only a registry failure is an error.
    pub async fn deliver(&self, release: &ChapterRelease) -> Result<DeliveryReport, StoreError> {
        let subscribers = self.registry.list()?;
        let text = messages::release(&self.series_name, release);

        let mut report = DeliveryReport::default();
        for chat_id in subscribers {
            match self.outbound.send(chat_id, &text).await {
                Ok(()) => report.delivered.push(chat_id),
                Err(e) => {
                    warn!(chat_id = %chat_id, error = %e, "release delivery failed");
                    report.failed.push(chat_id);
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::handoff;
    use crate::testing::{FakeRegistry, RecordingOutbound};
    use std::time::Duration;
    use tokio::time::timeout;

    const A: ChatId = ChatId(1);
    const B: ChatId = ChatId(2);
    const C: ChatId = ChatId(3);

    fn release() -> ChapterRelease {
        ChapterRelease {
            chapter_number: 1099,
            url: "https://example.com/chapters/2/one-piece-chapter-1099".to_string(),
        }
    }

    #[tokio::test]
    async fn one_failed_chat_does_not_block_the_rest() {
        let outbound = Arc::new(RecordingOutbound::failing_for([B]));
        let b = Broadcaster::new(
            Arc::new(FakeRegistry::with_members([A, B, C])),
            outbound.clone(),
            "One Piece",
        );

        let report = b.deliver(&release()).await.unwrap();

        assert_eq!(report.delivered, vec![A, C]);
        assert_eq!(report.failed, vec![B]);
        let text =
            "One Piece 1099 is out at https://example.com/chapters/2/one-piece-chapter-1099";
        assert_eq!(
            outbound.sent(),
            vec![(A, text.to_string()), (C, text.to_string())]
        );
    }

    #[tokio::test]
    async fn registry_failure_aborts_the_cycle() {
        let outbound = Arc::new(RecordingOutbound::default());
        let registry = FakeRegistry {
            unavailable: true,
            ..FakeRegistry::with_members([A])
        };
        let b = Broadcaster::new(Arc::new(registry), outbound.clone(), "One Piece");

        assert!(b.deliver(&release()).await.is_err());
        assert!(outbound.sent().is_empty());
    }

    #[tokio::test]
    async fn no_subscribers_is_an_empty_report() {
        let b = Broadcaster::new(
            Arc::new(FakeRegistry::default()),
            Arc::new(RecordingOutbound::default()),
            "One Piece",
        );
        assert_eq!(b.deliver(&release()).await.unwrap(), DeliveryReport::default());
    }

    #[tokio::test]
    async fn run_delivers_handed_off_releases() {
        let outbound = Arc::new(RecordingOutbound::default());
        let b = Broadcaster::new(
            Arc::new(FakeRegistry::with_members([A, B])),
            outbound.clone(),
            "One Piece",
        );
        let (tx, rx) = handoff();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(b.run(rx, cancel.clone()));

        tx.send(release(), &cancel).await.unwrap();
        drop(tx);

        // Sender dropped: the loop ends after draining.
        timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
        assert_eq!(outbound.sent().len(), 2);
    }

    #[tokio::test]
    async fn run_stops_on_cancel_with_empty_handoff() {
        let b = Broadcaster::new(
            Arc::new(FakeRegistry::default()),
            Arc::new(RecordingOutbound::default()),
            "One Piece",
        );
        let (_tx, rx) = handoff();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(b.run(rx, cancel.clone()));

        cancel.cancel();
        timeout(Duration::from_secs(1), handle)
            .await
            .expect("broadcaster blocked on an empty handoff")
            .unwrap();
    }
}
