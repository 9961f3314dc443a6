//! `chapterwatch-engine`: the poll → deduplicate → broadcast pipeline.
//!
//! # Overview
//!
//! Three loops run side by side and share one `CancellationToken`:
//!
//! | Loop                                   | Driven by        | Does                                         |
//! |----------------------------------------|------------------|----------------------------------------------|
//! | [`Poller`](poller::Poller)             | fixed interval   | fetch page, detect next chapter, advance     |
//! | [`Broadcaster`](broadcaster::Broadcaster) | [`handoff`]   | fan a release out to every subscriber        |
//! | [`CommandDispatcher`](dispatcher::CommandDispatcher) | chat events | `/start`, `/stop`                 |
//!
//! The poller hands releases to the broadcaster through a single-slot
//! [`handoff`]. Stores, the page source and the outbound transport are
//! injected as trait objects.

pub mod broadcaster;
pub mod detect;
pub mod dispatcher;
pub mod error;
pub mod handoff;
pub mod outbound;
pub mod poller;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use broadcaster::{Broadcaster, DeliveryReport};
pub use detect::ChapterDetector;
pub use dispatcher::{Command, CommandDispatcher};
pub use error::{DeliveryError, FetchError, HandoffError, PollError};
pub use handoff::{handoff, ReleaseReceiver, ReleaseSender};
pub use outbound::Outbound;
pub use poller::{PollOutcome, Poller, PollerSettings};
pub use source::{HttpPageSource, PageSource};
