// src/version.rs
//!
//! Coordination between document edits and asynchronous layout passes.
//!
//! Every edit bumps the [`DocumentVersion`] and publishes an
//! [`LayoutEvent::Invalidated`]; every finished layout pass publishes a
//! [`LayoutEvent::Ready`] tagged with the version it was computed against.
//! The [`VersionTracker`] reduces those events:
//!
//! ```text
//! edit ──Invalidated(v)──┐
//!                        ├──> LayoutEventBus ──drain──> VersionTracker
//! worker ──Ready(v')─────┘
//! ```
//!
//! Positional data from a pass is only trustworthy while the tracker is not
//! stale. A pass that completes after a newer one is discarded.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Monotonic counter of document edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentVersion(u64);

impl DocumentVersion {
    pub fn new(version: u64) -> Self {
        Self(version)
    }

    /// Advances to the next version and returns it.
    pub fn bump(&mut self) -> DocumentVersion {
        self.0 = self.0.saturating_add(1);
        *self
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent {
    /// The document changed; layouts older than `version` are stale.
    Invalidated { version: DocumentVersion, at: Instant },
    /// A layout pass computed against `version` completed.
    Ready { version: DocumentVersion, at: Instant },
}

impl LayoutEvent {
    pub fn invalidated(version: DocumentVersion) -> Self {
        LayoutEvent::Invalidated {
            version,
            at: Instant::now(),
        }
    }

    pub fn ready(version: DocumentVersion) -> Self {
        LayoutEvent::Ready {
            version,
            at: Instant::now(),
        }
    }

    pub fn version(&self) -> DocumentVersion {
        match self {
            LayoutEvent::Invalidated { version, .. } | LayoutEvent::Ready { version, .. } => {
                *version
            }
        }
    }
}

/// Reducer over [`LayoutEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct VersionTracker {
    current_version: DocumentVersion,
    latest_layout_version: DocumentVersion,
    /// Edits not yet covered by an accepted layout, with their time.
    pending: BTreeMap<DocumentVersion, Instant>,
}

impl VersionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the tracker. Returns `false` when the event was
    /// discarded: a completion older than the latest accepted one, or an
    /// invalidation that does not advance the current version.
    pub fn apply(&mut self, event: LayoutEvent) -> bool {
        match event {
            LayoutEvent::Invalidated { version, at } => {
                if version <= self.current_version {
                    return false;
                }
                self.current_version = version;
                if version > self.latest_layout_version {
                    self.pending.insert(version, at);
                }
                true
            }
            LayoutEvent::Ready { version, .. } => {
                if version < self.latest_layout_version {
                    log::debug!(
                        "Discarding layout for {} (latest accepted is {})",
                        version,
                        self.latest_layout_version
                    );
                    return false;
                }
                self.latest_layout_version = version;
                if version > self.current_version {
                    self.current_version = version;
                }
                self.pending = self.pending.split_off(&DocumentVersion(version.0.saturating_add(1)));
                true
            }
        }
    }

    /// `latest_layout_version < current_version`.
    pub fn is_stale(&self) -> bool {
        self.latest_layout_version < self.current_version
    }

    /// When the oldest edit not reflected in the accepted layout happened.
    pub fn stale_since(&self) -> Option<Instant> {
        if !self.is_stale() {
            return None;
        }
        self.pending.values().next().copied()
    }

    /// How long positional data has been stale as of `now`; `None` when fresh.
    pub fn staleness(&self, now: Instant) -> Option<Duration> {
        self.stale_since()
            .map(|since| now.saturating_duration_since(since))
    }

    pub fn current_version(&self) -> DocumentVersion {
        self.current_version
    }

    pub fn latest_layout_version(&self) -> DocumentVersion {
        self.latest_layout_version
    }
}

/// Sender half handed to editors and layout workers.
pub type LayoutEventSender = async_channel::Sender<LayoutEvent>;

/// Receiver half drained by the tracker's owner.
pub type LayoutEventReceiver = async_channel::Receiver<LayoutEvent>;

/// Unbounded event queue between edits, layout workers, and the tracker.
///
/// Publishing never blocks; the owner drains pending events whenever it needs
/// an up-to-date view of staleness.
#[derive(Debug, Clone)]
pub struct LayoutEventBus {
    tx: LayoutEventSender,
    rx: LayoutEventReceiver,
}

impl Default for LayoutEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEventBus {
    pub fn new() -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> LayoutEventSender {
        self.tx.clone()
    }

    pub fn publish(&self, event: LayoutEvent) {
        if let Err(e) = self.tx.try_send(event) {
            log::warn!("Dropping layout event {:?}: channel closed", e.into_inner());
        }
    }

    /// Applies every pending event to `tracker`. Returns how many were accepted.
    pub fn drain_into(&self, tracker: &mut VersionTracker) -> usize {
        let mut accepted = 0;
        while let Ok(event) = self.rx.try_recv() {
            if tracker.apply(event) {
                accepted += 1;
            }
        }
        accepted
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
