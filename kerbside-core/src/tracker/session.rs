//! Worker-thread session enforcing at most one resolution in flight.
//!
//! Fixes travel over a zero-capacity channel, so a send only succeeds while
//! the worker is parked waiting for input. Anything offered while a
//! resolution runs is handed back as [`FixDelivery::Dropped`].

use std::{
    io,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError},
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, warn};
use thiserror::Error;

use super::{LocationTracker, PositionFix, ResolutionEvent};
use crate::SpatialIndex;

/// What happened to an offered fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixDelivery {
    /// The idle worker took the fix.
    Accepted,
    /// The worker was busy; the fix was discarded.
    Dropped,
    /// The worker has stopped.
    Closed,
}

/// Errors raised while starting or stopping a session.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The operating system refused to start the worker thread.
    #[error("failed to spawn tracker worker: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },
    /// The worker thread panicked before returning its tracker.
    #[error("tracker worker panicked")]
    WorkerPanicked,
}

/// A [`LocationTracker`] running on its own thread.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use kerbside_core::{
///     Coordinate, FixDelivery, LocationTracker, NearestNodeResolver, PositionFix,
///     ResolutionEvent, TrackerSession, test_support::MemoryIndex,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tracker = LocationTracker::new(NearestNodeResolver::with_defaults(MemoryIndex::default()));
/// let session = TrackerSession::spawn(tracker)?;
/// let fix = PositionFix::new(Coordinate::new(43.0, -79.0)?);
/// while session.offer(fix) == FixDelivery::Dropped {
///     std::thread::yield_now();
/// }
/// let event = session.recv_event_timeout(Duration::from_secs(5));
/// assert_eq!(event, Some(ResolutionEvent::UnknownLocation));
/// session.shutdown()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TrackerSession<I> {
    feed: SyncSender<PositionFix>,
    events: Receiver<ResolutionEvent>,
    worker: JoinHandle<LocationTracker<I>>,
}

impl<I> TrackerSession<I>
where
    I: SpatialIndex + Send + 'static,
{
    /// Start a worker thread that owns `tracker`.
    pub fn spawn(tracker: LocationTracker<I>) -> Result<Self, TrackerError> {
        let (feed, fixes) = mpsc::sync_channel(0);
        let (event_sink, events) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("kerbside-tracker".into())
            .spawn(move || run(tracker, &fixes, &event_sink))
            .map_err(|source| TrackerError::Spawn { source })?;
        Ok(Self {
            feed,
            events,
            worker,
        })
    }

    /// Hand `fix` to the worker without blocking.
    pub fn offer(&self, fix: PositionFix) -> FixDelivery {
        match self.feed.try_send(fix) {
            Ok(()) => FixDelivery::Accepted,
            Err(TrySendError::Full(_)) => {
                debug!("tracker busy; dropping fix");
                FixDelivery::Dropped
            }
            Err(TrySendError::Disconnected(_)) => FixDelivery::Closed,
        }
    }

    /// Next event, if one is already waiting.
    pub fn try_next_event(&self) -> Option<ResolutionEvent> {
        self.events.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<ResolutionEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Close the feed, wait for the in-flight resolution and return the
    /// tracker with its final state.
    pub fn shutdown(self) -> Result<LocationTracker<I>, TrackerError> {
        let Self { feed, worker, .. } = self;
        drop(feed);
        worker.join().map_err(|_| TrackerError::WorkerPanicked)
    }
}

fn run<I: SpatialIndex>(
    mut tracker: LocationTracker<I>,
    fixes: &Receiver<PositionFix>,
    events: &Sender<ResolutionEvent>,
) -> LocationTracker<I> {
    for fix in fixes {
        if let Some(event) = tracker.handle_fix(&fix)
            && events.send(event).is_err()
        {
            warn!("tracker event receiver dropped; discarding event");
        }
    }
    debug!("tracker feed closed");
    tracker
}
