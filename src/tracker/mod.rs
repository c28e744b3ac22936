//! Frame-ingestion adapter between a streaming collaborator and the
//! marker registry.
//!
//! A [`Tracker`] is an owned value; nothing here is process-global. Frames
//! are handled strictly one at a time, callback included, so the histories
//! it owns need no locking.

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::source::{Component, Frame, FrameConnection, FrameSource};
use crate::tracking::{MarkerRegistry, TrackingError};

pub mod config;

pub use config::TrackerConfig;

/// Called after every ingested frame. Returning `false` stops the tracker.
pub type FrameCallback = Box<dyn FnMut(&Tracker) -> bool + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Running,
    /// Terminal. A stopped tracker never ingests again.
    Stopped,
}

/// Cloneable handle that stops a tracker from outside its frame loop, e.g.
/// from a Ctrl-C listener.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    /// Idempotent.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the tracker has been stopped.
    pub async fn stopped(&self) {
        self.token.cancelled().await
    }
}

/// Result of ingesting one frame.
#[derive(Debug)]
pub struct FrameOutcome {
    /// Frame number after this frame was counted (1-based).
    pub frame: u64,
    /// `MissingMarkerInFrame` for every configured marker absent from the frame.
    pub skipped: Vec<TrackingError>,
    /// False when the callback (or anyone else) stopped the tracker.
    pub keep_running: bool,
}

pub struct Tracker {
    config: TrackerConfig,
    markers: MarkerRegistry,
    frame_count: u64,
    callback: Option<FrameCallback>,
    state: TrackerState,
    stop_handle: StopHandle,
}

impl Tracker {
    /// Returns `Err(TrackingError::InvalidConfiguration)` if `config` fails validation.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackingError> {
        config.validate()?;
        let markers = MarkerRegistry::new(
            config.marker_identifiers.iter().copied(),
            config.history_capacity,
            config.labels.as_slice(),
        )?;

        Ok(Self {
            config,
            markers,
            frame_count: 0,
            callback: None,
            state: TrackerState::Idle,
            stop_handle: StopHandle::default(),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn state(&self) -> TrackerState {
        if self.stop_handle.is_stopped() {
            TrackerState::Stopped
        } else {
            self.state
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == TrackerState::Stopped
    }

    /// Replaces any previously registered callback.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Tracker) -> bool + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Stops ingestion. Idempotent; safe to call from inside the callback.
    pub fn stop(&self) {
        if !self.stop_handle.is_stopped() {
            log::info!("tracker stopping after {} frames", self.frame_count);
        }
        self.stop_handle.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    /// Routes one decoded frame into the marker histories.
    ///
    /// Every configured marker missing from `frame` is skipped and reported
    /// in the outcome; the rest are still recorded and the frame is still
    /// counted. Returns `Err(TrackingError::TrackerStopped)` once stopped.
    pub fn on_frame(&mut self, frame: &Frame) -> Result<FrameOutcome, TrackingError> {
        if self.is_stopped() {
            return Err(TrackingError::TrackerStopped);
        }
        if self.state == TrackerState::Idle {
            self.state = TrackerState::Running;
        }

        self.frame_count += 1;
        let frame_no = self.frame_count;

        let mut skipped = Vec::new();
        for history in self.markers.iter_mut() {
            match frame.get(history.id()) {
                Some(point) => history.insert(point),
                None => {
                    let err = TrackingError::MissingMarkerInFrame {
                        marker: history.id(),
                        frame: frame_no,
                    };
                    log::warn!("{}", err);
                    skipped.push(err);
                }
            }
        }

        // Taken out for the call so the callback can borrow the whole tracker.
        if let Some(mut callback) = self.callback.take() {
            let keep_going = callback(self);
            self.callback = Some(callback);
            if !keep_going {
                self.stop();
            }
        }

        Ok(FrameOutcome {
            frame: frame_no,
            skipped,
            keep_running: !self.is_stopped(),
        })
    }

    /// Connects through `source` and ingests frames until stopped or the
    /// stream ends. Blocks the calling thread on a current-thread runtime.
    ///
    /// Panics if called from inside an async runtime (tokio refuses to start
    /// one runtime within another); async callers use
    /// [`run_async`](Self::run_async) instead.
    pub fn run<S: FrameSource>(&mut self, source: &mut S) -> Result<(), TrackingError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TrackingError::Stream(anyhow::Error::new(e).context("building runtime")))?;

        runtime.block_on(self.run_async(source))
    }

    /// Async body of [`run`](Self::run) for callers that already own a runtime.
    ///
    /// A failed connect returns `Err(TrackingError::ConnectionFailed)`. However
    /// the session ends, the tracker is stopped afterwards.
    pub async fn run_async<S: FrameSource>(&mut self, source: &mut S) -> Result<(), TrackingError> {
        if self.is_stopped() {
            return Err(TrackingError::TrackerStopped);
        }
        self.frame_count = 0;

        let address = self.config.server_address.clone();
        log::debug!("connecting to {}", address);
        let Some(mut connection) = source.connect(&address).await else {
            log::error!("could not connect to {}", address);
            self.stop();
            return Err(TrackingError::ConnectionFailed(address));
        };

        self.state = TrackerState::Running;
        let result = self.pump(&mut connection).await;
        connection.disconnect().await;
        self.stop();
        result
    }

    async fn pump<C: FrameConnection>(&mut self, connection: &mut C) -> Result<(), TrackingError> {
        connection.stream_frames(&[Component::ThreeD]).await?;

        let stop = self.stop_handle.clone();
        loop {
            let next = tokio::select! {
                biased;
                _ = stop.stopped() => break,
                next = connection.next_frame() => next,
            };

            match next {
                None => {
                    log::info!("stream ended after {} frames", self.frame_count);
                    break;
                }
                Some(Err(e)) => return Err(TrackingError::Stream(e)),
                Some(Ok(frame)) => match self.on_frame(&frame) {
                    Ok(_) | Err(TrackingError::TrackerStopped) => {}
                    Err(e) => return Err(e),
                },
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("config", &self.config)
            .field("markers", &self.markers)
            .field("frame_count", &self.frame_count)
            .field("state", &self.state())
            .finish()
    }
}
