use thiserror::Error;

use super::MarkerId;

/// Errors that can occur while building or querying marker histories and
/// while feeding frames through a tracker.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Setup values that can never produce a working tracker (e.g. zero capacity).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A positional or derived query was made on a history with no points.
    #[error("PositionHistory is empty")]
    EmptyHistory,
    /// No history is registered for the given marker identifier.
    #[error("Unknown marker id={0}")]
    UnknownMarker(MarkerId),
    /// A registry position outside `[0, len)`, or a history slot that holds
    /// no point yet.
    #[error("Index {index} out of range (len={len})")]
    IndexOutOfRange { index: i64, len: usize },
    /// A configured marker had no sample in an incoming frame.
    #[error("Marker id={marker} missing from frame {frame}")]
    MissingMarkerInFrame { marker: MarkerId, frame: u64 },
    /// The streaming collaborator did not hand back a connection.
    #[error("Could not connect to {0}")]
    ConnectionFailed(String),
    /// A frame was offered to a tracker that has already stopped.
    #[error("Tracker is stopped")]
    TrackerStopped,
    /// The streaming collaborator failed mid-session.
    #[error("Stream error: {0}")]
    Stream(#[from] anyhow::Error),
}
