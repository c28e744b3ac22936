//! Per-marker position tracking for 3D motion-capture streams.
//!
//! - [`tracking`]: fixed-capacity position histories and the marker registry.
//! - [`source`]: the seam to whatever connects to the capture server and
//!   decodes its frames.
//! - [`tracker`]: routes decoded frames into the registry and drives the
//!   per-frame callback.

pub mod source;
pub mod tracker;
pub mod tracking;

pub use source::{Component, Frame, FrameConnection, FrameSource};
pub use tracker::{FrameOutcome, StopHandle, Tracker, TrackerConfig, TrackerState};
pub use tracking::{
    FillState, MarkerId, MarkerRegistry, Point3, PositionHistory, TrackingError, DEFAULT_LABEL,
};
