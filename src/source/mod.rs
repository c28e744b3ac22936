//! Seam to the streaming collaborator that connects to a motion-capture
//! server and decodes its packets into [`Frame`]s.
//!
//! The tracker only ever talks to these traits; wire protocols stay on the
//! far side of them.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::tracking::{MarkerId, Point3};

pub mod memory;
pub mod replay;

pub use memory::MemorySource;
pub use replay::ReplaySource;

/// Data components a connection can be asked to stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    /// Labelled or positional 3D marker coordinates.
    #[serde(rename = "3d")]
    ThreeD,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::ThreeD => write!(f, "3d"),
        }
    }
}

/// One decoded frame: every marker sample reported in a single snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    markers: HashMap<MarkerId, Point3>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys samples by their position in `points`, the way a server that
    /// reports an unlabelled marker list addresses them.
    pub fn from_positional<I, P>(points: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Point3>,
    {
        points
            .into_iter()
            .enumerate()
            .map(|(i, p)| (i as MarkerId, p.into()))
            .collect()
    }

    /// Adds or replaces the sample for `id`.
    pub fn insert(&mut self, id: MarkerId, point: impl Into<Point3>) {
        self.markers.insert(id, point.into());
    }

    pub fn get(&self, id: MarkerId) -> Option<Point3> {
        self.markers.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> &HashMap<MarkerId, Point3> {
        &self.markers
    }
}

impl<P: Into<Point3>> FromIterator<(MarkerId, P)> for Frame {
    fn from_iter<T: IntoIterator<Item = (MarkerId, P)>>(iter: T) -> Self {
        Self {
            markers: iter.into_iter().map(|(id, p)| (id, p.into())).collect(),
        }
    }
}

impl From<HashMap<MarkerId, Point3>> for Frame {
    fn from(markers: HashMap<MarkerId, Point3>) -> Self {
        Self { markers }
    }
}

/// Opens sessions against a motion-capture server.
#[async_trait]
pub trait FrameSource: Send {
    type Connection: FrameConnection;

    /// Returns `None` when no session could be established. Implementations
    /// log the underlying reason.
    async fn connect(&mut self, server_address: &str) -> Option<Self::Connection>;
}

/// An established session that yields decoded frames one at a time.
#[async_trait]
pub trait FrameConnection: Send {
    /// Asks the server to start sending `components`.
    async fn stream_frames(&mut self, components: &[Component]) -> anyhow::Result<()>;

    /// Next frame, `None` once the session has ended, or an error if a
    /// packet could not be read or decoded.
    async fn next_frame(&mut self) -> Option<anyhow::Result<Frame>>;

    /// Tears the session down. The default does nothing.
    async fn disconnect(&mut self) {}
}
