use std::collections::VecDeque;

use anyhow::anyhow;
use async_trait::async_trait;

use super::{Component, Frame, FrameConnection, FrameSource};

#[derive(Clone, Debug)]
enum Scripted {
    Frame(Frame),
    Error(String),
}

/// Scripted in-memory source. Plays back a fixed list of frames (and
/// optionally decode failures) and then ends the session.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    script: Vec<Scripted>,
    unreachable: bool,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            script: frames.into_iter().map(Scripted::Frame).collect(),
            unreachable: false,
        }
    }

    /// A source whose `connect` always fails.
    pub fn unreachable() -> Self {
        Self {
            script: Vec::new(),
            unreachable: true,
        }
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.script.push(Scripted::Frame(frame));
    }

    /// Makes the connection report a decode failure at this point.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.script.push(Scripted::Error(message.into()));
    }
}

#[async_trait]
impl FrameSource for MemorySource {
    type Connection = MemoryConnection;

    async fn connect(&mut self, server_address: &str) -> Option<MemoryConnection> {
        if self.unreachable {
            log::error!("memory source refusing connection to {}", server_address);
            return None;
        }

        Some(MemoryConnection {
            pending: self.script.iter().cloned().collect(),
            streaming: false,
        })
    }
}

pub struct MemoryConnection {
    pending: VecDeque<Scripted>,
    streaming: bool,
}

#[async_trait]
impl FrameConnection for MemoryConnection {
    async fn stream_frames(&mut self, components: &[Component]) -> anyhow::Result<()> {
        if !components.contains(&Component::ThreeD) {
            return Err(anyhow!("memory source only streams 3d markers"));
        }
        self.streaming = true;
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<anyhow::Result<Frame>> {
        if !self.streaming {
            return Some(Err(anyhow!("next_frame called before stream_frames")));
        }

        match self.pending.pop_front()? {
            Scripted::Frame(frame) => Some(Ok(frame)),
            Scripted::Error(message) => Some(Err(anyhow!(message))),
        }
    }
}
