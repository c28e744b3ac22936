// Replays a recorded session from a JSON-lines capture.
//
// Each non-blank line is one frame:
//   {"markers":[{"id":7,"x":1.0,"y":2.0,"z":3.0}, ...]}
// or, for servers that report an unlabelled list, positional triples:
//   {"markers":[[1.0,2.0,3.0], ...]}

use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

use super::{Component, Frame, FrameConnection, FrameSource};
use crate::tracking::{MarkerId, Point3};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MarkerSample {
    Labelled { id: MarkerId, x: f64, y: f64, z: f64 },
    Positional([f64; 3]),
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    markers: Vec<MarkerSample>,
}

impl FrameRecord {
    fn into_frame(self) -> Frame {
        self.markers
            .into_iter()
            .enumerate()
            .map(|(i, sample)| match sample {
                MarkerSample::Labelled { id, x, y, z } => (id, Point3::new(x, y, z)),
                MarkerSample::Positional(xyz) => (i as MarkerId, Point3::from(xyz)),
            })
            .collect()
    }
}

/// Decodes a single capture line into a frame.
pub fn parse_frame_line(line: &str) -> anyhow::Result<Frame> {
    let record: FrameRecord = serde_json::from_str(line)?;
    Ok(record.into_frame())
}

/// Source that treats the server address as the path of a JSON-lines capture.
#[derive(Clone, Debug, Default)]
pub struct ReplaySource {
    /// Time between frames; `None` replays as fast as the tracker consumes.
    period: Option<Duration>,
}

impl ReplaySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paces playback at `rate_hz` frames per second.
    ///
    /// Fails unless the rate gives a frame period that is non-zero and fits
    /// in a `Duration`.
    pub fn with_rate(rate_hz: f64) -> anyhow::Result<Self> {
        if !(rate_hz.is_finite() && rate_hz > 0.0) {
            return Err(anyhow!("replay rate must be a positive number, got {}", rate_hz));
        }

        let period = Duration::try_from_secs_f64(1.0 / rate_hz)
            .map_err(|e| anyhow!("replay rate {} Hz is too low: {}", rate_hz, e))?;
        if period.is_zero() {
            return Err(anyhow!("replay rate {} Hz is too high", rate_hz));
        }

        Ok(Self {
            period: Some(period),
        })
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }
}

#[async_trait]
impl FrameSource for ReplaySource {
    type Connection = ReplayConnection;

    async fn connect(&mut self, server_address: &str) -> Option<ReplayConnection> {
        match File::open(server_address).await {
            Ok(file) => {
                log::debug!("opened capture {}", server_address);
                Some(ReplayConnection {
                    path: server_address.to_string(),
                    lines: LinesStream::new(BufReader::new(file).lines()),
                    line_no: 0,
                    period: self.period,
                    pacing: None,
                    streaming: false,
                })
            }
            Err(e) => {
                log::error!("failed to open capture {}: {}", server_address, e);
                None
            }
        }
    }
}

pub struct ReplayConnection {
    path: String,
    lines: LinesStream<BufReader<File>>,
    line_no: usize,
    period: Option<Duration>,
    pacing: Option<Interval>,
    streaming: bool,
}

#[async_trait]
impl FrameConnection for ReplayConnection {
    async fn stream_frames(&mut self, components: &[Component]) -> anyhow::Result<()> {
        if !components.contains(&Component::ThreeD) {
            return Err(anyhow!(
                "capture {} only carries 3d markers, requested {:?}",
                self.path,
                components
            ));
        }

        self.pacing = self.period.map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        self.streaming = true;
        log::debug!("streaming {} from {}", Component::ThreeD, self.path);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<anyhow::Result<Frame>> {
        if !self.streaming {
            return Some(Err(anyhow!("next_frame called before stream_frames")));
        }

        loop {
            let line = match self.lines.next().await? {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(anyhow::Error::new(e)
                        .context(format!("reading {} line {}", self.path, self.line_no + 1))))
                }
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            if let Some(ticker) = self.pacing.as_mut() {
                ticker.tick().await;
            }

            return Some(
                parse_frame_line(&line)
                    .with_context(|| format!("decoding {} line {}", self.path, self.line_no)),
            );
        }
    }
}
