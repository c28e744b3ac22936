use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use marker_tracker::source::ReplaySource;
use marker_tracker::{MarkerId, Tracker, TrackerConfig, TrackingError};

/// Replays a marker capture and reports per-marker displacement and velocity.
#[derive(Debug, Parser)]
#[command(name = "marker-tracker", version)]
struct Cli {
    /// TOML config file. Without it, MARKER_TRACKER_* env vars are used.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Capture to replay (overrides server_address).
    #[arg(short, long)]
    server: Option<String>,

    /// Marker identifiers to track, comma-separated.
    #[arg(short, long, value_delimiter = ',')]
    markers: Option<Vec<MarkerId>>,

    /// Positions kept per marker.
    #[arg(long)]
    capacity: Option<usize>,

    /// Marker labels, comma-separated, in the same order as --markers.
    #[arg(short, long, value_delimiter = ',')]
    labels: Option<Vec<String>>,

    /// Playback rate in frames per second (default: as fast as possible).
    #[arg(long)]
    rate: Option<f64>,

    /// Stop once this many frames have been processed.
    #[arg(long)]
    max_frames: Option<u64>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<TrackerConfig> {
        let mut cfg = match &self.config {
            Some(path) => TrackerConfig::from_file(path)?,
            None => TrackerConfig::from_env()?,
        };

        if let Some(server) = &self.server {
            cfg.server_address = server.clone();
        }
        if let Some(markers) = &self.markers {
            cfg.marker_identifiers = markers.clone();
        }
        if let Some(capacity) = self.capacity {
            cfg.history_capacity = capacity;
        }
        if let Some(labels) = &self.labels {
            cfg.labels = labels.clone();
        }
        Ok(cfg)
    }
}

fn report(tracker: &Tracker, max_frames: Option<u64>) -> bool {
    println!("{}", format!("frame {}", tracker.frame_count()).bold());

    for history in tracker.markers() {
        let distance = match history.distance() {
            Ok(d) => format!("{:.3}", d),
            Err(e) => e.to_string().yellow().to_string(),
        };
        let position = match history.last() {
            Ok(p) => p.to_string(),
            Err(e) => e.to_string().yellow().to_string(),
        };
        let velocity = match history.velocity() {
            Ok(v) => v.to_string(),
            Err(e) => e.to_string().yellow().to_string(),
        };
        println!(
            "  {}: distance {} position {} velocity {}",
            history.to_string().cyan(),
            distance,
            position,
            velocity
        );
    }

    match max_frames {
        Some(max) if tracker.frame_count() >= max => {
            println!("{}", format!("Processed {} frames, exiting", max).green());
            false
        }
        _ => true,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let cfg = cli.load_config()?;
    let max_frames = cli.max_frames;

    let mut tracker = Tracker::new(cfg).context("invalid tracker configuration")?;
    tracker.set_callback(move |t| report(t, max_frames));

    let stop = tracker.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("ctrl-c received");
            stop.stop();
        }
    });

    let mut source = match cli.rate {
        Some(hz) => ReplaySource::with_rate(hz).context("invalid --rate")?,
        None => ReplaySource::new(),
    };

    match tracker.run_async(&mut source).await {
        Ok(()) => Ok(()),
        Err(TrackingError::ConnectionFailed(addr)) => {
            eprintln!("{}", format!("could not open {}", addr).red());
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
