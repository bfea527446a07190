// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! pinchquad - pinch-gesture window regions
//!
//! Turns per-frame hand landmarks into on-screen regions that are created,
//! dragged, resized and closed with pinch gestures. Recorded landmark
//! sessions can be replayed in a viewer or headlessly.

mod app;
mod config;
mod dispatch;
mod driver;
mod gesture;
mod io;
mod models;
mod quad;
mod ui;
mod util;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use app::PinchQuadApp;
use config::Settings;
use dispatch::ShutdownStatus;
use driver::{DriverEvent, FrameDriver};
use io::serialization::{export_layout, import_recording};

#[derive(Parser, Debug)]
#[command(name = "pinchquad", about = "Pinch-gesture window regions")]
struct Args {
    /// Settings file (YAML or JSON). Falls back to $PINCHQUAD_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the replay viewer
    View {
        /// Recording to open on start
        recording: Option<PathBuf>,
    },

    /// Run a recording through the frame driver without a window
    Replay {
        recording: PathBuf,
        /// Write the final region layout here (YAML or JSON)
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Print the effective settings, or write them to a file
    Config {
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    match args.command.unwrap_or(Command::View { recording: None }) {
        Command::View { recording } => run_viewer(settings, recording),
        Command::Replay { recording, export } => {
            let summary = run_replay(&settings, &recording, export.as_deref())?;
            println!(
                "{} frames ({:.2}s), {} created, {} closed, {} open",
                summary.frames,
                summary.duration.as_secs_f64(),
                summary.created,
                summary.closed,
                summary.open
            );
            Ok(())
        }
        Command::Config { write: Some(path) } => {
            settings.save(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Command::Config { write: None } => {
            print!("{}", serde_yaml::to_string(&settings)?);
            Ok(())
        }
    }
}

fn run_viewer(settings: Settings, recording: Option<PathBuf>) -> Result<()> {
    let driver = FrameDriver::new(&settings)?;
    let mut app = PinchQuadApp::new(settings, driver);
    if let Some(path) = recording {
        app.open_recording(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("pinchquad"),
        ..Default::default()
    };

    eframe::run_native("pinchquad", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow!("Application error: {}", e))?;

    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct ReplaySummary {
    frames: usize,
    duration: Duration,
    created: usize,
    closed: usize,
    open: usize,
}

fn run_replay(settings: &Settings, path: &Path, export: Option<&Path>) -> Result<ReplaySummary> {
    let recording = import_recording(path)?;
    let mut driver = FrameDriver::new(settings)?;
    let mut summary = ReplaySummary {
        duration: recording.duration(),
        ..Default::default()
    };

    while let Some(output) = driver.process_recorded(&recording, summary.frames) {
        let time = recording.timestamp(summary.frames).unwrap_or_default();
        summary.frames += 1;
        for event in &output.events {
            match event {
                DriverEvent::RegionCreated { .. } => summary.created += 1,
                DriverEvent::RegionClosed { .. } => summary.closed += 1,
                _ => {}
            }
            println!("{:>8.3}s  {}", time.as_secs_f64(), event);
        }
    }

    let layout = driver.layout();
    summary.open = layout.regions.len();
    if let Some(export) = export {
        export_layout(&layout, export)?;
    }

    if driver.shutdown() == ShutdownStatus::TimedOut {
        log::warn!("Command dispatch did not stop cleanly");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::serialization::{export_recording, import_layout};
    use crate::models::landmarks::{index, Landmark, LANDMARK_COUNT};
    use crate::models::recording::{RecordedFrame, RecordedHand, Recording};
    use tempfile::TempDir;

    /// Pinching hand centered on `c` in a 1000x1000 frame.
    fn pinching(id: u32, c: (f64, f64)) -> RecordedHand {
        let mut landmarks = vec![Landmark::new(c.0 / 1000.0, (c.1 + 100.0) / 1000.0); LANDMARK_COUNT];
        landmarks[index::THUMB_TIP] = Landmark::new((c.0 - 5.0) / 1000.0, c.1 / 1000.0);
        landmarks[index::INDEX_FINGER_TIP] = Landmark::new((c.0 + 5.0) / 1000.0, c.1 / 1000.0);
        RecordedHand {
            id: Some(id),
            landmarks,
        }
    }

    #[test]
    fn test_replay_creates_and_exports() {
        let dir = TempDir::new().unwrap();
        let recording_path = dir.path().join("session.json");
        let layout_path = dir.path().join("layout.yaml");

        let mut recording = Recording::new(1000, 1000);
        for i in 0..=25 {
            recording.frames.push(RecordedFrame {
                timestamp: i as f64 * 0.1,
                hands: vec![pinching(0, (200.0, 200.0)), pinching(1, (600.0, 400.0))],
                spawn: None,
            });
        }
        export_recording(&recording, &recording_path).unwrap();

        let summary = run_replay(&Settings::default(), &recording_path, Some(&layout_path)).unwrap();
        assert_eq!(summary.frames, 26);
        assert_eq!(summary.duration, Duration::from_secs_f64(2.5));
        assert_eq!(summary.created, 1);
        assert_eq!(summary.open, 1);

        let layout = import_layout(&layout_path).unwrap();
        assert_eq!(layout.frame_width, 1000);
        assert_eq!(layout.regions.len(), 1);
    }

    #[test]
    fn test_replay_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(run_replay(&Settings::default(), &dir.path().join("none.yaml"), None).is_err());
    }
}
