// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-frame orchestration.
//!
//! The frame driver feeds each landmark frame through the quad manager and
//! the volume gesture, hit-tests the controls drawn inside each region, and
//! hands the renderer everything it needs for the frame. All external calls
//! go through the two dispatchers, so processing a frame never blocks.

use std::time::Duration;

use anyhow::Result;

use crate::config::Settings;
use crate::dispatch::sinks::{volume_sink, MediaAction};
use crate::dispatch::{CommandDispatcher, CommandSink, ShutdownStatus};
use crate::gesture::classifier::{screen_to_region, HandFeatures};
use crate::gesture::volume::VolumeGesture;
use crate::io::serialization::Layout;
use crate::models::landmarks::{LandmarkFrame, Point};
use crate::models::recording::Recording;
use crate::models::region::{Quad, RegionId};
use crate::quad::manager::{QuadManager, RegionEvent};
use crate::quad::session::Mode;
use crate::util::geometry::distance;

/// Controls drawn in region content space, as (action, center).
pub const CONTROLS: [(MediaAction, Point); 3] = [
    (MediaAction::Previous, Point { x: 245.0, y: 75.0 }),
    (MediaAction::PlayPause, Point { x: 290.0, y: 75.0 }),
    (MediaAction::Next, Point { x: 335.0, y: 75.0 }),
];
pub const CONTROL_RADIUS: f64 = 18.0;
const CONTROL_DEBOUNCE: Duration = Duration::from_secs(1);

/// What the driver reports to the application for one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    RegionCreated {
        id: RegionId,
        quad: Quad,
        content: Option<String>,
    },
    RegionClosed {
        id: RegionId,
    },
    ControlPressed {
        region: RegionId,
        action: MediaAction,
    },
    VolumeSubmitted(u8),
}

impl std::fmt::Display for DriverEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegionCreated { id, content, .. } => {
                write!(f, "{} created", id)?;
                if let Some(content) = content {
                    write!(f, " for {}", content)?;
                }
                Ok(())
            }
            Self::RegionClosed { id } => write!(f, "{} closed", id),
            Self::ControlPressed { region, action } => write!(f, "{} pressed on {}", action, region),
            Self::VolumeSubmitted(level) => write!(f, "volume {}", level),
        }
    }
}

/// One region as the renderer should draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRegion {
    pub id: RegionId,
    pub quad: Quad,
    pub opacity: f32,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    /// Open regions, empty while hidden.
    pub regions: Vec<RenderRegion>,
    /// Live create outline, or the placeholder while a spawn is pending.
    pub outline: Option<Quad>,
    pub hands: Vec<HandFeatures>,
    pub events: Vec<DriverEvent>,
    /// Volume level for the on-screen indicator.
    pub volume: Option<u8>,
    pub mode: Option<Mode>,
}

pub struct FrameDriver {
    settings: Settings,
    manager: QuadManager,
    volume: VolumeGesture,
    volume_dispatch: CommandDispatcher<u8>,
    media_dispatch: CommandDispatcher<MediaAction>,
    last_press: Option<Duration>,
    frame_size: (u32, u32),
}

impl FrameDriver {
    /// Build a driver whose sinks run the commands named in the settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut volume = volume_sink(settings.commands.volume.as_deref());
        let media = settings.commands.media.clone();
        Self::with_sinks(settings, move |level: u8| volume.apply(level), media)
    }

    pub fn with_sinks<V, M>(settings: &Settings, volume_sink: V, media_sink: M) -> Result<Self>
    where
        V: CommandSink<u8> + 'static,
        M: CommandSink<MediaAction> + 'static,
    {
        let dispatch = settings.dispatch_settings();
        Ok(Self {
            settings: settings.clone(),
            manager: QuadManager::new(settings.manager_settings()),
            volume: settings.volume_gesture(),
            volume_dispatch: CommandDispatcher::spawn("volume", volume_sink, dispatch)?,
            media_dispatch: CommandDispatcher::spawn("media", media_sink, dispatch)?,
            last_press: None,
            frame_size: (0, 0),
        })
    }

    pub fn manager(&self) -> &QuadManager {
        &self.manager
    }

    /// Drop all regions and gesture state, keeping the dispatchers. Used when
    /// a replay restarts from the beginning.
    pub fn reset(&mut self) {
        let enabled = self.volume.is_enabled();
        self.manager = QuadManager::new(self.settings.manager_settings());
        self.volume = self.settings.volume_gesture();
        self.volume.set_enabled(enabled);
        self.last_press = None;
        log::debug!("Frame driver reset");
    }

    pub fn request_spawn(&mut self, content: impl Into<String>) {
        self.manager.request_spawn(content);
    }

    pub fn toggle_visible(&mut self) {
        self.manager.toggle_visible();
    }

    pub fn volume_enabled(&self) -> bool {
        self.volume.is_enabled()
    }

    pub fn set_volume_enabled(&mut self, enabled: bool) {
        self.volume.set_enabled(enabled);
    }

    /// Close a region on request from the application.
    pub fn close(&mut self, id: RegionId) -> Option<DriverEvent> {
        let event = self.manager.close(id)?;
        Some(self.relay(event))
    }

    /// Current region set in exportable form.
    pub fn layout(&self) -> Layout {
        Layout {
            frame_width: self.frame_size.0,
            frame_height: self.frame_size.1,
            regions: self.manager.regions().to_vec(),
        }
    }

    /// Run one landmark frame through the pipeline.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameOutput {
        self.frame_size = frame.frame_size;
        let hands: Vec<HandFeatures> = frame
            .hands
            .iter()
            .filter_map(|hand| HandFeatures::extract(hand, frame.frame_size))
            .collect();
        let dropped = frame.hands.len() - hands.len();
        if dropped > 0 {
            log::debug!("Dropped {} partial hand(s)", dropped);
        }

        let mut events: Vec<DriverEvent> = self
            .manager
            .process(&hands, frame.timestamp)
            .into_iter()
            .map(|event| self.relay(event))
            .collect();

        if self.manager.is_visible() {
            if let Some(pressed) = self.hit_test_controls(&hands, frame.timestamp) {
                events.push(pressed);
            }
        }

        let controlling = if self.manager.is_visible() && !self.manager.regions().is_empty() {
            hands.first()
        } else {
            None
        };
        if let Some(level) = self.volume.update(controlling) {
            self.volume_dispatch.submit(level);
            events.push(DriverEvent::VolumeSubmitted(level));
        }

        FrameOutput {
            regions: self.render_regions(),
            outline: self.manager.preview_outline(self.frame_size),
            hands,
            events,
            volume: self.volume.current(),
            mode: Some(self.manager.mode()),
        }
    }

    /// Process recorded frame `idx`, applying its scripted spawn request
    /// first. `None` past the end of the recording.
    pub fn process_recorded(&mut self, recording: &Recording, idx: usize) -> Option<FrameOutput> {
        let frame = recording.landmark_frame(idx)?;
        if let Some(content) = recording.frames.get(idx).and_then(|f| f.spawn.as_deref()) {
            self.request_spawn(content);
        }
        Some(self.process_frame(&frame))
    }

    pub fn content_size(&self) -> (f64, f64) {
        self.settings.regions.content_size
    }

    /// Stop both dispatchers. `TimedOut` if either failed to join.
    pub fn shutdown(&mut self) -> ShutdownStatus {
        let volume = self.volume_dispatch.shutdown();
        let media = self.media_dispatch.shutdown();
        if volume == ShutdownStatus::Joined && media == ShutdownStatus::Joined {
            ShutdownStatus::Joined
        } else {
            ShutdownStatus::TimedOut
        }
    }

    fn relay(&mut self, event: RegionEvent) -> DriverEvent {
        match event {
            RegionEvent::Created { id, quad, content } => DriverEvent::RegionCreated { id, quad, content },
            RegionEvent::Closed { id } => {
                if self.manager.pending_spawn().is_some() {
                    log::info!("Pending spawn cleared by close of {}", id);
                    self.manager.cancel_spawn();
                }
                DriverEvent::RegionClosed { id }
            }
        }
    }

    fn render_regions(&self) -> Vec<RenderRegion> {
        if !self.manager.is_visible() {
            return Vec::new();
        }
        self.manager
            .regions()
            .iter()
            .map(|r| RenderRegion {
                id: r.id,
                quad: r.quad,
                opacity: self.settings.regions.opacity,
                content: r.content.clone(),
            })
            .collect()
    }

    /// First index fingertip on a control wins; one press per debounce window.
    fn hit_test_controls(&mut self, hands: &[HandFeatures], now: Duration) -> Option<DriverEvent> {
        if let Some(last) = self.last_press {
            if now.saturating_sub(last) < CONTROL_DEBOUNCE {
                return None;
            }
        }
        let content_size = self.settings.regions.content_size;

        let (region, action) = self.manager.regions().iter().find_map(|region| {
            hands.iter().find_map(|hand| {
                let local = screen_to_region(hand.index_tip, &region.quad, content_size)?;
                control_at(local).map(|action| (region.id, action))
            })
        })?;

        log::info!("{} pressed on {}", action, region);
        self.last_press = Some(now);
        self.media_dispatch.submit(action);
        Some(DriverEvent::ControlPressed { region, action })
    }
}

/// Control under a point in content space. The rim itself is outside.
fn control_at(local: Point) -> Option<MediaAction> {
    CONTROLS
        .iter()
        .find(|(_, center)| distance(local, *center) < CONTROL_RADIUS)
        .map(|(action, _)| *action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::classifier::tests::hand_at;
    use crate::quad::manager::default_outline;
    use crate::models::landmarks::HandLandmarks;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    const FRAME: (u32, u32) = (1000, 1000);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn frame(t: u64, hands: Vec<HandLandmarks>) -> LandmarkFrame {
        LandmarkFrame::new(ms(t), FRAME, hands)
    }

    fn pinching(id: u32, c: (f64, f64)) -> HandLandmarks {
        hand_at(id, (c.0 - 5.0, c.1), (c.0 + 5.0, c.1), (c.0, c.1 + 120.0), (c.0, c.1 + 60.0))
    }

    /// Open hand pointing its index tip at `tip`.
    fn pointing(id: u32, tip: (f64, f64)) -> HandLandmarks {
        hand_at(id, (tip.0, tip.1 + 100.0), tip, (tip.0, tip.1 + 220.0), (tip.0, tip.1 + 160.0))
    }

    fn recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl FnMut(T) -> Result<()> + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink = move |v: T| -> Result<()> {
            sink_seen.lock().unwrap().push(v);
            Ok(())
        };
        (seen, sink)
    }

    fn driver() -> (FrameDriver, Arc<Mutex<Vec<u8>>>, Arc<Mutex<Vec<MediaAction>>>) {
        let (volume, volume_sink) = recorder::<u8>();
        let (media, media_sink) = recorder::<MediaAction>();
        let d = FrameDriver::with_sinks(&Settings::default(), volume_sink, media_sink).unwrap();
        (d, volume, media)
    }

    /// Spawn a "player" region spanning (195,200)-(605,400).
    fn open_player(d: &mut FrameDriver) -> RegionId {
        d.request_spawn("player");
        let out = d.process_frame(&frame(0, vec![pinching(0, (200.0, 200.0)), pinching(1, (600.0, 400.0))]));
        let id = match out.events.as_slice() {
            [DriverEvent::RegionCreated { id, content, .. }] => {
                assert_eq!(content.as_deref(), Some("player"));
                *id
            }
            other => panic!("unexpected events {:?}", other),
        };
        d.process_frame(&frame(50, vec![]));
        id
    }

    fn wait_for<T>(seen: &Arc<Mutex<Vec<T>>>, n: usize) {
        let start = Instant::now();
        while seen.lock().unwrap().len() < n && start.elapsed() < Duration::from_secs(2) {
            std::thread::sleep(ms(5));
        }
    }

    #[test]
    fn test_created_region_is_rendered_with_opacity() {
        let (mut d, _, _) = driver();
        let id = open_player(&mut d);

        let out = d.process_frame(&frame(100, vec![]));
        assert_eq!(out.regions.len(), 1);
        assert_eq!(out.regions[0].id, id);
        assert_eq!(out.regions[0].opacity, 0.9);
        let quad = out.regions[0].quad;
        assert!((quad.width() - 410.0).abs() < 1e-6);
        assert!((quad.height() - 200.0).abs() < 1e-6);
        assert_eq!(out.outline, None);
        assert_eq!(d.layout().regions.len(), 1);
        assert_eq!(d.shutdown(), ShutdownStatus::Joined);
        assert_eq!(d.shutdown(), ShutdownStatus::Joined);
    }

    #[test]
    fn test_pending_spawn_shows_placeholder() {
        let (mut d, _, _) = driver();
        d.request_spawn("player");
        let out = d.process_frame(&frame(0, vec![]));
        assert_eq!(out.outline, Some(default_outline(FRAME)));
    }

    #[test]
    fn test_control_press_is_debounced_and_dispatched() {
        let (mut d, _, media) = driver();
        let id = open_player(&mut d);

        // Content x 245 maps to 195 + 245 * 410 / 400; content y 75 to 300.
        let previous = (195.0 + 245.0 * 410.0 / 400.0, 300.0);
        let out = d.process_frame(&frame(200, vec![pointing(0, previous)]));
        assert!(out.events.contains(&DriverEvent::ControlPressed {
            region: id,
            action: MediaAction::Previous
        }));

        let out = d.process_frame(&frame(600, vec![pointing(0, previous)]));
        assert!(out.events.is_empty());

        let out = d.process_frame(&frame(1300, vec![pointing(0, previous)]));
        assert_eq!(out.events.len(), 1);

        wait_for(&media, 1);
        assert_eq!(media.lock().unwrap()[0], MediaAction::Previous);
    }

    #[test]
    fn test_control_rim_is_outside() {
        let (action, center) = CONTROLS[0];
        assert_eq!(control_at(center), Some(action));
        assert_eq!(control_at(Point::new(center.x, center.y - CONTROL_RADIUS)), None);
        assert_eq!(
            control_at(Point::new(center.x, center.y - CONTROL_RADIUS + 0.5)),
            Some(action)
        );
    }

    #[test]
    fn test_fingertip_outside_controls_does_nothing() {
        let (mut d, _, _) = driver();
        open_player(&mut d);
        let out = d.process_frame(&frame(200, vec![pointing(0, (250.0, 250.0))]));
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_volume_requires_open_region() {
        let (mut d, volume, _) = driver();
        d.set_volume_enabled(true);
        let spread = |id| hand_at(id, (100.0, 700.0), (211.0, 700.0), (100.0, 900.0), (100.0, 800.0));

        let out = d.process_frame(&frame(0, vec![spread(5)]));
        assert_eq!(out.volume, None);

        open_player(&mut d);
        let out = d.process_frame(&frame(100, vec![spread(5)]));
        assert_eq!(out.volume, Some(50));
        assert!(out.events.contains(&DriverEvent::VolumeSubmitted(50)));

        wait_for(&volume, 1);
        assert_eq!(volume.lock().unwrap()[0], 50);
    }

    #[test]
    fn test_close_clears_pending_spawn() {
        let (mut d, _, _) = driver();
        let id = open_player(&mut d);
        d.request_spawn("browser");

        assert_eq!(d.close(id), Some(DriverEvent::RegionClosed { id }));
        assert_eq!(d.manager().pending_spawn(), None);
        assert!(d.manager().regions().is_empty());
        assert_eq!(d.close(id), None);
    }

    #[test]
    fn test_hidden_regions_are_not_rendered() {
        let (mut d, _, _) = driver();
        open_player(&mut d);
        d.toggle_visible();
        let out = d.process_frame(&frame(100, vec![]));
        assert!(out.regions.is_empty());

        d.toggle_visible();
        let out = d.process_frame(&frame(150, vec![]));
        assert_eq!(out.regions.len(), 1);
    }

    #[test]
    fn test_recorded_spawn_is_applied() {
        use crate::models::recording::{RecordedFrame, RecordedHand};

        let hand = |id: u32, c: (f64, f64)| RecordedHand {
            id: Some(id),
            landmarks: pinching(id, c).landmarks,
        };
        let mut recording = Recording::new(1000, 1000);
        recording.frames.push(RecordedFrame {
            timestamp: 0.0,
            hands: vec![hand(0, (200.0, 200.0)), hand(1, (600.0, 400.0))],
            spawn: Some("player".into()),
        });

        let (mut d, _, _) = driver();
        let out = d.process_recorded(&recording, 0).unwrap();
        assert!(matches!(
            out.events.as_slice(),
            [DriverEvent::RegionCreated { content: Some(c), .. }] if c == "player"
        ));
        assert!(d.process_recorded(&recording, 1).is_none());
    }

    #[test]
    fn test_reset_drops_regions() {
        let (mut d, _, _) = driver();
        open_player(&mut d);
        d.reset();
        assert!(d.manager().regions().is_empty());
        let id = open_player(&mut d);
        assert_eq!(id, RegionId(1));
    }
}
