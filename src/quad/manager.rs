// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region manipulation state machine.
//!
//! The quad manager owns every open region and the single manipulation
//! session. Each landmark frame is evaluated once, in priority order:
//! rotate-to-close, two-hand resize, one-hand drag, then creation from two
//! free pinches. The manager never performs I/O; it reports lifecycle
//! events for the caller to relay.

use std::time::Duration;

use crate::gesture::classifier::{
    HandFeatures, Pinch, DEFAULT_CLOSE_ZONE, DEFAULT_GRAB_DISTANCE, DEFAULT_PINCH_THRESHOLD,
};
use crate::gesture::close::{CloseGestureDetector, DEFAULT_ROTATION_THRESHOLD};
use crate::models::landmarks::HandId;
use crate::models::region::{Corner, Quad, Region, RegionId};
use crate::util::geometry::{bounding_rect, distance};

use super::session::{CornerBinding, ManipulationSession, Mode};

/// Tunables for the quad manager.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerSettings {
    pub pinch_threshold: f64,
    pub grab_distance: f64,
    pub close_zone: f64,
    pub rotation_threshold: f64,
    pub close_timeout: Option<Duration>,
    /// How long a create outline must persist before it commits.
    pub hold: Duration,
    /// Smallest accepted width and height of a new region.
    pub min_size: f64,
    /// Content given to regions committed without a spawn request.
    pub default_content: Option<String>,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            grab_distance: DEFAULT_GRAB_DISTANCE,
            close_zone: DEFAULT_CLOSE_ZONE,
            rotation_threshold: DEFAULT_ROTATION_THRESHOLD,
            close_timeout: Some(Duration::from_secs(3)),
            hold: Duration::from_secs(2),
            min_size: 20.0,
            default_content: None,
        }
    }
}

/// Lifecycle events for the frame driver.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionEvent {
    Created {
        id: RegionId,
        quad: Quad,
        content: Option<String>,
    },
    Closed {
        id: RegionId,
    },
}

pub struct QuadManager {
    settings: ManagerSettings,
    regions: Vec<Region>,
    session: ManipulationSession,
    close_detector: CloseGestureDetector,
    next_id: u64,
    pending_spawn: Option<String>,
    /// Set after a commit until the create pinches are released.
    awaiting_release: bool,
    visible: bool,
}

impl Default for QuadManager {
    fn default() -> Self {
        Self::new(ManagerSettings::default())
    }
}

impl QuadManager {
    pub fn new(settings: ManagerSettings) -> Self {
        let close_detector = CloseGestureDetector::new(
            settings.close_zone,
            settings.rotation_threshold,
            settings.close_timeout,
        );
        Self {
            settings,
            regions: Vec::new(),
            session: ManipulationSession::Idle,
            close_detector,
            next_id: 1,
            pending_spawn: None,
            awaiting_release: false,
            visible: true,
        }
    }

    /// Open regions in creation order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[cfg(test)]
    pub fn session(&self) -> &ManipulationSession {
        &self.session
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    /// Outline of the region being created, if any.
    pub fn live_outline(&self) -> Option<Quad> {
        match &self.session {
            ManipulationSession::Creating { outline, .. } => Some(*outline),
            _ => None,
        }
    }

    /// Outline to draw for a frame of `frame_size`: the live create outline,
    /// else the default placement while a spawn request waits. Nothing while
    /// hidden.
    pub fn preview_outline(&self, frame_size: (u32, u32)) -> Option<Quad> {
        if !self.visible {
            return None;
        }
        self.live_outline()
            .or_else(|| self.pending_spawn.as_ref().map(|_| default_outline(frame_size)))
    }

    pub fn pending_spawn(&self) -> Option<&str> {
        self.pending_spawn.as_deref()
    }

    /// Ask for content to be placed in the next region created.
    pub fn request_spawn(&mut self, content: impl Into<String>) {
        let content = content.into();
        log::info!("Spawn requested for {}", content);
        self.pending_spawn = Some(content);
        self.visible = true;
    }

    pub fn cancel_spawn(&mut self) {
        self.pending_spawn = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hide or show all regions. Hiding aborts any session in progress.
    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
        if !self.visible {
            self.abort_session("regions hidden");
            self.close_detector.clear();
        }
        log::info!("Regions {}", if self.visible { "shown" } else { "hidden" });
    }

    /// Close a region directly (not by gesture).
    pub fn close(&mut self, id: RegionId) -> Option<RegionEvent> {
        let mut events = Vec::new();
        self.close_region(id, &mut events);
        events.pop()
    }

    /// Advance the state machine by one frame.
    pub fn process(&mut self, hands: &[HandFeatures], now: Duration) -> Vec<RegionEvent> {
        let mut events = Vec::new();
        if !self.visible {
            return events;
        }

        for id in self.close_detector.update(hands, &self.regions, now) {
            self.close_region(id, &mut events);
        }

        let pinches: Vec<Pinch> = hands
            .iter()
            .filter_map(|hand| hand.pinch(self.settings.pinch_threshold))
            .collect();

        let session = std::mem::take(&mut self.session);
        let before = session.mode();
        self.session = self.step(session, &pinches, now, &mut events);
        if self.session.mode() != before {
            log::debug!("Manipulation mode {:?} -> {:?}", before, self.session.mode());
        }
        events
    }

    fn step(
        &mut self,
        session: ManipulationSession,
        pinches: &[Pinch],
        now: Duration,
        events: &mut Vec<RegionEvent>,
    ) -> ManipulationSession {
        if let ManipulationSession::Resizing { region, bindings } = session {
            return self.continue_resize(region, bindings, pinches);
        }

        if let Some(resize) = self.try_start_resize(pinches) {
            if let ManipulationSession::Dragging { region, .. } = &session {
                log::info!("Drag on {} aborted by resize", region);
            }
            return resize;
        }

        match session {
            ManipulationSession::Dragging {
                region,
                hand,
                corner,
                offset,
            } => self.continue_drag(region, hand, corner, offset, pinches),
            other => {
                if let Some(drag) = self.try_start_drag(pinches) {
                    if other.mode() == Mode::Creating {
                        log::debug!("Creation abandoned for drag");
                    }
                    return drag;
                }
                self.step_create(other, pinches, now, events)
            }
        }
    }

    fn continue_resize(
        &mut self,
        region: RegionId,
        bindings: [CornerBinding; 2],
        pinches: &[Pinch],
    ) -> ManipulationSession {
        let held = |b: &CornerBinding| pinches.iter().find(|p| p.hand == b.hand).map(|p| p.center);
        let positions = (held(&bindings[0]), held(&bindings[1]));
        let quad = self.regions.iter_mut().find(|r| r.id == region).map(|r| &mut r.quad);

        match (positions, quad) {
            ((Some(a), Some(b)), Some(quad)) => {
                quad.set_diagonal(bindings[0].corner, a, bindings[1].corner, b);
                ManipulationSession::Resizing { region, bindings }
            }
            _ => {
                log::info!("Resize of {} ended", region);
                ManipulationSession::Idle
            }
        }
    }

    fn try_start_resize(&self, pinches: &[Pinch]) -> Option<ManipulationSession> {
        let [a, b] = pinches else {
            return None;
        };
        let grab = self.settings.grab_distance;
        self.regions.iter().find_map(|region| {
            let ca = nearest_corner(&region.quad, a, grab)?;
            let cb = nearest_corner(&region.quad, b, grab)?;
            if !ca.is_diagonal_to(cb) {
                return None;
            }
            log::info!("Resizing {} by {:?}/{:?}", region.id, ca, cb);
            Some(ManipulationSession::Resizing {
                region: region.id,
                bindings: [
                    CornerBinding { hand: a.hand, corner: ca },
                    CornerBinding { hand: b.hand, corner: cb },
                ],
            })
        })
    }

    fn continue_drag(
        &mut self,
        region: RegionId,
        hand: HandId,
        corner: Corner,
        offset: (f64, f64),
        pinches: &[Pinch],
    ) -> ManipulationSession {
        let pinch = pinches.iter().find(|p| p.hand == hand);
        let target = self.regions.iter_mut().find(|r| r.id == region);

        match (pinch, target) {
            (Some(pinch), Some(target)) => {
                let anchor = target.quad.corner(corner);
                let dx = pinch.center.x - offset.0 - anchor.x;
                let dy = pinch.center.y - offset.1 - anchor.y;
                target.quad.translate(dx, dy);
                ManipulationSession::Dragging {
                    region,
                    hand,
                    corner,
                    offset,
                }
            }
            _ => {
                log::info!("Drag of {} ended", region);
                ManipulationSession::Idle
            }
        }
    }

    /// A drag starts only when exactly one pinch grabs a corner.
    fn try_start_drag(&self, pinches: &[Pinch]) -> Option<ManipulationSession> {
        let grab = self.settings.grab_distance;
        let mut grabs = pinches.iter().filter_map(|pinch| {
            self.regions.iter().find_map(move |region| {
                Corner::ALL
                    .into_iter()
                    .find(|&c| pinch.grabs(region.quad.corner(c), grab))
                    .map(move |c| (pinch, region, c))
            })
        });
        let (pinch, region, corner) = grabs.next()?;
        if grabs.next().is_some() {
            return None;
        }

        let anchor = region.quad.corner(corner);
        log::info!("Dragging {} by {:?}", region.id, corner);
        Some(ManipulationSession::Dragging {
            region: region.id,
            hand: pinch.hand,
            corner,
            offset: (pinch.center.x - anchor.x, pinch.center.y - anchor.y),
        })
    }

    fn step_create(
        &mut self,
        previous: ManipulationSession,
        pinches: &[Pinch],
        now: Duration,
        events: &mut Vec<RegionEvent>,
    ) -> ManipulationSession {
        let grab = self.settings.grab_distance;
        let free: Vec<&Pinch> = pinches
            .iter()
            .filter(|p| {
                !self
                    .regions
                    .iter()
                    .any(|r| r.quad.points.iter().any(|&c| p.grabs(c, grab)))
            })
            .collect();

        let [a, b] = free.as_slice() else {
            self.awaiting_release = false;
            return ManipulationSession::Idle;
        };
        if self.awaiting_release {
            return ManipulationSession::Idle;
        }

        let points = [a.thumb_tip, a.index_tip, b.thumb_tip, b.index_tip];
        let Some(outline) = bounding_rect(&points) else {
            return ManipulationSession::Idle;
        };
        let since = match previous {
            ManipulationSession::Creating { since, .. } => since,
            _ => now,
        };

        let held = now.saturating_sub(since) >= self.settings.hold;
        if !(self.pending_spawn.is_some() || held) {
            return ManipulationSession::Creating { since, outline };
        }

        if outline.width() < self.settings.min_size || outline.height() < self.settings.min_size {
            log::debug!(
                "Rejected {:.0}x{:.0} region below minimum size",
                outline.width(),
                outline.height()
            );
            return ManipulationSession::Creating { since: now, outline };
        }

        let content = self
            .pending_spawn
            .take()
            .or_else(|| self.settings.default_content.clone());
        self.commit(outline, content, events);
        self.awaiting_release = true;
        ManipulationSession::Idle
    }

    fn commit(&mut self, quad: Quad, content: Option<String>, events: &mut Vec<RegionEvent>) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        log::info!(
            "Created {} ({:.0}x{:.0}) for {}",
            id,
            quad.width(),
            quad.height(),
            content.as_deref().unwrap_or("no content")
        );
        self.regions.push(Region {
            id,
            quad,
            content: content.clone(),
        });
        events.push(RegionEvent::Created { id, quad, content });
        id
    }

    fn close_region(&mut self, id: RegionId, events: &mut Vec<RegionEvent>) {
        let Some(pos) = self.regions.iter().position(|r| r.id == id) else {
            return;
        };
        self.regions.remove(pos);
        if self.session.region() == Some(id) {
            self.abort_session("region closed");
        }
        self.close_detector.forget_region(id);
        log::info!("Closed {}, {} open", id, self.regions.len());
        events.push(RegionEvent::Closed { id });
    }

    fn abort_session(&mut self, reason: &str) {
        if self.session.mode() != Mode::Idle {
            log::info!("{:?} aborted: {}", self.session.mode(), reason);
        }
        self.session = ManipulationSession::Idle;
    }
}

/// Corner of `quad` closest to the pinch center, within `threshold`.
fn nearest_corner(quad: &Quad, pinch: &Pinch, threshold: f64) -> Option<Corner> {
    Corner::ALL
        .into_iter()
        .map(|c| (c, distance(pinch.center, quad.corner(c))))
        .filter(|(_, d)| *d < threshold)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Centered placeholder outline used while a spawn request waits for a
/// gesture: 40% by 25% of the frame, clamped to sensible bounds.
pub fn default_outline(frame_size: (u32, u32)) -> Quad {
    let (w, h) = (frame_size.0 as f64, frame_size.1 as f64);
    let box_w = (w * 0.4).floor().min(w - 40.0).max(100.0);
    let box_h = (h * 0.25).floor().min(h - 40.0).max(80.0);
    let (cx, cy) = ((w / 2.0).floor(), (h / 2.0).floor());
    let (half_w, half_h) = ((box_w / 2.0).floor(), (box_h / 2.0).floor());
    Quad::from_edges(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::landmarks::Point;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn features(id: u32, thumb: (f64, f64), index_tip: (f64, f64), wrist: (f64, f64), base: (f64, f64)) -> HandFeatures {
        let p = |(x, y): (f64, f64)| Point::new(x, y);
        HandFeatures {
            id: HandId(id),
            thumb_tip: p(thumb),
            index_tip: p(index_tip),
            wrist: p(wrist),
            middle_base: p(base),
        }
    }

    /// Hand pinching at `c` (thumb and index 10 px apart).
    fn pinching(id: u32, c: (f64, f64)) -> HandFeatures {
        features(id, (c.0 - 5.0, c.1), (c.0 + 5.0, c.1), (c.0, c.1 + 150.0), (c.0, c.1 + 100.0))
    }

    /// Hand with its fingers apart at `c`.
    fn open(id: u32, c: (f64, f64)) -> HandFeatures {
        features(id, (c.0 - 60.0, c.1), (c.0 + 60.0, c.1), (c.0, c.1 + 150.0), (c.0, c.1 + 100.0))
    }

    /// Hand with index tip at `tip`, not pinching, wrist turned to `angle`.
    fn rotated(id: u32, tip: (f64, f64), angle_deg: f64) -> HandFeatures {
        let rad = angle_deg.to_radians();
        let wrist = (tip.0, tip.1 + 200.0);
        let base = (wrist.0 + 80.0 * rad.cos(), wrist.1 + 80.0 * rad.sin());
        features(id, (tip.0 - 90.0, tip.1 + 40.0), tip, wrist, base)
    }

    /// Manager holding one committed region spanning (200,200)-(600,400).
    fn with_region() -> QuadManager {
        let mut m = QuadManager::default();
        m.request_spawn("player");
        let events = m.process(&[pinching(0, (200.0, 200.0)), pinching(1, (600.0, 400.0))], ms(0));
        assert_eq!(events.len(), 1);
        // Release so the next frames start clean.
        m.process(&[], ms(10));
        m
    }

    fn quad(m: &QuadManager) -> Quad {
        m.regions()[0].quad
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_spawn_request_commits_immediately() {
        let mut m = QuadManager::default();
        m.request_spawn("Spotify");

        let events = m.process(&[pinching(0, (100.0, 100.0)), pinching(1, (500.0, 300.0))], ms(0));

        assert_eq!(m.regions().len(), 1);
        assert_eq!(m.mode(), Mode::Idle);
        assert_eq!(m.pending_spawn(), None);
        match &events[..] {
            [RegionEvent::Created { id, quad, content }] => {
                assert_eq!(*id, RegionId(1));
                assert!(quad.is_axis_aligned());
                assert!(approx_eq(quad.corner(Corner::TopLeft).x, 95.0));
                assert!(approx_eq(quad.corner(Corner::BottomRight).x, 505.0));
                assert_eq!(content.as_deref(), Some("Spotify"));
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[test]
    fn test_hold_duration_gates_commit() {
        let mut m = QuadManager::default();
        let hands = [pinching(0, (100.0, 100.0)), pinching(1, (500.0, 300.0))];

        for t in (0..=1900).step_by(100) {
            assert!(m.process(&hands, ms(t)).is_empty(), "committed early at {}ms", t);
            assert_eq!(m.mode(), Mode::Creating);
        }
        assert!(m.live_outline().is_some());

        let events = m.process(&hands, ms(2000));
        assert_eq!(events.len(), 1);
        assert_eq!(m.regions().len(), 1);
        assert_eq!(m.regions()[0].content, None);

        // Still pinching after commit: no second region.
        for t in (2100..=5000).step_by(100) {
            m.process(&hands, ms(t));
        }
        assert_eq!(m.regions().len(), 1);
    }

    #[test]
    fn test_dropped_pinch_resets_hold_timer() {
        let mut m = QuadManager::default();
        let hands = [pinching(0, (100.0, 100.0)), pinching(1, (500.0, 300.0))];

        for t in (0..=1500).step_by(100) {
            m.process(&hands, ms(t));
        }
        m.process(&[hands[0], open(1, (500.0, 300.0))], ms(1600));
        assert_eq!(m.mode(), Mode::Idle);

        for t in (1700..=3600).step_by(100) {
            assert!(m.process(&hands, ms(t)).is_empty());
        }
        assert_eq!(m.process(&hands, ms(3700)).len(), 1);
    }

    #[test]
    fn test_degenerate_outline_is_rejected() {
        let mut m = QuadManager::default();
        m.request_spawn("Spotify");

        let events = m.process(&[pinching(0, (300.0, 300.0)), pinching(1, (330.0, 300.0))], ms(0));
        assert!(events.is_empty());
        assert!(m.regions().is_empty());
        assert_eq!(m.pending_spawn(), Some("Spotify"));
    }

    #[test]
    fn test_drag_translates_rigidly() {
        let mut m = with_region();
        let before = quad(&m);

        m.process(&[pinching(0, (210.0, 205.0))], ms(100));
        assert_eq!(m.mode(), Mode::Dragging);

        for (i, c) in [(260.0, 245.0), (330.0, 180.0), (90.0, 420.0)].iter().enumerate() {
            m.process(&[pinching(0, *c)], ms(200 + i as u64 * 100));
            let now = quad(&m);
            assert!(approx_eq(now.width(), before.width()));
            assert!(approx_eq(now.height(), before.height()));
            assert!(now.is_axis_aligned());
            // The grabbed corner keeps its offset to the pinch.
            assert!(approx_eq(now.corner(Corner::TopLeft).x, c.0 - 15.0));
            assert!(approx_eq(now.corner(Corner::TopLeft).y, c.1 - 5.0));
        }

        m.process(&[open(0, (90.0, 420.0))], ms(600));
        assert_eq!(m.mode(), Mode::Idle);
        let released = quad(&m);
        m.process(&[open(0, (500.0, 500.0))], ms(700));
        assert_eq!(quad(&m), released);
    }

    #[test]
    fn test_drag_ends_when_hand_disappears() {
        let mut m = with_region();
        m.process(&[pinching(0, (600.0, 400.0))], ms(100));
        assert_eq!(m.mode(), Mode::Dragging);
        m.process(&[], ms(200));
        assert_eq!(m.mode(), Mode::Idle);
    }

    #[test]
    fn test_diagonal_resize_keeps_rectangle() {
        let mut m = with_region();

        m.process(&[pinching(0, (200.0, 200.0)), pinching(1, (600.0, 400.0))], ms(100));
        assert_eq!(m.mode(), Mode::Resizing);

        let path = [
            ((180.0, 190.0), (650.0, 450.0)),
            ((150.0, 100.0), (700.0, 300.0)),
            ((700.0, 500.0), (650.0, 450.0)), // hands crossed
            ((250.0, 260.0), (500.0, 380.0)),
        ];
        for (i, (a, b)) in path.iter().enumerate() {
            m.process(&[pinching(0, *a), pinching(1, *b)], ms(200 + i as u64 * 100));
            let q = quad(&m);
            assert_eq!(m.mode(), Mode::Resizing);
            assert!(q.is_axis_aligned());
            assert!(q.width() >= 0.0 && q.height() >= 0.0);
        }
        let q = quad(&m);
        assert_eq!(q.corner(Corner::TopLeft), Point::new(250.0, 260.0));
        assert_eq!(q.corner(Corner::BottomRight), Point::new(500.0, 380.0));
    }

    #[test]
    fn test_resize_binds_hands_by_identity() {
        let mut m = with_region();
        m.process(&[pinching(0, (600.0, 200.0)), pinching(1, (200.0, 400.0))], ms(100));
        assert_eq!(m.mode(), Mode::Resizing);

        // Tracker reports the hands in the other order; bindings must hold.
        m.process(&[pinching(1, (150.0, 450.0)), pinching(0, (650.0, 150.0))], ms(200));
        let q = quad(&m);
        assert_eq!(q.corner(Corner::TopRight), Point::new(650.0, 150.0));
        assert_eq!(q.corner(Corner::BottomLeft), Point::new(150.0, 450.0));
        assert_eq!(q.corner(Corner::TopLeft), Point::new(150.0, 150.0));
        assert_eq!(q.corner(Corner::BottomRight), Point::new(650.0, 450.0));
    }

    #[test]
    fn test_same_side_corners_do_not_resize() {
        let mut m = with_region();
        let before = quad(&m);

        for t in [100, 200, 300] {
            m.process(&[pinching(0, (200.0, 200.0)), pinching(1, (600.0, 200.0))], ms(t));
            assert_eq!(m.mode(), Mode::Idle);
        }
        assert_eq!(quad(&m), before);
    }

    #[test]
    fn test_same_side_pinch_keeps_drag() {
        let mut m = with_region();
        m.process(&[pinching(0, (200.0, 200.0))], ms(100));
        assert_eq!(m.mode(), Mode::Dragging);

        m.process(&[pinching(0, (200.0, 200.0)), pinching(1, (600.0, 200.0))], ms(200));
        assert_eq!(m.mode(), Mode::Dragging);
    }

    #[test]
    fn test_resize_aborts_drag() {
        let mut m = with_region();
        m.process(&[pinching(0, (200.0, 200.0))], ms(100));
        assert!(matches!(m.session(), ManipulationSession::Dragging { hand: HandId(0), .. }));

        m.process(&[pinching(0, (200.0, 200.0)), pinching(1, (600.0, 400.0))], ms(200));
        match m.session() {
            ManipulationSession::Resizing { bindings, .. } => {
                assert_eq!(bindings[0], CornerBinding { hand: HandId(0), corner: Corner::TopLeft });
                assert_eq!(bindings[1], CornerBinding { hand: HandId(1), corner: Corner::BottomRight });
            }
            other => panic!("expected resize, got {:?}", other),
        }
    }

    #[test]
    fn test_resize_ends_when_hand_lost() {
        let mut m = with_region();
        m.process(&[pinching(0, (200.0, 200.0)), pinching(1, (600.0, 400.0))], ms(100));
        assert_eq!(m.mode(), Mode::Resizing);

        m.process(&[pinching(0, (210.0, 210.0))], ms(200));
        assert_eq!(m.mode(), Mode::Idle);
    }

    #[test]
    fn test_rotation_closes_region_and_aborts_drag() {
        let mut m = with_region();
        // Hand 0 drags by the bottom-left corner.
        m.process(&[pinching(0, (200.0, 400.0))], ms(100));
        assert_eq!(m.mode(), Mode::Dragging);

        // Hand 1 arms on the top-right corner, then rotates.
        let events = m.process(&[pinching(0, (200.0, 400.0)), rotated(1, (590.0, 210.0), -90.0)], ms(200));
        assert!(events.is_empty());
        let events = m.process(&[pinching(0, (200.0, 400.0)), rotated(1, (590.0, 210.0), -60.0)], ms(300));

        assert_eq!(events, vec![RegionEvent::Closed { id: RegionId(1) }]);
        assert!(m.regions().is_empty());
        assert_eq!(m.mode(), Mode::Idle);
    }

    #[test]
    fn test_hidden_regions_ignore_gestures() {
        let mut m = with_region();
        m.toggle_visible();
        assert!(!m.is_visible());

        let before = quad(&m);
        assert!(m.process(&[pinching(0, (200.0, 200.0))], ms(100)).is_empty());
        assert_eq!(m.mode(), Mode::Idle);
        assert_eq!(quad(&m), before);

        m.toggle_visible();
        m.process(&[pinching(0, (200.0, 200.0))], ms(200));
        assert_eq!(m.mode(), Mode::Dragging);
    }

    #[test]
    fn test_explicit_close() {
        let mut m = with_region();
        assert_eq!(m.close(RegionId(1)), Some(RegionEvent::Closed { id: RegionId(1) }));
        assert_eq!(m.close(RegionId(1)), None);
    }

    #[test]
    fn test_default_outline_is_centered() {
        let q = default_outline((1280, 720));
        assert_eq!(q, Quad::from_edges(384.0, 270.0, 896.0, 450.0));

        let small = default_outline((200, 150));
        assert_eq!(small.width(), 100.0);
        assert_eq!(small.height(), 80.0);
    }

    #[test]
    fn test_preview_outline_follows_spawn_request() {
        let mut m = QuadManager::default();
        assert_eq!(m.preview_outline((1280, 720)), None);

        m.request_spawn("player");
        assert_eq!(m.preview_outline((1280, 720)), Some(default_outline((1280, 720))));

        m.toggle_visible();
        assert_eq!(m.preview_outline((1280, 720)), None);

        m.toggle_visible();
        m.cancel_spawn();
        assert_eq!(m.preview_outline((1280, 720)), None);
    }
}
