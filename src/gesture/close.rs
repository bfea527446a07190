// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rotate-to-close detection.
//!
//! A hand whose index fingertip lingers near a region's top-right corner arms
//! a tracker holding the wrist angle at that moment. Rotating the wrist past
//! the threshold while staying in the zone closes the region. Leaving the
//! zone or losing the hand drops the tracker; a tracker older than the
//! timeout re-arms at the current angle.

use std::collections::HashMap;
use std::time::Duration;

use crate::models::landmarks::HandId;
use crate::models::region::{Corner, Region, RegionId};

use super::classifier::{is_near, wrist_angle, HandFeatures, DEFAULT_CLOSE_ZONE};

/// Default wrist rotation that closes a region, in degrees.
pub const DEFAULT_ROTATION_THRESHOLD: f64 = 17.0;

/// The corner whose activation zone arms the close gesture.
pub const CLOSE_CORNER: Corner = Corner::TopRight;

/// Shorter angular distance between two angles in degrees, in [0, 180].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Per-hand state armed inside an activation zone.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseTracker {
    pub region: RegionId,
    pub start_angle: f64,
    pub start_time: Duration,
}

#[derive(Debug)]
pub struct CloseGestureDetector {
    zone: f64,
    rotation_threshold: f64,
    timeout: Option<Duration>,
    trackers: HashMap<HandId, CloseTracker>,
}

impl Default for CloseGestureDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSE_ZONE, DEFAULT_ROTATION_THRESHOLD, None)
    }
}

impl CloseGestureDetector {
    pub fn new(zone: f64, rotation_threshold: f64, timeout: Option<Duration>) -> Self {
        Self {
            zone,
            rotation_threshold,
            timeout,
            trackers: HashMap::new(),
        }
    }

    /// Tracker currently armed for `hand`, if any.
    #[cfg(test)]
    pub fn tracker(&self, hand: HandId) -> Option<&CloseTracker> {
        self.trackers.get(&hand)
    }

    pub fn clear(&mut self) {
        self.trackers.clear();
    }

    /// Evaluate one frame. Returns the regions whose close gesture completed,
    /// in the order the completing hands appear.
    pub fn update(&mut self, hands: &[HandFeatures], regions: &[Region], now: Duration) -> Vec<RegionId> {
        // Hands that vanished lose their trackers.
        self.trackers
            .retain(|id, _| hands.iter().any(|hand| hand.id == *id));

        let mut closed = Vec::new();
        for hand in hands {
            let target = regions
                .iter()
                .filter(|r| !closed.contains(&r.id))
                .find(|r| is_near(hand.index_tip, r.quad.corner(CLOSE_CORNER), self.zone));

            let Some(region) = target else {
                if self.trackers.remove(&hand.id).is_some() {
                    log::debug!("Hand {} left the close zone", hand.id.0);
                }
                continue;
            };

            let angle = wrist_angle(hand);
            let rearm = match self.trackers.get(&hand.id) {
                None => true,
                Some(t) if t.region != region.id => true,
                Some(t) => self
                    .timeout
                    .is_some_and(|limit| now.saturating_sub(t.start_time) > limit),
            };
            if rearm {
                log::debug!(
                    "Close gesture armed for {} by hand {} at {:.1}°",
                    region.id,
                    hand.id.0,
                    angle
                );
                self.trackers.insert(
                    hand.id,
                    CloseTracker {
                        region: region.id,
                        start_angle: angle,
                        start_time: now,
                    },
                );
                continue;
            }

            let start_angle = self.trackers[&hand.id].start_angle;
            let rotation = angular_distance(angle, start_angle);
            if rotation >= self.rotation_threshold {
                log::info!(
                    "Close gesture completed on {} ({:.1}° rotation)",
                    region.id,
                    rotation
                );
                closed.push(region.id);
            }
        }

        if !closed.is_empty() {
            self.trackers.retain(|_, t| !closed.contains(&t.region));
        }
        closed
    }

    /// Drop trackers aimed at a region that no longer exists.
    pub fn forget_region(&mut self, region: RegionId) {
        self.trackers.retain(|_, t| t.region != region);
    }
}
