// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stateless gesture classifiers.
//!
//! Everything here works on one hand in one frame: feature extraction from
//! the raw landmarks, pinch and proximity tests, wrist orientation, and the
//! screen-to-content mapping used for hit-testing controls drawn inside a
//! region.

use crate::models::landmarks::{index, HandId, HandLandmarks, Point};
use crate::models::region::Quad;
use crate::util::geometry::{denormalize_coordinates, distance, midpoint, Perspective};

/// Default thumb-to-index distance for a pinch, in capture pixels.
pub const DEFAULT_PINCH_THRESHOLD: f64 = 50.0;
/// Default corner grab distance.
pub const DEFAULT_GRAB_DISTANCE: f64 = 50.0;
/// Default radius of the rotate-to-close activation zone.
pub const DEFAULT_CLOSE_ZONE: f64 = 150.0;

/// True iff the two fingertips are strictly closer than `threshold`.
pub fn is_pinched(a: Point, b: Point, threshold: f64) -> bool {
    distance(a, b) < threshold
}

/// True iff `point` is strictly closer than `threshold` to `corner`.
pub fn is_near(point: Point, corner: Point, threshold: f64) -> bool {
    distance(point, corner) < threshold
}

/// Orientation of the wrist → middle-finger-base vector in degrees,
/// in (-180, 180].
pub fn wrist_angle(hand: &HandFeatures) -> f64 {
    let dx = hand.middle_base.x - hand.wrist.x;
    let dy = hand.middle_base.y - hand.wrist.y;
    let angle = dy.atan2(dx).to_degrees();
    // atan2 yields -180 for (-x, -0.0); fold it onto +180.
    if angle <= -180.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Map a screen point into the content space of a region of `region_size`,
/// using the same quad → rectangle transform the renderer warps with.
pub fn screen_to_region(point: Point, quad: &Quad, region_size: (f64, f64)) -> Option<Point> {
    Perspective::quad_to_rect(quad, region_size)?.apply(point)
}

/// The landmarks the classifiers need, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFeatures {
    pub id: HandId,
    pub thumb_tip: Point,
    pub index_tip: Point,
    pub wrist: Point,
    pub middle_base: Point,
}

impl HandFeatures {
    /// Extract features from a tracked hand. `None` for partial hands.
    pub fn extract(hand: &HandLandmarks, frame_size: (u32, u32)) -> Option<Self> {
        if !hand.is_complete() {
            return None;
        }
        let (w, h) = frame_size;
        let px = |idx: usize| hand.landmark(idx).map(|lm| denormalize_coordinates(&lm, w, h));
        Some(Self {
            id: hand.id,
            thumb_tip: px(index::THUMB_TIP)?,
            index_tip: px(index::INDEX_FINGER_TIP)?,
            wrist: px(index::WRIST)?,
            middle_base: px(index::MIDDLE_FINGER_MCP)?,
        })
    }

    pub fn pinch_distance(&self) -> f64 {
        distance(self.thumb_tip, self.index_tip)
    }

    /// The pinch this hand is making, if any.
    pub fn pinch(&self, threshold: f64) -> Option<Pinch> {
        is_pinched(self.thumb_tip, self.index_tip, threshold).then(|| Pinch {
            hand: self.id,
            thumb_tip: self.thumb_tip,
            index_tip: self.index_tip,
            center: midpoint(self.thumb_tip, self.index_tip),
        })
    }
}

/// A pinching hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pinch {
    pub hand: HandId,
    pub thumb_tip: Point,
    pub index_tip: Point,
    pub center: Point,
}

impl Pinch {
    /// Either fingertip within `threshold` of `corner`.
    pub fn grabs(&self, corner: Point, threshold: f64) -> bool {
        is_near(self.thumb_tip, corner, threshold) || is_near(self.index_tip, corner, threshold)
    }
}
