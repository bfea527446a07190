// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hand landmark data structures.
//!
//! This module defines the per-frame input produced by the external hand
//! tracker: points, hands with their 21 landmarks, and the frame itself.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of landmarks reported per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices used by the gesture classifiers.
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
}

/// A 2D point. Pixel space unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single tracker landmark, normalized to the frame (0.0 to 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Depth relative to the wrist. Carried through, never used.
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    #[cfg(test)]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Identity of a tracked hand, stable for as long as the tracker keeps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandId(pub u32);

/// One detected hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub id: HandId,
    pub landmarks: Vec<Landmark>,
}

impl HandLandmarks {
    pub fn new(id: HandId, landmarks: Vec<Landmark>) -> Self {
        Self { id, landmarks }
    }

    /// A hand is usable only when the tracker reported every landmark.
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }

    pub fn landmark(&self, idx: usize) -> Option<Landmark> {
        self.landmarks.get(idx).copied()
    }
}

/// All hands seen in one video frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkFrame {
    /// Time since the start of the session.
    pub timestamp: Duration,
    /// Frame size in pixels (width, height).
    pub frame_size: (u32, u32),
    pub hands: Vec<HandLandmarks>,
}

impl LandmarkFrame {
    pub fn new(timestamp: Duration, frame_size: (u32, u32), hands: Vec<HandLandmarks>) -> Self {
        Self {
            timestamp,
            frame_size,
            hands,
        }
    }
}
