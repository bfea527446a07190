// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pinch-distance volume gesture.
//!
//! Maps the thumb-to-index distance linearly onto a 0-100 level. Only
//! changes larger than `min_change` are reported for dispatch, which keeps
//! tracker jitter from flooding the dispatcher.

use super::classifier::HandFeatures;

#[derive(Debug, Clone)]
pub struct VolumeGesture {
    enabled: bool,
    min_distance: f64,
    max_distance: f64,
    min_change: u8,
    last_submitted: Option<u8>,
    current: Option<u8>,
}

impl Default for VolumeGesture {
    fn default() -> Self {
        Self::new(20.0, 200.0, 2)
    }
}

impl VolumeGesture {
    pub fn new(min_distance: f64, max_distance: f64, min_change: u8) -> Self {
        Self {
            enabled: false,
            min_distance,
            max_distance,
            min_change,
            last_submitted: None,
            current: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::info!("Volume gesture {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
        if !enabled {
            self.current = None;
        }
    }

    /// Level shown to the renderer for the current frame.
    pub fn current(&self) -> Option<u8> {
        self.current
    }

    /// Level for a given pinch distance, clamped to 0..=100.
    pub fn level_for_distance(&self, distance: f64) -> u8 {
        let span = self.max_distance - self.min_distance;
        if span <= 0.0 {
            return 0;
        }
        ((distance - self.min_distance) / span * 100.0).clamp(0.0, 100.0) as u8
    }

    /// Update from this frame's controlling hand. Returns the level to submit
    /// when it moved far enough from the last submitted one.
    pub fn update(&mut self, hand: Option<&HandFeatures>) -> Option<u8> {
        if !self.enabled {
            self.current = None;
            return None;
        }
        let Some(hand) = hand else {
            self.current = None;
            return None;
        };

        let level = self.level_for_distance(hand.pinch_distance());
        self.current = Some(level);

        let last = self.last_submitted.unwrap_or(0);
        if level.abs_diff(last) > self.min_change {
            self.last_submitted = Some(level);
            return Some(level);
        }
        None
    }
}
