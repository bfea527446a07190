// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recorded landmark sessions.
//!
//! A recording is the replayable form of a tracker stream: the frame size,
//! an optional backdrop image, and timestamped hand landmarks.

use super::landmarks::{HandId, HandLandmarks, Landmark, LandmarkFrame};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One recorded hand. `id` falls back to the hand's position in the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedHand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub landmarks: Vec<Landmark>,
}

/// One recorded video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Seconds since the start of the recording.
    pub timestamp: f64,
    #[serde(default)]
    pub hands: Vec<RecordedHand>,
    /// Content requested on this frame (stands in for voice/UI commands).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn: Option<String>,
}

/// Complete recording for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_file: Option<String>,
    pub frame_width: u32,
    pub frame_height: u32,
    #[serde(default)]
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    /// Create an empty recording for the given frame dimensions.
    #[cfg(test)]
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            media_file: None,
            frame_width,
            frame_height,
            frames: Vec::new(),
        }
    }

    /// Total length of the recording.
    pub fn duration(&self) -> Duration {
        self.frames
            .last()
            .map(|f| secs_to_duration(f.timestamp))
            .unwrap_or_default()
    }

    /// Timestamp of the recorded frame at `idx`.
    pub fn timestamp(&self, idx: usize) -> Option<Duration> {
        self.frames.get(idx).map(|f| secs_to_duration(f.timestamp))
    }

    /// Build the tracker frame for the recorded frame at `idx`.
    pub fn landmark_frame(&self, idx: usize) -> Option<LandmarkFrame> {
        let frame = self.frames.get(idx)?;
        let hands = frame
            .hands
            .iter()
            .enumerate()
            .map(|(ordinal, hand)| {
                let id = HandId(hand.id.unwrap_or(ordinal as u32));
                HandLandmarks::new(id, hand.landmarks.clone())
            })
            .collect();
        Some(LandmarkFrame::new(
            secs_to_duration(frame.timestamp),
            (self.frame_width, self.frame_height),
            hands,
        ))
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_ids_default_to_ordinal() {
        let mut recording = Recording::new(640, 480);
        recording.frames.push(RecordedFrame {
            timestamp: 0.5,
            hands: vec![
                RecordedHand { id: None, landmarks: vec![] },
                RecordedHand { id: Some(7), landmarks: vec![] },
                RecordedHand { id: None, landmarks: vec![] },
            ],
            spawn: None,
        });

        let frame = recording.landmark_frame(0).unwrap();
        let ids: Vec<HandId> = frame.hands.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![HandId(0), HandId(7), HandId(2)]);
        assert_eq!(frame.timestamp, Duration::from_millis(500));
        assert_eq!(frame.frame_size, (640, 480));
        assert!(recording.landmark_frame(1).is_none());
    }

    #[test]
    fn test_unrepresentable_timestamps_clamp_to_zero() {
        let mut recording = Recording::new(640, 480);
        for timestamp in [-1.0, 1e30, f64::NAN] {
            recording.frames.push(RecordedFrame {
                timestamp,
                hands: vec![],
                spawn: None,
            });
            assert_eq!(recording.duration(), Duration::ZERO);
        }
        assert_eq!(recording.timestamp(1), Some(Duration::ZERO));
    }
}
