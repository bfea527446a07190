// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The manipulation session: which mode the quad manager is in and the
//! anchors that mode needs. Only one session exists at a time, so drag,
//! resize and create are mutually exclusive by construction.

use std::time::Duration;

use crate::models::landmarks::HandId;
use crate::models::region::{Corner, Quad, RegionId};

/// Session mode without its payload, for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Creating,
    Dragging,
    Resizing,
}

/// Hand bound to a corner for the length of a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerBinding {
    pub hand: HandId,
    pub corner: Corner,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ManipulationSession {
    #[default]
    Idle,
    /// Two pinching hands outline a region that is not committed yet.
    Creating {
        /// When the current pinch configuration first appeared.
        since: Duration,
        outline: Quad,
    },
    /// One hand moves a region rigidly by one of its corners.
    Dragging {
        region: RegionId,
        hand: HandId,
        corner: Corner,
        /// Pinch center minus corner at grab time.
        offset: (f64, f64),
    },
    /// Two hands hold diagonally opposite corners.
    Resizing {
        region: RegionId,
        bindings: [CornerBinding; 2],
    },
}

impl ManipulationSession {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Idle => Mode::Idle,
            Self::Creating { .. } => Mode::Creating,
            Self::Dragging { .. } => Mode::Dragging,
            Self::Resizing { .. } => Mode::Resizing,
        }
    }

    /// The region under manipulation, if any.
    pub fn region(&self) -> Option<RegionId> {
        match self {
            Self::Dragging { region, .. } | Self::Resizing { region, .. } => Some(*region),
            Self::Idle | Self::Creating { .. } => None,
        }
    }
}
