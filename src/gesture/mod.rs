// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Gesture classifiers: per-frame pinch, proximity and rotation detection.

pub mod classifier;
pub mod close;
pub mod volume;
