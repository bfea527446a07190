// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O for recordings, layouts, settings and backdrop images.

pub mod media;
pub mod serialization;
