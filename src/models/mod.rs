// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: tracker input, regions and recordings.

pub mod landmarks;
pub mod recording;
pub mod region;
