// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region manipulation: the session type and the quad manager.

pub mod manager;
pub mod session;
