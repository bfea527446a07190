// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Backdrop image loading.
//!
//! Recordings may reference a still of the scene; it is decoded to RGBA so
//! the viewer can upload it as a texture.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Decoded image, 8-bit RGBA rows.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: img.into_raw(),
    })
}

/// Resolve a media path stored in a recording against the recording's
/// directory.
pub fn resolve_media_path(recording_path: &Path, media_file: &str) -> PathBuf {
    let media = Path::new(media_file);
    if media.is_absolute() {
        return media.to_path_buf();
    }
    recording_path
        .parent()
        .map(|dir| dir.join(media))
        .unwrap_or_else(|| media.to_path_buf())
}
