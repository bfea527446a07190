// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recording and layout serialization.
//!
//! Recordings, region layouts and settings are stored as YAML or JSON. The
//! format is chosen from the file extension; anything other than `.json`
//! is treated as YAML.

use crate::models::recording::Recording;
use crate::models::region::Region;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Export any serializable document, format by extension.
pub fn write_document<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    let text = match Format::from_path(path) {
        Format::Yaml => serde_yaml::to_string(data)?,
        Format::Json => serde_json::to_string_pretty(data)?,
    };
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Import any deserializable document, format by extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data = match Format::from_path(path) {
        Format::Yaml => serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
        Format::Json => serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
    };
    Ok(data)
}

pub fn import_recording(path: &Path) -> Result<Recording> {
    let recording: Recording = read_document(path)?;
    log::info!(
        "Loaded recording {} ({} frames, {}x{})",
        path.display(),
        recording.frames.len(),
        recording.frame_width,
        recording.frame_height
    );
    Ok(recording)
}

pub fn export_recording(recording: &Recording, path: &Path) -> Result<()> {
    write_document(recording, path)?;
    log::info!("Saved recording ({} frames) to {}", recording.frames.len(), path.display());
    Ok(())
}

/// Snapshot of the open regions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub frame_width: u32,
    pub frame_height: u32,
    pub regions: Vec<Region>,
}

pub fn export_layout(layout: &Layout, path: &Path) -> Result<()> {
    write_document(layout, path)?;
    log::info!("Exported {} region(s) to {}", layout.regions.len(), path.display());
    Ok(())
}

#[cfg(test)]
pub fn import_layout(path: &Path) -> Result<Layout> {
    read_document(path)
}
