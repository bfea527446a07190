// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings come from an optional YAML or JSON file (chosen by extension),
//! then environment overrides, then validation. Every field has a default so
//! a partial file, or no file, is valid.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::dispatch::sinks::MediaCommands;
use crate::dispatch::DispatchSettings;
use crate::gesture::volume::VolumeGesture;
use crate::io::serialization::{read_document, write_document};
use crate::quad::manager::ManagerSettings;

pub const CONFIG_ENV: &str = "PINCHQUAD_CONFIG";
const HOLD_ENV: &str = "PINCHQUAD_HOLD_SECS";
const VOLUME_COMMAND_ENV: &str = "PINCHQUAD_VOLUME_COMMAND";

/// Upper bound for every duration setting, one day.
const MAX_DURATION_SECS: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    pub pinch_threshold: f64,
    pub grab_distance: f64,
    pub close_zone: f64,
    pub rotation_threshold_deg: f64,
    /// Armed close trackers older than this re-arm. Zero disables the timeout.
    pub close_timeout_secs: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            pinch_threshold: 50.0,
            grab_distance: 50.0,
            close_zone: 150.0,
            rotation_threshold_deg: 17.0,
            close_timeout_secs: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionSettings {
    pub hold_secs: f64,
    pub min_size: f64,
    pub opacity: f32,
    /// Content-space size used to place the in-region controls.
    pub content_size: (f64, f64),
    pub default_content: Option<String>,
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            hold_secs: 2.0,
            min_size: 20.0,
            opacity: 0.9,
            content_size: (400.0, 150.0),
            default_content: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSettings {
    pub enabled: bool,
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_change: u8,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            min_distance: 20.0,
            max_distance: 200.0,
            min_change: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub min_interval_secs: f64,
    pub poll_secs: f64,
    pub shutdown_timeout_secs: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: 0.5,
            poll_secs: 0.1,
            shutdown_timeout_secs: 1.0,
        }
    }
}

/// External commands. `{value}` in the volume command is replaced with the
/// level. Unset commands are only logged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSettings {
    pub volume: Option<String>,
    #[serde(flatten)]
    pub media: MediaCommands,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gesture: GestureSettings,
    pub regions: RegionSettings,
    pub volume: VolumeSettings,
    pub dispatch: DispatchConfig,
    pub commands: CommandSettings,
}

impl Settings {
    /// Load from `path` (or `PINCHQUAD_CONFIG`), apply environment overrides
    /// and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok().filter(|p| !p.trim().is_empty());
        let path = path.map(Path::to_path_buf).or_else(|| env_path.map(Into::into));

        let mut settings = match path {
            Some(path) => {
                log::info!("Loading settings from {}", path.display());
                read_document(&path)
                    .with_context(|| format!("Failed to read settings {}", path.display()))?
            }
            None => Settings::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_document(self, path)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(hold) = var(HOLD_ENV) {
            self.regions.hold_secs = hold
                .trim()
                .parse()
                .map_err(|_| anyhow!("{} must be a number of seconds", HOLD_ENV))?;
        }
        if let Some(command) = var(VOLUME_COMMAND_ENV) {
            if !command.trim().is_empty() {
                self.commands.volume = Some(command);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let g = &self.gesture;
        for (name, value) in [
            ("gesture.pinch_threshold", g.pinch_threshold),
            ("gesture.grab_distance", g.grab_distance),
            ("gesture.close_zone", g.close_zone),
            ("gesture.rotation_threshold_deg", g.rotation_threshold_deg),
            ("regions.min_size", self.regions.min_size),
            ("regions.content_size.0", self.regions.content_size.0),
            ("regions.content_size.1", self.regions.content_size.1),
            ("dispatch.poll_secs", self.dispatch.poll_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                bail!("{} must be greater than zero (got {})", name, value);
            }
        }
        for (name, value) in [
            ("gesture.close_timeout_secs", g.close_timeout_secs),
            ("regions.hold_secs", self.regions.hold_secs),
            ("dispatch.min_interval_secs", self.dispatch.min_interval_secs),
            ("dispatch.shutdown_timeout_secs", self.dispatch.shutdown_timeout_secs),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                bail!("{} must not be negative (got {})", name, value);
            }
        }
        for (name, value) in [
            ("gesture.close_timeout_secs", g.close_timeout_secs),
            ("regions.hold_secs", self.regions.hold_secs),
            ("dispatch.min_interval_secs", self.dispatch.min_interval_secs),
            ("dispatch.poll_secs", self.dispatch.poll_secs),
            ("dispatch.shutdown_timeout_secs", self.dispatch.shutdown_timeout_secs),
        ] {
            if value > MAX_DURATION_SECS {
                bail!("{} must be at most {} seconds (got {})", name, MAX_DURATION_SECS, value);
            }
        }
        if g.close_zone < g.grab_distance {
            bail!(
                "gesture.close_zone ({}) must be at least gesture.grab_distance ({})",
                g.close_zone,
                g.grab_distance
            );
        }
        if !(0.0..=1.0).contains(&self.regions.opacity) {
            bail!("regions.opacity must be between 0 and 1");
        }
        if self.volume.max_distance <= self.volume.min_distance {
            bail!("volume.max_distance must exceed volume.min_distance");
        }
        Ok(())
    }

    pub fn manager_settings(&self) -> ManagerSettings {
        let g = &self.gesture;
        ManagerSettings {
            pinch_threshold: g.pinch_threshold,
            grab_distance: g.grab_distance,
            close_zone: g.close_zone,
            rotation_threshold: g.rotation_threshold_deg,
            close_timeout: (g.close_timeout_secs > 0.0).then(|| secs(g.close_timeout_secs)),
            hold: secs(self.regions.hold_secs),
            min_size: self.regions.min_size,
            default_content: self.regions.default_content.clone(),
        }
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            min_interval: secs(self.dispatch.min_interval_secs),
            poll: secs(self.dispatch.poll_secs),
            shutdown_timeout: secs(self.dispatch.shutdown_timeout_secs),
        }
    }

    pub fn volume_gesture(&self) -> VolumeGesture {
        let v = &self.volume;
        let mut gesture = VolumeGesture::new(v.min_distance, v.max_distance, v.min_change);
        gesture.set_enabled(v.enabled);
        gesture
    }
}

/// Seconds to a `Duration`, clamped to the validated range. NaN maps to zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.clamp(0.0, MAX_DURATION_SECS)).unwrap_or_default()
}
