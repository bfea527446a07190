// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Adapters from dispatched values to external services.
//!
//! The media player and system mixer are outside this program; they are
//! reached through shell command templates from the settings file. Without a
//! template the value is only logged.

use std::fmt::Display;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use super::CommandSink;

/// Playback controls drawn inside a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaAction {
    Previous,
    PlayPause,
    Next,
}

impl MediaAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Previous => "previous",
            Self::PlayPause => "play-pause",
            Self::Next => "next",
        }
    }
}

impl Display for MediaAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logs every value it receives.
pub struct LogSink {
    label: String,
}

impl LogSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl<T: Display> CommandSink<T> for LogSink {
    fn apply(&mut self, value: T) -> Result<()> {
        log::info!("{}: {}", self.label, value);
        Ok(())
    }
}

/// Substitute `{value}` in a command template.
pub fn render_template(template: &str, value: &dyn Display) -> String {
    template.replace("{value}", &value.to_string())
}

/// Run a command line through the platform shell and require success.
fn run_shell(command_line: &str) -> Result<()> {
    let status = if cfg!(windows) {
        Command::new("cmd").args(["/C", command_line]).status()
    } else {
        Command::new("sh").args(["-c", command_line]).status()
    }
    .with_context(|| format!("Failed to run `{}`", command_line))?;

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("`{}` exited with {}", command_line, status))
    }
}

/// Runs a shell command for every value, e.g. a mixer CLI call.
pub struct ShellCommandSink {
    template: String,
}

impl ShellCommandSink {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl<T: Display> CommandSink<T> for ShellCommandSink {
    fn apply(&mut self, value: T) -> Result<()> {
        let line = render_template(&self.template, &value);
        log::debug!("Running `{}`", line);
        run_shell(&line)
    }
}

/// One optional command per media control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaCommands {
    pub play_pause: Option<String>,
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl MediaCommands {
    pub fn command_for(&self, action: MediaAction) -> Option<&str> {
        match action {
            MediaAction::PlayPause => self.play_pause.as_deref(),
            MediaAction::Next => self.next.as_deref(),
            MediaAction::Previous => self.previous.as_deref(),
        }
    }
}

impl CommandSink<MediaAction> for MediaCommands {
    fn apply(&mut self, action: MediaAction) -> Result<()> {
        match self.command_for(action) {
            Some(line) => run_shell(line),
            None => {
                log::info!("media: {}", action);
                Ok(())
            }
        }
    }
}

/// Pick the volume sink for an optional command template.
pub fn volume_sink(template: Option<&str>) -> Box<dyn CommandSink<u8>> {
    match template {
        Some(t) => Box::new(ShellCommandSink::new(t)),
        None => Box::new(LogSink::new("volume")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        assert_eq!(
            render_template("amixer set Master {value}%", &42u8),
            "amixer set Master 42%"
        );
        assert_eq!(
            render_template("playerctl {value}", &MediaAction::PlayPause),
            "playerctl play-pause"
        );
    }

    #[test]
    fn test_unconfigured_media_action_is_logged() {
        let mut commands = MediaCommands::default();
        assert!(commands.apply(MediaAction::Next).is_ok());
        assert_eq!(commands.command_for(MediaAction::Next), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_sink_reports_failure() {
        let mut ok = ShellCommandSink::new("test {value} -eq 7");
        assert!(CommandSink::<u8>::apply(&mut ok, 7).is_ok());
        assert!(CommandSink::<u8>::apply(&mut ok, 8).is_err());
    }
}
