// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Replay viewer state and egui App implementation.
//!
//! The viewer plays a recorded landmark session through the frame driver,
//! either in real time or one frame at a time, and draws what the renderer
//! would receive. Seeking replays the recording from the first frame so the
//! region state is always the one the gestures produced.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::dispatch::ShutdownStatus;
use crate::driver::{DriverEvent, FrameDriver, FrameOutput};
use crate::io::media::{load_image, resolve_media_path, LoadedImage};
use crate::io::serialization::{export_layout, export_recording, import_recording};
use crate::models::recording::Recording;
use crate::ui::{canvas, properties, timeline, toolbar};

const EVENT_LOG_LIMIT: usize = 200;

/// Result of background recording loading.
struct LoadedRecording {
    path: PathBuf,
    recording: Recording,
    backdrop: Option<LoadedImage>,
}

/// Anchor between wall time and recording time while playing.
struct PlayClock {
    started: Instant,
    origin: Duration,
}

pub struct PinchQuadApp {
    settings: Settings,
    driver: FrameDriver,

    recording: Option<Recording>,
    recording_path: Option<PathBuf>,
    /// Index of the next frame to process.
    cursor: usize,
    clock: Option<PlayClock>,
    output: FrameOutput,

    event_log: VecDeque<String>,
    spawn_text: String,

    backdrop: Option<egui::TextureHandle>,
    loader: Option<Receiver<Result<LoadedRecording, String>>>,
    loading_message: Option<String>,
}

impl PinchQuadApp {
    pub fn new(settings: Settings, driver: FrameDriver) -> Self {
        Self {
            settings,
            driver,
            recording: None,
            recording_path: None,
            cursor: 0,
            clock: None,
            output: FrameOutput::default(),
            event_log: VecDeque::new(),
            spawn_text: String::new(),
            backdrop: None,
            loader: None,
            loading_message: None,
        }
    }

    /// Load a recording and its backdrop image (asynchronously).
    pub fn open_recording(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.loader = Some(receiver);
        self.loading_message = Some(format!("Loading {}...", path.display()));

        std::thread::spawn(move || {
            let result = (|| -> Result<LoadedRecording, String> {
                let recording = import_recording(&path).map_err(|e| format!("{:#}", e))?;

                let backdrop = match &recording.media_file {
                    Some(media) => {
                        let image_path = resolve_media_path(&path, media);
                        match load_image(&image_path) {
                            Ok(image) => Some(image),
                            Err(e) => {
                                log::warn!("Backdrop unavailable: {:#}", e);
                                None
                            }
                        }
                    }
                    None => None,
                };

                Ok(LoadedRecording {
                    path,
                    recording,
                    backdrop,
                })
            })();

            let _ = sender.send(result);
        });
    }

    fn frame_size(&self) -> (u32, u32) {
        self.recording
            .as_ref()
            .map(|r| (r.frame_width, r.frame_height))
            .unwrap_or((1280, 720))
    }

    fn frame_count(&self) -> usize {
        self.recording.as_ref().map_or(0, |r| r.frames.len())
    }

    fn timestamp_at(&self, idx: usize) -> Option<Duration> {
        self.recording.as_ref()?.timestamp(idx)
    }

    fn log_event(&mut self, line: String) {
        self.event_log.push_back(line);
        while self.event_log.len() > EVENT_LOG_LIMIT {
            self.event_log.pop_front();
        }
    }

    fn record_events(&mut self, events: &[DriverEvent]) {
        for event in events {
            if matches!(event, DriverEvent::VolumeSubmitted(_)) {
                continue;
            }
            let time = self
                .timestamp_at(self.cursor.saturating_sub(1))
                .unwrap_or_default();
            self.log_event(format!("{:>7.2}s  {}", time.as_secs_f64(), event));
        }
    }

    /// Process the next frame. False at the end of the recording.
    fn step(&mut self) -> bool {
        let Some(recording) = self.recording.as_ref() else {
            return false;
        };
        let Some(output) = self.driver.process_recorded(recording, self.cursor) else {
            return false;
        };
        self.cursor += 1;
        let events = output.events.clone();
        self.output = output;
        self.record_events(&events);
        true
    }

    /// Replay from the first frame up to and including `target`.
    fn seek(&mut self, target: usize) {
        self.driver.reset();
        self.cursor = 0;
        self.output = FrameOutput::default();
        self.log_event(format!("-- seek to frame {} --", target));
        while self.cursor <= target && self.step() {}
        if self.clock.is_some() {
            self.start_clock();
        }
    }

    fn start_clock(&mut self) {
        let origin = self
            .timestamp_at(self.cursor.saturating_sub(1))
            .filter(|_| self.cursor > 0)
            .unwrap_or_default();
        self.clock = Some(PlayClock {
            started: Instant::now(),
            origin,
        });
    }

    fn toggle_play(&mut self) {
        if self.clock.take().is_none() {
            if self.cursor >= self.frame_count() {
                self.seek_to_start();
            }
            self.start_clock();
        }
    }

    fn seek_to_start(&mut self) {
        self.driver.reset();
        self.cursor = 0;
        self.output = FrameOutput::default();
    }

    /// Catch up with wall time while playing.
    fn advance_playback(&mut self) {
        let Some(clock) = &self.clock else {
            return;
        };
        let now = clock.origin + clock.started.elapsed();
        while let Some(next) = self.timestamp_at(self.cursor) {
            if next > now || !self.step() {
                break;
            }
        }
        if self.cursor >= self.frame_count() {
            log::info!("Replay finished");
            self.clock = None;
        }
    }

    fn export(&self, path: PathBuf) {
        if let Err(e) = export_layout(&self.driver.layout(), &path) {
            log::error!("Failed to export layout: {:#}", e);
        }
    }

    /// Write the loaded recording, converting format by extension.
    fn save_recording(&self, path: PathBuf) {
        let Some(recording) = &self.recording else {
            return;
        };
        if let Err(e) = export_recording(recording, &path) {
            log::error!("Failed to save recording: {:#}", e);
        }
    }

    fn handle_toolbar(&mut self, action: toolbar::ToolbarAction) {
        match action {
            toolbar::ToolbarAction::TogglePlay => self.toggle_play(),
            toolbar::ToolbarAction::Step => {
                self.clock = None;
                self.step();
            }
            toolbar::ToolbarAction::Restart => {
                self.seek_to_start();
                self.log_event("-- restart --".to_string());
            }
            toolbar::ToolbarAction::ToggleVisible => self.driver.toggle_visible(),
            toolbar::ToolbarAction::SetVolumeEnabled(enabled) => self.driver.set_volume_enabled(enabled),
            toolbar::ToolbarAction::Spawn(content) => {
                self.log_event(format!("spawn requested: {}", content));
                self.driver.request_spawn(content);
            }
            toolbar::ToolbarAction::None => {}
        }
    }

    /// Join the command dispatchers before the window goes away.
    fn stop_dispatch(&mut self) -> ShutdownStatus {
        self.clock = None;
        let status = self.driver.shutdown();
        if status == ShutdownStatus::TimedOut {
            log::warn!("Command dispatch did not stop cleanly");
        }
        status
    }

    fn poll_loader(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.loader = None;
        self.loading_message = None;

        match result {
            Ok(loaded) => {
                self.backdrop = loaded.backdrop.map(|image| {
                    let size = [image.width as usize, image.height as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                    ctx.load_texture("backdrop", color_image, egui::TextureOptions::LINEAR)
                });
                self.log_event(format!(
                    "-- loaded {} ({} frames) --",
                    loaded.path.display(),
                    loaded.recording.frames.len()
                ));
                self.recording = Some(loaded.recording);
                self.recording_path = Some(loaded.path);
                self.clock = None;
                self.seek_to_start();
            }
            Err(e) => {
                log::error!("Failed to load recording: {}", e);
                self.log_event(format!("load failed: {}", e));
            }
        }
    }
}

impl eframe::App for PinchQuadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader(ctx);
        self.advance_playback();

        if self.loading_message.is_some() || self.clock.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Recording...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Recordings", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.open_recording(path);
                        }
                        ui.close_menu();
                    }
                    let reload = self.recording_path.clone();
                    if ui.add_enabled(reload.is_some(), egui::Button::new("Reload")).clicked() {
                        if let Some(path) = reload {
                            self.open_recording(path);
                        }
                        ui.close_menu();
                    }
                    let can_save = self.recording.is_some();
                    if ui.add_enabled(can_save, egui::Button::new("Save Recording As...")).clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Recordings", &["yaml", "yml", "json"])
                            .set_file_name("recording.yaml")
                            .save_file()
                        {
                            self.save_recording(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Export Layout...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Layout", &["yaml", "yml", "json"])
                            .set_file_name("layout.yaml")
                            .save_file()
                        {
                            self.export(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    toolbar::ToolbarState {
                        playing: self.clock.is_some(),
                        has_recording: self.recording.is_some(),
                        regions_visible: self.driver.manager().is_visible(),
                        volume_enabled: self.driver.volume_enabled(),
                        spawn_text: &mut self.spawn_text,
                    },
                )
            })
            .inner;
        self.handle_toolbar(toolbar_action);

        // Timeline
        let cursor = self.cursor.saturating_sub(1);
        let timestamp = self.timestamp_at(cursor).unwrap_or_default().as_secs_f64();
        let frame_count = self.frame_count();
        let duration = self
            .recording
            .as_ref()
            .map(|r| r.duration().as_secs_f64())
            .unwrap_or_default();
        let seek = egui::TopBottomPanel::bottom("timeline")
            .show(ctx, |ui| timeline::show(ui, cursor, frame_count, timestamp, duration))
            .inner;
        if let Some(target) = seek {
            self.seek(target);
        }

        // Region list and event log
        let log: Vec<String> = self.event_log.iter().cloned().collect();
        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| {
                let manager = self.driver.manager();
                properties::show(ui, manager.regions(), manager.mode(), &log)
            })
            .inner;
        if let properties::PropertiesAction::CloseRegion(id) = properties_action {
            if let Some(event) = self.driver.close(id) {
                self.log_event(format!("{} (from list)", event));
                self.output.regions.retain(|r| r.id != id);
            }
        }

        // Keyboard shortcuts, unless a text field has focus
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::Space)) && self.recording.is_some() {
                self.toggle_play();
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
                self.clock = None;
                self.step();
            }
            if ctx.input(|i| i.key_pressed(egui::Key::H)) {
                self.driver.toggle_visible();
            }
        }

        // Main canvas (center)
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref message) = self.loading_message {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.spinner();
                        ui.add_space(10.0);
                        ui.label(
                            egui::RichText::new(message)
                                .size(16.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                    });
                });
            } else {
                canvas::show(
                    ui,
                    self.frame_size(),
                    &self.backdrop,
                    &self.output,
                    self.driver.content_size(),
                    self.settings.gesture.pinch_threshold,
                );
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.stop_dispatch();
    }
}
