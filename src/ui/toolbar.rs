// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback and region toolbar.

/// Result of toolbar interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    None,
    TogglePlay,
    Step,
    Restart,
    ToggleVisible,
    SetVolumeEnabled(bool),
    Spawn(String),
}

/// State the toolbar displays.
pub struct ToolbarState<'a> {
    pub playing: bool,
    pub has_recording: bool,
    pub regions_visible: bool,
    pub volume_enabled: bool,
    pub spawn_text: &'a mut String,
}

pub fn show(ui: &mut egui::Ui, state: ToolbarState<'_>) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let ToolbarState {
        playing,
        has_recording,
        regions_visible,
        volume_enabled,
        spawn_text,
    } = state;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.add_enabled_ui(has_recording, |ui| {
            let play_label = if playing { "⏸ Pause" } else { "▶ Play" };
            if ui.button(play_label).clicked() {
                action = ToolbarAction::TogglePlay;
            }
            if ui.button("⏭ Step").clicked() {
                action = ToolbarAction::Step;
            }
            if ui.button("⏮ Restart").clicked() {
                action = ToolbarAction::Restart;
            }
        });

        ui.separator();

        let visible_label = if regions_visible { "Hide regions" } else { "Show regions" };
        if ui.button(visible_label).clicked() {
            action = ToolbarAction::ToggleVisible;
        }

        let mut volume = volume_enabled;
        if ui.checkbox(&mut volume, "Volume gesture").changed() {
            action = ToolbarAction::SetVolumeEnabled(volume);
        }

        ui.separator();

        ui.label("Spawn:");
        let response = ui.add(
            egui::TextEdit::singleline(&mut *spawn_text)
                .hint_text("content id")
                .desired_width(140.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.button("Request").clicked() || submitted) && !spawn_text.trim().is_empty() {
            action = ToolbarAction::Spawn(spawn_text.trim().to_string());
            spawn_text.clear();
        }
    });

    action
}
