// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recording timeline scrubber.

/// Show the scrubber. Returns the frame index the user moved to.
pub fn show(
    ui: &mut egui::Ui,
    current: usize,
    frame_count: usize,
    timestamp: f64,
    duration: f64,
) -> Option<usize> {
    if frame_count == 0 {
        ui.label(egui::RichText::new("No recording loaded").weak());
        return None;
    }

    let mut target = current.min(frame_count - 1);
    let mut seek = None;
    ui.horizontal(|ui| {
        ui.spacing_mut().slider_width = (ui.available_width() - 200.0).max(100.0);
        let response = ui.add(egui::Slider::new(&mut target, 0..=frame_count - 1).text("frame"));
        if response.changed() {
            seek = Some(target);
        }
        ui.label(format!("{:.2}s / {:.2}s", timestamp, duration));
    });
    seek
}
