// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region list and event log panel.

use crate::models::region::{Region, RegionId};
use crate::quad::session::Mode;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    CloseRegion(RegionId),
}

pub fn show(ui: &mut egui::Ui, regions: &[Region], mode: Mode, event_log: &[String]) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Regions");
    ui.label(format!("Mode: {:?}", mode));
    ui.separator();

    if regions.is_empty() {
        ui.label(egui::RichText::new("No open regions").weak());
    }
    for region in regions {
        ui.horizontal(|ui| {
            ui.label(region.id.to_string());
            if let Some(content) = &region.content {
                ui.label(egui::RichText::new(content).strong());
            }
            if ui.small_button("✖").on_hover_text("Close region").clicked() {
                action = PropertiesAction::CloseRegion(region.id);
            }
        });
        ui.label(
            egui::RichText::new(format!(
                "{:.0}x{:.0} at ({:.0}, {:.0})",
                region.quad.width(),
                region.quad.height(),
                region.quad.points[0].x,
                region.quad.points[0].y
            ))
            .small()
            .weak(),
        );
    }

    ui.separator();
    ui.heading("Events");
    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for line in event_log {
                ui.label(egui::RichText::new(line).monospace());
            }
        });

    action
}
