// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Replay canvas.
//!
//! Draws the backdrop, the open regions with their controls, the create
//! outline and the tracked hands, scaled to fit the panel.

use crate::dispatch::sinks::MediaAction;
use crate::driver::{FrameOutput, RenderRegion, CONTROLS, CONTROL_RADIUS};
use crate::gesture::classifier::is_pinched;
use crate::models::landmarks::Point;
use crate::models::region::Quad;
use crate::util::geometry::Perspective;

/// Frame pixels to screen mapping for one paint.
struct View {
    rect: egui::Rect,
    scale: f32,
}

impl View {
    fn pos(&self, p: Point) -> egui::Pos2 {
        egui::pos2(
            self.rect.min.x + p.x as f32 * self.scale,
            self.rect.min.y + p.y as f32 * self.scale,
        )
    }

    fn quad(&self, quad: &Quad) -> Vec<egui::Pos2> {
        quad.points.iter().map(|&p| self.pos(p)).collect()
    }
}

/// Display the frame. `frame_size` is the capture resolution.
pub fn show(
    ui: &mut egui::Ui,
    frame_size: (u32, u32),
    backdrop: &Option<egui::TextureHandle>,
    output: &FrameOutput,
    content_size: (f64, f64),
    pinch_threshold: f64,
) {
    let available = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available);
        let (fw, fh) = (frame_size.0.max(1) as f32, frame_size.1.max(1) as f32);

        // Fit the frame, preserving aspect ratio.
        let scale = (available.x / fw).min(available.y / fh);
        let size = egui::vec2(fw * scale, fh * scale);
        let offset = (available - size) / 2.0;
        let view = View {
            rect: egui::Rect::from_min_size(ui.min_rect().min + offset, size),
            scale,
        };
        let painter = ui.painter_at(view.rect);

        match backdrop {
            Some(texture) => painter.image(
                texture.id(),
                view.rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            ),
            None => painter.rect_filled(view.rect, 0.0, egui::Color32::from_gray(25)),
        };

        for region in &output.regions {
            draw_region(&painter, &view, region, content_size);
        }

        if let Some(outline) = &output.outline {
            painter.add(egui::Shape::closed_line(
                view.quad(outline),
                egui::Stroke::new(2.0, egui::Color32::LIGHT_BLUE),
            ));
        }

        for hand in &output.hands {
            let pinched = is_pinched(hand.thumb_tip, hand.index_tip, pinch_threshold);
            let color = if pinched {
                egui::Color32::GREEN
            } else {
                egui::Color32::from_rgb(255, 160, 0)
            };
            let (thumb, index) = (view.pos(hand.thumb_tip), view.pos(hand.index_tip));
            painter.line_segment(
                [view.pos(hand.wrist), view.pos(hand.middle_base)],
                egui::Stroke::new(1.0, egui::Color32::GRAY),
            );
            painter.line_segment([thumb, index], egui::Stroke::new(2.0, color));
            for p in [thumb, index] {
                painter.circle_filled(p, 5.0, color);
                painter.circle_stroke(p, 5.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
            }
            painter.text(
                view.pos(hand.wrist),
                egui::Align2::CENTER_TOP,
                format!("hand {}", hand.id.0),
                egui::FontId::proportional(12.0),
                egui::Color32::WHITE,
            );
        }

        if let Some(level) = output.volume {
            painter.text(
                view.rect.left_bottom() + egui::vec2(10.0, -10.0),
                egui::Align2::LEFT_BOTTOM,
                format!("Volume {}%", level),
                egui::FontId::proportional(18.0),
                egui::Color32::WHITE,
            );
        }
    });
}

fn draw_region(painter: &egui::Painter, view: &View, region: &RenderRegion, content_size: (f64, f64)) {
    let alpha = (region.opacity.clamp(0.0, 1.0) * 255.0) as u8;
    let fill = egui::Color32::from_rgba_unmultiplied(30, 30, 40, alpha / 2);
    let edge = egui::Color32::from_rgba_unmultiplied(255, 220, 0, alpha);

    painter.add(egui::Shape::convex_polygon(
        view.quad(&region.quad),
        fill,
        egui::Stroke::new(2.0, edge),
    ));

    let label = match &region.content {
        Some(content) => format!("{} · {}", region.id, content),
        None => region.id.to_string(),
    };
    painter.text(
        view.pos(region.quad.points[0]) + egui::vec2(6.0, 4.0),
        egui::Align2::LEFT_TOP,
        label,
        egui::FontId::proportional(14.0),
        edge,
    );

    let Some(to_screen) = Perspective::rect_to_quad(content_size, &region.quad) else {
        return;
    };
    for (action, center) in CONTROLS {
        let Some(screen) = to_screen.apply(center) else {
            continue;
        };
        let Some(rim) = to_screen.apply(Point::new(center.x + CONTROL_RADIUS, center.y)) else {
            continue;
        };
        let c = view.pos(screen);
        let radius = (view.pos(rim) - c).length();
        painter.circle_stroke(c, radius, egui::Stroke::new(1.5, edge));
        painter.text(
            c,
            egui::Align2::CENTER_CENTER,
            match action {
                MediaAction::Previous => "⏮",
                MediaAction::PlayPause => "⏯",
                MediaAction::Next => "⏭",
            },
            egui::FontId::proportional(radius.max(8.0)),
            edge,
        );
    }
}
