// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region data structures.
//!
//! A region is a quadrilateral in frame-pixel space with corners ordered
//! top-left, top-right, bottom-right, bottom-left. Regions built or resized
//! by gestures are always axis-aligned rectangles.

use super::landmarks::Point;
use serde::{Deserialize, Serialize};

/// Corner of a quad, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Position of this corner in the quad's point array.
    pub fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomRight => 2,
            Corner::BottomLeft => 3,
        }
    }

    /// The diagonally opposite corner.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomRight => Corner::TopLeft,
            Corner::BottomLeft => Corner::TopRight,
        }
    }

    pub fn is_diagonal_to(self, other: Corner) -> bool {
        self.opposite() == other
    }
}

/// Four corner points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    /// Axis-aligned rectangle from its edges.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            points: [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
        }
    }

    pub fn corner(&self, corner: Corner) -> Point {
        self.points[corner.index()]
    }

    pub fn set_corner(&mut self, corner: Corner, point: Point) {
        self.points[corner.index()] = point;
    }

    pub fn width(&self) -> f64 {
        self.corner(Corner::TopRight).x - self.corner(Corner::TopLeft).x
    }

    pub fn height(&self) -> f64 {
        self.corner(Corner::BottomLeft).y - self.corner(Corner::TopLeft).y
    }

    /// Move every corner by the same delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in self.points.iter_mut() {
            p.x += dx;
            p.y += dy;
        }
    }

    /// Place two diagonal corners and rebuild the other two so the quad stays
    /// an axis-aligned rectangle.
    ///
    /// Crossed hands collapse the rectangle to zero width or height instead of
    /// inverting it.
    pub fn set_diagonal(&mut self, a: Corner, a_pos: Point, b: Corner, b_pos: Point) {
        debug_assert!(a.is_diagonal_to(b));
        // Normalize to the TL/BR or TR/BL ordering.
        let (first, first_pos, mut second_pos) = match a {
            Corner::TopLeft | Corner::TopRight => (a, a_pos, b_pos),
            Corner::BottomRight | Corner::BottomLeft => (b, b_pos, a_pos),
        };
        second_pos.y = second_pos.y.max(first_pos.y);
        second_pos.x = match first {
            Corner::TopLeft => second_pos.x.max(first_pos.x),
            _ => second_pos.x.min(first_pos.x),
        };
        self.set_corner(first, first_pos);
        self.set_corner(first.opposite(), second_pos);
        match first {
            Corner::TopLeft => {
                self.set_corner(Corner::TopRight, Point::new(second_pos.x, first_pos.y));
                self.set_corner(Corner::BottomLeft, Point::new(first_pos.x, second_pos.y));
            }
            _ => {
                self.set_corner(Corner::TopLeft, Point::new(second_pos.x, first_pos.y));
                self.set_corner(Corner::BottomRight, Point::new(first_pos.x, second_pos.y));
            }
        }
    }

    /// True when opposite edges share their coordinate.
    #[cfg(test)]
    pub fn is_axis_aligned(&self) -> bool {
        let [tl, tr, br, bl] = self.points;
        tl.y == tr.y && bl.y == br.y && tl.x == bl.x && tr.x == br.x
    }
}

/// Identifier handed out by the quad manager, never reused in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub u64);

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "region {}", self.0)
    }
}

/// An open region and the content shown inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub quad: Quad,
    #[serde(default)]
    pub content: Option<String>,
}
