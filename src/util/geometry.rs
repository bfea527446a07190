// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module converts normalized tracker coordinates to frame pixels and
//! holds basic point math plus the perspective transform that maps a
//! region's quad onto its content rectangle.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

use crate::models::landmarks::{Landmark, Point};
use crate::models::region::Quad;

/// Convert a normalized landmark to pixel coordinates.
pub fn denormalize_coordinates(landmark: &Landmark, width: u32, height: u32) -> Point {
    Point::new(landmark.x * width as f64, landmark.y * height as f64)
}

pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Axis-aligned bounding rectangle of a point set.
pub fn bounding_rect(points: &[Point]) -> Option<Quad> {
    let first = points.first()?;
    let (mut left, mut top, mut right, mut bottom) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        left = left.min(p.x);
        right = right.max(p.x);
        top = top.min(p.y);
        bottom = bottom.max(p.y);
    }
    Some(Quad::from_edges(left, top, right, bottom))
}

/// A 3x3 projective transform with the last element fixed to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    h: Matrix3<f64>,
}

impl Perspective {
    /// Transform that maps the quad's corners onto the rectangle
    /// `(0,0) (w,0) (w,h) (0,h)`. `None` when the quad is degenerate.
    pub fn quad_to_rect(quad: &Quad, size: (f64, f64)) -> Option<Self> {
        Self::between(&quad.points, &rect_corners(size))
    }

    /// Inverse of [`Perspective::quad_to_rect`]: content space to screen.
    pub fn rect_to_quad(size: (f64, f64), quad: &Quad) -> Option<Self> {
        Self::between(&rect_corners(size), &quad.points)
    }

    /// Transform taking each `src` corner onto the matching `dst` corner.
    /// `None` when three corners of either side are collinear.
    pub fn between(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        if has_collinear_triple(src) || has_collinear_triple(dst) {
            return None;
        }

        // Eight equations in the eight unknown coefficients.
        let mut rows = Vec::with_capacity(64);
        let mut rhs = Vec::with_capacity(8);
        for (s, d) in src.iter().zip(dst.iter()) {
            rows.extend_from_slice(&[s.x, s.y, 1.0, 0.0, 0.0, 0.0, -d.x * s.x, -d.x * s.y]);
            rows.extend_from_slice(&[0.0, 0.0, 0.0, s.x, s.y, 1.0, -d.y * s.x, -d.y * s.y]);
            rhs.extend_from_slice(&[d.x, d.y]);
        }
        let a = SMatrix::<f64, 8, 8>::from_row_slice(&rows);
        let b = SVector::<f64, 8>::from_column_slice(&rhs);
        let coeffs = a.lu().solve(&b)?;
        if coeffs.iter().any(|c| !c.is_finite()) {
            return None;
        }

        let mut h = [1.0; 9];
        h[..8].copy_from_slice(coeffs.as_slice());
        Some(Self {
            h: Matrix3::from_row_slice(&h),
        })
    }

    /// Apply the transform. `None` for points on the horizon line.
    pub fn apply(&self, p: Point) -> Option<Point> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        if w.abs() < 1e-10 {
            return None;
        }
        Some(Point::new(v[0] / w, v[1] / w))
    }
}

fn rect_corners((w, h): (f64, f64)) -> [Point; 4] {
    [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}

fn has_collinear_triple(points: &[Point; 4]) -> bool {
    const EPS: f64 = 1e-9;
    (0..4).any(|skip| {
        let mut it = (0..4).filter(|&i| i != skip).map(|i| points[i]);
        match (it.next(), it.next(), it.next()) {
            (Some(a), Some(b), Some(c)) => {
                ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs() < EPS
            }
            _ => true,
        }
    })
}
