// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroked outlines.

use kurbo::{Line, ParamCurveNearest, Point};

use crate::LocalHit;

/// A hairline segment picked within a tolerance of its centerline.
///
/// Zero-length segments still hit within the tolerance of their single point,
/// so a line collapsed onto one pixel stays pickable.
#[derive(Clone, Copy, Debug)]
pub struct StrokedLine {
    /// The centerline in local coordinates.
    pub line: Line,
    /// Pick distance around the centerline, in local units.
    pub tolerance: f64,
}

impl StrokedLine {
    /// A segment picked within `tolerance` of `line`.
    pub const fn new(line: Line, tolerance: f64) -> Self {
        Self { line, tolerance }
    }
}

impl LocalHit for StrokedLine {
    fn contains_local(&self, pt: Point) -> bool {
        let nearest = self.line.nearest(pt, 1e-9);
        nearest.distance_sq <= self.tolerance * self.tolerance
    }
}
