// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local-space containment tests for scene shapes.
//!
//! Every test in this crate answers one question: does a point, already
//! expressed in the coordinate frame the shape is defined in, land on the
//! shape? Walking the ownership chain and translating points into that frame
//! is the scene graph's job; this crate only does the geometry.
//!
//! # Shapes
//!
//! - [`Rect`] is half-open: the top and left edges are inside, the bottom and
//!   right edges are not. A point on the corner opposite the origin misses.
//! - [`Ellipse`] uses the ellipse equation `dx²/rx² + dy²/ry² <= 1` rather than
//!   its bounding box. A degenerate ellipse (either radius zero) never hits.
//! - [`stroke::StrokedLine`] hits when the point is within its pick
//!   tolerance of the segment.
//!
//! # Example
//!
//! ```
//! use kurbo::{Ellipse, Point, Rect};
//! use trellis_hit::LocalHit;
//!
//! let bounds = Rect::new(0.0, 0.0, 20.0, 10.0);
//! let oval = Ellipse::from_rect(bounds);
//!
//! // The corner is inside the bounding box but outside the oval.
//! let corner = Point::new(1.0, 1.0);
//! assert!(bounds.contains_local(corner));
//! assert!(!oval.contains_local(corner));
//! ```

#![no_std]

use kurbo::{Ellipse, Point, Rect};

/// Stroke-oriented containment tests.
pub mod stroke;

/// Containment test in the shape's own coordinate frame.
pub trait LocalHit {
    /// Returns `true` when `pt` lands on the shape.
    fn contains_local(&self, pt: Point) -> bool;
}

impl LocalHit for Rect {
    fn contains_local(&self, pt: Point) -> bool {
        self.contains(pt)
    }
}

/// Only axis-aligned ellipses are supported; rotation is ignored.
impl LocalHit for Ellipse {
    fn contains_local(&self, pt: Point) -> bool {
        let radii = self.radii();
        if radii.x == 0.0 || radii.y == 0.0 {
            return false;
        }
        let d = pt - self.center();
        (d.x * d.x) / (radii.x * radii.x) + (d.y * d.y) / (radii.y * radii.y) <= 1.0
    }
}
