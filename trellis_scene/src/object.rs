// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object properties: placement, bounds, containment, color, visibility.
//!
//! Getters return `None` for stale ids and setters ignore them. Every setter
//! on an object attached to the surface requests a redraw, subject to the
//! auto-repaint flag.

use core::fmt::Write as _;

use kurbo::{Point, Rect, Size, Vec2};

use crate::color::Color;
use crate::scene::{Body, Scene};
use crate::shape::{ObjectKind, Shape};
use crate::types::{ContainerId, ObjectFlags, ObjectId};

impl Scene {
    /// The concrete kind of `id`.
    pub fn kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.node_opt(id).map(|n| n.kind())
    }

    /// The container `id` currently belongs to.
    pub fn parent(&self, id: ObjectId) -> Option<ContainerId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Location of `id` in its parent's frame.
    pub fn location(&self, id: ObjectId) -> Option<Point> {
        self.node_opt(id).map(|n| n.location)
    }

    /// Move `id` to `pt` in its parent's frame.
    pub fn set_location(&mut self, id: ObjectId, pt: Point) {
        if let Some(n) = self.node_opt_mut(id) {
            n.location = pt;
            self.repaint_object(id);
        }
    }

    /// Move `id` by `(dx, dy)`.
    pub fn move_by(&mut self, id: ObjectId, dx: f64, dy: f64) {
        if let Some(pt) = self.location(id) {
            self.set_location(id, pt + Vec2::new(dx, dy));
        }
    }

    /// Move `id` by `r` units in direction `theta`, in degrees.
    ///
    /// Zero degrees points along +x and angles grow counterclockwise on
    /// screen, so with y growing downward the y offset is `-r * sin(theta)`.
    pub fn move_polar(&mut self, id: ObjectId, r: f64, theta: f64) {
        let angle = theta.to_radians();
        self.move_by(id, r * angle.cos(), -r * angle.sin());
    }

    /// Smallest axis-aligned rectangle covering `id`, in its parent's frame.
    ///
    /// Rotation is a paint-time effect and does not change bounds. A compound
    /// covers the union of its children; an empty one is a zero-size
    /// rectangle at its location.
    pub fn bounds(&self, id: ObjectId) -> Option<Rect> {
        let node = self.node_opt(id)?;
        Some(match &node.body {
            Body::Shape(shape) => shape.bounds_at(node.location),
            Body::Compound(group) => group
                .children
                .iter()
                .filter_map(|&c| self.bounds(c))
                .reduce(|acc, r| acc.union(r))
                .map(|r| r + node.location.to_vec2())
                .unwrap_or_else(|| Rect::from_origin_size(node.location, Size::ZERO)),
        })
    }

    /// Size of the bounds of `id`.
    pub fn size(&self, id: ObjectId) -> Option<Size> {
        self.bounds(id).map(|r| r.size())
    }

    /// Width of the bounds of `id`.
    pub fn width(&self, id: ObjectId) -> Option<f64> {
        self.size(id).map(|s| s.width)
    }

    /// Height of the bounds of `id`.
    pub fn height(&self, id: ObjectId) -> Option<f64> {
        self.size(id).map(|s| s.height)
    }

    /// Whether `pt`, in the parent's frame of `id`, lands on the object.
    ///
    /// Ovals and lines test their exact shape; a compound contains a point
    /// when any child contains it.
    pub fn contains(&self, id: ObjectId, pt: Point) -> bool {
        let Some(node) = self.node_opt(id) else {
            return false;
        };
        match &node.body {
            Body::Shape(shape) => shape.contains_at(node.location, pt, self.config.line_tolerance),
            Body::Compound(group) => {
                let local = pt - node.location.to_vec2();
                group.children.iter().any(|&c| self.contains(c, local))
            }
        }
    }

    /// Set or clear the color override of `id`.
    pub fn set_color(&mut self, id: ObjectId, color: Option<Color>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.color = color;
            self.repaint_object(id);
        }
    }

    /// The color override of `id` itself, if any.
    pub fn object_color(&self, id: ObjectId) -> Option<Color> {
        self.node_opt(id).and_then(|n| n.color)
    }

    /// The color `id` paints with.
    ///
    /// Walks up through enclosing compounds until one has a color. An object
    /// inside the surface falls back to its foreground; a detached object
    /// with no color anywhere in its chain is black.
    pub fn color(&self, id: ObjectId) -> Color {
        let mut cur = id;
        loop {
            let Some(node) = self.node_opt(cur) else {
                return Color::BLACK;
            };
            if let Some(color) = node.color {
                return color;
            }
            match node.parent {
                Some(ContainerId::Compound(p)) => cur = p,
                Some(ContainerId::Surface) => return self.config.foreground,
                None => return Color::BLACK,
            }
        }
    }

    /// Show or hide `id`. Hidden objects are still hit-testable.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) {
        if let Some(n) = self.node_opt_mut(id) {
            n.flags.set(ObjectFlags::VISIBLE, visible);
            self.repaint_object(id);
        }
    }

    /// Whether `id` paints.
    pub fn is_visible(&self, id: ObjectId) -> bool {
        self.node_opt(id)
            .is_some_and(|n| n.flags.contains(ObjectFlags::VISIBLE))
    }

    /// State bits of `id`.
    pub fn flags(&self, id: ObjectId) -> Option<ObjectFlags> {
        self.node_opt(id).map(|n| n.flags)
    }

    /// Rotation of `id`, in radians, applied at paint time.
    pub fn rotation(&self, id: ObjectId) -> Option<f64> {
        self.node_opt(id).map(|n| n.rotation)
    }

    /// Rotate `id` by `radians` around its location plus anchor.
    pub fn set_rotation(&mut self, id: ObjectId, radians: f64) {
        if let Some(n) = self.node_opt_mut(id) {
            n.rotation = radians;
            self.repaint_object(id);
        }
    }

    /// Rotation anchor of `id`, relative to its location.
    pub fn rotation_anchor(&self, id: ObjectId) -> Option<Vec2> {
        self.node_opt(id).map(|n| n.anchor)
    }

    /// Set the point rotation pivots around, relative to the location.
    pub fn set_rotation_anchor(&mut self, id: ObjectId, anchor: Vec2) {
        if let Some(n) = self.node_opt_mut(id) {
            n.anchor = anchor;
            self.repaint_object(id);
        }
    }

    /// The shape of a leaf object.
    pub fn shape(&self, id: ObjectId) -> Option<&Shape> {
        match &self.node_opt(id)?.body {
            Body::Shape(shape) => Some(shape),
            Body::Compound(_) => None,
        }
    }

    /// Edit the shape of a leaf object in place, then repaint.
    ///
    /// Returns `None` for compounds and stale ids. The closure may change
    /// anything but the kind, which is kept as created.
    pub fn update_shape<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut Shape) -> R) -> Option<R> {
        let Body::Shape(shape) = &mut self.node_opt_mut(id)?.body else {
            return None;
        };
        let kind = shape.kind();
        let mut edited = shape.clone();
        let out = f(&mut edited);
        if edited.kind() == kind {
            *shape = edited;
        }
        self.repaint_object(id);
        Some(out)
    }

    /// Resize a rectangle, oval or image. Other kinds are left alone.
    pub fn set_size(&mut self, id: ObjectId, width: f64, height: f64) {
        self.update_shape(id, |s| s.set_size(Size::new(width, height)));
    }

    /// Turn interior filling on or off for a rectangle or oval.
    pub fn set_filled(&mut self, id: ObjectId, filled: bool) {
        self.update_shape(id, |s| {
            if let Some(fill) = s.fill_mut() {
                fill.filled = filled;
            }
        });
    }

    /// Whether `id` fills its interior.
    pub fn is_filled(&self, id: ObjectId) -> bool {
        self.shape(id)
            .and_then(Shape::fill)
            .is_some_and(|f| f.filled)
    }

    /// Set or clear the interior color of a rectangle or oval.
    pub fn set_fill_color(&mut self, id: ObjectId, color: Option<Color>) {
        self.update_shape(id, |s| {
            if let Some(fill) = s.fill_mut() {
                fill.color = color;
            }
        });
    }

    /// The interior color of `id`: its fill color, else its resolved color.
    pub fn fill_color(&self, id: ObjectId) -> Color {
        self.shape(id)
            .and_then(Shape::fill)
            .and_then(|f| f.color)
            .unwrap_or_else(|| self.color(id))
    }

    /// A short human-readable description, e.g.
    /// `Rect[bounds=(0.0, 0.0, 10.0, 10.0), color=RED, filled=true]`.
    ///
    /// Resizable kinds report their bounds, others their location. The color
    /// is listed only when the object has its own.
    pub fn describe(&self, id: ObjectId) -> Option<String> {
        let node = self.node_opt(id)?;
        let kind = node.kind();
        let mut out = format!("{}[", kind.name());
        if kind.is_resizable() {
            let r = self.bounds(id)?;
            let _ = write!(
                out,
                "bounds=({:?}, {:?}, {:?}, {:?})",
                r.x0,
                r.y0,
                r.width(),
                r.height()
            );
        } else {
            let _ = write!(out, "location=({:?}, {:?})", node.location.x, node.location.y);
        }
        if let Some(color) = node.color {
            let _ = write!(out, ", color={color}");
        }
        if let Some(fill) = self.shape(id).and_then(Shape::fill) {
            let _ = write!(out, ", filled={}", fill.filled);
            if let Some(fill_color) = fill.color
                && Some(fill_color) != node.color
            {
                let _ = write!(out, ", fillColor={fill_color}");
            }
        }
        out.push(']');
        Some(out)
    }
}
