// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compounds: objects that are also containers with their own frame.

use kurbo::{Point, Vec2};
use log::debug;

use crate::error::Result;
use crate::scene::{Body, Group, Scene};
use crate::types::{ContainerId, ObjectId};

impl Scene {
    /// Create an empty, detached compound.
    pub fn create_compound(&mut self) -> ObjectId {
        let id = self.insert_node(Body::Compound(Group::default()));
        debug!("created Compound {id:?}");
        id
    }

    /// Freeze the membership of a compound.
    ///
    /// Afterwards [`add`](Self::add), [`remove`](Self::remove) and
    /// [`remove_all`](Self::remove_all) on it fail with
    /// [`SceneError::Sealed`](crate::SceneError::Sealed). Children can still be
    /// moved, recolored and restacked. There is no way back.
    pub fn mark_as_complete(&mut self, compound: ObjectId) -> Result<()> {
        self.group_mut(compound)?.sealed = true;
        debug!("sealed {compound:?}");
        Ok(())
    }

    /// Whether [`mark_as_complete`](Self::mark_as_complete) has been called.
    pub fn is_complete(&self, compound: ObjectId) -> bool {
        self.group(compound).is_ok_and(|g| g.sealed)
    }

    /// Scale `id` by `(sx, sy)`.
    ///
    /// Leaves scale their own extent; labels don't scale. A compound scales
    /// every child's location and, recursively, every scalable child. However
    /// many objects change, at most one redraw is requested.
    pub fn scale(&mut self, id: ObjectId, sx: f64, sy: f64) {
        if !self.is_alive(id) {
            return;
        }
        let saved = self.config.auto_repaint;
        self.config.auto_repaint = false;
        self.scale_inner(id, sx, sy);
        self.config.auto_repaint = saved;
        self.repaint_object(id);
    }

    fn scale_inner(&mut self, id: ObjectId, sx: f64, sy: f64) {
        let children = match &mut self.node_mut(id).body {
            Body::Shape(shape) => {
                shape.scale(sx, sy);
                return;
            }
            Body::Compound(group) => group.children.clone(),
        };
        for &child in children.iter().rev() {
            let node = self.node_mut(child);
            node.location = Point::new(node.location.x * sx, node.location.y * sy);
            self.scale_inner(child, sx, sy);
        }
    }

    /// Uniform [`scale`](Self::scale).
    pub fn scale_uniform(&mut self, id: ObjectId, factor: f64) {
        self.scale(id, factor, factor);
    }

    /// Sum of the locations of `compound` and every compound enclosing it.
    fn frame_offset(&self, compound: ObjectId) -> Option<Vec2> {
        self.group(compound).ok()?;
        let mut offset = Vec2::ZERO;
        let mut cur = Some(ContainerId::Compound(compound));
        while let Some(ContainerId::Compound(c)) = cur {
            let node = self.node_opt(c)?;
            offset += node.location.to_vec2();
            cur = node.parent;
        }
        Some(offset)
    }

    /// Convert `pt` from the frame of `compound` to surface coordinates.
    ///
    /// The walk stops at the first container that is not a compound, so a
    /// detached compound converts relative to its outermost ancestor.
    pub fn local_to_surface(&self, compound: ObjectId, pt: Point) -> Option<Point> {
        Some(pt + self.frame_offset(compound)?)
    }

    /// Convert `pt` from surface coordinates to the frame of `compound`.
    pub fn surface_to_local(&self, compound: ObjectId, pt: Point) -> Option<Point> {
        Some(pt - self.frame_offset(compound)?)
    }
}
