// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: object arena, containers, z-order.

use std::sync::Arc;

use kurbo::{Point, Rect, Size, Vec2};
use log::{debug, warn};

use crate::color::Color;
use crate::damage::RedrawQueue;
use crate::error::{Result, SceneError};
use crate::event::{Listeners, RouteState};
use crate::paint::OffscreenBuffer;
use crate::shape::{ObjectKind, Shape};
use crate::types::{ContainerId, ObjectFlags, ObjectId};

/// Construction-time settings for a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    /// Clear to [`background`](Self::background) through an offscreen buffer
    /// before painting children.
    pub opaque: bool,
    /// Background fill of an opaque surface.
    pub background: Color,
    /// Color for objects with no color anywhere in their chain.
    pub foreground: Color,
    /// Schedule a redraw on every mutation of an attached object.
    pub auto_repaint: bool,
    /// Pick distance, in local units, around line segments.
    pub line_tolerance: f64,
    /// Initial physical size of the surface.
    pub size: Size,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            opaque: true,
            background: Color::WHITE,
            foreground: Color::BLACK,
            auto_repaint: true,
            line_tolerance: 1.5,
            size: Size::ZERO,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) generation: u32,
    pub(crate) parent: Option<ContainerId>,
    pub(crate) location: Point,
    pub(crate) color: Option<Color>,
    pub(crate) rotation: f64,
    pub(crate) anchor: Vec2,
    pub(crate) flags: ObjectFlags,
    pub(crate) body: Body,
    pub(crate) listeners: Listeners,
}

impl Node {
    fn new(generation: u32, body: Body) -> Self {
        Self {
            generation,
            parent: None,
            location: Point::ZERO,
            color: None,
            rotation: 0.0,
            anchor: Vec2::ZERO,
            flags: ObjectFlags::default(),
            body,
            listeners: Listeners::default(),
        }
    }

    pub(crate) fn kind(&self) -> ObjectKind {
        match &self.body {
            Body::Shape(shape) => shape.kind(),
            Body::Compound(_) => ObjectKind::Compound,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Body {
    Shape(Shape),
    Compound(Group),
}

/// Membership and routing memory of a compound.
#[derive(Debug, Default)]
pub(crate) struct Group {
    pub(crate) children: Vec<ObjectId>,
    pub(crate) sealed: bool,
    pub(crate) route: RouteState,
}

/// The drawing surface and every object created for it.
///
/// `Scene` is the root container ([`ContainerId::Surface`]) and the arena that
/// owns all objects, attached or not. Objects are addressed by [`ObjectId`];
/// compounds double as containers through [`ContainerId::Compound`].
///
/// ## Example
///
/// ```rust
/// use kurbo::Point;
/// use trellis_scene::{ContainerId, Scene, Shape};
///
/// let mut scene = Scene::new();
/// let back = scene.create(Shape::rect(10.0, 10.0));
/// let front = scene.create(Shape::rect(10.0, 10.0));
/// scene.add_at(ContainerId::Surface, back, 0.0, 0.0).unwrap();
/// scene.add_at(ContainerId::Surface, front, 5.0, 5.0).unwrap();
///
/// // Topmost wins inside the overlap.
/// assert_eq!(scene.element_at(ContainerId::Surface, Point::new(7.0, 7.0)), Some(front));
///
/// scene.send_to_back(front);
/// assert_eq!(scene.element_at(ContainerId::Surface, Point::new(7.0, 7.0)), Some(back));
/// ```
pub struct Scene {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// surface children, back to front
    children: Vec<ObjectId>,
    /// surface children that take part in event routing, back to front
    pub(crate) eligible: Vec<ObjectId>,
    pub(crate) route: RouteState,
    pub(crate) config: SceneConfig,
    pub(crate) size: Size,
    pub(crate) buffer: Option<OffscreenBuffer>,
    redraw: Arc<RedrawQueue>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("children", &self.children)
            .field("eligible", &self.eligible)
            .field("size", &self.size)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with [`SceneConfig::default`].
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty scene.
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            children: Vec::new(),
            eligible: Vec::new(),
            route: RouteState::default(),
            config,
            size: config.size,
            buffer: None,
            redraw: Arc::new(RedrawQueue::new()),
        }
    }

    /// The queue redraw requests are raised on.
    ///
    /// Clone the `Arc` to drain requests from the host's UI thread.
    pub fn redraw_queue(&self) -> &Arc<RedrawQueue> {
        &self.redraw
    }

    // --- arena ---

    pub(crate) fn insert_node(&mut self, body: Body) -> ObjectId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, body));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ObjectId uses 32-bit slot indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, body)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ObjectId uses 32-bit slot indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        ObjectId::new(idx, generation)
    }

    /// Create a detached leaf object.
    pub fn create(&mut self, shape: Shape) -> ObjectId {
        let kind = shape.kind();
        let id = self.insert_node(Body::Shape(shape));
        debug!("created {} {:?}", kind.name(), id);
        id
    }

    /// Returns `true` if `id` refers to a live object.
    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    pub(crate) fn ensure_alive(&self, id: ObjectId) -> Result<()> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(SceneError::StaleObject(id))
        }
    }

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: ObjectId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling ObjectId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: ObjectId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling ObjectId")
    }

    pub(crate) fn node_opt(&self, id: ObjectId) -> Option<&Node> {
        self.is_alive(id).then(|| self.node(id))
    }

    pub(crate) fn node_opt_mut(&mut self, id: ObjectId) -> Option<&mut Node> {
        if self.is_alive(id) {
            Some(self.node_mut(id))
        } else {
            None
        }
    }

    pub(crate) fn group(&self, id: ObjectId) -> Result<&Group> {
        match &self.node_opt(id).ok_or(SceneError::StaleObject(id))?.body {
            Body::Compound(group) => Ok(group),
            Body::Shape(_) => Err(SceneError::NotAContainer(id)),
        }
    }

    pub(crate) fn group_mut(&mut self, id: ObjectId) -> Result<&mut Group> {
        match &mut self
            .node_opt_mut(id)
            .ok_or(SceneError::StaleObject(id))?
            .body
        {
            Body::Compound(group) => Ok(group),
            Body::Shape(_) => Err(SceneError::NotAContainer(id)),
        }
    }

    /// Destroy an object: detach it and free it together with its compound
    /// subtree. Its id, and the ids of everything inside it, become stale.
    ///
    /// Fails with [`SceneError::Sealed`] if its parent is a sealed compound.
    pub fn destroy(&mut self, id: ObjectId) -> Result<()> {
        self.ensure_alive(id)?;
        if let Some(parent) = self.node(id).parent {
            self.check_unsealed(parent)?;
            self.unlink(parent, id);
            self.after_structure_change(parent);
        }
        self.free_subtree(id);
        debug!("destroyed {id:?}");
        Ok(())
    }

    fn free_subtree(&mut self, id: ObjectId) {
        let children = match &self.node(id).body {
            Body::Compound(group) => group.children.clone(),
            Body::Shape(_) => Vec::new(),
        };
        for child in children {
            self.free_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    // --- containers ---

    /// The ordered children of `container`, back to front.
    pub fn children(&self, container: ContainerId) -> Result<&[ObjectId]> {
        match container {
            ContainerId::Surface => Ok(&self.children),
            ContainerId::Compound(id) => Ok(&self.group(id)?.children),
        }
    }

    fn sequence_mut(&mut self, container: ContainerId) -> Result<&mut Vec<ObjectId>> {
        match container {
            ContainerId::Surface => Ok(&mut self.children),
            ContainerId::Compound(id) => Ok(&mut self.group_mut(id)?.children),
        }
    }

    pub(crate) fn check_unsealed(&self, container: ContainerId) -> Result<()> {
        if let ContainerId::Compound(id) = container
            && self.group(id)?.sealed
        {
            warn!("refused to change the membership of sealed compound {id:?}");
            return Err(SceneError::Sealed(id));
        }
        Ok(())
    }

    /// Whether `ancestor` encloses `id` through a chain of compounds.
    pub(crate) fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut cur = self.node_opt(id).and_then(|n| n.parent);
        while let Some(ContainerId::Compound(p)) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.node_opt(p).and_then(|n| n.parent);
        }
        false
    }

    fn unlink(&mut self, container: ContainerId, child: ObjectId) {
        if let Ok(seq) = self.sequence_mut(container) {
            seq.retain(|&c| c != child);
        }
        self.node_mut(child).parent = None;
    }

    /// Add `child` as the frontmost element of `container`.
    ///
    /// If `child` already belongs to a container it is removed from there
    /// first; the move happens in one step, so no caller ever observes it in
    /// both containers or in neither. Re-adding a child to its own container
    /// brings it to the front.
    ///
    /// Fails without changing anything if either container is a sealed
    /// compound, or if `child` is a compound enclosing `container`.
    pub fn add(&mut self, container: ContainerId, child: ObjectId) -> Result<()> {
        self.ensure_alive(child)?;
        self.children(container)?;
        self.check_unsealed(container)?;
        if let ContainerId::Compound(target) = container
            && (target == child || self.is_ancestor(child, target))
        {
            return Err(SceneError::WouldCycle { child, container });
        }
        let old = self.node(child).parent;
        if let Some(old) = old
            && old != container
        {
            self.check_unsealed(old)?;
        }

        if let Some(old) = old {
            self.unlink(old, child);
        }
        self.sequence_mut(container)?.push(child);
        self.node_mut(child).parent = Some(container);
        debug!("added {child:?} to {container:?}");

        if let Some(old) = old
            && old != container
        {
            self.after_structure_change(old);
        }
        self.after_structure_change(container);
        Ok(())
    }

    /// [`add`](Self::add), then move the child to `(x, y)` in the container's frame.
    pub fn add_at(&mut self, container: ContainerId, child: ObjectId, x: f64, y: f64) -> Result<()> {
        self.add(container, child)?;
        self.set_location(child, Point::new(x, y));
        Ok(())
    }

    /// Remove `child` from `container`.
    ///
    /// Removing an object that is not in `container` does nothing.
    pub fn remove(&mut self, container: ContainerId, child: ObjectId) -> Result<()> {
        self.children(container)?;
        self.check_unsealed(container)?;
        if self.children(container)?.contains(&child) {
            self.unlink(container, child);
            debug!("removed {child:?} from {container:?}");
            self.after_structure_change(container);
        }
        Ok(())
    }

    /// Remove every child of `container`, detaching each one.
    pub fn remove_all(&mut self, container: ContainerId) -> Result<()> {
        self.children(container)?;
        self.check_unsealed(container)?;
        let removed = core::mem::take(self.sequence_mut(container)?);
        for &child in &removed {
            self.node_mut(child).parent = None;
        }
        debug!("removed {} children from {container:?}", removed.len());
        self.after_structure_change(container);
        Ok(())
    }

    /// Number of children in `container`.
    pub fn element_count(&self, container: ContainerId) -> Result<usize> {
        Ok(self.children(container)?.len())
    }

    /// The child at `index`, numbering from back to front.
    pub fn element(&self, container: ContainerId, index: usize) -> Result<ObjectId> {
        let children = self.children(container)?;
        children
            .get(index)
            .copied()
            .ok_or(SceneError::IndexOutOfRange {
                index,
                len: children.len(),
            })
    }

    /// The topmost child of `container` containing `pt`, given in the
    /// container's own frame.
    pub fn element_at(&self, container: ContainerId, pt: Point) -> Option<ObjectId> {
        self.topmost(self.children(container).ok()?, pt)
    }

    pub(crate) fn topmost(&self, candidates: &[ObjectId], pt: Point) -> Option<ObjectId> {
        candidates
            .iter()
            .rev()
            .copied()
            .find(|&id| self.contains(id, pt))
    }

    // --- z-order ---

    fn restack(&mut self, id: ObjectId, place: impl FnOnce(usize, usize) -> usize) {
        let Some(parent) = self.node_opt(id).and_then(|n| n.parent) else {
            return;
        };
        let Ok(seq) = self.sequence_mut(parent) else {
            return;
        };
        let Some(index) = seq.iter().position(|&c| c == id) else {
            return;
        };
        let at = place(index, seq.len() - 1);
        if at == index {
            return;
        }
        seq.remove(index);
        seq.insert(at, id);
        self.after_structure_change(parent);
    }

    /// Move `id` to the front of its container. No-op when detached.
    pub fn send_to_front(&mut self, id: ObjectId) {
        self.restack(id, |_, len| len);
    }

    /// Move `id` to the back of its container. No-op when detached.
    pub fn send_to_back(&mut self, id: ObjectId) {
        self.restack(id, |_, _| 0);
    }

    /// Move `id` one step toward the front. No-op at the front.
    pub fn send_forward(&mut self, id: ObjectId) {
        self.restack(id, |index, len| (index + 1).min(len));
    }

    /// Move `id` one step toward the back. No-op at the back.
    pub fn send_backward(&mut self, id: ObjectId) {
        self.restack(id, |index, _| index.saturating_sub(1));
    }

    // --- eligibility & repaint ---

    /// Whether `id` has ever had a listener, itself or anywhere below it.
    pub(crate) fn is_eligible(&self, id: ObjectId) -> bool {
        let Some(node) = self.node_opt(id) else {
            return false;
        };
        if node.flags.contains(ObjectFlags::LISTENING) {
            return true;
        }
        match &node.body {
            Body::Compound(group) => group.children.iter().any(|&c| self.is_eligible(c)),
            Body::Shape(_) => false,
        }
    }

    pub(crate) fn refresh_eligible(&mut self) {
        self.eligible = self
            .children
            .iter()
            .copied()
            .filter(|&c| self.is_eligible(c))
            .collect();
    }

    fn after_structure_change(&mut self, container: ContainerId) {
        self.refresh_eligible();
        match container {
            ContainerId::Surface => self.conditional_repaint(),
            ContainerId::Compound(id) => self.repaint_object(id),
        }
    }

    /// Whether the ownership chain of `id` ends at the surface.
    pub fn is_on_surface(&self, id: ObjectId) -> bool {
        let mut cur = self.node_opt(id).and_then(|n| n.parent);
        loop {
            match cur {
                Some(ContainerId::Surface) => return true,
                Some(ContainerId::Compound(p)) => cur = self.node_opt(p).and_then(|n| n.parent),
                None => return false,
            }
        }
    }

    /// Request a redraw for a change to `id`. Detached objects are ignored.
    pub(crate) fn repaint_object(&self, id: ObjectId) {
        if self.is_on_surface(id) {
            self.conditional_repaint();
        }
    }

    pub(crate) fn conditional_repaint(&self) {
        if self.config.auto_repaint {
            self.repaint();
        }
    }

    /// Request a redraw of the whole surface, regardless of auto-repaint.
    pub fn repaint(&self) {
        self.redraw
            .request_redraw(Rect::from_origin_size(Point::ZERO, self.size));
    }

    // --- surface settings ---

    /// Whether mutations schedule redraws on their own.
    pub fn auto_repaint(&self) -> bool {
        self.config.auto_repaint
    }

    /// Turn automatic redraw requests on or off.
    pub fn set_auto_repaint(&mut self, enabled: bool) {
        self.config.auto_repaint = enabled;
    }

    /// Whether the surface clears its background before painting.
    pub fn is_opaque(&self) -> bool {
        self.config.opaque
    }

    /// Make the surface opaque or transparent.
    pub fn set_opaque(&mut self, opaque: bool) {
        self.config.opaque = opaque;
        self.conditional_repaint();
    }

    /// Background fill of an opaque surface.
    pub fn background(&self) -> Color {
        self.config.background
    }

    /// Change the background fill.
    pub fn set_background(&mut self, color: Color) {
        self.config.background = color;
        self.conditional_repaint();
    }

    /// Color inherited by objects with no color of their own.
    pub fn foreground(&self) -> Color {
        self.config.foreground
    }

    /// Change the inherited default color.
    pub fn set_foreground(&mut self, color: Color) {
        self.config.foreground = color;
        self.conditional_repaint();
    }

    /// Pick tolerance around lines.
    pub fn line_tolerance(&self) -> f64 {
        self.config.line_tolerance
    }

    /// Current physical size of the surface.
    pub fn surface_size(&self) -> Size {
        self.size
    }
}
