// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mouse event routing.
//!
//! Routing happens in two steps. [`Scene::route_mouse_event`] runs the
//! routing state machine and returns a [`Routed`] list of deliveries without
//! calling any listener; [`Routed::deliver`] then calls them. Listeners never
//! run while the scene is borrowed, so they are free to lock a
//! [`SharedScene`](crate::SharedScene) and mutate it.
//!
//! ## State machine
//!
//! Each dispatch scope (the surface and every compound routing into its
//! children) remembers the child the pointer is over and the child holding
//! drag capture. For every incoming event:
//!
//! 1. Find the topmost eligible child under the pointer. Eligible children
//!    have had a listener attached, themselves or somewhere inside them.
//! 2. If that differs from the remembered one, send `Exited` to the old child
//!    and `Entered` to the new one.
//! 3. The target is the capture holder if there is one, else the hit.
//! 4. `Pressed` gives the target capture and `Released` clears it. `Dragged`
//!    with nobody holding capture is dropped.
//!
//! A compound without listeners of its own passes events down by running the
//! same machine over its children, in its own frame and with its own memory.
//! A compound with listeners takes events itself.

use core::cell::Cell;
use core::fmt;
use std::sync::Arc;

use kurbo::Point;
use log::trace;
use smallvec::SmallVec;

use crate::scene::{Body, Scene};
use crate::types::{ObjectFlags, ObjectId};

/// Kind of a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// A button went down.
    Pressed,
    /// A button went up.
    Released,
    /// A press and release without motion in between.
    Clicked,
    /// The pointer moved onto an object.
    Entered,
    /// The pointer moved off an object.
    Exited,
    /// The pointer moved with no button down.
    Moved,
    /// The pointer moved with a button down.
    Dragged,
}

impl MouseEventKind {
    /// `Entered` and `Exited`.
    pub const fn is_crossing(self) -> bool {
        matches!(self, Self::Entered | Self::Exited)
    }

    /// Kinds handled by [`MouseMotionListener`].
    pub const fn is_motion(self) -> bool {
        matches!(self, Self::Moved | Self::Dragged)
    }
}

bitflags::bitflags! {
    /// Keyboard modifiers and buttons held during a pointer event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        /// Shift.
        const SHIFT   = 1 << 0;
        /// Control.
        const CONTROL = 1 << 1;
        /// Alt / Option.
        const ALT     = 1 << 2;
        /// Meta / Command.
        const META    = 1 << 3;
        /// Primary button.
        const BUTTON1 = 1 << 4;
        /// Middle button.
        const BUTTON2 = 1 << 5;
        /// Secondary button.
        const BUTTON3 = 1 << 6;
    }
}

/// Pointer input from the host, in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseEvent {
    /// What happened.
    pub kind: MouseEventKind,
    /// Where, in surface coordinates.
    pub point: Point,
    /// Modifiers and buttons held.
    pub modifiers: Modifiers,
    /// Click count for press, release and click events.
    pub click_count: u32,
    /// Host timestamp in milliseconds.
    pub when: u64,
}

impl MouseEvent {
    /// An event with no modifiers, no clicks, at time zero.
    pub fn new(kind: MouseEventKind, point: impl Into<Point>) -> Self {
        Self {
            kind,
            point: point.into(),
            modifiers: Modifiers::empty(),
            click_count: 0,
            when: 0,
        }
    }

    /// Set the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the click count.
    pub fn with_click_count(mut self, click_count: u32) -> Self {
        self.click_count = click_count;
        self
    }

    /// Set the timestamp.
    pub fn at(mut self, when: u64) -> Self {
        self.when = when;
        self
    }
}

/// An event as delivered to one object.
#[derive(Debug)]
pub struct ObjectEvent {
    kind: MouseEventKind,
    source: ObjectId,
    point: Point,
    local_point: Point,
    modifiers: Modifiers,
    click_count: u32,
    when: u64,
    consumed: Cell<bool>,
}

impl ObjectEvent {
    /// What happened; may differ from the input for synthesized crossings.
    pub fn kind(&self) -> MouseEventKind {
        self.kind
    }

    /// The object the event is delivered to.
    pub fn source(&self) -> ObjectId {
        self.source
    }

    /// Pointer position in surface coordinates.
    pub fn point(&self) -> Point {
        self.point
    }

    /// Pointer position in the frame the source's location is expressed in.
    ///
    /// Differences of this point can be applied directly with
    /// [`Scene::move_by`], whatever the nesting depth.
    pub fn local_point(&self) -> Point {
        self.local_point
    }

    /// Modifiers and buttons held.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Click count.
    pub fn click_count(&self) -> u32 {
        self.click_count
    }

    /// Host timestamp in milliseconds.
    pub fn when(&self) -> u64 {
        self.when
    }

    /// Mark the event as handled.
    pub fn consume(&self) {
        self.consumed.set(true);
    }

    /// Whether a listener consumed the event.
    pub fn is_consumed(&self) -> bool {
        self.consumed.get()
    }
}

/// Receives button and crossing events for an object.
pub trait MouseListener: Send + Sync {
    /// A button went down over the object.
    fn mouse_pressed(&self, _event: &ObjectEvent) {}
    /// A button went up after a press on the object.
    fn mouse_released(&self, _event: &ObjectEvent) {}
    /// The object was clicked.
    fn mouse_clicked(&self, _event: &ObjectEvent) {}
    /// The pointer moved onto the object.
    fn mouse_entered(&self, _event: &ObjectEvent) {}
    /// The pointer moved off the object.
    fn mouse_exited(&self, _event: &ObjectEvent) {}
}

/// Receives motion events for an object.
pub trait MouseMotionListener: Send + Sync {
    /// The pointer moved over the object.
    fn mouse_moved(&self, _event: &ObjectEvent) {}
    /// The pointer was dragged after a press on the object.
    fn mouse_dragged(&self, _event: &ObjectEvent) {}
}

#[derive(Clone, Default)]
pub(crate) struct Listeners {
    mouse: Vec<Arc<dyn MouseListener>>,
    motion: Vec<Arc<dyn MouseMotionListener>>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("mouse", &self.mouse.len())
            .field("motion", &self.motion.len())
            .finish()
    }
}

fn same<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[derive(Clone)]
enum Handler {
    Mouse(Arc<dyn MouseListener>),
    Motion(Arc<dyn MouseMotionListener>),
}

/// One event bound for one object, with the listeners it will reach.
pub struct Delivery {
    event: ObjectEvent,
    handlers: SmallVec<[Handler; 2]>,
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("event", &self.event)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Delivery {
    fn new(
        target: ObjectId,
        kind: MouseEventKind,
        input: &MouseEvent,
        local_point: Point,
        listeners: &Listeners,
    ) -> Self {
        let handlers = if kind.is_motion() {
            listeners.motion.iter().cloned().map(Handler::Motion).collect()
        } else {
            listeners.mouse.iter().cloned().map(Handler::Mouse).collect()
        };
        Self {
            event: ObjectEvent {
                kind,
                source: target,
                point: input.point,
                local_point,
                modifiers: input.modifiers,
                click_count: input.click_count,
                when: input.when,
                consumed: Cell::new(false),
            },
            handlers,
        }
    }

    /// The receiving object.
    pub fn target(&self) -> ObjectId {
        self.event.source
    }

    /// The delivered kind.
    pub fn kind(&self) -> MouseEventKind {
        self.event.kind
    }

    /// The delivered event.
    pub fn event(&self) -> &ObjectEvent {
        &self.event
    }

    /// Call every listener. Returns whether one of them consumed the event.
    pub fn deliver(&self) -> bool {
        let e = &self.event;
        for handler in &self.handlers {
            match (handler, e.kind) {
                (Handler::Mouse(l), MouseEventKind::Pressed) => l.mouse_pressed(e),
                (Handler::Mouse(l), MouseEventKind::Released) => l.mouse_released(e),
                (Handler::Mouse(l), MouseEventKind::Clicked) => l.mouse_clicked(e),
                (Handler::Mouse(l), MouseEventKind::Entered) => l.mouse_entered(e),
                (Handler::Mouse(l), MouseEventKind::Exited) => l.mouse_exited(e),
                (Handler::Motion(l), MouseEventKind::Moved) => l.mouse_moved(e),
                (Handler::Motion(l), MouseEventKind::Dragged) => l.mouse_dragged(e),
                _ => {}
            }
        }
        e.is_consumed()
    }
}

/// Deliveries computed for one input event, in order.
#[derive(Debug, Default)]
pub struct Routed {
    deliveries: Vec<Delivery>,
}

impl Routed {
    /// The deliveries, in the order they will run.
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// `(kind, target)` of each delivery.
    pub fn summary(&self) -> Vec<(MouseEventKind, ObjectId)> {
        self.deliveries
            .iter()
            .map(|d| (d.kind(), d.target()))
            .collect()
    }

    /// Whether the event reached no object.
    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Run every delivery. Returns whether any listener consumed its event.
    pub fn deliver(self) -> bool {
        self.deliveries
            .iter()
            .fold(false, |consumed, d| d.deliver() | consumed)
    }
}

/// Pointer memory of one dispatch scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RouteState {
    pub(crate) last_hit: Option<ObjectId>,
    pub(crate) capture: Option<ObjectId>,
}

impl Scene {
    /// Attach a mouse listener to `id`. Attaching the same `Arc` twice has no
    /// further effect.
    ///
    /// From then on the object is eligible for events, even if every listener
    /// is removed again.
    pub fn add_mouse_listener(&mut self, id: ObjectId, listener: Arc<dyn MouseListener>) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if !node.listeners.mouse.iter().any(|l| same(l, &listener)) {
            node.listeners.mouse.push(listener);
        }
        node.flags.insert(ObjectFlags::LISTENING);
        self.refresh_eligible();
    }

    /// Detach a mouse listener previously attached to `id`.
    pub fn remove_mouse_listener(&mut self, id: ObjectId, listener: &Arc<dyn MouseListener>) {
        if let Some(node) = self.node_opt_mut(id) {
            node.listeners.mouse.retain(|l| !same(l, listener));
        }
    }

    /// Attach a motion listener to `id`. Attaching the same `Arc` twice has no
    /// further effect.
    pub fn add_motion_listener(&mut self, id: ObjectId, listener: Arc<dyn MouseMotionListener>) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        if !node.listeners.motion.iter().any(|l| same(l, &listener)) {
            node.listeners.motion.push(listener);
        }
        node.flags.insert(ObjectFlags::LISTENING);
        self.refresh_eligible();
    }

    /// Detach a motion listener previously attached to `id`.
    pub fn remove_motion_listener(
        &mut self,
        id: ObjectId,
        listener: &Arc<dyn MouseMotionListener>,
    ) {
        if let Some(node) = self.node_opt_mut(id) {
            node.listeners.motion.retain(|l| !same(l, listener));
        }
    }

    /// The surface child the pointer was last over.
    pub fn hovered(&self) -> Option<ObjectId> {
        self.route.last_hit
    }

    /// The surface child holding drag capture.
    pub fn drag_capture(&self) -> Option<ObjectId> {
        self.route.capture
    }

    /// Run the routing state machine for `event` and return the deliveries
    /// without calling any listener.
    pub fn route_mouse_event(&mut self, event: &MouseEvent) -> Routed {
        let mut routed = Routed::default();
        let candidates = self.eligible.clone();
        let mut state = core::mem::take(&mut self.route);
        self.route_scope(&candidates, &mut state, event, event.kind, event.point, &mut routed);
        self.route = state;
        routed
    }

    /// Route `event` and call the listeners it reaches.
    ///
    /// Returns whether any listener consumed it.
    pub fn dispatch_mouse_event(&mut self, event: &MouseEvent) -> bool {
        self.route_mouse_event(event).deliver()
    }

    fn route_scope(
        &mut self,
        candidates: &[ObjectId],
        state: &mut RouteState,
        event: &MouseEvent,
        kind: MouseEventKind,
        pt: Point,
        routed: &mut Routed,
    ) {
        let hit = self.topmost(candidates, pt);
        if hit != state.last_hit {
            trace!("pointer crossed from {:?} to {:?}", state.last_hit, hit);
            if let Some(prev) = state.last_hit {
                self.fire(prev, MouseEventKind::Exited, event, pt, routed);
            }
            if let Some(next) = hit {
                self.fire(next, MouseEventKind::Entered, event, pt, routed);
            }
            state.last_hit = hit;
        }
        if kind.is_crossing() {
            return;
        }

        let capture = state.capture.filter(|&c| self.is_alive(c));
        let Some(target) = capture.or(hit) else {
            return;
        };
        match kind {
            MouseEventKind::Dragged if capture.is_none() => {
                trace!("dropped drag over {target:?} with no capture");
                return;
            }
            MouseEventKind::Pressed => {
                trace!("capture taken by {target:?}");
                state.capture = Some(target);
            }
            MouseEventKind::Released => {
                trace!("capture released by {target:?}");
                state.capture = None;
            }
            _ => {}
        }
        self.fire(target, kind, event, pt, routed);
    }

    /// Deliver to `id`, or route into its children if it is a compound with
    /// no listeners of its own. `pt` is in the parent frame of `id`.
    fn fire(
        &mut self,
        id: ObjectId,
        kind: MouseEventKind,
        event: &MouseEvent,
        pt: Point,
        routed: &mut Routed,
    ) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        let inner = match &node.body {
            Body::Compound(group) if !node.flags.contains(ObjectFlags::LISTENING) => {
                let candidates: Vec<ObjectId> = group
                    .children
                    .iter()
                    .copied()
                    .filter(|&c| self.is_eligible(c))
                    .collect();
                Some((pt - node.location.to_vec2(), candidates))
            }
            _ => None,
        };
        let Some((local, candidates)) = inner else {
            routed
                .deliveries
                .push(Delivery::new(id, kind, event, pt, &node.listeners));
            return;
        };
        let Ok(group) = self.group_mut(id) else {
            return;
        };
        let mut state = core::mem::take(&mut group.route);
        self.route_scope(&candidates, &mut state, event, kind, local, routed);
        if let Ok(group) = self.group_mut(id) {
            group.route = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::shape::Shape;
    use crate::types::ContainerId;

    use super::MouseEventKind::{Dragged, Entered, Exited, Moved, Pressed, Released};

    #[derive(Default)]
    struct Log {
        seen: Mutex<Vec<(MouseEventKind, ObjectId)>>,
        consume: bool,
    }

    impl Log {
        fn record(&self, e: &ObjectEvent) {
            self.seen.lock().push((e.kind(), e.source()));
            if self.consume {
                e.consume();
            }
        }
    }

    impl MouseListener for Log {
        fn mouse_pressed(&self, e: &ObjectEvent) {
            self.record(e);
        }
        fn mouse_released(&self, e: &ObjectEvent) {
            self.record(e);
        }
        fn mouse_entered(&self, e: &ObjectEvent) {
            self.record(e);
        }
        fn mouse_exited(&self, e: &ObjectEvent) {
            self.record(e);
        }
    }

    impl MouseMotionListener for Log {
        fn mouse_dragged(&self, e: &ObjectEvent) {
            self.record(e);
        }
    }

    fn listening_rect(scene: &mut Scene, x: f64, y: f64, log: &Arc<Log>) -> ObjectId {
        let id = scene.create(Shape::rect(10.0, 10.0));
        scene.add_at(ContainerId::Surface, id, x, y).unwrap();
        scene.add_mouse_listener(id, log.clone());
        scene.add_motion_listener(id, log.clone());
        id
    }

    fn route(scene: &mut Scene, kind: MouseEventKind, x: f64, y: f64) -> Vec<(MouseEventKind, ObjectId)> {
        scene.route_mouse_event(&MouseEvent::new(kind, (x, y))).summary()
    }

    #[test]
    fn enter_press_drag_release_sequence() {
        let mut scene = Scene::new();
        let log = Arc::new(Log::default());
        let a = listening_rect(&mut scene, 0.0, 0.0, &log);
        let b = listening_rect(&mut scene, 20.0, 0.0, &log);

        assert_eq!(route(&mut scene, Moved, 5.0, 5.0), vec![(Entered, a), (Moved, a)]);
        assert_eq!(route(&mut scene, Pressed, 5.0, 5.0), vec![(Pressed, a)]);
        assert_eq!(scene.drag_capture(), Some(a));

        // Dragging over b still goes to a.
        assert_eq!(
            route(&mut scene, Dragged, 25.0, 5.0),
            vec![(Exited, a), (Entered, b), (Dragged, a)]
        );
        assert_eq!(route(&mut scene, Released, 25.0, 5.0), vec![(Released, a)]);
        assert_eq!(scene.drag_capture(), None);
        assert_eq!(scene.hovered(), Some(b));

        assert_eq!(route(&mut scene, Moved, 26.0, 5.0), vec![(Moved, b)]);
        // A drag nobody pressed for is dropped; only the crossing remains.
        assert_eq!(route(&mut scene, Dragged, 50.0, 50.0), vec![(Exited, b)]);
        assert!(route(&mut scene, Dragged, 51.0, 50.0).is_empty());
    }

    #[test]
    fn objects_without_listeners_are_transparent_to_events() {
        let mut scene = Scene::new();
        let log = Arc::new(Log::default());
        let below = listening_rect(&mut scene, 0.0, 0.0, &log);
        let above = scene.create(Shape::rect(10.0, 10.0));
        scene.add(ContainerId::Surface, above).unwrap();

        assert_eq!(scene.element_at(ContainerId::Surface, Point::new(5.0, 5.0)), Some(above));
        assert_eq!(
            route(&mut scene, Pressed, 5.0, 5.0),
            vec![(Entered, below), (Pressed, below)]
        );
    }

    #[test]
    fn compound_routes_into_children_in_local_frame() {
        let mut scene = Scene::new();
        let log = Arc::new(Log::default());
        let group = scene.create_compound();
        let child = scene.create(Shape::rect(10.0, 10.0));
        scene.add(group.into(), child).unwrap();
        scene.add_at(ContainerId::Surface, group, 100.0, 100.0).unwrap();
        scene.add_motion_listener(child, log.clone());
        scene.add_mouse_listener(child, log.clone());

        let routed = scene.route_mouse_event(&MouseEvent::new(Pressed, (105.0, 104.0)));
        assert_eq!(routed.summary(), vec![(Entered, child), (Pressed, child)]);
        let press = routed.deliveries()[1].event();
        assert_eq!(press.point(), Point::new(105.0, 104.0));
        assert_eq!(press.local_point(), Point::new(5.0, 4.0));
        assert_eq!(scene.drag_capture(), Some(group));

        // Capture holds at both levels while dragging outside.
        assert_eq!(
            route(&mut scene, Dragged, 300.0, 300.0),
            vec![(Exited, child), (Dragged, child)]
        );
        assert_eq!(route(&mut scene, Released, 300.0, 300.0), vec![(Released, child)]);
    }

    #[test]
    fn compound_with_own_listener_takes_events() {
        let mut scene = Scene::new();
        let log = Arc::new(Log::default());
        let group = scene.create_compound();
        let child = scene.create(Shape::rect(10.0, 10.0));
        scene.add(group.into(), child).unwrap();
        scene.add(ContainerId::Surface, group).unwrap();
        scene.add_mouse_listener(child, log.clone());
        scene.add_mouse_listener(group, log.clone());

        assert_eq!(
            route(&mut scene, Pressed, 5.0, 5.0),
            vec![(Entered, group), (Pressed, group)]
        );
    }

    #[test]
    fn listeners_run_on_deliver_and_report_consumption() {
        let mut scene = Scene::new();
        let log = Arc::new(Log {
            consume: true,
            ..Log::default()
        });
        let a = listening_rect(&mut scene, 0.0, 0.0, &log);
        // Attaching twice is idempotent.
        scene.add_mouse_listener(a, log.clone());

        let routed = scene.route_mouse_event(&MouseEvent::new(Pressed, (1.0, 1.0)));
        assert!(log.seen.lock().is_empty(), "routing alone calls nothing");
        assert!(routed.deliver());
        assert_eq!(*log.seen.lock(), vec![(Entered, a), (Pressed, a)]);

        // Moved goes to motion listeners, which ignore it here.
        assert!(!scene.dispatch_mouse_event(&MouseEvent::new(Moved, (2.0, 2.0))));
    }

    #[test]
    fn removed_listener_keeps_object_eligible() {
        let mut scene = Scene::new();
        let log = Arc::new(Log::default());
        let a = listening_rect(&mut scene, 0.0, 0.0, &log);
        let as_mouse: Arc<dyn MouseListener> = log.clone();
        scene.remove_mouse_listener(a, &as_mouse);

        let routed = scene.route_mouse_event(&MouseEvent::new(Pressed, (1.0, 1.0)));
        assert_eq!(routed.summary(), vec![(Entered, a), (Pressed, a)]);
        routed.deliver();
        assert!(log.seen.lock().is_empty());
    }

    #[test]
    fn clicks_do_not_touch_capture() {
        let mut scene = Scene::new();
        let log = Arc::new(Log::default());
        let a = listening_rect(&mut scene, 0.0, 0.0, &log);
        assert_eq!(
            route(&mut scene, MouseEventKind::Clicked, 1.0, 1.0),
            vec![(Entered, a), (MouseEventKind::Clicked, a)]
        );
        assert_eq!(scene.drag_capture(), None);
    }
}
