// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Scene: a retained-mode 2D scene graph over a host drawing surface.
//!
//! A program builds a tree of shapes and compounds, attaches it to the
//! surface, and then moves, restacks, hit-tests, paints and routes pointer
//! input through it. The host toolkit supplies pixels and raw input; this
//! crate owns structure, coordinate frames, z-order and event routing.
//!
//! ## Model
//!
//! - [`Scene`] is both the object arena and the root container, the surface.
//!   Its frame is absolute pixel space.
//! - Objects are created detached and addressed by generational
//!   [`ObjectId`]s. Leaves carry a [`Shape`]; compounds carry children.
//! - A container is either the surface or a compound, named by
//!   [`ContainerId`]. Its children are ordered back to front: index 0 paints
//!   first, the last index is topmost and wins hit tests.
//! - Every object lives in at most one container. Adding it elsewhere moves
//!   it in a single step.
//! - A compound sets up a frame offset by its location. Its bounds are the
//!   union of its children and it contains a point when one of them does.
//!   [`Scene::mark_as_complete`] freezes its membership.
//!
//! ## Painting and redraw
//!
//! Mutating an object that is attached to the surface raises a request on the
//! [`RedrawQueue`] unless auto-repaint is off. The host drains the queue and
//! calls [`Scene::paint`] with its [`SurfaceBackend`].
//!
//! ## Input
//!
//! [`Scene::route_mouse_event`] turns one host [`MouseEvent`] into enter,
//! exit and target deliveries, tracking drag capture per dispatch scope. See
//! the [`event`] module for the state machine.
//!
//! ## Threads
//!
//! [`SharedScene`] puts the scene behind one lock. Routing, painting and
//! structural changes run under it; listeners run after it is released.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Point;
//! use trellis_scene::{Color, ContainerId, Scene, Shape};
//!
//! let mut scene = Scene::new();
//! let face = scene.create_compound();
//! let head = scene.create(Shape::oval(40.0, 40.0));
//! let eye = scene.create(Shape::oval(6.0, 6.0));
//! scene.add_at(face.into(), head, 0.0, 0.0).unwrap();
//! scene.add_at(face.into(), eye, 10.0, 12.0).unwrap();
//! scene.add_at(ContainerId::Surface, face, 100.0, 50.0).unwrap();
//! scene.set_color(face, Some(Color::BLUE));
//!
//! // Children paint with the compound's color unless they have their own.
//! assert_eq!(scene.color(eye), Color::BLUE);
//!
//! // Points convert between the surface and the compound frame.
//! let local = scene.surface_to_local(face, Point::new(112.0, 64.0)).unwrap();
//! assert_eq!(local, Point::new(12.0, 14.0));
//! assert_eq!(scene.element_at(face.into(), local), Some(eye));
//! ```

mod color;
mod compound;
mod damage;
mod error;
pub mod event;
mod iter;
mod object;
mod paint;
mod scene;
mod shape;
mod shared;
mod types;
mod util;

pub use color::Color;
pub use damage::{Damage, RedrawQueue};
pub use error::{Result, SceneError};
pub use event::{
    Delivery, Modifiers, MouseEvent, MouseEventKind, MouseListener, MouseMotionListener,
    ObjectEvent, Routed,
};
pub use iter::{ElementCursor, Elements};
pub use paint::{OffscreenBuffer, PaintAttributes, PaintShape, SurfaceBackend};
pub use scene::{Scene, SceneConfig};
pub use shape::{Bitmap, Fill, ObjectKind, Shape, TextExtent};
pub use shared::SharedScene;
pub use types::{ContainerId, Direction, ObjectFlags, ObjectId};
