// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The paint cycle and the host drawing boundary.
//!
//! The scene never touches pixels. [`Scene::paint`] walks the tree back to
//! front and hands each visible leaf to a [`SurfaceBackend`] as a
//! [`PaintShape`] plus [`PaintAttributes`]. Geometry is given in the frame
//! of the object's parent; [`PaintAttributes::transform`] maps that frame to
//! surface pixels and already includes every enclosing compound offset and
//! the object's own rotation.

use kurbo::{Affine, Ellipse, Line, Point, Rect, Size};
use log::debug;

use crate::color::Color;
use crate::scene::{Body, Scene};
use crate::shape::{Bitmap, Shape};
use crate::types::{ContainerId, ObjectFlags, ObjectId};
use crate::util::transform_rect_bbox;

/// A host-allocated offscreen image used for double buffering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OffscreenBuffer {
    /// Backend-assigned handle.
    pub id: u64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// What to draw.
#[derive(Clone, Copy, Debug)]
pub enum PaintShape<'a> {
    /// Clear the whole surface to the fill color.
    Background(Rect),
    /// Rectangle outline, and interior when a fill color is given.
    Rect(Rect),
    /// Ellipse outline, and interior when a fill color is given.
    Oval(Ellipse),
    /// Line segment.
    Line(Line),
    /// Text starting at a baseline point.
    Label {
        /// The text.
        text: &'a str,
        /// Font size in points.
        font_size: f64,
        /// Start of the baseline.
        baseline: Point,
    },
    /// Bitmap stretched over a rectangle.
    Image {
        /// The bitmap.
        bitmap: &'a dyn Bitmap,
        /// Destination rectangle.
        rect: Rect,
    },
}

/// How to draw it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintAttributes {
    /// Stroke and text color.
    pub color: Color,
    /// Interior color, for filled shapes only.
    pub fill_color: Option<Color>,
    /// Maps shape geometry to surface pixels.
    pub transform: Affine,
    /// Offscreen buffer to draw into, or `None` to draw straight to screen.
    pub target: Option<OffscreenBuffer>,
}

/// Drawing capability supplied by the host toolkit adapter.
pub trait SurfaceBackend {
    /// Current physical size of the drawing area.
    fn size(&self) -> Size;

    /// Allocate an offscreen buffer. `None` if the host can't provide one,
    /// in which case painting goes straight to screen.
    fn create_offscreen_buffer(&mut self, width: u32, height: u32) -> Option<OffscreenBuffer>;

    /// Draw one shape. `region` is a conservative surface-space bound of what
    /// the call touches.
    fn paint_shape(&mut self, shape: &PaintShape<'_>, attrs: &PaintAttributes, region: Rect);

    /// Copy a finished offscreen buffer to screen.
    fn present(&mut self, buffer: &OffscreenBuffer);
}

fn paint_shape_for(shape: &Shape, origin: Point) -> Option<PaintShape<'_>> {
    Some(match shape {
        Shape::Rect { size, .. } => PaintShape::Rect(Rect::from_origin_size(origin, *size)),
        Shape::Oval { size, .. } => {
            PaintShape::Oval(Ellipse::from_rect(Rect::from_origin_size(origin, *size)))
        }
        Shape::Line { end } => PaintShape::Line(Line::new(origin, origin + *end)),
        Shape::Label {
            text, font_size, ..
        } => PaintShape::Label {
            text,
            font_size: *font_size,
            baseline: origin,
        },
        Shape::Image { bitmap, size } => PaintShape::Image {
            bitmap: bitmap.as_deref()?,
            rect: Rect::from_origin_size(origin, *size),
        },
    })
}

fn is_zero_area(size: Size) -> bool {
    size.width <= 0.0 || size.height <= 0.0
}

impl Scene {
    /// Tell the scene the surface changed size.
    ///
    /// Drops the offscreen buffer so the next paint recreates it at the new
    /// size, and requests a redraw. A zero-area size is ignored.
    pub fn resize(&mut self, size: Size) {
        if self.apply_size(size) {
            self.repaint();
        }
    }

    fn apply_size(&mut self, size: Size) -> bool {
        if is_zero_area(size) {
            debug!("ignored zero-area resize to {size:?}");
            return false;
        }
        if size == self.size && self.buffer.is_some() {
            return false;
        }
        debug!("surface resized from {:?} to {size:?}", self.size);
        self.size = size;
        self.buffer = None;
        true
    }

    fn ensure_buffer<B: SurfaceBackend + ?Sized>(&mut self, backend: &mut B) -> Option<OffscreenBuffer> {
        if self.buffer.is_none() && !is_zero_area(self.size) {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "surface sizes are small positive pixel counts"
            )]
            let (w, h) = (self.size.width.ceil() as u32, self.size.height.ceil() as u32);
            self.buffer = backend.create_offscreen_buffer(w, h);
            debug!("created {w}x{h} offscreen buffer: {:?}", self.buffer);
        }
        self.buffer
    }

    /// Paint the whole surface.
    ///
    /// Picks up a size change reported by the backend first. An opaque
    /// surface draws into its offscreen buffer, clears it to the background
    /// and presents it at the end; a transparent one draws children straight
    /// over whatever is on screen.
    pub fn paint<B: SurfaceBackend + ?Sized>(&mut self, backend: &mut B) {
        let size = backend.size();
        if size != self.size {
            self.apply_size(size);
        }
        // This frame covers everything requested so far.
        let _ = self.redraw_queue().take();
        let target = if self.config.opaque {
            let target = self.ensure_buffer(backend);
            let background = self.config.background;
            let bounds = Rect::from_origin_size(Point::ZERO, self.size);
            backend.paint_shape(
                &PaintShape::Background(bounds),
                &PaintAttributes {
                    color: background,
                    fill_color: Some(background),
                    transform: Affine::IDENTITY,
                    target,
                },
                bounds,
            );
            target
        } else {
            None
        };
        if let Ok(children) = self.children(ContainerId::Surface) {
            for &child in children {
                self.paint_object(child, Affine::IDENTITY, target, backend);
            }
        }
        if let Some(buffer) = target {
            backend.present(&buffer);
        }
    }

    fn paint_object<B: SurfaceBackend + ?Sized>(
        &self,
        id: ObjectId,
        parent: Affine,
        target: Option<OffscreenBuffer>,
        backend: &mut B,
    ) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        if !node.flags.contains(ObjectFlags::VISIBLE) {
            return;
        }
        let transform = parent * Affine::rotate_about(node.rotation, node.location + node.anchor);
        match &node.body {
            Body::Compound(group) => {
                let inner = transform * Affine::translate(node.location.to_vec2());
                for &child in &group.children {
                    self.paint_object(child, inner, target, backend);
                }
            }
            Body::Shape(shape) => {
                let Some(paint) = paint_shape_for(shape, node.location) else {
                    debug!("skipped painting image {id:?}: no bitmap available");
                    return;
                };
                let color = self.color(id);
                let fill_color = shape
                    .fill()
                    .filter(|f| f.filled)
                    .map(|f| f.color.unwrap_or(color));
                let region = transform_rect_bbox(transform, shape.bounds_at(node.location));
                backend.paint_shape(
                    &paint,
                    &PaintAttributes {
                        color,
                        fill_color,
                        transform,
                        target,
                    },
                    region,
                );
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// One recorded `paint_shape` call.
    #[derive(Clone, Debug, PartialEq)]
    pub(crate) struct Painted {
        pub(crate) what: &'static str,
        pub(crate) color: Color,
        pub(crate) fill_color: Option<Color>,
        pub(crate) region: Rect,
        pub(crate) target: Option<u64>,
    }

    /// Backend that records calls instead of drawing.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSurface {
        pub(crate) size: Size,
        pub(crate) buffers: Vec<OffscreenBuffer>,
        pub(crate) painted: Vec<Painted>,
        pub(crate) presented: Vec<u64>,
    }

    impl RecordingSurface {
        pub(crate) fn new(width: f64, height: f64) -> Self {
            Self {
                size: Size::new(width, height),
                ..Self::default()
            }
        }

        pub(crate) fn kinds(&self) -> Vec<&'static str> {
            self.painted.iter().map(|p| p.what).collect()
        }
    }

    impl SurfaceBackend for RecordingSurface {
        fn size(&self) -> Size {
            self.size
        }

        fn create_offscreen_buffer(&mut self, width: u32, height: u32) -> Option<OffscreenBuffer> {
            let buffer = OffscreenBuffer {
                id: self.buffers.len() as u64 + 1,
                width,
                height,
            };
            self.buffers.push(buffer);
            Some(buffer)
        }

        fn paint_shape(&mut self, shape: &PaintShape<'_>, attrs: &PaintAttributes, region: Rect) {
            let what = match shape {
                PaintShape::Background(_) => "background",
                PaintShape::Rect(_) => "rect",
                PaintShape::Oval(_) => "oval",
                PaintShape::Line(_) => "line",
                PaintShape::Label { .. } => "label",
                PaintShape::Image { .. } => "image",
            };
            self.painted.push(Painted {
                what,
                color: attrs.color,
                fill_color: attrs.fill_color,
                region,
                target: attrs.target.map(|b| b.id),
            });
        }

        fn present(&mut self, buffer: &OffscreenBuffer) {
            self.presented.push(buffer.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kurbo::Vec2;

    use super::testing::RecordingSurface;
    use super::*;
    use crate::scene::SceneConfig;
    use crate::shape::TextExtent;

    #[derive(Debug)]
    struct Pixels;

    impl Bitmap for Pixels {
        fn width(&self) -> u32 {
            4
        }
        fn height(&self) -> u32 {
            2
        }
    }

    #[test]
    fn opaque_paint_uses_buffer_and_back_to_front_order() {
        let mut scene = Scene::new();
        let back = scene.create(Shape::rect(10.0, 10.0));
        let front = scene.create(Shape::oval(10.0, 10.0));
        scene.add(ContainerId::Surface, back).unwrap();
        scene.add(ContainerId::Surface, front).unwrap();
        scene.set_color(front, Some(Color::RED));

        let mut surface = RecordingSurface::new(40.0, 30.0);
        scene.paint(&mut surface);
        scene.paint(&mut surface);

        assert_eq!(surface.buffers.len(), 1, "buffer is reused between paints");
        assert_eq!(surface.buffers[0].width, 40);
        assert_eq!(surface.presented, vec![1, 1]);
        assert_eq!(
            surface.kinds(),
            vec!["background", "rect", "oval", "background", "rect", "oval"]
        );
        assert_eq!(surface.painted[0].color, Color::WHITE);
        assert_eq!(surface.painted[1].color, Color::BLACK);
        assert_eq!(surface.painted[2].color, Color::RED);
        assert!(surface.painted.iter().all(|p| p.target == Some(1)));
    }

    #[test]
    fn transparent_paint_draws_straight_to_screen() {
        let mut scene = Scene::with_config(SceneConfig {
            opaque: false,
            ..SceneConfig::default()
        });
        let dot = scene.create(Shape::oval(2.0, 2.0));
        scene.add(ContainerId::Surface, dot).unwrap();

        let mut surface = RecordingSurface::new(10.0, 10.0);
        scene.paint(&mut surface);
        assert!(surface.buffers.is_empty());
        assert!(surface.presented.is_empty());
        assert_eq!(surface.kinds(), vec!["oval"]);
        assert_eq!(surface.painted[0].target, None);
    }

    #[test]
    fn hidden_objects_and_missing_images_paint_nothing() {
        let mut scene = Scene::new();
        let hidden = scene.create(Shape::rect(1.0, 1.0));
        let group = scene.create_compound();
        let inside = scene.create(Shape::rect(1.0, 1.0));
        let missing = scene.create(Shape::image(None));
        let present = scene.create(Shape::image(Some(Arc::new(Pixels))));
        scene.add(group.into(), inside).unwrap();
        for id in [hidden, group, missing, present] {
            scene.add(ContainerId::Surface, id).unwrap();
        }
        scene.set_visible(hidden, false);
        scene.set_visible(group, false);

        let mut surface = RecordingSurface::new(10.0, 10.0);
        scene.paint(&mut surface);
        assert_eq!(surface.kinds(), vec!["background", "image"]);
        assert_eq!(surface.painted[1].region, Rect::new(0.0, 0.0, 4.0, 2.0));
    }

    #[test]
    fn compounds_offset_their_children() {
        let mut scene = Scene::new();
        let outer = scene.create_compound();
        let inner = scene.create_compound();
        let label = scene.create(Shape::label(
            "hi",
            12.0,
            TextExtent {
                width: 10.0,
                ascent: 8.0,
                descent: 2.0,
            },
        ));
        scene.add_at(inner.into(), label, 1.0, 10.0).unwrap();
        scene.add_at(outer.into(), inner, 5.0, 5.0).unwrap();
        scene.add_at(ContainerId::Surface, outer, 100.0, 0.0).unwrap();
        scene.set_color(outer, Some(Color::BLUE));

        let mut surface = RecordingSurface::new(200.0, 200.0);
        scene.paint(&mut surface);
        let painted = &surface.painted[1];
        assert_eq!(painted.what, "label");
        assert_eq!(painted.color, Color::BLUE);
        assert_eq!(painted.region, Rect::new(106.0, 7.0, 116.0, 17.0));
    }

    #[test]
    fn rotation_turns_around_location_plus_anchor() {
        let mut scene = Scene::new();
        let bar = scene.create(Shape::rect(10.0, 2.0));
        scene.add_at(ContainerId::Surface, bar, 20.0, 20.0).unwrap();
        scene.set_rotation(bar, core::f64::consts::FRAC_PI_2);
        scene.set_rotation_anchor(bar, Vec2::new(5.0, 1.0));
        // Rotation doesn't change bounds.
        assert_eq!(scene.bounds(bar), Some(Rect::new(20.0, 20.0, 30.0, 22.0)));

        let mut surface = RecordingSurface::new(50.0, 50.0);
        scene.paint(&mut surface);
        let region = surface.painted[1].region;
        let expected = Rect::new(24.0, 16.0, 26.0, 26.0);
        for (got, want) in [
            (region.x0, expected.x0),
            (region.y0, expected.y0),
            (region.x1, expected.x1),
            (region.y1, expected.y1),
        ] {
            assert!((got - want).abs() < 1e-9, "{region:?} != {expected:?}");
        }
    }

    #[test]
    fn filled_shapes_carry_fill_color() {
        let mut scene = Scene::new();
        let r = scene.create(Shape::rect(3.0, 3.0));
        scene.add(ContainerId::Surface, r).unwrap();
        scene.set_color(r, Some(Color::GREEN));
        scene.set_filled(r, true);

        let mut surface = RecordingSurface::new(10.0, 10.0);
        scene.paint(&mut surface);
        assert_eq!(surface.painted[1].fill_color, Some(Color::GREEN));
        scene.set_fill_color(r, Some(Color::YELLOW));
        scene.paint(&mut surface);
        assert_eq!(surface.painted[3].fill_color, Some(Color::YELLOW));
    }

    #[test]
    fn resize_recreates_buffer_and_ignores_zero_area() {
        let mut scene = Scene::new();
        let queue = Arc::clone(scene.redraw_queue());
        let mut surface = RecordingSurface::new(20.0, 10.0);
        scene.paint(&mut surface);
        assert_eq!(surface.buffers.len(), 1);

        scene.resize(Size::new(0.0, 10.0));
        assert!(queue.take().is_none());
        assert_eq!(scene.surface_size(), Size::new(20.0, 10.0));

        surface.size = Size::new(30.5, 12.0);
        scene.resize(surface.size);
        assert!(queue.take().is_some());
        scene.paint(&mut surface);
        assert_eq!(surface.buffers.len(), 2);
        assert_eq!((surface.buffers[1].width, surface.buffers[1].height), (31, 12));
        assert_eq!(surface.presented, vec![1, 2]);
    }

    #[test]
    fn paint_notices_backend_size_change() {
        let mut scene = Scene::new();
        let mut surface = RecordingSurface::new(8.0, 8.0);
        scene.paint(&mut surface);
        surface.size = Size::new(16.0, 16.0);
        scene.paint(&mut surface);
        assert_eq!(surface.buffers.len(), 2);
        assert_eq!(scene.surface_size(), Size::new(16.0, 16.0));
    }

    #[test]
    fn paint_drains_pending_redraws() {
        let mut scene = Scene::new();
        let queue = Arc::clone(scene.redraw_queue());
        let dot = scene.create(Shape::rect(2.0, 2.0));
        scene.add(ContainerId::Surface, dot).unwrap();
        let mut surface = RecordingSurface::new(50.0, 50.0);
        for _ in 0..100 {
            for _ in 0..1000 {
                scene.move_by(dot, 0.01, 0.0);
            }
            scene.paint(&mut surface);
            assert!(!queue.is_pending(), "painting settles the queue");
        }
        assert!(queue.take().is_none());

        scene.move_by(dot, 1.0, 0.0);
        scene.move_by(dot, 1.0, 0.0);
        let damage = queue.take().expect("moves after the last paint");
        assert_eq!(damage.dirty_rects, vec![Rect::new(0.0, 0.0, 50.0, 50.0)]);
    }

    #[test]
    fn zero_sized_surface_paints_without_buffer() {
        let mut scene = Scene::new();
        let r = scene.create(Shape::rect(3.0, 3.0));
        scene.add(ContainerId::Surface, r).unwrap();
        let mut surface = RecordingSurface::default();
        scene.paint(&mut surface);
        assert!(surface.buffers.is_empty());
        assert!(surface.presented.is_empty());
        assert_eq!(surface.kinds(), vec!["background", "rect"]);
    }
}
