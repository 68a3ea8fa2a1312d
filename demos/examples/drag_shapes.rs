// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag shapes around a scene with synthetic pointer input.
//!
//! This example shows how to combine:
//! - a [`SharedScene`] holding a few shapes and a sealed compound,
//! - mouse listeners that re-lock the scene to move what they grab,
//! - a logging [`SurfaceBackend`] that paints only when a redraw was requested.
//!
//! Run:
//! - `RUST_LOG=info cargo run -p trellis_demos --example drag_shapes`

use std::sync::Arc;

use kurbo::{Point, Rect, Size};
use parking_lot::Mutex;
use trellis_scene::{
    Color, ContainerId, Direction, MouseEvent, MouseEventKind, MouseListener, MouseMotionListener,
    ObjectEvent, OffscreenBuffer, PaintAttributes, PaintShape, Scene, SceneConfig, Shape,
    SharedScene, SurfaceBackend, TextExtent,
};

/// Backend that logs every draw call instead of rasterizing.
#[derive(Debug)]
struct LoggingSurface {
    size: Size,
    next_buffer: u64,
}

impl SurfaceBackend for LoggingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn create_offscreen_buffer(&mut self, width: u32, height: u32) -> Option<OffscreenBuffer> {
        self.next_buffer += 1;
        log::info!("offscreen buffer #{} {width}x{height}", self.next_buffer);
        Some(OffscreenBuffer {
            id: self.next_buffer,
            width,
            height,
        })
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
        match attrs.fill_color {
            Some(fill) => log::info!("  {what} {} fill {fill} in {region:?}", attrs.color),
            None => log::info!("  {what} {} in {region:?}", attrs.color),
        }
    }

    fn present(&mut self, buffer: &OffscreenBuffer) {
        log::info!("present buffer #{}", buffer.id);
    }
}

/// Moves whatever it is attached to by the pointer delta while dragging.
#[derive(Debug)]
struct Dragger {
    scene: SharedScene,
    last: Mutex<Option<Point>>,
}

impl MouseListener for Dragger {
    fn mouse_pressed(&self, event: &ObjectEvent) {
        *self.last.lock() = Some(event.local_point());
        self.scene.lock().send_to_front(event.source());
    }

    fn mouse_released(&self, _event: &ObjectEvent) {
        *self.last.lock() = None;
    }

    fn mouse_entered(&self, event: &ObjectEvent) {
        log::info!("enter {:?}", event.source());
    }

    fn mouse_exited(&self, event: &ObjectEvent) {
        log::info!("exit {:?}", event.source());
    }
}

/// Motion half of [`Dragger`]; the two listener traits are attached separately.
#[derive(Debug)]
struct DragMotion(Arc<Dragger>);

impl MouseMotionListener for DragMotion {
    fn mouse_dragged(&self, event: &ObjectEvent) {
        let mut last = self.0.last.lock();
        if let Some(prev) = *last {
            let delta = event.local_point() - prev;
            self.0.scene.lock().move_by(event.source(), delta.x, delta.y);
        }
        *last = Some(event.local_point());
    }
}

fn build(scene: &mut Scene) -> trellis_scene::Result<Vec<trellis_scene::ObjectId>> {
    let square = scene.create(Shape::rect(40.0, 40.0));
    scene.set_filled(square, true);
    scene.set_fill_color(square, Some(Color::ORANGE));
    scene.add_at(ContainerId::Surface, square, 20.0, 20.0)?;

    let ball = scene.create(Shape::oval(30.0, 30.0));
    scene.set_color(ball, Some(Color::RED));
    scene.set_filled(ball, true);
    scene.add_at(ContainerId::Surface, ball, 100.0, 40.0)?;

    let tag = scene.create_compound();
    let frame = scene.create(Shape::rect(60.0, 20.0));
    let text = scene.create(Shape::label(
        "drag me",
        12.0,
        TextExtent {
            width: 42.0,
            ascent: 10.0,
            descent: 3.0,
        },
    ));
    scene.add_at(tag.into(), frame, 0.0, 0.0)?;
    scene.add_at(tag.into(), text, 8.0, 15.0)?;
    scene.mark_as_complete(tag)?;
    scene.set_color(tag, Some(Color::BLUE));
    scene.add_at(ContainerId::Surface, tag, 40.0, 120.0)?;

    Ok(vec![square, ball, tag])
}

fn main() -> trellis_scene::Result<()> {
    env_logger::init();

    let shared = SharedScene::new(Scene::with_config(SceneConfig {
        size: Size::new(240.0, 180.0),
        ..SceneConfig::default()
    }));
    let draggable = build(&mut shared.lock())?;
    for id in draggable {
        let dragger = Arc::new(Dragger {
            scene: shared.clone(),
            last: Mutex::new(None),
        });
        let mut scene = shared.lock();
        scene.add_mouse_listener(id, dragger.clone());
        scene.add_motion_listener(id, Arc::new(DragMotion(dragger)));
    }

    let mut surface = LoggingSurface {
        size: Size::new(240.0, 180.0),
        next_buffer: 0,
    };
    shared.paint(&mut surface);

    // Press on the ball, drag it over the square and let go.
    let script = [
        (MouseEventKind::Moved, (110.0, 50.0)),
        (MouseEventKind::Pressed, (110.0, 50.0)),
        (MouseEventKind::Dragged, (80.0, 50.0)),
        (MouseEventKind::Dragged, (50.0, 45.0)),
        (MouseEventKind::Released, (50.0, 45.0)),
        (MouseEventKind::Moved, (200.0, 170.0)),
    ];
    for (when, (kind, pt)) in (0_u64..).zip(script) {
        let event = MouseEvent::new(kind, pt).at(when);
        shared.dispatch_mouse_event(&event);
        if shared.paint_if_requested(&mut surface) {
            log::info!("repainted after {kind:?}");
        }
    }

    let scene = shared.lock();
    for id in scene.iter(ContainerId::Surface, Direction::FrontToBack)? {
        if let Some(text) = scene.describe(id) {
            println!("{text}");
        }
    }
    Ok(())
}
