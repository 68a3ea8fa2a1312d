// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scene behind one lock, for hosts that touch it from several threads.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::damage::RedrawQueue;
use crate::event::MouseEvent;
use crate::paint::SurfaceBackend;
use crate::scene::Scene;

/// Cloneable handle to a [`Scene`] guarded by a single mutex.
///
/// Every structural change and every full traversal (paint, hit test,
/// routing) runs under the lock, and the lock is never held while a listener
/// runs: [`dispatch_mouse_event`](Self::dispatch_mouse_event) routes under
/// the lock, releases it, then delivers. Redraw requests go to the
/// [`RedrawQueue`], which can be drained without taking the scene lock.
#[derive(Clone, Debug)]
pub struct SharedScene {
    scene: Arc<Mutex<Scene>>,
    redraw: Arc<RedrawQueue>,
}

impl SharedScene {
    /// Wrap `scene`.
    pub fn new(scene: Scene) -> Self {
        let redraw = Arc::clone(scene.redraw_queue());
        Self {
            scene: Arc::new(Mutex::new(scene)),
            redraw,
        }
    }

    /// Lock the scene. Don't hold the guard across anything that may block.
    pub fn lock(&self) -> MutexGuard<'_, Scene> {
        self.scene.lock()
    }

    /// The scene's redraw queue.
    pub fn redraw_queue(&self) -> &Arc<RedrawQueue> {
        &self.redraw
    }

    /// Route `event` under the lock, then call listeners with the lock
    /// released. Returns whether a listener consumed it.
    pub fn dispatch_mouse_event(&self, event: &MouseEvent) -> bool {
        let routed = self.scene.lock().route_mouse_event(event);
        routed.deliver()
    }

    /// Paint under the lock.
    pub fn paint<B: SurfaceBackend + ?Sized>(&self, backend: &mut B) {
        self.scene.lock().paint(backend);
    }

    /// Paint only if a redraw has been requested since the last call.
    ///
    /// Returns whether it painted.
    pub fn paint_if_requested<B: SurfaceBackend + ?Sized>(&self, backend: &mut B) -> bool {
        if self.redraw.take().is_none() {
            return false;
        }
        self.paint(backend);
        true
    }
}
