// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Iteration over a container's children in either z direction.
//!
//! [`Scene::iter`] borrows the scene and is the usual way to walk children.
//! When the walk needs to remove elements as it goes, use an
//! [`ElementCursor`] from [`Scene::cursor`] instead: it holds no borrow and
//! takes the scene on each call.

use core::iter::FusedIterator;
use core::slice;

use crate::error::Result;
use crate::scene::Scene;
use crate::types::{ContainerId, Direction, ObjectId};

/// Borrowing iterator over a container's children.
#[derive(Clone, Debug)]
pub struct Elements<'a> {
    inner: slice::Iter<'a, ObjectId>,
    direction: Direction,
}

impl Iterator for Elements<'_> {
    type Item = ObjectId;

    fn next(&mut self) -> Option<ObjectId> {
        match self.direction {
            Direction::BackToFront => self.inner.next().copied(),
            Direction::FrontToBack => self.inner.next_back().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Elements<'_> {
    fn next_back(&mut self) -> Option<ObjectId> {
        match self.direction {
            Direction::BackToFront => self.inner.next_back().copied(),
            Direction::FrontToBack => self.inner.next().copied(),
        }
    }
}

impl ExactSizeIterator for Elements<'_> {}
impl FusedIterator for Elements<'_> {}

/// Detached cursor over a container's children.
///
/// The cursor snapshots the element count when it is created. Removing the
/// element last returned by [`next`](Self::next) through
/// [`remove`](Self::remove) steps the cursor back one position and shrinks
/// the snapshot, so the walk carries on with the element that followed the
/// removed one. Other structural changes made during the walk are not
/// tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementCursor {
    container: ContainerId,
    direction: Direction,
    index: usize,
    len: usize,
}

impl ElementCursor {
    fn position(&self, index: usize) -> usize {
        match self.direction {
            Direction::BackToFront => index,
            Direction::FrontToBack => self.len - index - 1,
        }
    }

    /// Whether [`next`](Self::next) would yield another element.
    pub fn has_next(&self) -> bool {
        self.index < self.len
    }

    /// Yield the next element, or `None` at the end.
    pub fn next(&mut self, scene: &Scene) -> Option<ObjectId> {
        if !self.has_next() {
            return None;
        }
        let at = self.position(self.index);
        self.index += 1;
        scene.element(self.container, at).ok()
    }

    /// Remove the element last returned by [`next`](Self::next) from the
    /// container.
    ///
    /// Returns the removed element, or `None` if nothing has been yielded
    /// yet.
    pub fn remove(&mut self, scene: &mut Scene) -> Result<Option<ObjectId>> {
        if self.index == 0 {
            return Ok(None);
        }
        let at = self.position(self.index - 1);
        let id = scene.element(self.container, at)?;
        scene.remove(self.container, id)?;
        self.index -= 1;
        self.len -= 1;
        Ok(Some(id))
    }

    /// Elements left to yield.
    pub fn remaining(&self) -> usize {
        self.len - self.index
    }
}

impl Scene {
    /// Iterate the children of `container` in `direction`.
    pub fn iter(&self, container: ContainerId, direction: Direction) -> Result<Elements<'_>> {
        Ok(Elements {
            inner: self.children(container)?.iter(),
            direction,
        })
    }

    /// A removal-friendly cursor over the children of `container`.
    pub fn cursor(&self, container: ContainerId, direction: Direction) -> Result<ElementCursor> {
        Ok(ElementCursor {
            container,
            direction,
            index: 0,
            len: self.element_count(container)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    fn four(scene: &mut Scene) -> Vec<ObjectId> {
        (0..4)
            .map(|_| {
                let id = scene.create(Shape::rect(1.0, 1.0));
                scene.add(ContainerId::Surface, id).unwrap();
                id
            })
            .collect()
    }

    #[test]
    fn iter_directions() {
        let mut scene = Scene::new();
        let ids = four(&mut scene);
        let back: Vec<_> = scene
            .iter(ContainerId::Surface, Direction::BackToFront)
            .unwrap()
            .collect();
        assert_eq!(back, ids);
        let front: Vec<_> = scene
            .iter(ContainerId::Surface, Direction::FrontToBack)
            .unwrap()
            .collect();
        assert_eq!(front, ids.iter().rev().copied().collect::<Vec<_>>());
        assert_eq!(
            scene
                .iter(ContainerId::Surface, Direction::FrontToBack)
                .unwrap()
                .len(),
            4
        );
    }

    #[test]
    fn cursor_removal_continues_with_next_element() {
        let mut scene = Scene::new();
        let ids = four(&mut scene);
        let mut cursor = scene
            .cursor(ContainerId::Surface, Direction::BackToFront)
            .unwrap();
        let mut seen = Vec::new();
        while let Some(id) = cursor.next(&scene) {
            seen.push(id);
            if id == ids[1] || id == ids[2] {
                assert_eq!(cursor.remove(&mut scene), Ok(Some(id)));
            }
        }
        assert_eq!(seen, ids);
        assert_eq!(scene.children(ContainerId::Surface).unwrap(), &[ids[0], ids[3]]);
        assert_eq!(scene.parent(ids[1]), None);
    }

    #[test]
    fn cursor_removal_front_to_back() {
        let mut scene = Scene::new();
        let ids = four(&mut scene);
        let mut cursor = scene
            .cursor(ContainerId::Surface, Direction::FrontToBack)
            .unwrap();
        assert_eq!(cursor.remove(&mut scene), Ok(None));
        let mut seen = Vec::new();
        while let Some(id) = cursor.next(&scene) {
            seen.push(id);
            if id == ids[3] || id == ids[1] {
                cursor.remove(&mut scene).unwrap();
            }
        }
        assert_eq!(seen, vec![ids[3], ids[2], ids[1], ids[0]]);
        assert_eq!(scene.children(ContainerId::Surface).unwrap(), &[ids[0], ids[2]]);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn raw_direction_codes() {
        let scene = Scene::new();
        let direction = Direction::try_from(Direction::FRONT_TO_BACK).unwrap();
        assert!(scene.cursor(ContainerId::Surface, direction).is_ok());
        assert!(Direction::try_from(2).is_err());
    }
}
