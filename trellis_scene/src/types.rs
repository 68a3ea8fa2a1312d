// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public identifiers and flags: object handles, containers, iteration order.

use crate::error::SceneError;

/// Identifier for an object in a [`Scene`](crate::Scene) (generational).
///
/// Ids stay valid while the object exists, whether or not it is attached to a
/// container. Once [`Scene::destroy`](crate::Scene::destroy) frees the object
/// the id becomes stale; a later object reusing the slot gets a new generation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectId(pub(crate) u32, pub(crate) u32);

impl ObjectId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Something that owns an ordered, z-ordered sequence of objects.
///
/// The surface is the root frame; a compound is both an object and a
/// container with its own local frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ContainerId {
    /// The root drawing surface.
    Surface,
    /// A compound object.
    Compound(ObjectId),
}

impl From<ObjectId> for ContainerId {
    fn from(id: ObjectId) -> Self {
        Self::Compound(id)
    }
}

bitflags::bitflags! {
    /// Per-object state bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u8 {
        /// Object paints. Invisible objects still take part in hit testing.
        const VISIBLE   = 0b0000_0001;
        /// A mouse or motion listener has been attached at some point.
        /// Never cleared, even when every listener is removed again.
        const LISTENING = 0b0000_0010;
    }
}

impl Default for ObjectFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Traversal order over a container's children.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Topmost first: the order hit testing uses.
    FrontToBack,
    /// Backmost first: the order painting uses.
    #[default]
    BackToFront,
}

impl Direction {
    /// Raw code for [`Direction::FrontToBack`].
    pub const FRONT_TO_BACK: i32 = 0;
    /// Raw code for [`Direction::BackToFront`].
    pub const BACK_TO_FRONT: i32 = 1;
}

impl TryFrom<i32> for Direction {
    type Error = SceneError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            Self::FRONT_TO_BACK => Ok(Self::FrontToBack),
            Self::BACK_TO_FRONT => Ok(Self::BackToFront),
            other => Err(SceneError::InvalidDirection(other)),
        }
    }
}

impl From<Direction> for i32 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::FrontToBack => Direction::FRONT_TO_BACK,
            Direction::BackToFront => Direction::BACK_TO_FRONT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_codes_round_trip() {
        for d in [Direction::FrontToBack, Direction::BackToFront] {
            assert_eq!(Direction::try_from(i32::from(d)), Ok(d));
        }
    }

    #[test]
    fn unknown_direction_is_an_error() {
        assert_eq!(
            Direction::try_from(7),
            Err(SceneError::InvalidDirection(7))
        );
        assert_eq!(
            Direction::try_from(-1),
            Err(SceneError::InvalidDirection(-1))
        );
    }

    #[test]
    fn default_flags_are_visible_only() {
        let flags = ObjectFlags::default();
        assert!(flags.contains(ObjectFlags::VISIBLE));
        assert!(!flags.contains(ObjectFlags::LISTENING));
    }
}
