// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by structural misuse of the scene.
//!
//! Only invariant violations are errors. Removing an object that is not
//! present, moving past a z-order boundary, or resizing to zero area are
//! silent no-ops instead.

use crate::types::{ContainerId, ObjectId};

/// A structural operation was refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The compound was marked as complete and its membership is frozen.
    #[error("compound {0:?} has been marked as complete; its children can't be added or removed")]
    Sealed(ObjectId),
    /// An element index outside `0..len`.
    #[error("element index {index} is out of range for a container with {len} elements")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of elements in the container.
        len: usize,
    },
    /// A raw iteration direction code that is neither front-to-back nor back-to-front.
    #[error("illegal iteration direction {0}")]
    InvalidDirection(i32),
    /// The id refers to an object that has been destroyed.
    #[error("object {0:?} no longer exists")]
    StaleObject(ObjectId),
    /// The object is not a compound and can't hold children.
    #[error("object {0:?} is not a compound")]
    NotAContainer(ObjectId),
    /// Adding the child would make a compound its own ancestor.
    #[error("adding {child:?} to {container:?} would create an ownership cycle")]
    WouldCycle {
        /// The object being added.
        child: ObjectId,
        /// The compound it was being added to.
        container: ContainerId,
    },
}

/// Result alias for scene operations.
pub type Result<T, E = SceneError> = core::result::Result<T, E>;
