// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf shapes: geometry, containment, scaling.
//!
//! A shape is positioned by its owning object's location; all geometry here is
//! expressed relative to that origin and converted into the parent's frame by
//! [`Shape::bounds_at`].

use core::fmt;
use std::sync::Arc;

use kurbo::{Ellipse, Line, Point, Rect, Size, Vec2};
use trellis_hit::stroke::StrokedLine;
use trellis_hit::LocalHit;

use crate::color::Color;

/// A decoded bitmap supplied by the host's media loader.
pub trait Bitmap: Send + Sync + fmt::Debug {
    /// Intrinsic width in pixels.
    fn width(&self) -> u32;
    /// Intrinsic height in pixels.
    fn height(&self) -> u32;

    /// Intrinsic size as a [`Size`].
    fn intrinsic_size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }
}

/// The concrete kind of a scene object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Axis-aligned rectangle.
    Rect,
    /// Ellipse inscribed in a rectangle.
    Oval,
    /// Straight line segment.
    Line,
    /// Single line of text.
    Label,
    /// Bitmap image.
    Image,
    /// Group of objects with its own frame.
    Compound,
}

impl ObjectKind {
    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rect => "Rect",
            Self::Oval => "Oval",
            Self::Line => "Line",
            Self::Label => "Label",
            Self::Image => "Image",
            Self::Compound => "Compound",
        }
    }

    /// Kinds whose size can be set directly.
    pub const fn is_resizable(self) -> bool {
        matches!(self, Self::Rect | Self::Oval | Self::Image)
    }

    /// Kinds with a fill state.
    pub const fn is_fillable(self) -> bool {
        matches!(self, Self::Rect | Self::Oval)
    }

    /// Kinds that support [`Scene::scale`](crate::Scene::scale).
    pub const fn is_scalable(self) -> bool {
        !matches!(self, Self::Label)
    }
}

/// Fill state of a closed shape.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Fill {
    /// Whether the interior is painted.
    pub filled: bool,
    /// Interior color; falls back to the object's resolved color.
    pub color: Option<Color>,
}

/// Text metrics measured by the host for a label.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtent {
    /// Advance width of the whole string.
    pub width: f64,
    /// Distance from the baseline to the top of the tallest glyph.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the lowest glyph.
    pub descent: f64,
}

/// Geometry of a leaf object.
#[derive(Clone, Debug)]
pub enum Shape {
    /// Rectangle with its top-left corner at the origin.
    Rect {
        /// Width and height.
        size: Size,
        /// Interior fill.
        fill: Fill,
    },
    /// Ellipse inscribed in the rectangle `(origin, size)`.
    Oval {
        /// Width and height of the bounding rectangle.
        size: Size,
        /// Interior fill.
        fill: Fill,
    },
    /// Segment from the origin to `origin + end`.
    Line {
        /// Offset of the end point.
        end: Vec2,
    },
    /// Text whose baseline starts at the origin.
    Label {
        /// The text.
        text: String,
        /// Font size in points.
        font_size: f64,
        /// Host-measured metrics.
        extent: TextExtent,
    },
    /// Bitmap drawn into `(origin, size)`.
    Image {
        /// Decoded bitmap, or `None` when the loader could not supply one.
        bitmap: Option<Arc<dyn Bitmap>>,
        /// Display size; defaults to the intrinsic size.
        size: Size,
    },
}

impl Shape {
    /// An unfilled rectangle.
    pub fn rect(width: f64, height: f64) -> Self {
        Self::Rect {
            size: Size::new(width, height),
            fill: Fill::default(),
        }
    }

    /// An unfilled oval.
    pub fn oval(width: f64, height: f64) -> Self {
        Self::Oval {
            size: Size::new(width, height),
            fill: Fill::default(),
        }
    }

    /// A line ending at `(dx, dy)` relative to its start.
    pub fn line(dx: f64, dy: f64) -> Self {
        Self::Line {
            end: Vec2::new(dx, dy),
        }
    }

    /// A label with host-measured metrics.
    pub fn label(text: impl Into<String>, font_size: f64, extent: TextExtent) -> Self {
        Self::Label {
            text: text.into(),
            font_size,
            extent,
        }
    }

    /// An image at its intrinsic size; zero-sized when no bitmap is available.
    pub fn image(bitmap: Option<Arc<dyn Bitmap>>) -> Self {
        let size = bitmap
            .as_ref()
            .map(|b| b.intrinsic_size())
            .unwrap_or(Size::ZERO);
        Self::Image { bitmap, size }
    }

    /// The kind of object this shape makes.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Rect { .. } => ObjectKind::Rect,
            Self::Oval { .. } => ObjectKind::Oval,
            Self::Line { .. } => ObjectKind::Line,
            Self::Label { .. } => ObjectKind::Label,
            Self::Image { .. } => ObjectKind::Image,
        }
    }

    /// Axis-aligned bounds when the shape sits at `origin`.
    pub fn bounds_at(&self, origin: Point) -> Rect {
        match self {
            Self::Rect { size, .. } | Self::Oval { size, .. } | Self::Image { size, .. } => {
                Rect::from_origin_size(origin, *size)
            }
            Self::Line { end } => Rect::from_points(origin, origin + *end),
            Self::Label { extent, .. } => Rect::new(
                origin.x,
                origin.y - extent.ascent,
                origin.x + extent.width,
                origin.y + extent.descent,
            ),
        }
    }

    /// Exact containment when the shape sits at `origin`.
    ///
    /// Ovals test the ellipse and lines test distance to the segment; every
    /// other kind tests its bounds.
    pub(crate) fn contains_at(&self, origin: Point, pt: Point, line_tolerance: f64) -> bool {
        match self {
            Self::Oval { size, .. } => {
                Ellipse::from_rect(Rect::from_origin_size(origin, *size)).contains_local(pt)
            }
            Self::Line { end } => {
                StrokedLine::new(Line::new(origin, origin + *end), line_tolerance)
                    .contains_local(pt)
            }
            _ => self.bounds_at(origin).contains_local(pt),
        }
    }

    /// Scale the shape's own extent. Returns `false` for labels.
    pub(crate) fn scale(&mut self, sx: f64, sy: f64) -> bool {
        match self {
            Self::Rect { size, .. } | Self::Oval { size, .. } | Self::Image { size, .. } => {
                *size = Size::new(size.width * sx, size.height * sy);
                true
            }
            Self::Line { end } => {
                *end = Vec2::new(end.x * sx, end.y * sy);
                true
            }
            Self::Label { .. } => false,
        }
    }

    /// Set the display size of a resizable shape. Returns `false` otherwise.
    pub(crate) fn set_size(&mut self, new_size: Size) -> bool {
        match self {
            Self::Rect { size, .. } | Self::Oval { size, .. } | Self::Image { size, .. } => {
                *size = new_size;
                true
            }
            Self::Line { .. } | Self::Label { .. } => false,
        }
    }

    /// Fill state, for rectangles and ovals.
    pub fn fill(&self) -> Option<&Fill> {
        match self {
            Self::Rect { fill, .. } | Self::Oval { fill, .. } => Some(fill),
            _ => None,
        }
    }

    pub(crate) fn fill_mut(&mut self) -> Option<&mut Fill> {
        match self {
            Self::Rect { fill, .. } | Self::Oval { fill, .. } => Some(fill),
            _ => None,
        }
    }
}
