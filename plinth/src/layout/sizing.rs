//! Layout sizing types.
//!
//! Core types for specifying element dimensions, padding and alignment.

use serde::{Deserialize, Serialize};

/// Sizing mode for one axis of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Sizing {
    /// Wrap content (children, text or image), clamped to `[min, max]`.
    Fit { min: f32, max: f32 },
    /// Claim a weighted share of the parent's remaining space, clamped to
    /// `[min, max]`. On the cross axis, fill the parent's content box.
    Grow { min: f32, max: f32, weight: f32 },
    /// Exact pixel size.
    Fixed(f32),
    /// Fraction (0.0-1.0) of the parent's content box.
    Percent(f32),
}

impl Default for Sizing {
    fn default() -> Self {
        Sizing::fit()
    }
}

impl Sizing {
    /// Unclamped fit.
    pub const fn fit() -> Self {
        Sizing::Fit { min: 0.0, max: f32::INFINITY }
    }

    /// Unclamped grow with weight 1.
    pub const fn grow() -> Self {
        Sizing::Grow { min: 0.0, max: f32::INFINITY, weight: 1.0 }
    }

    pub const fn fixed(px: f32) -> Self {
        Sizing::Fixed(px)
    }

    pub const fn percent(fraction: f32) -> Self {
        Sizing::Percent(fraction)
    }

    /// Set the lower clamp. No effect on `Fixed`/`Percent`.
    pub fn min(self, value: f32) -> Self {
        match self {
            Sizing::Fit { max, .. } => Sizing::Fit { min: value, max },
            Sizing::Grow { max, weight, .. } => Sizing::Grow { min: value, max, weight },
            other => other,
        }
    }

    /// Set the upper clamp. No effect on `Fixed`/`Percent`.
    pub fn max(self, value: f32) -> Self {
        match self {
            Sizing::Fit { min, .. } => Sizing::Fit { min, max: value },
            Sizing::Grow { min, weight, .. } => Sizing::Grow { min, max: value, weight },
            other => other,
        }
    }

    /// Set the growth weight. No effect unless this is `Grow`.
    pub fn weight(self, value: f32) -> Self {
        match self {
            Sizing::Grow { min, max, .. } => Sizing::Grow { min, max, weight: value },
            other => other,
        }
    }

    /// The growth weight, or 0 if this axis does not grow.
    pub fn flex(&self) -> f32 {
        match self {
            Sizing::Grow { weight, .. } => *weight,
            _ => 0.0,
        }
    }

    /// Whether this axis participates in grow distribution.
    pub fn is_grow(&self) -> bool {
        matches!(self, Sizing::Grow { .. })
    }

    /// The `[min, max]` clamp this sizing imposes.
    pub fn bounds(&self) -> (f32, f32) {
        match *self {
            Sizing::Fit { min, max } | Sizing::Grow { min, max, .. } => (min, max),
            Sizing::Fixed(px) => (px, px),
            Sizing::Percent(_) => (0.0, f32::INFINITY),
        }
    }

    /// Clamp `value` into this sizing's bounds.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        let (min, max) = self.bounds();
        value.max(min).min(max)
    }
}

/// Direction children flow in. Defines the main axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    LeftToRight,
    TopToBottom,
}

impl Direction {
    /// The main axis for this direction.
    #[inline]
    pub fn main_axis(self) -> Axis {
        match self {
            Direction::LeftToRight => Axis::Horizontal,
            Direction::TopToBottom => Axis::Vertical,
        }
    }
}

/// A layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    #[inline]
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// Alignment of children along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

impl Alignment {
    /// Offset of an item inside `free` pixels of slack.
    #[inline]
    pub fn offset(self, free: f32) -> f32 {
        match self {
            Alignment::Start => 0.0,
            Alignment::Center => free / 2.0,
            Alignment::End => free,
        }
    }
}

/// Child alignment on both axes.
///
/// The cross-axis component positions each child inside the content box.
/// The main-axis component shifts the whole run of children when it does
/// not fill the content box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildAlignment {
    pub x: Alignment,
    pub y: Alignment,
}

impl ChildAlignment {
    pub const fn new(x: Alignment, y: Alignment) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn along(&self, axis: Axis) -> Alignment {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

/// Padding around content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    /// Create padding with explicit values for each side.
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Uniform padding on all sides.
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Symmetric padding (horizontal, vertical).
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Total horizontal padding.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Total vertical padding.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Total padding along `axis`.
    #[inline]
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.horizontal(),
            Axis::Vertical => self.vertical(),
        }
    }

    /// Leading inset along `axis` (left or top).
    #[inline]
    pub fn leading(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|v| *v >= 0.0 && v.is_finite())
    }

    pub(crate) fn sanitized(&self) -> Self {
        let fix = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            top: fix(self.top),
            right: fix(self.right),
            bottom: fix(self.bottom),
            left: fix(self.left),
        }
    }
}
