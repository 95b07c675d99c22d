//! Geometry primitives used across trellis.
//!
//! Node geometry is expressed as four independent edges. Each edge is stored
//! as an offset from an [`Anchor`] point on the parent's resolved [`Bounds`].

#![warn(missing_docs)]

/// Anchor points and edge selectors.
mod anchor;
/// Edge-based rectangles.
mod bounds;
/// Points and sizes.
mod point;

pub use anchor::{Anchor, Edge, HAlign, ParseAnchorError, VAlign};
pub use bounds::Bounds;
pub use point::{Point, Size};
