use crate::{Edge, Point, Size};

/// An axis-aligned box described by its four absolute edges.
///
/// Edges are independent: nothing forces `left <= right`. Width and height
/// are therefore reported as absolute differences.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl Bounds {
    /// Construct bounds from edges.
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Construct bounds from an origin and a size.
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// Bounds anchored at the origin with the given size.
    pub fn from_size(size: Size) -> Self {
        Self::from_xywh(0.0, 0.0, size.w, size.h)
    }

    /// `|right - left|`
    pub fn width(&self) -> f32 {
        (self.right - self.left).abs()
    }

    /// `|bottom - top|`
    pub fn height(&self) -> f32 {
        (self.bottom - self.top).abs()
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Top-left point.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Read one edge.
    pub fn edge(&self, edge: Edge) -> f32 {
        match edge {
            Edge::Left => self.left,
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
        }
    }

    /// Replace one edge.
    pub fn set_edge(&mut self, edge: Edge, value: f32) {
        match edge {
            Edge::Left => self.left = value,
            Edge::Top => self.top = value,
            Edge::Right => self.right = value,
            Edge::Bottom => self.bottom = value,
        }
    }

    /// Shift all edges by an offset.
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Move the box so its left/top corner sits at `p`, keeping its extent.
    pub fn at(&self, p: Point) -> Self {
        self.translate(p.x - self.left, p.y - self.top)
    }

    /// Does the box contain the point? Edges are inclusive on the low side
    /// and exclusive on the high side, regardless of edge order.
    pub fn contains(&self, p: Point) -> bool {
        let (x0, x1) = ordered(self.left, self.right);
        let (y0, y1) = ordered(self.top, self.bottom);
        p.x >= x0 && p.x < x1 && p.y >= y0 && p.y < y1
    }
}

/// Return a pair in ascending order.
fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}
