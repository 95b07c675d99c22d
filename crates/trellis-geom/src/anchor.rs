use std::{fmt, str::FromStr};

use crate::Bounds;

/// Horizontal component of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HAlign {
    /// Parent's left edge.
    Left,
    /// Parent's horizontal midpoint.
    Center,
    /// Parent's right edge.
    Right,
}

/// Vertical component of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VAlign {
    /// Parent's top edge.
    Top,
    /// Parent's vertical midpoint.
    Middle,
    /// Parent's bottom edge.
    Bottom,
}

/// One of the four edges of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Left edge (x axis).
    Left,
    /// Top edge (y axis).
    Top,
    /// Right edge (x axis).
    Right,
    /// Bottom edge (y axis).
    Bottom,
}

impl Edge {
    /// All edges, in left/top/right/bottom order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Top, Self::Right, Self::Bottom];

    /// True for edges measured along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// A named reference point on a parent's box.
///
/// Only the horizontal component matters for the left and right edges, and
/// only the vertical component for the top and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Anchor {
    /// Top-left corner.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "top_left"))]
    TopLeft,
    /// Midpoint of the top edge.
    #[cfg_attr(feature = "serde", serde(alias = "top_center"))]
    TopCenter,
    /// Top-right corner.
    #[cfg_attr(feature = "serde", serde(alias = "top_right"))]
    TopRight,
    /// Midpoint of the left edge.
    #[cfg_attr(feature = "serde", serde(alias = "middle_left"))]
    MiddleLeft,
    /// Center of the box.
    #[cfg_attr(feature = "serde", serde(alias = "middle_center"))]
    MiddleCenter,
    /// Midpoint of the right edge.
    #[cfg_attr(feature = "serde", serde(alias = "middle_right"))]
    MiddleRight,
    /// Bottom-left corner.
    #[cfg_attr(feature = "serde", serde(alias = "bottom_left"))]
    BottomLeft,
    /// Midpoint of the bottom edge.
    #[cfg_attr(feature = "serde", serde(alias = "bottom_center"))]
    BottomCenter,
    /// Bottom-right corner.
    #[cfg_attr(feature = "serde", serde(alias = "bottom_right"))]
    BottomRight,
}

impl Anchor {
    /// All nine anchors in row-major order.
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::MiddleCenter,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Compose an anchor from its components.
    pub fn new(v: VAlign, h: HAlign) -> Self {
        match (v, h) {
            (VAlign::Top, HAlign::Left) => Self::TopLeft,
            (VAlign::Top, HAlign::Center) => Self::TopCenter,
            (VAlign::Top, HAlign::Right) => Self::TopRight,
            (VAlign::Middle, HAlign::Left) => Self::MiddleLeft,
            (VAlign::Middle, HAlign::Center) => Self::MiddleCenter,
            (VAlign::Middle, HAlign::Right) => Self::MiddleRight,
            (VAlign::Bottom, HAlign::Left) => Self::BottomLeft,
            (VAlign::Bottom, HAlign::Center) => Self::BottomCenter,
            (VAlign::Bottom, HAlign::Right) => Self::BottomRight,
        }
    }

    /// The horizontal family of this anchor.
    pub fn horizontal(self) -> HAlign {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft => HAlign::Left,
            Self::TopCenter | Self::MiddleCenter | Self::BottomCenter => HAlign::Center,
            Self::TopRight | Self::MiddleRight | Self::BottomRight => HAlign::Right,
        }
    }

    /// The vertical family of this anchor.
    pub fn vertical(self) -> VAlign {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => VAlign::Top,
            Self::MiddleLeft | Self::MiddleCenter | Self::MiddleRight => VAlign::Middle,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => VAlign::Bottom,
        }
    }

    /// Reference x coordinate on a parent box.
    pub fn reference_x(self, parent: Bounds) -> f32 {
        match self.horizontal() {
            HAlign::Left => parent.left,
            HAlign::Center => parent.left + parent.width() / 2.0,
            HAlign::Right => parent.left + parent.width(),
        }
    }

    /// Reference y coordinate on a parent box.
    pub fn reference_y(self, parent: Bounds) -> f32 {
        match self.vertical() {
            VAlign::Top => parent.top,
            VAlign::Middle => parent.top + parent.height() / 2.0,
            VAlign::Bottom => parent.top + parent.height(),
        }
    }

    /// Reference coordinate for a specific edge: x for left/right, y for
    /// top/bottom.
    pub fn reference(self, edge: Edge, parent: Bounds) -> f32 {
        if edge.is_horizontal() {
            self.reference_x(parent)
        } else {
            self.reference_y(parent)
        }
    }

    /// The canonical upper-case name, e.g. `TOP_LEFT`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "TOP_LEFT",
            Self::TopCenter => "TOP_CENTER",
            Self::TopRight => "TOP_RIGHT",
            Self::MiddleLeft => "MIDDLE_LEFT",
            Self::MiddleCenter => "MIDDLE_CENTER",
            Self::MiddleRight => "MIDDLE_RIGHT",
            Self::BottomLeft => "BOTTOM_LEFT",
            Self::BottomCenter => "BOTTOM_CENTER",
            Self::BottomRight => "BOTTOM_RIGHT",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an anchor name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAnchorError(String);

impl fmt::Display for ParseAnchorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown anchor: {}", self.0)
    }
}

impl std::error::Error for ParseAnchorError {}

impl FromStr for Anchor {
    type Err = ParseAnchorError;

    /// Parse an anchor name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == upper)
            .ok_or_else(|| ParseAnchorError(s.to_string()))
    }
}
