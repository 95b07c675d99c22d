//! Convenience re-exports for common Trellis types.

pub use crate::{
    Behavior, Callback, Container, Context, Event, EventType, ListenerPhase, NodeConfig, NodeId,
    Placement, Registry, Retention, Scene, TypedId, error,
    geom::{Anchor, Bounds, Edge, Point, Size},
    render::RenderBackend,
};

/// Common result alias for Trellis operations.
pub type Result<T> = error::Result<T>;
