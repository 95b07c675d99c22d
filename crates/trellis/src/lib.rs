//! Trellis: a retained-mode scene graph core.
//!
//! Trellis owns a tree of positioned, anchored, event-aware display nodes.
//! A host loop drives it one frame at a time; behaviors attached to nodes
//! may restructure the tree while it is being traversed, and those changes
//! are applied once the traversal completes.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Registry`] - Node arena, structural operations and event dispatch
//! - [`Scene`] - The per-frame driver
//! - [`Behavior`] - The trait implemented by node logic
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Anchor, Bounds, Point, Size)
//! - [`event`] - Events, listeners and dispatch
//! - [`dump`] - Debug output

#![warn(missing_docs)]

mod core;

pub mod behavior;
pub mod prelude;

pub use trellis_geom as geom;

#[cfg(any(test, feature = "testing"))]
pub use core::testing;
pub use core::{
    Anchors, Context, Factory, Flags, FrameStats, FutureChild, Grace, Maintenance, Mutation, Node,
    NodeConfig, NodeContext, NodeId, Orphan, OrphanRequest, Placement, Registry, Retention, Scene,
    Settings, Traversal, TraversalKind, TypedId,
};
pub use core::{config, dump, error, event, render, state};

pub use behavior::{Behavior, Container};
pub use event::{
    Event, EventType, Payload, Phase,
    listener::{Callback, ListenerId, ListenerPhase},
};
