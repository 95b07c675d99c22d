//! The scene-graph runtime: registry, nodes, geometry, ordering, deferred
//! mutation, events and the frame driver.

/// Node configuration and registry settings.
pub mod config;
/// Context handed to behaviors and listeners.
pub mod context;
/// Debug dump utilities.
pub mod dump;
/// Core error types.
pub mod error;
/// Events, listeners and dispatch.
pub mod event;
/// Behavior constructors by kind.
pub mod factory;
/// Anchor-relative geometry.
pub mod geometry;
/// Node handle types.
pub mod id;
/// Node data stored in the arena.
pub mod node;
/// Sibling ordering.
pub mod order;
/// Orphan retention and garbage collection.
pub mod orphan;
/// Update, render and self-test passes.
pub mod pass;
/// The node registry.
pub mod registry;
/// Rendering interfaces.
pub mod render;
/// The per-frame driver.
pub mod scene;
/// Shared node name types.
pub mod state;
/// Tab navigation.
pub mod tab;
/// Testing utilities.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
/// Traversal scopes and deferred mutation records.
pub mod traversal;
/// Structural mutation.
pub mod tree;

pub use config::{NodeConfig, Settings};
pub use context::{Context, NodeContext};
pub use factory::Factory;
pub use id::{NodeId, TypedId};
pub use node::{Anchors, Flags, Node};
pub use orphan::{Grace, Orphan, Retention};
pub use registry::Registry;
pub use scene::{FrameStats, Scene};
pub use traversal::{FutureChild, OrphanRequest, Placement, Traversal, TraversalKind};
pub use tree::{Maintenance, Mutation};
