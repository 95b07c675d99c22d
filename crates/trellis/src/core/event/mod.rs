//! Events delivered through the capture/bubble dispatcher.

/// Capture/bubble dispatch on the registry.
pub mod dispatch;
/// Listener storage.
pub mod listener;

use std::{borrow::Cow, fmt, time::Instant};

use crate::{NodeId, geom::Point};

/// The type of an event. Listener tables are keyed by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    /// The node was attached to a parent.
    Added,
    /// The node is being detached from its parent.
    Removed,
    /// The node became reachable from the stage.
    AddedToStage,
    /// The node is about to become unreachable from the stage.
    RemovedFromStage,
    /// A key was pressed.
    KeyDown,
    /// A key was released.
    KeyUp,
    /// A pointer button was pressed.
    PointerDown,
    /// A pointer button was released.
    PointerUp,
    /// The pointer moved.
    PointerMove,
    /// A completed press and release on the same node.
    Click,
    /// The node gained input focus.
    Focus,
    /// The node lost input focus.
    Blur,
    /// Application-defined event.
    Named(Cow<'static, str>),
}

impl EventType {
    /// An application-defined event type.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named(name.into())
    }

    /// True for the four structural lifecycle types.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::Added | Self::Removed | Self::AddedToStage | Self::RemovedFromStage
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => f.write_str("added"),
            Self::Removed => f.write_str("removed"),
            Self::AddedToStage => f.write_str("added_to_stage"),
            Self::RemovedFromStage => f.write_str("removed_from_stage"),
            Self::KeyDown => f.write_str("key_down"),
            Self::KeyUp => f.write_str("key_up"),
            Self::PointerDown => f.write_str("pointer_down"),
            Self::PointerUp => f.write_str("pointer_up"),
            Self::PointerMove => f.write_str("pointer_move"),
            Self::Click => f.write_str("click"),
            Self::Focus => f.write_str("focus"),
            Self::Blur => f.write_str("blur"),
            Self::Named(n) => f.write_str(n),
        }
    }
}

/// Where an event currently is on its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Not being dispatched.
    #[default]
    None,
    /// Travelling from the root towards the target.
    Capture,
    /// At the target node.
    AtTarget,
    /// Travelling from the target back to the root.
    Bubble,
}

/// Native input data carried by an event. The core never interprets it.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Keyboard input.
    Key {
        /// Platform key name.
        code: String,
        /// True while the key is held and repeating.
        repeat: bool,
    },
    /// Pointer input in stage coordinates.
    Pointer {
        /// Pointer position.
        position: Point,
        /// Button index, 0 for primary.
        button: u8,
    },
    /// Text input.
    Text(String),
    /// Arbitrary structured data.
    Data(serde_json::Value),
}

/// Propagation state, checked between listener invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Propagation {
    /// Keep going.
    #[default]
    Continue,
    /// Finish the current node and phase, then stop.
    Stop,
    /// Stop before the next listener.
    StopImmediate,
}

/// An event. Created by the caller, then stamped by the dispatcher with its
/// target, current node and phase as it travels.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event type.
    kind: EventType,
    /// Node the event was dispatched to.
    target: Option<NodeId>,
    /// Node whose listeners are currently running.
    current: Option<NodeId>,
    /// Secondary node, e.g. the parent for lifecycle events.
    related: Option<NodeId>,
    /// Current phase.
    phase: Phase,
    /// Creation time.
    created: Instant,
    /// Frame the event was dispatched in.
    frame: u64,
    /// Optional native input.
    payload: Option<Payload>,
    /// Cancellation state.
    propagation: Propagation,
    /// Number of listener and behavior invocations so far.
    delivered: usize,
}

impl Event {
    /// Construct an event of the given type.
    pub fn new(kind: EventType) -> Self {
        Self {
            kind,
            target: None,
            current: None,
            related: None,
            phase: Phase::None,
            created: Instant::now(),
            frame: 0,
            payload: None,
            propagation: Propagation::Continue,
            delivered: 0,
        }
    }

    /// Set the related node.
    pub fn with_related(mut self, related: NodeId) -> Self {
        self.related = Some(related);
        self
    }

    /// Attach an input payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Event type.
    pub fn kind(&self) -> &EventType {
        &self.kind
    }

    /// Node the event was dispatched to.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Node whose listeners are currently running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current
    }

    /// Related node.
    pub fn related(&self) -> Option<NodeId> {
        self.related
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Creation time.
    pub fn created(&self) -> Instant {
        self.created
    }

    /// Frame the event was dispatched in.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Input payload, if any.
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Number of listener and behavior invocations made so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Stop after the listeners of the current node and phase have run.
    pub fn stop_propagation(&mut self) {
        if self.propagation == Propagation::Continue {
            self.propagation = Propagation::Stop;
        }
    }

    /// Stop before the next listener runs.
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation = Propagation::StopImmediate;
    }

    /// Has either stop been requested?
    pub fn is_stopped(&self) -> bool {
        self.propagation != Propagation::Continue
    }

    /// Has an immediate stop been requested?
    pub fn is_stopped_immediately(&self) -> bool {
        self.propagation == Propagation::StopImmediate
    }

    /// Prepare for dispatch to `target` in `frame`.
    pub(crate) fn begin(&mut self, target: NodeId, frame: u64) {
        self.target = Some(target);
        self.frame = frame;
        self.propagation = Propagation::Continue;
        self.delivered = 0;
    }

    /// Move the event to a node and phase.
    pub(crate) fn enter(&mut self, node: NodeId, phase: Phase) {
        self.current = Some(node);
        self.phase = phase;
    }

    /// Record one invocation.
    pub(crate) fn count_delivery(&mut self) {
        self.delivered += 1;
    }

    /// Reset positional state after dispatch completes.
    pub(crate) fn finish(&mut self) {
        self.current = None;
        self.phase = Phase::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_escalates_but_never_downgrades() {
        let mut e = Event::new(EventType::Click);
        assert!(!e.is_stopped());
        e.stop_propagation();
        assert!(e.is_stopped());
        assert!(!e.is_stopped_immediately());
        e.stop_immediate_propagation();
        assert!(e.is_stopped_immediately());
        e.stop_propagation();
        assert!(e.is_stopped_immediately());
    }

    #[test]
    fn lifecycle_types() {
        assert!(EventType::Added.is_lifecycle());
        assert!(EventType::RemovedFromStage.is_lifecycle());
        assert!(!EventType::Click.is_lifecycle());
        assert!(!EventType::named("custom").is_lifecycle());
        assert_eq!(EventType::named("custom").to_string(), "custom");
        assert_eq!(EventType::AddedToStage.to_string(), "added_to_stage");
    }
}
