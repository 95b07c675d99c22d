use std::{cell::RefCell, rc::Rc};

use crate::{
    Behavior, Context, NodeId, Registry,
    error::{Error, Result},
    event::{
        Event, EventType, Phase,
        listener::{Callback, ListenerPhase},
    },
    render::RenderBackend,
};

/// One observed hook call or listener invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// `on_init` ran.
    Init(String),
    /// `on_quit` ran.
    Quit(String),
    /// `on_update` ran.
    Update(String),
    /// `on_render` ran.
    Render(String),
    /// An event reached a behavior or listener.
    Event {
        /// Probe or listener tag.
        tag: String,
        /// Event type.
        kind: EventType,
        /// Phase at delivery.
        phase: Phase,
        /// Node whose listener or behavior ran.
        current: Option<NodeId>,
        /// Related node.
        related: Option<NodeId>,
    },
}

impl Record {
    /// Compact description used in assertions, e.g. `a:added_to_stage`.
    pub fn short(&self) -> String {
        match self {
            Self::Init(t) => format!("{t}:init"),
            Self::Quit(t) => format!("{t}:quit"),
            Self::Update(t) => format!("{t}:update"),
            Self::Render(t) => format!("{t}:render"),
            Self::Event { tag, kind, .. } => format!("{tag}:{kind}"),
        }
    }
}

/// Shared, append-only log of records.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    /// Records in arrival order.
    records: Rc<RefCell<Vec<Record>>>,
}

impl Journal {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&self, record: Record) {
        self.records.borrow_mut().push(record);
    }

    /// A copy of every record.
    pub fn records(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }

    /// Every record in short form.
    pub fn short(&self) -> Vec<String> {
        self.records.borrow().iter().map(Record::short).collect()
    }

    /// Event records of one type.
    pub fn events(&self, kind: &EventType) -> Vec<Record> {
        self.records
            .borrow()
            .iter()
            .filter(|r| matches!(r, Record::Event { kind: k, .. } if k == kind))
            .cloned()
            .collect()
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }

    /// A callback that records each delivery under `tag`.
    pub fn listener(&self, tag: &str) -> Callback {
        let journal = self.clone();
        let tag = tag.to_string();
        Callback::new(move |e: &mut Event, _: &mut dyn Context| {
            journal.push(Record::Event {
                tag: tag.clone(),
                kind: e.kind().clone(),
                phase: e.phase(),
                current: e.current_target(),
                related: e.related(),
            });
            Ok(())
        })
    }

    /// Register recording listeners for every lifecycle event type on a
    /// node, in the given phase.
    pub fn watch_lifecycle(
        &self,
        registry: &mut Registry,
        node: NodeId,
        tag: &str,
        phase: ListenerPhase,
    ) -> Result<()> {
        for kind in [
            EventType::Added,
            EventType::AddedToStage,
            EventType::Removed,
            EventType::RemovedFromStage,
        ] {
            registry.add_event_listener(node, kind, self.listener(tag), phase, 0)?;
        }
        Ok(())
    }
}

/// Closure run from a probe's `on_update`.
type UpdateHook = Box<dyn FnMut(&mut dyn Context) -> Result<()>>;

/// A behavior that records every hook into a journal. It can optionally run
/// a closure on update and fail its self test.
pub struct Probe {
    /// Tag used in records.
    tag: String,
    /// Destination.
    journal: Journal,
    /// Extra work on update.
    on_update: Option<UpdateHook>,
    /// Fail `self_test` when set.
    broken: bool,
}

impl Probe {
    /// A probe that records under `tag`.
    pub fn new(tag: &str, journal: &Journal) -> Self {
        Self {
            tag: tag.to_string(),
            journal: journal.clone(),
            on_update: None,
            broken: false,
        }
    }

    /// Run `f` on every update.
    pub fn on_update(mut self, f: impl FnMut(&mut dyn Context) -> Result<()> + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Make `self_test` fail.
    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    /// The probe's tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl Behavior for Probe {
    fn on_init(&mut self, _ctx: &mut dyn Context) -> Result<()> {
        self.journal.push(Record::Init(self.tag.clone()));
        Ok(())
    }

    fn on_quit(&mut self, _ctx: &mut dyn Context) {
        self.journal.push(Record::Quit(self.tag.clone()));
    }

    fn on_update(&mut self, ctx: &mut dyn Context) -> Result<()> {
        self.journal.push(Record::Update(self.tag.clone()));
        match self.on_update.as_mut() {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }

    fn on_render(&mut self, _backend: &mut dyn RenderBackend, _ctx: &mut dyn Context) -> Result<()> {
        self.journal.push(Record::Render(self.tag.clone()));
        Ok(())
    }

    fn on_event(&mut self, event: &mut Event, _ctx: &mut dyn Context) -> Result<()> {
        self.journal.push(Record::Event {
            tag: self.tag.clone(),
            kind: event.kind().clone(),
            phase: event.phase(),
            current: event.current_target(),
            related: event.related(),
        });
        Ok(())
    }

    fn self_test(&mut self, _ctx: &mut dyn Context) -> Result<()> {
        if self.broken {
            return Err(Error::Callback(format!("{} is broken", self.tag)));
        }
        Ok(())
    }
}
