use std::{
    any::TypeId,
    cmp::Reverse,
    collections::HashMap,
    fmt,
    ptr,
    rc::Rc,
};

use crate::{
    Context,
    error::Result,
    event::{Event, EventType},
};

/// Signature shared by all listener callbacks.
pub type CallbackFn = dyn Fn(&mut Event, &mut dyn Context) -> Result<()>;

/// A shareable listener callback.
///
/// Clones compare equal by identity. The closure's concrete type is kept as
/// its class, so a callback can still be matched by type when the caller no
/// longer holds the original.
#[derive(Clone)]
pub struct Callback {
    /// The callback.
    func: Rc<CallbackFn>,
    /// `TypeId` of the closure type.
    class: TypeId,
}

impl Callback {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Event, &mut dyn Context) -> Result<()> + 'static,
    {
        Self {
            func: Rc::new(f),
            class: TypeId::of::<F>(),
        }
    }

    /// Invoke the callback.
    pub fn call(&self, event: &mut Event, ctx: &mut dyn Context) -> Result<()> {
        (self.func)(event, ctx)
    }

    /// Do both handles refer to the same closure?
    pub fn same(&self, other: &Self) -> bool {
        ptr::addr_eq(Rc::as_ptr(&self.func), Rc::as_ptr(&other.func))
    }

    /// The closure's type.
    pub fn class(&self) -> TypeId {
        self.class
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("ptr", &Rc::as_ptr(&self.func).cast::<()>())
            .finish()
    }
}

impl<F> From<F> for Callback
where
    F: Fn(&mut Event, &mut dyn Context) -> Result<()> + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Identifier returned when a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Which table a listener lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerPhase {
    /// Runs while the event travels towards the target, and at the target
    /// before the behavior.
    Capture,
    /// Runs at the target after the behavior, and while the event travels
    /// back towards the root.
    Bubble,
}

/// A registered listener.
#[derive(Debug, Clone)]
pub struct Listener {
    /// Registration id.
    pub(crate) id: ListenerId,
    /// The callback.
    pub(crate) callback: Callback,
    /// Higher priorities run first.
    pub(crate) priority: i32,
}

impl Listener {
    /// Registration id.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Callback.
    pub fn callback(&self) -> &Callback {
        &self.callback
    }
}

/// Listeners for one phase, bucketed by event type.
#[derive(Debug, Clone, Default)]
pub struct ListenerTable {
    /// Buckets in descending priority, insertion order within a priority.
    buckets: HashMap<EventType, Vec<Listener>>,
}

impl ListenerTable {
    /// Insert a listener, keeping the bucket sorted.
    pub(crate) fn insert(&mut self, kind: EventType, listener: Listener) {
        let bucket = self.buckets.entry(kind).or_default();
        bucket.push(listener);
        bucket.sort_by_key(|l| Reverse(l.priority));
    }

    /// Listeners for an event type, in invocation order.
    pub fn get(&self, kind: &EventType) -> &[Listener] {
        self.buckets.get(kind).map_or(&[], Vec::as_slice)
    }

    /// Remove a callback. An identical callback is removed if present;
    /// otherwise the first callback of the same class is removed, and if all
    /// that remain share the class the bucket is cleared. Returns the number
    /// of listeners removed.
    pub(crate) fn remove_callback(&mut self, kind: &EventType, callback: &Callback) -> usize {
        let Some(bucket) = self.buckets.get_mut(kind) else {
            return 0;
        };
        let before = bucket.len();
        if let Some(pos) = bucket.iter().position(|l| l.callback.same(callback)) {
            bucket.remove(pos);
        } else if let Some(pos) = bucket
            .iter()
            .position(|l| l.callback.class() == callback.class())
        {
            bucket.remove(pos);
            if bucket.iter().all(|l| l.callback.class() == callback.class()) {
                bucket.clear();
            }
        }
        let removed = before - bucket.len();
        if bucket.is_empty() {
            self.buckets.remove(kind);
        }
        removed
    }

    /// Remove a listener by id.
    pub(crate) fn remove_id(&mut self, id: ListenerId) -> bool {
        let mut found = None;
        for (kind, bucket) in &mut self.buckets {
            if let Some(pos) = bucket.iter().position(|l| l.id == id) {
                bucket.remove(pos);
                found = Some((kind.clone(), bucket.is_empty()));
                break;
            }
        }
        match found {
            Some((kind, empty)) => {
                if empty {
                    self.buckets.remove(&kind);
                }
                true
            }
            None => false,
        }
    }

    /// Total number of listeners.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// A node's capture and bubble tables.
#[derive(Debug, Clone, Default)]
pub struct Listeners {
    /// Capture-phase listeners.
    capture: ListenerTable,
    /// Bubble-phase listeners.
    bubble: ListenerTable,
}

impl Listeners {
    /// Table for a phase.
    pub fn table(&self, phase: ListenerPhase) -> &ListenerTable {
        match phase {
            ListenerPhase::Capture => &self.capture,
            ListenerPhase::Bubble => &self.bubble,
        }
    }

    /// Mutable table for a phase.
    pub(crate) fn table_mut(&mut self, phase: ListenerPhase) -> &mut ListenerTable {
        match phase {
            ListenerPhase::Capture => &mut self.capture,
            ListenerPhase::Bubble => &mut self.bubble,
        }
    }

    /// Is any listener registered for the type in either phase?
    pub fn has(&self, kind: &EventType) -> bool {
        !self.capture.get(kind).is_empty() || !self.bubble.get(kind).is_empty()
    }

    /// Total listeners across both phases.
    pub fn len(&self) -> usize {
        self.capture.len() + self.bubble.len()
    }

    /// No listeners in either phase?
    pub fn is_empty(&self) -> bool {
        self.capture.is_empty() && self.bubble.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener(id: u64, priority: i32, callback: Callback) -> Listener {
        Listener {
            id: ListenerId(id),
            callback,
            priority,
        }
    }

    fn noop() -> Callback {
        Callback::new(|_, _| Ok(()))
    }

    #[test]
    fn sorted_descending_and_stable() {
        let mut t = ListenerTable::default();
        t.insert(EventType::Click, listener(1, 0, noop()));
        t.insert(EventType::Click, listener(2, 5, noop()));
        t.insert(EventType::Click, listener(3, 0, noop()));
        t.insert(EventType::Click, listener(4, 5, noop()));
        let ids: Vec<u64> = t.get(&EventType::Click).iter().map(|l| l.id.0).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn remove_by_identity() {
        let mut t = ListenerTable::default();
        let a = Callback::new(|_, _| Ok(()));
        let b = Callback::new(|e: &mut Event, _: &mut dyn Context| {
            e.stop_propagation();
            Ok(())
        });
        t.insert(EventType::Click, listener(1, 0, a.clone()));
        t.insert(EventType::Click, listener(2, 0, b));
        assert_eq!(t.remove_callback(&EventType::Click, &a), 1);
        assert_eq!(t.get(&EventType::Click).len(), 1);
        assert_eq!(t.get(&EventType::Click)[0].id, ListenerId(2));
        assert_eq!(t.remove_callback(&EventType::Click, &a), 0);
    }

    #[test]
    fn remove_by_class_clears_uniform_bucket() {
        fn make() -> Callback {
            Callback::new(|_, _| Ok(()))
        }
        let mut t = ListenerTable::default();
        t.insert(EventType::Click, listener(1, 0, make()));
        t.insert(EventType::Click, listener(2, 0, make()));
        t.insert(EventType::Click, listener(3, 0, make()));
        // A fresh closure of the same type is a different identity.
        assert_eq!(t.remove_callback(&EventType::Click, &make()), 3);
        assert!(t.is_empty());
    }

    #[test]
    fn remove_by_id() {
        let mut t = ListenerTable::default();
        t.insert(EventType::KeyDown, listener(1, 0, noop()));
        t.insert(EventType::Click, listener(2, 0, noop()));
        assert!(t.remove_id(ListenerId(2)));
        assert!(!t.remove_id(ListenerId(2)));
        assert!(t.get(&EventType::Click).is_empty());
        assert_eq!(t.len(), 1);
    }
}
