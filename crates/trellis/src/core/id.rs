use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a node stored in the registry arena.
    ///
    /// Handles are copyable and never own the node. A handle to a destroyed
    /// node never resolves again, even if its slot is reused.
    pub struct NodeId;
}

/// A node handle tagged with the behavior type it was created with.
pub struct TypedId<B> {
    /// Untyped handle.
    id: NodeId,
    /// Marker for the behavior type.
    _marker: PhantomData<fn() -> B>,
}

impl<B> TypedId<B> {
    /// Wrap an untyped handle. The caller asserts the node's behavior is `B`;
    /// typed access checks this again at runtime.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The untyped handle.
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<B> Clone for TypedId<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for TypedId<B> {}

impl<B> PartialEq for TypedId<B> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<B> Eq for TypedId<B> {}

impl<B> Hash for TypedId<B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<B> fmt::Debug for TypedId<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedId").field(&self.id).finish()
    }
}

impl<B> From<TypedId<B>> for NodeId {
    fn from(value: TypedId<B>) -> Self {
        value.id
    }
}

impl<B> PartialEq<NodeId> for TypedId<B> {
    fn eq(&self, other: &NodeId) -> bool {
        self.id == *other
    }
}
