use crate::byte_order::ByteOrder;
use crate::error::{TrieError, TrieResult};
use crate::store::NodeStore;

/// A store wrapper that forwards every read and turns every mutator into
/// [`TrieError::Immutable`]. The first mutating call fails; the wrapped store
/// is never touched.
#[derive(Clone)]
pub struct Immutable<S>(S);

impl<S: NodeStore> Immutable<S> {
    pub fn new(store: S) -> Self {
        Immutable(store)
    }

    pub fn get_ref(&self) -> &S {
        &self.0
    }

    /// Unwrap into a mutable store again.
    pub fn into_inner(self) -> S {
        self.0
    }

    /// A deep copy that accepts mutation.
    pub fn mutable_copy(&self) -> S
    where
        S: Clone,
    {
        self.0.clone()
    }
}

impl<S: NodeStore> NodeStore for Immutable<S> {
    type Node = S::Node;

    fn root(&self) -> Self::Node {
        self.0.root()
    }
    fn byte_order(&self) -> ByteOrder {
        self.0.byte_order()
    }
    fn is_counting(&self) -> bool {
        self.0.is_counting()
    }
    fn node_count(&self) -> usize {
        self.0.node_count()
    }
    fn storage_size(&self) -> usize {
        self.0.storage_size()
    }
    fn invalidations(&self) -> u64 {
        self.0.invalidations()
    }
    fn value(&self, n: Self::Node) -> u8 {
        self.0.value(n)
    }
    fn is_terminal(&self, n: Self::Node) -> bool {
        self.0.is_terminal(n)
    }
    fn sibling(&self, n: Self::Node) -> Option<Self::Node> {
        self.0.sibling(n)
    }
    fn child(&self, n: Self::Node) -> Option<Self::Node> {
        self.0.child(n)
    }
    fn last_child(&self, n: Self::Node) -> Option<Self::Node> {
        self.0.last_child(n)
    }
    fn find_child(&self, n: Self::Node, value: u8) -> Option<Self::Node> {
        self.0.find_child(n, value)
    }
    fn find_child_or_next(&self, n: Self::Node, value: u8) -> Option<Self::Node> {
        self.0.find_child_or_next(n, value)
    }
    fn count(&self, n: Self::Node) -> usize {
        self.0.count(n)
    }
    fn count_to_child(&self, n: Self::Node, value: u8) -> usize {
        self.0.count_to_child(n, value)
    }

    fn ensure_extra_capacity(&mut self, _extra: usize) -> TrieResult<()> {
        Err(TrieError::Immutable)
    }
    fn compact(&mut self) -> TrieResult<()> {
        Err(TrieError::Immutable)
    }
    fn clear(&mut self) -> TrieResult<()> {
        Err(TrieError::Immutable)
    }
    fn set_terminal(&mut self, _n: Self::Node, _terminal: bool) -> TrieResult<bool> {
        Err(TrieError::Immutable)
    }
    fn find_or_insert_child(&mut self, _n: Self::Node, _value: u8) -> TrieResult<Self::Node> {
        Err(TrieError::Immutable)
    }
    fn adjust_counts(&mut self, _stack: &[Self::Node], _delta: i64) -> TrieResult<()> {
        Err(TrieError::Immutable)
    }
    fn remove_child(&mut self, _parent: Self::Node, _child: Self::Node) -> TrieResult<()> {
        Err(TrieError::Immutable)
    }
    fn detach_children(&mut self, _n: Self::Node) -> TrieResult<()> {
        Err(TrieError::Immutable)
    }
    fn append_child(&mut self, _parent: Self::Node, _value: u8) -> TrieResult<Self::Node> {
        Err(TrieError::Immutable)
    }
    fn append_sibling(&mut self, _n: Self::Node, _value: u8) -> TrieResult<Self::Node> {
        Err(TrieError::Immutable)
    }
    fn read_complete(&mut self) -> TrieResult<()> {
        Err(TrieError::Immutable)
    }
}
