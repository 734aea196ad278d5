use std::cmp::Ordering;
use std::fmt::Debug;

use crate::byte_order::ByteOrder;
use crate::error::TrieResult;

/// A `NodeStore` owns every node of one trie and hands out copyable handles to
/// them. Handles are indices into store-owned storage, never borrowed
/// references; any accessor takes the store explicitly. A handle is valid only
/// as long as `invalidations()` has not moved since the handle was obtained.
///
/// The root node exists from creation, carries value 0 (never examined), has
/// no sibling and is terminal exactly when the empty key is stored. Sibling
/// lists are strictly increasing under `byte_order()`, and no node other than
/// the root is ever left non-terminal and childless once a public operation
/// returns.
pub trait NodeStore {
    type Node: Copy + PartialEq + Debug;

    fn root(&self) -> Self::Node;
    fn byte_order(&self) -> ByteOrder;

    /// Whether per-node terminal-descendant counts are maintained. Counting
    /// stores answer `count` in O(1) and enable rank/select.
    fn is_counting(&self) -> bool;

    /// Live nodes in the store, the root included.
    fn node_count(&self) -> usize;

    /// Estimated backing storage in bytes.
    fn storage_size(&self) -> usize;

    /// Monotonic tick, incremented by every mutation that may relocate or
    /// free nodes. Cached handles must be re-resolved when it moves.
    fn invalidations(&self) -> u64;

    /// Reserve room for up to `extra` new nodes ahead of a mutation batch, so
    /// that no allocation inside the batch can fail or reorganize storage.
    /// Fails with `CapacityExhausted` against a configured hard cap.
    fn ensure_extra_capacity(&mut self, extra: usize) -> TrieResult<()>;

    /// Rebuild storage for locality and size. Iteration order, counts and
    /// membership are preserved; handles are not.
    fn compact(&mut self) -> TrieResult<()>;

    /// Reset the store to just the (non-terminal) root.
    fn clear(&mut self) -> TrieResult<()>;

    // -- node accessors ------------------------------------------------------

    fn value(&self, n: Self::Node) -> u8;
    fn is_terminal(&self, n: Self::Node) -> bool;

    /// Next-larger sibling under the same parent, if any.
    fn sibling(&self, n: Self::Node) -> Option<Self::Node>;

    /// Least child, if any.
    fn child(&self, n: Self::Node) -> Option<Self::Node>;

    fn last_child(&self, n: Self::Node) -> Option<Self::Node> {
        let mut c = self.child(n)?;
        while let Some(s) = self.sibling(c) {
            c = s;
        }
        Some(c)
    }

    fn find_child(&self, n: Self::Node, value: u8) -> Option<Self::Node> {
        let order = self.byte_order();
        let mut c = self.child(n)?;
        loop {
            match order.compare(self.value(c), value) {
                Ordering::Equal => return Some(c),
                Ordering::Greater => return None,
                Ordering::Less => c = self.sibling(c)?,
            }
        }
    }

    /// First child whose value is `>= value` under the byte order.
    fn find_child_or_next(&self, n: Self::Node, value: u8) -> Option<Self::Node> {
        let order = self.byte_order();
        let mut c = self.child(n)?;
        while order.compare(self.value(c), value) == Ordering::Less {
            c = self.sibling(c)?;
        }
        Some(c)
    }

    /// Terminal descendants reachable through `n`, including `n` itself when
    /// terminal. Counting stores only.
    fn count(&self, n: Self::Node) -> usize;

    /// Terminals under `n` that sort strictly before `value`, plus one when
    /// `n` is itself terminal. This is the rank contribution of one descent
    /// step. Counting stores only.
    fn count_to_child(&self, n: Self::Node, value: u8) -> usize {
        let order = self.byte_order();
        let mut r = usize::from(self.is_terminal(n));
        let mut c = self.child(n);
        while let Some(x) = c {
            if order.compare(self.value(x), value) == Ordering::Less {
                r += self.count(x);
                c = self.sibling(x);
            } else {
                break;
            }
        }
        r
    }

    // -- mutation primitives -------------------------------------------------

    /// Set or clear the terminal flag, returning whether a transition
    /// occurred. Counts are not touched; the path layer applies the matching
    /// count delta via `adjust_counts`.
    fn set_terminal(&mut self, n: Self::Node, terminal: bool) -> TrieResult<bool>;

    /// The single insertion primitive: return the child of `n` with the given
    /// value, inserting it at its sorted position among the siblings when
    /// absent. A newly inserted first child becomes the parent's child
    /// pointer.
    fn find_or_insert_child(&mut self, n: Self::Node, value: u8) -> TrieResult<Self::Node>;

    /// Apply `delta` to the count of every node on the path, exactly once per
    /// distinct underlying node. Backends that share one record between
    /// adjacent path entries collapse them and derive in-record counts from
    /// their terminal masks. No-op on non-counting stores.
    fn adjust_counts(&mut self, stack: &[Self::Node], delta: i64) -> TrieResult<()>;

    /// Unlink `child` from `parent` and free its entire subtree. The caller
    /// guarantees the subtree holds no terminals, so counts are unaffected.
    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> TrieResult<()>;

    /// Free every descendant of `n` and clear its terminal flag, leaving `n`
    /// dangling. Ancestor counts are the caller's business.
    fn detach_children(&mut self, n: Self::Node) -> TrieResult<()>;

    // -- order-trusting builders, used only by stream decoding ---------------

    /// Attach a first child to a childless node. The decoder guarantees
    /// call order; values are not compared.
    fn append_child(&mut self, parent: Self::Node, value: u8) -> TrieResult<Self::Node>;

    /// Attach a next-larger sibling to a node without one. The decoder
    /// guarantees call order; values are not compared.
    fn append_sibling(&mut self, n: Self::Node, value: u8) -> TrieResult<Self::Node>;

    /// Invoked once decoding drained its stack: rebuild counts from the
    /// terminal flags and, where the backend benefits, compact.
    fn read_complete(&mut self) -> TrieResult<()>;
}

impl<S: NodeStore> NodeStore for &mut S {
    type Node = S::Node;

    fn root(&self) -> Self::Node {
        (**self).root()
    }
    fn byte_order(&self) -> ByteOrder {
        (**self).byte_order()
    }
    fn is_counting(&self) -> bool {
        (**self).is_counting()
    }
    fn node_count(&self) -> usize {
        (**self).node_count()
    }
    fn storage_size(&self) -> usize {
        (**self).storage_size()
    }
    fn invalidations(&self) -> u64 {
        (**self).invalidations()
    }
    fn ensure_extra_capacity(&mut self, extra: usize) -> TrieResult<()> {
        (**self).ensure_extra_capacity(extra)
    }
    fn compact(&mut self) -> TrieResult<()> {
        (**self).compact()
    }
    fn clear(&mut self) -> TrieResult<()> {
        (**self).clear()
    }
    fn value(&self, n: Self::Node) -> u8 {
        (**self).value(n)
    }
    fn is_terminal(&self, n: Self::Node) -> bool {
        (**self).is_terminal(n)
    }
    fn sibling(&self, n: Self::Node) -> Option<Self::Node> {
        (**self).sibling(n)
    }
    fn child(&self, n: Self::Node) -> Option<Self::Node> {
        (**self).child(n)
    }
    fn last_child(&self, n: Self::Node) -> Option<Self::Node> {
        (**self).last_child(n)
    }
    fn find_child(&self, n: Self::Node, value: u8) -> Option<Self::Node> {
        (**self).find_child(n, value)
    }
    fn find_child_or_next(&self, n: Self::Node, value: u8) -> Option<Self::Node> {
        (**self).find_child_or_next(n, value)
    }
    fn count(&self, n: Self::Node) -> usize {
        (**self).count(n)
    }
    fn count_to_child(&self, n: Self::Node, value: u8) -> usize {
        (**self).count_to_child(n, value)
    }
    fn set_terminal(&mut self, n: Self::Node, terminal: bool) -> TrieResult<bool> {
        (**self).set_terminal(n, terminal)
    }
    fn find_or_insert_child(&mut self, n: Self::Node, value: u8) -> TrieResult<Self::Node> {
        (**self).find_or_insert_child(n, value)
    }
    fn adjust_counts(&mut self, stack: &[Self::Node], delta: i64) -> TrieResult<()> {
        (**self).adjust_counts(stack, delta)
    }
    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> TrieResult<()> {
        (**self).remove_child(parent, child)
    }
    fn detach_children(&mut self, n: Self::Node) -> TrieResult<()> {
        (**self).detach_children(n)
    }
    fn append_child(&mut self, parent: Self::Node, value: u8) -> TrieResult<Self::Node> {
        (**self).append_child(parent, value)
    }
    fn append_sibling(&mut self, n: Self::Node, value: u8) -> TrieResult<Self::Node> {
        (**self).append_sibling(n, value)
    }
    fn read_complete(&mut self) -> TrieResult<()> {
        (**self).read_complete()
    }
}
