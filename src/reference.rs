use crate::byte_order::ByteOrder;
use crate::error::{TrieError, TrieResult};
use crate::immutable::Immutable;
use crate::store::NodeStore;

const NIL: u32 = u32::MAX;

/// One node of a [`ReferenceStore`]: a standalone record with explicit links.
/// Fast and simple, at roughly one machine word per field.
#[derive(Clone, Copy, Debug)]
struct RefNode {
    value: u8,
    terminal: bool,
    sibling: u32,
    child: u32,
    count: u32,
}

impl RefNode {
    fn new(value: u8) -> Self {
        RefNode {
            value,
            terminal: false,
            sibling: NIL,
            child: NIL,
            count: 0,
        }
    }
}

/// Handle to a node in a [`ReferenceStore`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RefId(u32);

/// The reference backend: every node is its own record in a flat arena,
/// siblings form a sorted singly-linked list, freed records thread a free
/// list through their sibling field. No packing, no compaction; memory-heavy
/// but with the simplest possible mutation paths.
#[derive(Clone, Debug)]
pub struct ReferenceStore {
    nodes: Vec<RefNode>,
    free_head: u32,
    free_count: usize,
    order: ByteOrder,
    counting: bool,
    max_nodes: Option<usize>,
    invalidations: u64,
}

impl ReferenceStore {
    pub fn new(order: ByteOrder, counting: bool) -> Self {
        Self::with_capacity(order, counting, 0, None)
    }

    pub fn with_capacity(
        order: ByteOrder,
        counting: bool,
        capacity_hint: usize,
        max_nodes: Option<usize>,
    ) -> Self {
        let mut nodes = Vec::with_capacity(capacity_hint.max(1));
        nodes.push(RefNode::new(0));
        ReferenceStore {
            nodes,
            free_head: NIL,
            free_count: 0,
            order,
            counting,
            max_nodes,
            invalidations: 0,
        }
    }

    pub fn immutable_copy(&self) -> Immutable<Self> {
        Immutable::new(self.clone())
    }

    pub fn into_immutable(self) -> Immutable<Self> {
        Immutable::new(self)
    }

    fn node(&self, n: RefId) -> &RefNode {
        &self.nodes[n.0 as usize]
    }

    fn node_mut(&mut self, n: RefId) -> &mut RefNode {
        &mut self.nodes[n.0 as usize]
    }

    fn alloc(&mut self, value: u8) -> TrieResult<u32> {
        if let Some(cap) = self.max_nodes {
            if self.node_count() >= cap {
                return Err(TrieError::CapacityExhausted { cap });
            }
        }
        if self.free_head != NIL {
            let ix = self.free_head;
            self.free_head = self.nodes[ix as usize].sibling;
            self.free_count -= 1;
            self.nodes[ix as usize] = RefNode::new(value);
            Ok(ix)
        } else {
            self.nodes.push(RefNode::new(value));
            Ok((self.nodes.len() - 1) as u32)
        }
    }

    fn release(&mut self, ix: u32) {
        self.nodes[ix as usize].sibling = self.free_head;
        self.free_head = ix;
        self.free_count += 1;
    }

    /// Free `ix` and all of its descendants. Siblings of `ix` are untouched.
    fn free_subtree(&mut self, ix: u32) {
        let mut stack = vec![ix];
        while let Some(x) = stack.pop() {
            let mut c = self.nodes[x as usize].child;
            while c != NIL {
                let s = self.nodes[c as usize].sibling;
                stack.push(c);
                c = s;
            }
            self.release(x);
        }
    }

    fn recompute_counts(&mut self) {
        let mut stack = vec![(0u32, false)];
        while let Some((ix, visited)) = stack.pop() {
            if visited {
                let mut total = u32::from(self.nodes[ix as usize].terminal);
                let mut c = self.nodes[ix as usize].child;
                while c != NIL {
                    total += self.nodes[c as usize].count;
                    c = self.nodes[c as usize].sibling;
                }
                self.nodes[ix as usize].count = total;
            } else {
                stack.push((ix, true));
                let mut c = self.nodes[ix as usize].child;
                while c != NIL {
                    stack.push((c, false));
                    c = self.nodes[c as usize].sibling;
                }
            }
        }
    }
}

impl NodeStore for ReferenceStore {
    type Node = RefId;

    fn root(&self) -> RefId {
        RefId(0)
    }

    fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn is_counting(&self) -> bool {
        self.counting
    }

    fn node_count(&self) -> usize {
        self.nodes.len() - self.free_count
    }

    fn storage_size(&self) -> usize {
        self.nodes.len() * std::mem::size_of::<RefNode>()
    }

    fn invalidations(&self) -> u64 {
        self.invalidations
    }

    fn ensure_extra_capacity(&mut self, extra: usize) -> TrieResult<()> {
        if let Some(cap) = self.max_nodes {
            if self.node_count() + extra > cap {
                return Err(TrieError::CapacityExhausted { cap });
            }
        }
        let reusable = self.free_count + (self.nodes.capacity() - self.nodes.len());
        if extra > reusable {
            self.nodes.reserve(extra - reusable);
        }
        Ok(())
    }

    fn compact(&mut self) -> TrieResult<()> {
        Ok(())
    }

    fn clear(&mut self) -> TrieResult<()> {
        self.nodes.truncate(1);
        self.nodes[0] = RefNode::new(0);
        self.free_head = NIL;
        self.free_count = 0;
        self.invalidations += 1;
        Ok(())
    }

    fn value(&self, n: RefId) -> u8 {
        self.node(n).value
    }

    fn is_terminal(&self, n: RefId) -> bool {
        self.node(n).terminal
    }

    fn sibling(&self, n: RefId) -> Option<RefId> {
        let s = self.node(n).sibling;
        (s != NIL).then_some(RefId(s))
    }

    fn child(&self, n: RefId) -> Option<RefId> {
        let c = self.node(n).child;
        (c != NIL).then_some(RefId(c))
    }

    fn count(&self, n: RefId) -> usize {
        debug_assert!(self.counting);
        self.node(n).count as usize
    }

    fn set_terminal(&mut self, n: RefId, terminal: bool) -> TrieResult<bool> {
        if self.node(n).terminal == terminal {
            return Ok(false);
        }
        self.node_mut(n).terminal = terminal;
        self.invalidations += 1;
        Ok(true)
    }

    fn find_or_insert_child(&mut self, n: RefId, value: u8) -> TrieResult<RefId> {
        use std::cmp::Ordering;
        let order = self.order;
        let mut prev: Option<u32> = None;
        let mut cur = self.node(n).child;
        while cur != NIL {
            match order.compare(self.nodes[cur as usize].value, value) {
                Ordering::Equal => return Ok(RefId(cur)),
                Ordering::Greater => break,
                Ordering::Less => {
                    prev = Some(cur);
                    cur = self.nodes[cur as usize].sibling;
                }
            }
        }
        let ix = self.alloc(value)?;
        self.nodes[ix as usize].sibling = cur;
        match prev {
            Some(p) => self.nodes[p as usize].sibling = ix,
            None => self.node_mut(n).child = ix,
        }
        self.invalidations += 1;
        Ok(RefId(ix))
    }

    fn adjust_counts(&mut self, stack: &[RefId], delta: i64) -> TrieResult<()> {
        if !self.counting || delta == 0 {
            return Ok(());
        }
        for &n in stack {
            let count = &mut self.node_mut(n).count;
            *count = (*count as i64 + delta) as u32;
        }
        Ok(())
    }

    fn remove_child(&mut self, parent: RefId, child: RefId) -> TrieResult<()> {
        let next = self.node(child).sibling;
        if self.node(parent).child == child.0 {
            self.node_mut(parent).child = next;
        } else {
            let mut cur = self.node(parent).child;
            while self.nodes[cur as usize].sibling != child.0 {
                cur = self.nodes[cur as usize].sibling;
                debug_assert!(cur != NIL);
            }
            self.nodes[cur as usize].sibling = next;
        }
        self.free_subtree(child.0);
        self.invalidations += 1;
        Ok(())
    }

    fn detach_children(&mut self, n: RefId) -> TrieResult<()> {
        let mut c = self.node(n).child;
        while c != NIL {
            let s = self.nodes[c as usize].sibling;
            self.free_subtree(c);
            c = s;
        }
        let node = self.node_mut(n);
        node.child = NIL;
        node.terminal = false;
        self.invalidations += 1;
        Ok(())
    }

    fn append_child(&mut self, parent: RefId, value: u8) -> TrieResult<RefId> {
        debug_assert!(self.node(parent).child == NIL);
        let ix = self.alloc(value)?;
        self.node_mut(parent).child = ix;
        self.invalidations += 1;
        Ok(RefId(ix))
    }

    fn append_sibling(&mut self, n: RefId, value: u8) -> TrieResult<RefId> {
        debug_assert!(self.node(n).sibling == NIL);
        let ix = self.alloc(value)?;
        self.node_mut(n).sibling = ix;
        self.invalidations += 1;
        Ok(RefId(ix))
    }

    fn read_complete(&mut self) -> TrieResult<()> {
        if self.counting {
            self.recompute_counts();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ReferenceStore {
        ReferenceStore::new(ByteOrder::Unsigned, true)
    }

    #[test]
    fn test_insert_keeps_siblings_sorted() {
        let mut s = store();
        let root = s.root();
        for b in [b'm', b'a', b'z', b'q'] {
            s.find_or_insert_child(root, b).unwrap();
        }
        let mut got = vec![];
        let mut c = s.child(root);
        while let Some(x) = c {
            got.push(s.value(x));
            c = s.sibling(x);
        }
        assert_eq!(got, vec![b'a', b'm', b'q', b'z']);
    }

    #[test]
    fn test_insert_existing_returns_same_node() {
        let mut s = store();
        let root = s.root();
        let a = s.find_or_insert_child(root, 7).unwrap();
        let b = s.find_or_insert_child(root, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(s.node_count(), 2);
    }

    #[test]
    fn test_free_list_reuse() {
        let mut s = store();
        let root = s.root();
        let a = s.find_or_insert_child(root, 1).unwrap();
        s.find_or_insert_child(a, 2).unwrap();
        let len = s.nodes.len();
        s.remove_child(root, a).unwrap();
        assert_eq!(s.node_count(), 1);
        // both freed records are reused before the arena grows
        let b = s.find_or_insert_child(root, 3).unwrap();
        s.find_or_insert_child(b, 4).unwrap();
        assert_eq!(s.nodes.len(), len);
    }

    #[test]
    fn test_invalidations_tick_on_mutation_only() {
        let mut s = store();
        let root = s.root();
        let before = s.invalidations();
        assert!(s.child(root).is_none());
        assert_eq!(s.invalidations(), before);
        let n = s.find_or_insert_child(root, 9).unwrap();
        assert!(s.invalidations() > before);
        let t1 = s.invalidations();
        s.set_terminal(n, true).unwrap();
        assert!(s.invalidations() > t1);
        let t2 = s.invalidations();
        // setting an already-set flag is not a transition
        s.set_terminal(n, true).unwrap();
        assert_eq!(s.invalidations(), t2);
    }

    #[test]
    fn test_capacity_cap() {
        let mut s = ReferenceStore::with_capacity(ByteOrder::Unsigned, false, 4, Some(2));
        let root = s.root();
        s.find_or_insert_child(root, 1).unwrap();
        assert_eq!(
            s.ensure_extra_capacity(1).unwrap_err(),
            TrieError::CapacityExhausted { cap: 2 }
        );
        assert!(s.find_or_insert_child(root, 2).is_err());
    }
}
