use std::cell::Cell;
use std::io::{Read, Write};

use crate::codec::Codec;
use crate::error::{TrieError, TrieResult};
use crate::immutable::Immutable;
use crate::path::Path;
use crate::source::{NodeSource, StoreConfig};
use crate::store::NodeStore;
use crate::stream;

/// An ordered set of elements stored as byte keys in a trie.
///
/// A trie pairs a [`NodeStore`] with a [`Codec`] and, possibly, a key prefix:
/// a sub-trie is just another `Trie` over the same store whose prefix is
/// longer. The node the prefix ends at is cached and re-resolved whenever the
/// store's invalidation tick moves.
///
/// Every mutation goes store → path → nodes; the methods here only choose
/// which path operations to compose.
#[derive(Debug)]
pub struct Trie<S: NodeStore, C: Codec> {
    pub(crate) store: S,
    pub(crate) codec: C,
    pub(crate) prefix: Vec<u8>,
    pub(crate) cached: Cell<Option<(u64, Option<S::Node>)>>,
    pub(crate) path: Path<S::Node>,
}

impl<S: NodeStore, C: Codec> Trie<S, C> {
    pub fn new(store: S, codec: C) -> Self {
        Trie {
            store,
            codec,
            prefix: Vec::new(),
            cached: Cell::new(None),
            path: Path::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// The key prefix this view is rooted at; empty for a whole-trie view.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Resolve (and cache) the node the prefix leads to.
    pub(crate) fn prefix_node(&self) -> Option<S::Node> {
        let tick = self.store.invalidations();
        if let Some((at, node)) = self.cached.get() {
            if at == tick {
                return node;
            }
        }
        let mut node = Some(self.store.root());
        for &b in &self.prefix {
            node = node.and_then(|n| self.store.find_child(n, b));
        }
        self.cached.set(Some((tick, node)));
        node
    }

    pub fn size(&self) -> usize {
        match self.prefix_node() {
            None => 0,
            Some(n) if self.store.is_counting() => self.store.count(n),
            Some(_) => self.scan_size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    fn scan_size(&self) -> usize {
        let mut path = Path::new();
        path.set_key(&self.prefix);
        if !path.first(&self.store, self.prefix.len()) {
            return 0;
        }
        let mut n = 1;
        while path.advance(&self.store, self.prefix.len()) {
            n += 1;
        }
        n
    }

    pub fn contains(&self, elem: &C::Elem) -> TrieResult<bool> {
        let mut path = Path::new();
        self.codec.encode(elem, path.key_mut())?;
        if !path.key().starts_with(&self.prefix) {
            return Ok(false);
        }
        path.reset(&self.store);
        if !path.walk_key(&self.store) {
            return Ok(false);
        }
        Ok(self.store.is_terminal(path.head().unwrap()))
    }

    /// Store an element. Returns false when it was already present. Fails —
    /// leaving the trie unchanged — on an element that cannot be encoded,
    /// lies outside the prefix, or exceeds a capacity cap.
    pub fn add(&mut self, elem: &C::Elem) -> TrieResult<bool> {
        self.path.key_mut().clear();
        self.codec.encode(elem, self.path.key_mut())?;
        if !self.path.key().starts_with(&self.prefix) {
            return Err(TrieError::OutsidePrefix);
        }
        // reserve up front so no allocation mid-walk can move the path
        let extra = self.path.key().len() + 1;
        self.store.ensure_extra_capacity(extra)?;
        self.path.reset(&self.store);
        self.path.push_key(&mut self.store)?;
        self.path.terminate(&mut self.store, true)
    }

    /// Drop an element. Returns false when it was not present.
    pub fn remove(&mut self, elem: &C::Elem) -> TrieResult<bool> {
        self.path.key_mut().clear();
        self.codec.encode(elem, self.path.key_mut())?;
        if !self.path.key().starts_with(&self.prefix) {
            return Ok(false);
        }
        self.path.reset(&self.store);
        if !self.path.walk_key(&self.store) {
            return Ok(false);
        }
        if !self.path.terminate(&mut self.store, false)? {
            return Ok(false);
        }
        self.path.prune(&mut self.store)?;
        Ok(true)
    }

    pub fn first(&self) -> Option<C::Elem> {
        let mut path = Path::new();
        path.set_key(&self.prefix);
        if !path.first(&self.store, self.prefix.len()) {
            return None;
        }
        Some(self.codec.decode(path.key()))
    }

    pub fn last(&self) -> Option<C::Elem> {
        let mut path = Path::new();
        path.set_key(&self.prefix);
        path.reset(&self.store);
        if !path.walk_key(&self.store) {
            return None;
        }
        while path.walk_last_child(&self.store) {}
        if !self.store.is_terminal(path.head().unwrap()) {
            return None;
        }
        path.serialize(&self.store);
        Some(self.codec.decode(path.key()))
    }

    pub fn remove_first(&mut self) -> TrieResult<Option<C::Elem>> {
        self.path.set_key(&self.prefix);
        if !self.path.first(&self.store, self.prefix.len()) {
            return Ok(None);
        }
        let elem = self.codec.decode(self.path.key());
        self.path.terminate(&mut self.store, false)?;
        self.path.prune(&mut self.store)?;
        Ok(Some(elem))
    }

    pub fn remove_last(&mut self) -> TrieResult<Option<C::Elem>> {
        self.path.set_key(&self.prefix);
        self.path.reset(&self.store);
        if !self.path.walk_key(&self.store) {
            return Ok(None);
        }
        while self.path.walk_last_child(&self.store) {}
        if !self.store.is_terminal(self.path.head().unwrap()) {
            return Ok(None);
        }
        self.path.serialize(&self.store);
        let elem = self.codec.decode(self.path.key());
        self.path.terminate(&mut self.store, false)?;
        self.path.prune(&mut self.store)?;
        Ok(Some(elem))
    }

    /// Rebuild the store for locality and size. Membership, order and counts
    /// are unaffected; cached handles re-resolve on the next access.
    pub fn compact(&mut self) -> TrieResult<()> {
        self.store.compact()
    }

    /// Drop every element under the prefix: dangle the prefix node, then
    /// prune whatever chain carried it.
    pub fn clear(&mut self) -> TrieResult<()> {
        self.path.set_key(&self.prefix);
        self.path.reset(&self.store);
        if !self.path.walk_key(&self.store) {
            return Ok(());
        }
        self.path.dangle(&mut self.store)?;
        self.path.prune(&mut self.store)?;
        Ok(())
    }

    /// A view over the same store restricted to elements whose keys extend
    /// the given element's key. Adding an element outside that prefix through
    /// the view fails.
    pub fn sub_trie(&mut self, prefix_elem: &C::Elem) -> TrieResult<Trie<&mut S, C>>
    where
        C: Clone,
    {
        let mut key = Vec::new();
        self.codec.encode(prefix_elem, &mut key)?;
        if !key.starts_with(&self.prefix) {
            return Err(TrieError::InvalidArgument(
                "sub-trie prefix must extend the current prefix",
            ));
        }
        Ok(Trie {
            store: &mut self.store,
            codec: self.codec.clone(),
            prefix: key,
            cached: Cell::new(None),
            path: Path::new(),
        })
    }

    pub fn iter(&self) -> Iter<'_, S, C> {
        let mut path = Path::new();
        path.set_key(&self.prefix);
        Iter {
            trie: self,
            path,
            tick: self.store.invalidations(),
            state: IterState::Start,
        }
    }

    /// Iterate starting at the first element `>=` the given one.
    pub fn iter_from(&self, elem: &C::Elem) -> TrieResult<Iter<'_, S, C>> {
        let mut key = Vec::new();
        self.codec.encode(elem, &mut key)?;
        let mut state = IterState::Start;
        if !key.starts_with(&self.prefix) {
            // clamp to the view: anything below the prefix starts at the
            // beginning, anything above is out of elements entirely
            match self
                .store
                .byte_order()
                .compare_slices(&key, &self.prefix)
            {
                std::cmp::Ordering::Less => {
                    key.clear();
                    key.extend_from_slice(&self.prefix);
                }
                _ => state = IterState::Done,
            }
        }
        let mut path = Path::new();
        path.set_key(&key);
        Ok(Iter {
            trie: self,
            path,
            tick: self.store.invalidations(),
            state,
        })
    }

    /// Dump the sub-trie at the prefix; see the stream module for the wire
    /// format. Returns the number of nodes written.
    pub fn write_to<W: Write>(&self, w: &mut W) -> TrieResult<u32> {
        let mut path = Path::new();
        path.set_key(&self.prefix);
        path.reset(&self.store);
        if !path.walk_key(&self.store) {
            let nothing: &[S::Node] = &[];
            return stream::write_nodes(&self.store, nothing, w);
        }
        path.write_to(&self.store, w)
    }

    pub fn to_bytes(&self) -> TrieResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// A deep, independently mutable copy.
    pub fn duplicate(&self) -> Trie<S, C>
    where
        S: Clone,
        C: Clone,
    {
        Trie {
            store: self.store.clone(),
            codec: self.codec.clone(),
            prefix: self.prefix.clone(),
            cached: Cell::new(None),
            path: Path::new(),
        }
    }

    /// A deep copy on which every mutator fails with
    /// [`TrieError::Immutable`].
    pub fn immutable_copy(&self) -> Trie<Immutable<S>, C>
    where
        S: Clone,
        C: Clone,
    {
        Trie {
            store: Immutable::new(self.store.clone()),
            codec: self.codec.clone(),
            prefix: self.prefix.clone(),
            cached: Cell::new(None),
            path: Path::new(),
        }
    }

    /// Wrap this trie itself; reads keep working, writes fail.
    pub fn into_immutable(self) -> Trie<Immutable<S>, C> {
        Trie {
            store: Immutable::new(self.store),
            codec: self.codec,
            prefix: self.prefix,
            cached: Cell::new(None),
            path: Path::new(),
        }
    }
}

/// Restore a dumped trie through a node source. The byte order and counting
/// flag in `config` must match the ones the dump was written under.
pub fn restore<N: NodeSource, C: Codec, R: Read>(
    source: &N,
    config: StoreConfig,
    codec: C,
    r: &mut R,
) -> TrieResult<Trie<N::Store, C>> {
    let store = source.read_store(config, r)?;
    Ok(Trie::new(store, codec))
}

enum IterState {
    Start,
    Running,
    Done,
}

/// Elements in byte order. The cursor carries the last-yielded key and the
/// store tick it was valid at; if the tick has moved it re-enters the trie at
/// that key instead of trusting its node handles.
pub struct Iter<'a, S: NodeStore, C: Codec> {
    trie: &'a Trie<S, C>,
    path: Path<S::Node>,
    tick: u64,
    state: IterState,
}

impl<S: NodeStore, C: Codec> Iterator for Iter<'_, S, C> {
    type Item = C::Elem;

    fn next(&mut self) -> Option<C::Elem> {
        let store = &self.trie.store;
        let min_length = self.trie.prefix.len();
        let found = match self.state {
            IterState::Done => return None,
            IterState::Start => {
                self.state = IterState::Running;
                self.path.first(store, min_length)
            }
            IterState::Running => {
                if self.tick == store.invalidations() {
                    self.path.advance(store, min_length)
                } else {
                    // the store changed shape: re-resolve from the last key
                    let last = self.path.key().to_vec();
                    if !self.path.first(store, min_length) {
                        false
                    } else if self.path.key() == &last[..] {
                        self.path.advance(store, min_length)
                    } else {
                        true
                    }
                }
            }
        };
        if !found {
            self.state = IterState::Done;
            return None;
        }
        self.tick = store.invalidations();
        Some(self.trie.codec.decode(self.path.key()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_order::ByteOrder;
    use crate::codec::StrCodec;
    use crate::packed::PackedStore;
    use crate::reference::ReferenceStore;
    use crate::source::{PackedSource, ReferenceSource};

    fn str_trie() -> Trie<PackedStore, StrCodec> {
        Trie::new(PackedStore::new(ByteOrder::Unsigned, true), StrCodec)
    }

    fn seed<S: NodeStore>(trie: &mut Trie<S, StrCodec>, words: &[&str]) {
        for w in words {
            assert!(trie.add(&w.to_string()).unwrap());
        }
    }

    fn drain<S: NodeStore>(trie: &Trie<S, StrCodec>) -> Vec<String> {
        trie.iter().collect()
    }

    #[test]
    fn test_add_contains_remove() {
        let mut trie = str_trie();
        seed(&mut trie, &["Moon", "Moo", "Moody"]);
        assert_eq!(trie.size(), 3);
        assert!(trie.contains(&"Moo".into()).unwrap());
        assert!(!trie.contains(&"Mo".into()).unwrap());
        // re-adding is not a change
        assert!(!trie.add(&"Moon".into()).unwrap());
        assert_eq!(trie.size(), 3);
        assert!(trie.remove(&"Moody".into()).unwrap());
        assert!(!trie.remove(&"Moody".into()).unwrap());
        assert_eq!(drain(&trie), vec!["Moo", "Moon"]);
    }

    #[test]
    fn test_iteration_order() {
        let mut trie = str_trie();
        seed(&mut trie, &["Moon", "Moo", "Moody"]);
        assert_eq!(drain(&trie), vec!["Moo", "Moody", "Moon"]);
    }

    #[test]
    fn test_first_last() {
        let mut trie = Trie::new(
            ReferenceStore::new(ByteOrder::ReverseUnsigned, true),
            StrCodec,
        );
        seed(&mut trie, &["Apple", "Ape", "Baboon", "Cartwheel"]);
        assert_eq!(trie.first().unwrap(), "Cartwheel");
        assert_eq!(trie.last().unwrap(), "Ape");
    }

    #[test]
    fn test_sub_trie_views_share_the_store() {
        let mut trie = str_trie();
        seed(&mut trie, &["Cat", "Hot", "Puppy"]);
        {
            let mut hot = trie.sub_trie(&"Hot".into()).unwrap();
            assert_eq!(hot.size(), 1);
            assert!(hot.add(&"Hotdog".into()).unwrap());
            assert!(hot.add(&"Hotrod".into()).unwrap());
            assert_eq!(
                hot.add(&"Cold".into()).unwrap_err(),
                TrieError::OutsidePrefix
            );
            assert_eq!(drain(&hot), vec!["Hot", "Hotdog", "Hotrod"]);
        }
        assert_eq!(trie.size(), 5);
        {
            let mut hot = trie.sub_trie(&"Hot".into()).unwrap();
            assert!(hot.remove(&"Hot".into()).unwrap());
        }
        assert_eq!(trie.size(), 4);
        assert!(!trie.contains(&"Hot".into()).unwrap());
        assert!(trie.contains(&"Hotdog".into()).unwrap());
    }

    #[test]
    fn test_sub_trie_clear() {
        let mut trie = str_trie();
        seed(&mut trie, &["Cat", "Hot", "Hotdog", "Hotrod", "Puppy"]);
        trie.sub_trie(&"Hot".into()).unwrap().clear().unwrap();
        assert_eq!(drain(&trie), vec!["Cat", "Puppy"]);
        assert_eq!(trie.size(), 2);
    }

    #[test]
    fn test_remove_first_and_last() {
        let mut trie = str_trie();
        seed(&mut trie, &["b", "a", "c"]);
        assert_eq!(trie.remove_first().unwrap().unwrap(), "a");
        assert_eq!(trie.remove_last().unwrap().unwrap(), "c");
        assert_eq!(drain(&trie), vec!["b"]);
        assert_eq!(trie.remove_first().unwrap().unwrap(), "b");
        assert!(trie.remove_first().unwrap().is_none());
        assert!(trie.last().is_none());
    }

    #[test]
    fn test_iter_from() {
        let mut trie = str_trie();
        seed(&mut trie, &["ant", "bee", "cow", "dog"]);
        let got: Vec<String> = trie.iter_from(&"bee".into()).unwrap().collect();
        assert_eq!(got, vec!["bee", "cow", "dog"]);
        let got: Vec<String> = trie.iter_from(&"bat".into()).unwrap().collect();
        assert_eq!(got, vec!["bee", "cow", "dog"]);
        let got: Vec<String> = trie.iter_from(&"zebra".into()).unwrap().collect();
        assert!(got.is_empty());
    }

    #[test]
    fn test_immutable_copy_rejects_writes() {
        let mut trie = str_trie();
        seed(&mut trie, &["one", "two"]);
        let mut frozen = trie.immutable_copy();
        assert_eq!(frozen.size(), 2);
        assert!(frozen.contains(&"one".into()).unwrap());
        assert_eq!(
            frozen.add(&"three".into()).unwrap_err(),
            TrieError::Immutable
        );
        assert_eq!(
            frozen.remove(&"one".into()).unwrap_err(),
            TrieError::Immutable
        );
        assert_eq!(frozen.size(), 2);
        // the original is unaffected and still mutable
        assert!(trie.add(&"three".into()).unwrap());
    }

    #[test]
    fn test_dump_restore_through_source() {
        let mut trie = Trie::new(
            ReferenceStore::new(ByteOrder::Unsigned, true),
            StrCodec,
        );
        seed(&mut trie, &["alpha", "beta", "gamma", "gamut"]);
        let bytes = trie.to_bytes().unwrap();
        let config = StoreConfig::new(ByteOrder::Unsigned);
        let packed = restore(&PackedSource, config, StrCodec, &mut &bytes[..]).unwrap();
        assert_eq!(drain(&packed), drain(&trie));
        let reference = restore(&ReferenceSource, config, StrCodec, &mut &bytes[..]).unwrap();
        assert_eq!(drain(&reference), drain(&trie));
    }

    #[test]
    fn test_duplicate_is_independent() {
        let mut trie = str_trie();
        seed(&mut trie, &["x", "y"]);
        let mut copy = trie.duplicate();
        copy.add(&"z".into()).unwrap();
        assert_eq!(trie.size(), 2);
        assert_eq!(copy.size(), 3);
    }

    #[test]
    fn test_prefix_cache_follows_invalidations() {
        let mut trie = str_trie();
        seed(&mut trie, &["Hot", "Hotdog"]);
        let mut hot = trie.sub_trie(&"Hot".into()).unwrap();
        assert_eq!(hot.size(), 2);
        // force the cached prefix node stale, then make sure it re-resolves
        hot.remove(&"Hotdog".into()).unwrap();
        assert_eq!(hot.size(), 1);
        hot.remove(&"Hot".into()).unwrap();
        assert_eq!(hot.size(), 0);
    }

    #[test]
    fn test_empty_string_element() {
        let mut trie = str_trie();
        assert!(trie.add(&String::new()).unwrap());
        assert!(trie.contains(&String::new()).unwrap());
        assert_eq!(trie.size(), 1);
        assert_eq!(drain(&trie), vec![""]);
        assert!(trie.remove(&String::new()).unwrap());
        assert!(trie.is_empty());
    }
}
