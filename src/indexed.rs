use crate::codec::Codec;
use crate::error::{TrieError, TrieResult};
use crate::path::Path;
use crate::source::{NodeSource, StoreConfig};
use crate::store::NodeStore;
use crate::trie::{Iter, Trie};

/// A [`Trie`] whose elements are also addressable by rank. Requires a
/// counting store; both `get` and `index_of` run in O(depth) by walking the
/// per-node counts.
#[derive(Debug)]
pub struct IndexedTrie<S: NodeStore, C: Codec> {
    inner: Trie<S, C>,
}

impl<S: NodeStore, C: Codec> IndexedTrie<S, C> {
    pub fn new(store: S, codec: C) -> TrieResult<Self> {
        if !store.is_counting() {
            return Err(TrieError::UnsupportedConfiguration(
                "indexed tries require a counting store",
            ));
        }
        Ok(IndexedTrie {
            inner: Trie::new(store, codec),
        })
    }

    /// Build through a node source, refusing sources and configurations that
    /// cannot count.
    pub fn from_source<N: NodeSource<Store = S>>(
        source: &N,
        config: StoreConfig,
        codec: C,
    ) -> TrieResult<Self> {
        if !source.counting_supported() || !config.counting {
            return Err(TrieError::UnsupportedConfiguration(
                "indexed tries require a counting node source",
            ));
        }
        Self::new(source.new_store(config)?, codec)
    }

    pub fn as_trie(&self) -> &Trie<S, C> {
        &self.inner
    }

    pub fn into_trie(self) -> Trie<S, C> {
        self.inner
    }

    pub fn size(&self) -> usize {
        self.inner.size()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn add(&mut self, elem: &C::Elem) -> TrieResult<bool> {
        self.inner.add(elem)
    }

    pub fn contains(&self, elem: &C::Elem) -> TrieResult<bool> {
        self.inner.contains(elem)
    }

    pub fn remove(&mut self, elem: &C::Elem) -> TrieResult<bool> {
        self.inner.remove(elem)
    }

    pub fn first(&self) -> Option<C::Elem> {
        self.inner.first()
    }

    pub fn last(&self) -> Option<C::Elem> {
        self.inner.last()
    }

    pub fn clear(&mut self) -> TrieResult<()> {
        self.inner.clear()
    }

    pub fn compact(&mut self) -> TrieResult<()> {
        self.inner.compact()
    }

    pub fn iter(&self) -> Iter<'_, S, C> {
        self.inner.iter()
    }

    pub fn to_bytes(&self) -> TrieResult<Vec<u8>> {
        self.inner.to_bytes()
    }

    pub fn sub_trie(&mut self, prefix_elem: &C::Elem) -> TrieResult<IndexedTrie<&mut S, C>>
    where
        C: Clone,
    {
        Ok(IndexedTrie {
            inner: self.inner.sub_trie(prefix_elem)?,
        })
    }

    /// The element with the given rank in iteration order.
    pub fn get(&self, index: usize) -> TrieResult<C::Elem> {
        let size = self.size();
        if index >= size {
            return Err(TrieError::IndexOutOfBounds { index, size });
        }
        let mut path = Path::new();
        path.set_key(&self.inner.prefix);
        path.reset(&self.inner.store);
        if !path.walk_key(&self.inner.store) || !path.walk_count(&self.inner.store, index) {
            return Err(TrieError::IndexOutOfBounds { index, size });
        }
        path.serialize(&self.inner.store);
        Ok(self.inner.codec.decode(path.key()))
    }

    /// The rank of the element, or, when absent, `-(insertion point) - 1`.
    /// Accumulates `count_to_child` along the descent, so a miss costs the
    /// same as a hit.
    pub fn index_of(&self, elem: &C::Elem) -> TrieResult<isize> {
        let mut key = Vec::new();
        self.inner.codec.encode(elem, &mut key)?;
        if !key.starts_with(&self.inner.prefix) {
            return Err(TrieError::OutsidePrefix);
        }
        let Some(mut node) = self.inner.prefix_node() else {
            return Ok(-1);
        };
        let store = &self.inner.store;
        let mut index = 0;
        for &b in &key[self.inner.prefix.len()..] {
            index += store.count_to_child(node, b);
            match store.find_child(node, b) {
                Some(c) => node = c,
                None => return Ok(-(index as isize) - 1),
            }
        }
        if store.is_terminal(node) {
            Ok(index as isize)
        } else {
            Ok(-(index as isize) - 1)
        }
    }

    /// Remove and return the element with the given rank.
    pub fn remove_at(&mut self, index: usize) -> TrieResult<C::Elem> {
        let size = self.size();
        if index >= size {
            return Err(TrieError::IndexOutOfBounds { index, size });
        }
        self.inner.path.set_key(&self.inner.prefix);
        self.inner.path.reset(&self.inner.store);
        if !self.inner.path.walk_key(&self.inner.store)
            || !self.inner.path.walk_count(&self.inner.store, index)
        {
            return Err(TrieError::IndexOutOfBounds { index, size });
        }
        self.inner.path.serialize(&self.inner.store);
        let elem = self.inner.codec.decode(self.inner.path.key());
        self.inner.path.terminate(&mut self.inner.store, false)?;
        self.inner.path.prune(&mut self.inner.store)?;
        Ok(elem)
    }
}
