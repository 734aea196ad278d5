use std::io::Read;

use crate::byte_order::ByteOrder;
use crate::error::TrieResult;
use crate::packed::{CompactStore, PackedStore};
use crate::reference::ReferenceStore;
use crate::store::NodeStore;
use crate::stream;

/// Everything a node source needs to know to build a store.
#[derive(Clone, Copy, Debug)]
pub struct StoreConfig {
    pub byte_order: ByteOrder,
    /// Maintain per-node terminal counts, the price of rank/select.
    pub counting: bool,
    /// Nodes to pre-reserve storage for.
    pub capacity_hint: usize,
    /// Hard cap on live nodes. Exceeding it fails with `CapacityExhausted`
    /// instead of growing.
    pub max_nodes: Option<usize>,
}

impl StoreConfig {
    pub fn new(byte_order: ByteOrder) -> Self {
        StoreConfig {
            byte_order,
            counting: true,
            capacity_hint: 0,
            max_nodes: None,
        }
    }

    pub fn counting(mut self, counting: bool) -> Self {
        self.counting = counting;
        self
    }

    pub fn capacity_hint(mut self, hint: usize) -> Self {
        self.capacity_hint = hint;
        self
    }

    pub fn max_nodes(mut self, cap: usize) -> Self {
        self.max_nodes = Some(cap);
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(ByteOrder::Unsigned)
    }
}

/// A factory for one backend: builds fresh stores, deep-copies existing ones
/// and decodes dumped ones. A source that cannot maintain counts must say so,
/// and indexed-trie construction will refuse it.
pub trait NodeSource {
    type Store: NodeStore;

    fn counting_supported(&self) -> bool {
        true
    }

    fn new_store(&self, config: StoreConfig) -> TrieResult<Self::Store>;

    fn copy_store(&self, store: &Self::Store) -> Self::Store;

    fn read_store<R: Read>(&self, config: StoreConfig, r: &mut R) -> TrieResult<Self::Store> {
        let mut store = self.new_store(config)?;
        stream::read_into(&mut store, r)?;
        Ok(store)
    }
}

/// Source of [`ReferenceStore`] backends.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceSource;

impl NodeSource for ReferenceSource {
    type Store = ReferenceStore;

    fn new_store(&self, config: StoreConfig) -> TrieResult<ReferenceStore> {
        Ok(ReferenceStore::with_capacity(
            config.byte_order,
            config.counting,
            config.capacity_hint,
            config.max_nodes,
        ))
    }

    fn copy_store(&self, store: &ReferenceStore) -> ReferenceStore {
        store.clone()
    }
}

/// Source of [`PackedStore`] backends.
#[derive(Clone, Copy, Debug, Default)]
pub struct PackedSource;

impl NodeSource for PackedSource {
    type Store = PackedStore;

    fn new_store(&self, config: StoreConfig) -> TrieResult<PackedStore> {
        Ok(PackedStore::with_capacity(
            config.byte_order,
            config.counting,
            config.capacity_hint,
            config.max_nodes,
        ))
    }

    fn copy_store(&self, store: &PackedStore) -> PackedStore {
        store.clone()
    }
}

/// Source of [`CompactStore`] backends.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompactSource;

impl NodeSource for CompactSource {
    type Store = CompactStore;

    fn new_store(&self, config: StoreConfig) -> TrieResult<CompactStore> {
        Ok(CompactStore::with_capacity(
            config.byte_order,
            config.counting,
            config.capacity_hint,
            config.max_nodes,
        ))
    }

    fn copy_store(&self, store: &CompactStore) -> CompactStore {
        store.clone()
    }
}
