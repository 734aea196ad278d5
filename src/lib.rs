//! # `bytetrie`
//!
//! In-memory byte-keyed tries storing sorted sets of variable-length byte
//! strings, with pluggable node storage trading memory for speed.
//!
//! Elements are serialized to byte keys by a [`Codec`] and held in a
//! [`NodeStore`]: a simple record-per-node arena ([`ReferenceStore`]), a
//! packed store keeping whole chains of nodes inside single records of one
//! integer array ([`PackedStore`]), or the packed store with binary-searched
//! sibling runs ([`CompactStore`]). Counting stores track per-node terminal
//! counts, giving the [`IndexedTrie`] O(depth) rank and select. Tries can be
//! restricted to a key prefix ([`Trie::sub_trie`]), frozen
//! ([`Trie::into_immutable`]), and dumped to or restored from a compact byte
//! stream.

pub mod byte_order;
pub mod codec;
pub mod error;
pub mod immutable;
pub mod indexed;
pub mod packed;
pub mod path;
pub mod reference;
pub mod source;
pub mod store;
pub mod stream;
pub mod trie;


pub use byte_order::ByteOrder;
pub use codec::{BytesCodec, Codec, MappedCodec, StrCodec, U64Codec};
pub use error::{TrieError, TrieResult};
pub use immutable::Immutable;
pub use indexed::IndexedTrie;
pub use packed::{CompactStore, PackedStore};
pub use path::Path;
pub use reference::ReferenceStore;
pub use source::{CompactSource, NodeSource, PackedSource, ReferenceSource, StoreConfig};
pub use store::NodeStore;
pub use stream::NodeFlags;
pub use trie::{Iter, Trie, restore};
