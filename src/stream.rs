use std::io::{ErrorKind, Read, Write};

use bitflags::bitflags;

use crate::error::{TrieError, TrieResult};
use crate::store::NodeStore;

// Wire format: a 32-bit big-endian node count, then one (value, flags) byte
// pair per node in depth-first pre-order under the tree's byte order. The
// byte order and counting flag are not embedded; the reader must supply the
// ones the trie was written with.

bitflags! {
    /// The flags byte that trails every node value on the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        const TERMINAL = 0x01;
        const CHILD = 0x02;
        const SIBLING = 0x04;
    }
}

fn read_exact_or_truncated<R: Read>(r: &mut R, buf: &mut [u8]) -> TrieResult<()> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => TrieError::MalformedStream("truncated stream"),
        _ => TrieError::Io(e),
    })
}

fn count_nodes<S: NodeStore>(store: &S, first: S::Node) -> u32 {
    let mut total = 0;
    let mut stack = vec![first];
    while let Some(n) = stack.pop() {
        total += 1;
        if let Some(s) = store.sibling(n) {
            stack.push(s);
        }
        if let Some(c) = store.child(n) {
            stack.push(c);
        }
    }
    total
}

fn write_subtree<S: NodeStore, W: Write>(store: &S, first: S::Node, w: &mut W) -> TrieResult<()> {
    let mut stack = vec![first];
    while let Some(n) = stack.pop() {
        let sibling = store.sibling(n);
        let child = store.child(n);
        let mut flags = NodeFlags::empty();
        if store.is_terminal(n) {
            flags |= NodeFlags::TERMINAL;
        }
        if child.is_some() {
            flags |= NodeFlags::CHILD;
        }
        if sibling.is_some() {
            flags |= NodeFlags::SIBLING;
        }
        w.write_all(&[store.value(n), flags.bits()])?;
        // sibling below child on the stack, so the child subtree drains first
        if let Some(s) = sibling {
            stack.push(s);
        }
        if let Some(c) = child {
            stack.push(c);
        }
    }
    Ok(())
}

/// Dump the subtree reachable from a path. The spine is written stripped of
/// siblings and of all but its deepest child; the head's child, if any,
/// follows in full. A root-only path dumps the whole trie, an empty path
/// dumps zero nodes. Returns the node count written.
pub fn write_nodes<S: NodeStore, W: Write>(
    store: &S,
    stack: &[S::Node],
    w: &mut W,
) -> TrieResult<u32> {
    if stack.is_empty() {
        w.write_all(&0u32.to_be_bytes())?;
        return Ok(0);
    }
    let head = stack[stack.len() - 1];
    let below = store.child(head);
    let mut count = stack.len() as u32;
    if let Some(c) = below {
        count += count_nodes(store, c);
    }
    w.write_all(&count.to_be_bytes())?;
    for (i, &n) in stack.iter().enumerate() {
        let deepest = i + 1 == stack.len();
        let mut flags = NodeFlags::empty();
        if store.is_terminal(n) {
            flags |= NodeFlags::TERMINAL;
        }
        if !deepest || below.is_some() {
            flags |= NodeFlags::CHILD;
        }
        w.write_all(&[store.value(n), flags.bits()])?;
    }
    if let Some(c) = below {
        write_subtree(store, c, w)?;
    }
    Ok(count)
}

/// Whole-trie dump to a byte vector.
pub fn store_to_bytes<S: NodeStore>(store: &S) -> TrieResult<Vec<u8>> {
    let mut out = Vec::new();
    write_nodes(store, &[store.root()], &mut out)?;
    Ok(out)
}

enum Attach<N> {
    Child(N),
    Sibling(N),
    Done,
}

/// Decode a dump into a freshly created store, rebuilding the tree with an
/// explicit stack of nodes still awaiting their sibling, then hand the store
/// its `read_complete` hook. Terminal flags are trusted; counts are not on
/// the wire at all. On error the partially filled store is dropped by the
/// caller, so no malformed state escapes.
pub fn read_into<S: NodeStore, R: Read>(store: &mut S, r: &mut R) -> TrieResult<()> {
    let mut word = [0u8; 4];
    read_exact_or_truncated(r, &mut word)?;
    let count = u32::from_be_bytes(word);
    if count == 0 {
        return store.read_complete();
    }
    let mut rec = [0u8; 2];
    read_exact_or_truncated(r, &mut rec)?;
    let flags =
        NodeFlags::from_bits(rec[1]).ok_or(TrieError::MalformedStream("unknown flag bits"))?;
    if rec[0] != 0 {
        return Err(TrieError::MalformedStream("root value must be zero"));
    }
    if flags.contains(NodeFlags::SIBLING) {
        return Err(TrieError::MalformedStream("root cannot have a sibling"));
    }
    let root = store.root();
    if flags.contains(NodeFlags::TERMINAL) {
        store.set_terminal(root, true)?;
    }
    let mut pending: Vec<S::Node> = Vec::new();
    let mut attach = if flags.contains(NodeFlags::CHILD) {
        Attach::Child(root)
    } else {
        Attach::Done
    };
    let mut read = 1;
    while read < count {
        read_exact_or_truncated(r, &mut rec)?;
        let flags =
            NodeFlags::from_bits(rec[1]).ok_or(TrieError::MalformedStream("unknown flag bits"))?;
        let n = match attach {
            Attach::Child(p) => store.append_child(p, rec[0])?,
            Attach::Sibling(s) => store.append_sibling(s, rec[0])?,
            Attach::Done => return Err(TrieError::MalformedStream("node count mismatch")),
        };
        if flags.contains(NodeFlags::TERMINAL) {
            store.set_terminal(n, true)?;
        }
        attach = if flags.contains(NodeFlags::CHILD) {
            if flags.contains(NodeFlags::SIBLING) {
                pending.push(n);
            }
            Attach::Child(n)
        } else if flags.contains(NodeFlags::SIBLING) {
            Attach::Sibling(n)
        } else {
            match pending.pop() {
                Some(waiting) => Attach::Sibling(waiting),
                None => Attach::Done,
            }
        };
        read += 1;
    }
    if !matches!(attach, Attach::Done) || !pending.is_empty() {
        return Err(TrieError::MalformedStream("node count mismatch"));
    }
    store.read_complete()
}
