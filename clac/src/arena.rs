// SPDX-License-Identifier: Apache-2.0

use core::cell::{Cell, RefCell};
use core::fmt;
use core::ptr::NonNull;

use log::{debug, trace};

/// Capacity of the first block, and of every following block until an
/// oversized request bumps it.
pub const DEFAULT_BLOCK_CAPACITY: usize = 1000;

/// One fixed-capacity buffer owned by the arena.
///
/// The buffer is leaked out of its `Box` on creation and only reclaimed on drop,
/// so its address stays put no matter how often the arena's block list grows.
struct Block {
    base: NonNull<u8>,
    capacity: usize,
    used: usize,
}

impl Block {
    fn new(capacity: usize) -> Self {
        let buffer: Box<[u8]> = vec![0u8; capacity].into_boxed_slice();
        let base = NonNull::from(Box::leak(buffer)).cast::<u8>();
        Self {
            base,
            capacity,
            used: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.used)
    }

    /// Pointer to `offset` bytes into the block.
    ///
    /// # Safety
    /// `offset` must not exceed the block capacity.
    unsafe fn at(&self, offset: usize) -> *mut u8 {
        self.base.as_ptr().add(offset)
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        let raw = core::ptr::slice_from_raw_parts_mut(self.base.as_ptr(), self.capacity);
        // SAFETY: `raw` is exactly the allocation leaked in `Block::new`, and no
        // view into it can outlive the arena that owns this block.
        drop(unsafe { Box::from_raw(raw) });
    }
}

/// Location of a single allocation inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Allocation {
    block: usize,
    offset: usize,
    len: usize,
}

/// A bump-pointer arena for byte strings.
///
/// Allocations are carved out of large blocks by advancing a cursor. Nothing is
/// ever freed individually; every block lives until the arena is dropped, and a
/// block never moves once created, so views handed out stay valid for the
/// arena's whole lifetime.
///
/// The arena also remembers its two most recent allocations. When they are
/// adjacent in memory, [`crate::StringValue::concat`] can join them without
/// copying.
///
/// Allocation goes through `&self`, so any number of views can be alive while
/// new ones are created. The arena is single-threaded (`!Sync`).
pub struct Arena {
    blocks: RefCell<Vec<Block>>,
    block_capacity: Cell<usize>,
    last: Cell<Option<Allocation>>,
    before_last: Cell<Option<Allocation>>,
}

impl Arena {
    /// Creates an arena with [`DEFAULT_BLOCK_CAPACITY`] byte blocks.
    pub fn new() -> Self {
        Self::with_block_capacity(DEFAULT_BLOCK_CAPACITY)
    }

    /// Creates an arena whose blocks hold `capacity` bytes (at least one).
    pub fn with_block_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            blocks: RefCell::new(vec![Block::new(capacity)]),
            block_capacity: Cell::new(capacity),
            last: Cell::new(None),
            before_last: Cell::new(None),
        }
    }

    /// Hands out `size` fresh bytes.
    ///
    /// The bytes come from the current block when they fit there; otherwise a
    /// new block is appended and the request is served from its start. The
    /// previous block's tail is abandoned.
    ///
    /// A zero-sized request returns an empty slice and is not recorded as an
    /// allocation.
    ///
    /// Crate-private: every caller fills the range and downgrades it to a
    /// shared view before touching the arena again. Outside code gets arena
    /// bytes through [`crate::StringValue::from_fn`] instead.
    #[allow(clippy::mut_from_ref)]
    pub(crate) fn allocate(&self, size: usize) -> &mut [u8] {
        if size == 0 {
            return &mut [];
        }
        let allocation = self.reserve(size);
        let blocks = self.blocks.borrow();
        let ptr = match blocks.get(allocation.block) {
            // SAFETY: `reserve` guarantees offset + len <= capacity.
            Some(block) => unsafe { block.at(allocation.offset) },
            None => return &mut [],
        };
        // SAFETY: `reserve` handed out [offset, offset + size) to this caller
        // alone, and the block memory is neither moved nor freed before `self`
        // is dropped.
        unsafe { core::slice::from_raw_parts_mut(ptr, size) }
    }

    fn reserve(&self, size: usize) -> Allocation {
        let mut blocks = self.blocks.borrow_mut();
        let fits = blocks.last().is_some_and(|block| block.remaining() >= size);
        if !fits {
            let mut capacity = self.block_capacity.get();
            if size > capacity {
                capacity = size.saturating_mul(2);
                self.block_capacity.set(capacity);
            }
            blocks.push(Block::new(capacity));
            debug!(
                "arena: appended block {} ({} bytes) for a {} byte request",
                blocks.len() - 1,
                capacity,
                size
            );
        }
        let index = blocks.len().saturating_sub(1);
        let offset = match blocks.last_mut() {
            Some(block) => {
                let offset = block.used;
                block.used += size;
                offset
            }
            None => 0,
        };
        let allocation = Allocation {
            block: index,
            offset,
            len: size,
        };
        self.before_last.set(self.last.get());
        self.last.set(Some(allocation));
        allocation
    }

    /// Joins `first` and `second` into one view without copying, if `first` is
    /// exactly the before-last allocation, `second` exactly the last one, and the
    /// two sit back to back in the same block.
    pub(crate) fn coalesce(&self, first: &[u8], second: &[u8]) -> Option<&[u8]> {
        let earlier = self.before_last.get()?;
        let later = self.last.get()?;
        if earlier.block != later.block || earlier.offset + earlier.len != later.offset {
            return None;
        }
        if first.len() != earlier.len || second.len() != later.len {
            return None;
        }
        let blocks = self.blocks.borrow();
        let block = blocks.get(earlier.block)?;
        // SAFETY: both allocations lie inside this block, so their offsets are in
        // bounds.
        let (start, middle) = unsafe { (block.at(earlier.offset), block.at(later.offset)) };
        if !core::ptr::eq(first.as_ptr(), start) || !core::ptr::eq(second.as_ptr(), middle) {
            return None;
        }
        trace!(
            "arena: coalesced {} + {} bytes in block {}",
            earlier.len,
            later.len,
            earlier.block
        );
        // The joined span now stands in for both allocations, so it can be
        // extended again by whatever gets allocated next.
        self.before_last.set(None);
        self.last.set(Some(Allocation {
            block: earlier.block,
            offset: earlier.offset,
            len: earlier.len + later.len,
        }));
        // SAFETY: the range is the union of two contiguous live allocations of
        // this arena. Both are only ever exposed as shared views, and the block
        // outlives the returned borrow of `self`.
        Some(unsafe { core::slice::from_raw_parts(start, earlier.len + later.len) })
    }

    /// Current default capacity for newly appended blocks.
    pub fn block_capacity(&self) -> usize {
        self.block_capacity.get()
    }

    /// Number of blocks currently owned.
    pub fn block_count(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// Total bytes handed out across all blocks.
    pub fn bytes_allocated(&self) -> usize {
        self.blocks.borrow().iter().map(|block| block.used).sum()
    }

    /// Snapshot of the block bookkeeping.
    pub fn stats(&self) -> ArenaStats {
        let blocks = self.blocks.borrow();
        ArenaStats {
            blocks: blocks
                .iter()
                .map(|block| BlockStats {
                    capacity: block.capacity,
                    used: block.used,
                })
                .collect(),
            block_capacity: self.block_capacity.get(),
        }
    }

    /// Writes the [`ArenaStats`] report to `out`. With `contents`, each block's
    /// used bytes follow its line, wrapped in `{` and `}` lines.
    pub fn dump<W: std::io::Write>(&self, out: &mut W, contents: bool) -> std::io::Result<()> {
        let stats = self.stats();
        writeln!(out, "{}", stats.header())?;
        let blocks = self.blocks.borrow();
        for (index, block) in blocks.iter().enumerate() {
            writeln!(out, "[{}]: [{}] bytes", index, block.capacity)?;
            if contents {
                // SAFETY: the first `used` bytes of a block were handed out by
                // `allocate`, and no mutable borrow of them outlives the call
                // that filled them.
                let used = unsafe { core::slice::from_raw_parts(block.base.as_ptr(), block.used) };
                writeln!(out, ":\n{{")?;
                out.write_all(used)?;
                writeln!(out, "\n}}")?;
            }
        }
        Ok(())
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("blocks", &self.block_count())
            .field("block_capacity", &self.block_capacity.get())
            .field("bytes_allocated", &self.bytes_allocated())
            .finish()
    }
}

/// Capacity and fill level of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockStats {
    /// Size of the block in bytes.
    pub capacity: usize,
    /// Bytes handed out from the start of the block.
    pub used: usize,
}

/// Bookkeeping snapshot returned by [`Arena::stats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaStats {
    /// Every block, oldest first.
    pub blocks: Vec<BlockStats>,
    /// Capacity the next appended block will get.
    pub block_capacity: usize,
}

impl ArenaStats {
    /// Number of blocks in the snapshot.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Bytes used in the block currently being filled.
    pub fn bytes_used(&self) -> usize {
        self.blocks.last().map_or(0, |block| block.used)
    }

    fn header(&self) -> String {
        let count = self.blocks.len();
        format!("{} block{}:", count, if count > 1 { "s" } else { "" })
    }
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        for (index, block) in self.blocks.iter().enumerate() {
            writeln!(f, "[{}]: [{}] bytes", index, block.capacity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_share_a_block_until_full() {
        let arena = Arena::with_block_capacity(16);
        let a = arena.allocate(6).as_ptr();
        let b = arena.allocate(6).as_ptr();
        assert_eq!(arena.block_count(), 1);
        assert_eq!(b, a.wrapping_add(6), "bump allocations should be adjacent");

        // 4 bytes left, request 5: new block
        arena.allocate(5);
        assert_eq!(arena.block_count(), 2);
        assert_eq!(arena.bytes_allocated(), 17);
    }

    #[test]
    fn test_exact_fit_stays_in_block() {
        let arena = Arena::with_block_capacity(8);
        arena.allocate(3);
        arena.allocate(5);
        assert_eq!(arena.block_count(), 1);
        assert_eq!(arena.stats().bytes_used(), 8);
    }

    #[test_log::test]
    fn test_oversized_request_grows_default_capacity() {
        let arena = Arena::with_block_capacity(8);
        let big = arena.allocate(20);
        assert_eq!(big.len(), 20);
        assert_eq!(arena.block_count(), 2);
        assert_eq!(arena.block_capacity(), 40);

        // The oversized block keeps serving requests, later blocks use the
        // grown capacity
        arena.allocate(15);
        assert_eq!(arena.block_count(), 2);
        arena.allocate(30);
        let stats = arena.stats();
        assert_eq!(stats.block_count(), 3);
        assert_eq!(stats.blocks[1].capacity, 40);
        assert_eq!(stats.blocks[2].capacity, 40);
    }

    #[test]
    fn test_zero_sized_allocation_is_not_recorded() {
        let arena = Arena::with_block_capacity(8);
        assert!(arena.allocate(0).is_empty());
        assert_eq!(arena.bytes_allocated(), 0);
        assert_eq!(arena.last.get(), None);
    }

    #[test]
    fn test_blocks_do_not_move_when_arena_grows() {
        let arena = Arena::with_block_capacity(4);
        let first = arena.allocate(4);
        first.copy_from_slice(b"abcd");
        let first: &[u8] = first;
        for _ in 0..64 {
            arena.allocate(4).copy_from_slice(b"zzzz");
        }
        assert_eq!(first, b"abcd");
        assert_eq!(arena.block_count(), 65);
    }

    #[test]
    fn test_coalesce_requires_exact_adjacent_pair() {
        let arena = Arena::with_block_capacity(32);
        let a: &[u8] = arena.allocate(3);
        let b: &[u8] = arena.allocate(2);
        let joined = arena.coalesce(a, b).map(|s| s.as_ptr());
        assert_eq!(joined, Some(a.as_ptr()));

        // Wrong order, or a prefix of the allocation, never coalesces
        assert!(arena.coalesce(b, a).is_none());
        assert!(arena.coalesce(&a[..2], b).is_none());

        // Once something else is allocated the pair is stale
        arena.allocate(1);
        assert!(arena.coalesce(a, b).is_none());
    }

    #[test]
    fn test_coalesced_span_can_be_extended_again() {
        let arena = Arena::with_block_capacity(32);
        let a: &[u8] = arena.allocate(3);
        let b: &[u8] = arena.allocate(2);
        let ab = arena.coalesce(a, b).unwrap();
        assert_eq!(ab.len(), 5);
        // The pair is consumed: a second join of the same operands fails
        assert!(arena.coalesce(a, b).is_none());

        let c: &[u8] = arena.allocate(4);
        let abc = arena.coalesce(ab, c).unwrap();
        assert_eq!(abc.as_ptr(), a.as_ptr());
        assert_eq!(abc.len(), 9);
    }

    #[test]
    fn test_coalesce_refuses_pair_across_blocks() {
        let arena = Arena::with_block_capacity(4);
        let a: &[u8] = arena.allocate(3);
        let b: &[u8] = arena.allocate(3);
        assert_eq!(arena.block_count(), 2);
        assert!(arena.coalesce(a, b).is_none());
    }

    #[test]
    fn test_stats_display() {
        let arena = Arena::with_block_capacity(10);
        assert_eq!(arena.stats().to_string(), "1 block:\n[0]: [10] bytes\n");
        arena.allocate(11);
        assert_eq!(
            arena.stats().to_string(),
            "2 blocks:\n[0]: [10] bytes\n[1]: [22] bytes\n"
        );
    }

    #[test]
    fn test_dump_with_contents() {
        let arena = Arena::with_block_capacity(10);
        arena.allocate(2).copy_from_slice(b"hi");
        let mut out = Vec::new();
        arena.dump(&mut out, true).unwrap();
        assert_eq!(out, b"1 block:\n[0]: [10] bytes\n:\n{\nhi\n}\n");
    }

    #[test]
    fn test_dump_while_filled_values_are_live() {
        let arena = Arena::with_block_capacity(10);
        let first = crate::StringValue::from_fn(&arena, 4, |buf| buf.copy_from_slice(b"abcd"));
        let mut out = Vec::new();
        arena.dump(&mut out, true).unwrap();
        let second = crate::StringValue::from_fn(&arena, 2, |buf| buf.fill(b'z'));
        arena.dump(&mut out, true).unwrap();

        assert_eq!(first, "abcd");
        assert_eq!(second, "zz");
        assert!(out.ends_with(b"{\nabcdzz\n}\n"));
    }
}
