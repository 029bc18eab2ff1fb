//! The free-page queue itself (§3, §4.3): a FIFO of reclaimed page
//! identifiers split across a remove side (a chain of on-disk nodes already
//! durable from a prior epoch) and an append side (an in-memory heap that
//! spills to disk nodes as it grows). One [`PageQueue`] instance is a single
//! such FIFO; a page manager typically owns two — a normal free list and a
//! reserve list used to fund the normal list's own node allocations.

use tracing::{debug, error, warn};

use crate::error::Corruption;
use crate::heap::AppendHeap;
use crate::header::HeaderSlice;
use crate::manager::{AllocMode, PageArray, PageManager};
use crate::node;
use crate::{PageId, Result};

fn payload_capacity(page_size: usize) -> usize {
    page_size - node::HEADER_LEN
}

/// The in-memory, not-yet-written tail node of the append side.
struct TailBuffer {
    buf: Vec<u8>,
    started: bool,
    first_page_id: PageId,
    last_id: PageId,
    offset: usize,
}

impl TailBuffer {
    fn new(page_size: usize) -> Self {
        Self {
            buf: vec![0u8; page_size],
            started: false,
            first_page_id: 0,
            last_id: 0,
            offset: node::HEADER_LEN,
        }
    }

    fn reset(&mut self) {
        self.buf.fill(0);
        self.started = false;
        self.first_page_id = 0;
        self.last_id = 0;
        self.offset = node::HEADER_LEN;
    }
}

/// Result of a [`PageQueue::try_remove`] call.
///
/// `tryRemove` may need to delete the node it just exhausted, but deleting
/// a page is itself an operation that can call back into the page manager
/// (§9). Rather than accept the caller's remove-lock guard as a generic
/// parameter, this returns the deferred work: the caller drops its own
/// remove lock, then performs `pending_delete` through the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub page_id: PageId,
    pub pending_delete: Option<PageId>,
}

impl RemoveOutcome {
    fn empty() -> Self {
        Self {
            page_id: 0,
            pending_delete: None,
        }
    }

    fn removed(page_id: PageId, pending_delete: Option<PageId>) -> Self {
        Self {
            page_id,
            pending_delete,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.page_id == 0
    }
}

pub struct PageQueue {
    reserve: bool,
    aggressive: bool,
    page_size: usize,

    remove_page_count: u64,
    remove_node_count: u64,
    remove_head_id: PageId,
    remove_head_offset: usize,
    remove_head_first_page_id: PageId,
    remove_head_buf: Option<Vec<u8>>,
    remove_stopped_id: PageId,

    append_heap: AppendHeap,
    append_tail: TailBuffer,
    append_tail_id: PageId,
    append_head_id: PageId,
    append_page_count: u64,
    append_node_count: u64,
    drain_in_progress: bool,
}

impl PageQueue {
    /// Creates a brand-new, empty queue, allocating its first node through
    /// `manager`.
    pub fn create<M: PageManager>(manager: &mut M, reserve: bool, aggressive: bool) -> Result<Self> {
        let page_size = manager.page_array().page_size();
        let mode = if reserve { AllocMode::Reserve } else { AllocMode::Normal };
        let init_id = manager.alloc_page(mode)?;

        let mut buf = vec![0u8; page_size];
        node::write_header(&mut buf, 0, 0);
        manager.page_array().write_page(init_id, &buf)?;

        Ok(Self {
            reserve,
            aggressive,
            page_size,
            remove_page_count: 0,
            remove_node_count: 0,
            remove_head_id: init_id,
            remove_head_offset: node::HEADER_LEN,
            remove_head_first_page_id: 0,
            remove_head_buf: Some(buf),
            remove_stopped_id: 0,
            append_heap: AppendHeap::new(payload_capacity(page_size)),
            append_tail: TailBuffer::new(page_size),
            append_tail_id: init_id,
            append_head_id: init_id,
            append_page_count: 0,
            append_node_count: 0,
            drain_in_progress: false,
        })
    }

    /// Rebuilds a queue from a previously persisted [`HeaderSlice`] (§3
    /// "Lifecycle", §4.4).
    pub fn restore<M: PageManager>(manager: &mut M, header: &HeaderSlice, reserve: bool, aggressive: bool) -> Result<Self> {
        let page_size = manager.page_array().page_size();

        let mut queue = Self {
            reserve,
            aggressive,
            page_size,
            remove_page_count: header.remove_page_count(),
            remove_node_count: header.remove_node_count(),
            remove_head_id: header.remove_head_id(),
            remove_head_offset: header.remove_head_offset() as usize,
            remove_head_first_page_id: header.remove_head_first_page_id(),
            remove_head_buf: None,
            remove_stopped_id: 0,
            append_heap: AppendHeap::new(payload_capacity(page_size)),
            append_tail: TailBuffer::new(page_size),
            append_tail_id: header.append_head_id(),
            append_head_id: header.append_head_id(),
            append_page_count: 0,
            append_node_count: 0,
            drain_in_progress: false,
        };

        if queue.remove_head_id != 0 {
            let mut buf = vec![0u8; page_size];
            manager.page_array().read_page(queue.remove_head_id, &mut buf)?;
            if queue.remove_head_first_page_id == 0 {
                // commitStart's sentinel: the real value lives on the node.
                let (_, first_page_id) = node::read_header(&buf);
                queue.remove_head_first_page_id = first_page_id;
            }
            queue.remove_head_buf = Some(buf);
        }

        debug!(
            remove_head_id = queue.remove_head_id,
            append_head_id = queue.append_head_id,
            "page queue restored"
        );

        Ok(queue)
    }

    fn alloc_mode(&self) -> AllocMode {
        if self.reserve {
            AllocMode::Reserve
        } else {
            AllocMode::Normal
        }
    }

    /// Adds `page_id` to the append side (§4.2, §4.3). May synchronously
    /// drain part of the heap to disk if doing so would otherwise leave no
    /// headroom for a reentrant append.
    pub fn append<M: PageManager>(&mut self, manager: &mut M, page_id: PageId) -> Result<()> {
        assert!(page_id > 1, "page id {page_id} is not a valid free-list identifier");

        let inserted = self.append_heap.push(page_id);
        debug_assert!(inserted, "page {page_id} is already on the append heap (double free)");

        if self.append_heap.should_drain() && !self.drain_in_progress {
            self.drain_append_heap(manager)?;
        }
        Ok(())
    }

    /// Removes and returns the newest id still sitting in the append heap,
    /// or `0` if nothing qualifies (§4.2, §4.3). Used by `reclaim` to unwind
    /// a reserve queue without ever writing its contents to disk.
    pub fn try_unappend(&mut self) -> PageId {
        let headroom = if self.drain_in_progress { 1 } else { 0 };
        self.append_heap.try_unappend(headroom)
    }

    fn drain_append_heap<M: PageManager>(&mut self, manager: &mut M) -> Result<()> {
        self.drain_in_progress = true;
        let result = self.drain_append_heap_inner(manager);
        self.drain_in_progress = false;
        result
    }

    fn drain_append_heap_inner<M: PageManager>(&mut self, manager: &mut M) -> Result<()> {
        while !self.append_heap.is_empty() {
            if !self.append_tail.started {
                let first = self.append_heap.pop_min().expect("checked non-empty above");
                self.append_tail.started = true;
                self.append_tail.first_page_id = first;
                self.append_tail.last_id = first;
                self.append_page_count += 1;
            }

            let (new_offset, count, last) =
                self.append_heap
                    .drain(self.append_tail.last_id, &mut self.append_tail.buf, self.append_tail.offset);
            self.append_tail.offset = new_offset;
            self.append_page_count += count as u64;
            if let Some(last_id) = last {
                self.append_tail.last_id = last_id;
            }

            if self.append_heap.is_empty() {
                break;
            }

            // The tail node is full and ids remain: roll to a fresh one.
            self.finalize_tail_node(manager)?;
        }
        Ok(())
    }

    /// Writes the in-memory tail buffer to `append_tail_id`, linked to a
    /// freshly allocated successor, and makes that successor the new tail.
    ///
    /// Until the first rollover, a brand-new queue's remove and append
    /// sides share the same physical node (nothing has been removed yet).
    /// When that is still true, the remove side's cached copy of that node
    /// is refreshed too, or `try_remove` would read back the stale
    /// all-zero image `create` wrote instead of what was just appended.
    fn finalize_tail_node<M: PageManager>(&mut self, manager: &mut M) -> Result<()> {
        let new_tail_id = manager.alloc_page(self.alloc_mode())?;
        node::write_header(&mut self.append_tail.buf, new_tail_id, self.append_tail.first_page_id);
        manager.page_array().write_page(self.append_tail_id, &self.append_tail.buf)?;

        if self.append_tail_id == self.remove_head_id && self.remove_head_offset == node::HEADER_LEN {
            self.remove_head_first_page_id = self.append_tail.first_page_id;
            self.remove_head_buf = Some(self.append_tail.buf.clone());
        }

        self.append_tail_id = new_tail_id;
        self.append_node_count += 1;
        self.append_tail.reset();
        Ok(())
    }

    /// Flushes the append side to disk ahead of a checkpoint (§4.3, §4.4):
    /// drains whatever remains in the heap and, if anything was appended
    /// this epoch, writes the (possibly partial) tail node and allocates a
    /// fresh empty one beyond it.
    pub fn pre_commit<M: PageManager>(&mut self, manager: &mut M) -> Result<()> {
        self.drain_in_progress = true;
        let result = self.pre_commit_inner(manager);
        self.drain_in_progress = false;
        result
    }

    fn pre_commit_inner<M: PageManager>(&mut self, manager: &mut M) -> Result<()> {
        self.drain_append_heap_inner(manager)?;

        if self.append_tail.started {
            self.finalize_tail_node(manager)?;
        }

        Ok(())
    }

    /// Folds this epoch's append counts into the remove side and writes the
    /// post-epoch queue state into `header` (§4.4). Must run after
    /// `pre_commit` and before the header is made durable.
    pub fn commit_start(&mut self, header: &mut HeaderSlice) {
        let appended_this_epoch = self.append_page_count > 0 || self.append_node_count > 0;

        if self.remove_head_id == 0 && appended_this_epoch {
            header.set_remove_head_id(self.append_head_id);
            header.set_remove_head_offset(node::HEADER_LEN as u32);
            header.set_remove_head_first_page_id(0);
        } else {
            header.set_remove_head_id(self.remove_head_id);
            header.set_remove_head_offset(self.remove_head_offset as u32);
            header.set_remove_head_first_page_id(self.remove_head_first_page_id);
        }

        header.set_append_head_id(self.append_tail_id);

        self.remove_page_count += self.append_page_count;
        self.remove_node_count += self.append_node_count;
        header.set_remove_page_count(self.remove_page_count);
        header.set_remove_node_count(self.remove_node_count);

        self.append_page_count = 0;
        self.append_node_count = 0;

        debug!(
            remove_page_count = self.remove_page_count,
            remove_node_count = self.remove_node_count,
            append_head_id = self.append_tail_id,
            "commitStart: folded append counts, barrier advancing"
        );
    }

    /// Advances the live barrier once `header` is durable (§4.4). If the
    /// remove side had run dry but the barrier moved, resumes removal from
    /// the node that used to be the barrier.
    pub fn commit_end<M: PageManager>(&mut self, manager: &mut M, header: &HeaderSlice) -> Result<()> {
        let new_barrier = header.append_head_id();
        self.append_head_id = new_barrier;

        if self.remove_head_id == 0 && self.remove_stopped_id != 0 && self.remove_stopped_id != new_barrier {
            self.load_node_as_head(manager, self.remove_stopped_id)?;
        }

        debug!(append_head_id = new_barrier, "commitEnd: barrier now durable");
        Ok(())
    }

    fn load_node_as_head<M: PageManager>(&mut self, manager: &mut M, node_id: PageId) -> Result<()> {
        let mut buf = vec![0u8; self.page_size];
        manager.page_array().read_page(node_id, &mut buf)?;
        let (_, first_page_id) = node::read_header(&buf);

        self.remove_head_id = node_id;
        self.remove_head_offset = node::HEADER_LEN;
        self.remove_head_first_page_id = first_page_id;
        self.remove_head_buf = Some(buf);
        Ok(())
    }

    fn check_removed_id(&self, manager: &impl PageManager, page_id: PageId) -> Result<()> {
        if !manager.is_page_out_of_bounds(page_id) {
            return Ok(());
        }

        if self.reserve {
            // Open question (§9): reserve/aggressive queues have
            // historically trusted the identifier without a bounds check.
            // Preserve that tolerance, but log it so it is visible.
            warn!(page_id, "tryRemove: trusting an out-of-bounds id from a reserve queue");
            Ok(())
        } else {
            error!(page_id, "tryRemove: page id out of bounds, database is corrupt");
            Err(Corruption::PageOutOfBounds { page: page_id }.into())
        }
    }

    /// Removes and returns the oldest free page id, if any (§4.3). A
    /// non-empty result may carry a node id that must be deleted through
    /// the page manager — the caller should do that only after releasing
    /// its own remove lock (§9, "two-phase result").
    pub fn try_remove<M: PageManager>(&mut self, manager: &mut M) -> Result<RemoveOutcome> {
        // A head node that is still its all-zero `create` image — no
        // checkpoint has ever drained anything into it — looks identical to
        // a populated node except for `first_page_id == 0`, which a real
        // entry can never carry (ids are >= 2). Treat that the same as an
        // exhausted remove side instead of reading through to page 0.
        if self.remove_head_id != 0 && (self.remove_page_count == 0 || self.remove_head_first_page_id == 0) {
            return Ok(RemoveOutcome::empty());
        }

        if self.remove_head_id == 0 {
            if self.aggressive && self.remove_stopped_id != 0 && self.remove_stopped_id != self.append_tail_id {
                self.load_node_as_head(manager, self.remove_stopped_id)?;
            } else {
                return Ok(RemoveOutcome::empty());
            }
        }

        let page_id = self.remove_head_first_page_id;
        self.check_removed_id(manager, page_id)?;
        self.remove_page_count -= 1;

        let mut cursor = node::PayloadCursor {
            offset: self.remove_head_offset,
            current_id: self.remove_head_first_page_id,
        };
        let decoded = {
            let buf = self.remove_head_buf.as_ref().expect("remove head buffer loaded while remove_head_id != 0");
            node::decode_next(buf, &mut cursor)
        };

        if let Some(next_id) = decoded {
            self.remove_head_offset = cursor.offset;
            self.remove_head_first_page_id = next_id;
            return Ok(RemoveOutcome::removed(page_id, None));
        }

        let next_node_id = {
            let buf = self.remove_head_buf.as_ref().expect("remove head buffer loaded while remove_head_id != 0");
            node::read_header(buf).0
        };
        let barrier = if self.aggressive { self.append_tail_id } else { self.append_head_id };
        let exhausted_node_id = self.remove_head_id;

        if next_node_id == barrier {
            self.remove_head_id = 0;
            self.remove_stopped_id = next_node_id;
            self.remove_head_buf = None;
        } else {
            self.load_node_as_head(manager, next_node_id)?;
            self.remove_node_count -= 1;
        }

        Ok(RemoveOutcome::removed(page_id, Some(exhausted_node_id)))
    }

    /// Unwinds an aggressive reserve queue entirely, deleting every id at or
    /// below `upper_bound` through the manager (§4.3, "reclaim"). Only
    /// meaningful for queues created with `reserve && aggressive`.
    pub fn reclaim<M: PageManager>(&mut self, manager: &mut M, upper_bound: PageId, recycle: bool) -> Result<()> {
        assert!(self.reserve && self.aggressive, "reclaim is only valid for an aggressive reserve queue");

        loop {
            let unappended = self.try_unappend();
            if unappended != 0 {
                if unappended <= upper_bound {
                    manager.delete_page(unappended, recycle)?;
                }
                continue;
            }

            let outcome = self.try_remove(manager)?;
            if outcome.is_empty() {
                break;
            }

            if outcome.page_id <= upper_bound {
                manager.delete_page(outcome.page_id, recycle)?;
            }
            if let Some(node_id) = outcome.pending_delete {
                manager.delete_page(node_id, recycle)?;
            }
        }

        if self.append_tail_id != 0 && self.append_tail_id <= upper_bound {
            manager.delete_page(self.append_tail_id, recycle)?;
        }

        Ok(())
    }

    /// Walks the remove-side chain up to (not including) the append tail
    /// and checks that the set of ids encountered is exactly `lo..hi`,
    /// using an order-independent rolling hash (§4.3, "verifyPageRange").
    pub fn verify_page_range<M: PageManager>(&mut self, manager: &mut M, lo: PageId, hi: PageId) -> Result<bool> {
        let mut hash: u64 = 0;
        let mut count: u64 = 0;

        let mut node_id = if self.remove_head_id != 0 { self.remove_head_id } else { self.remove_stopped_id };
        let end = self.append_tail_id;

        let mut buf = vec![0u8; self.page_size];
        while node_id != 0 && node_id != end {
            manager.page_array().read_page(node_id, &mut buf)?;
            let (next_node_id, first_page_id) = node::read_header(&buf);

            if first_page_id != 0 {
                hash = hash.wrapping_add(scramble(first_page_id));
                count += 1;

                let mut cursor = node::PayloadCursor::at_start(first_page_id);
                while let Some(id) = node::decode_next(&buf, &mut cursor) {
                    hash = hash.wrapping_add(scramble(id));
                    count += 1;
                }
            }

            node_id = next_node_id;
        }

        let mut expected_hash: u64 = 0;
        for id in lo..hi {
            expected_hash = expected_hash.wrapping_add(scramble(id));
        }

        Ok(hash == expected_hash && count == hi.saturating_sub(lo))
    }

    /// Clears a bit for every page and node reachable from the remove side
    /// through (and including) the append head, signalling a double free if
    /// a bit was already clear (§4.3, "traceRemovablePages"). Returns the
    /// count of bits cleared.
    pub fn trace_removable_pages<M: PageManager>(&mut self, manager: &mut M, bitset: &mut crate::bitset::PageBitset) -> Result<u64> {
        let mut cleared = 0u64;
        let mut node_id = if self.remove_head_id != 0 { self.remove_head_id } else { self.remove_stopped_id };

        let mut buf = vec![0u8; self.page_size];
        while node_id != 0 {
            cleared += clear_node_bit(bitset, node_id)?;
            let at_append_head = node_id == self.append_head_id;

            manager.page_array().read_page(node_id, &mut buf)?;
            let (next_node_id, first_page_id) = node::read_header(&buf);

            if first_page_id != 0 {
                cleared += clear_page_bit(bitset, first_page_id)?;
                let mut cursor = node::PayloadCursor::at_start(first_page_id);
                while let Some(id) = node::decode_next(&buf, &mut cursor) {
                    cleared += clear_page_bit(bitset, id)?;
                }
            }

            if at_append_head {
                break;
            }
            node_id = next_node_id;
        }

        Ok(cleared)
    }

    /// Adds this queue's outstanding page count into the manager's running
    /// free-page statistics (§4.3, "Provided to the page manager").
    pub fn add_to(&self, stats: &mut crate::manager::FreePageStats) {
        stats.free_pages += self.remove_page_count + self.append_page_count;
    }
}

fn clear_page_bit(bitset: &mut crate::bitset::PageBitset, id: PageId) -> Result<u64> {
    if id >= bitset.len() {
        return Ok(0);
    }
    if bitset.clear(id) {
        Ok(1)
    } else {
        error!(page = id, "traceRemovablePages: page already cleared, database is corrupt");
        Err(Corruption::DoublyFreedPage { page: id }.into())
    }
}

fn clear_node_bit(bitset: &mut crate::bitset::PageBitset, id: PageId) -> Result<u64> {
    if id >= bitset.len() {
        return Ok(0);
    }
    if bitset.clear(id) {
        Ok(1)
    } else {
        error!(node = id, "traceRemovablePages: node already cleared, database is corrupt");
        Err(Corruption::DoublyFreedNode { node: id }.into())
    }
}

/// A bijective 64-bit mix (splitmix64's finalizer), used to build an
/// order-independent hash of a set of page ids for `verifyPageRange`.
fn scramble(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemoryPageManager;

    fn manager(page_size: usize, page_count: u64) -> MemoryPageManager {
        MemoryPageManager::new(page_size, page_count)
    }

    #[test]
    fn append_then_remove_round_trips_in_a_single_epoch() {
        let mut mgr = manager(256, 4096);
        let mut q = PageQueue::create(&mut mgr, false, false).unwrap();

        for id in [10u64, 20, 5, 30] {
            q.append(&mut mgr, id).unwrap();
        }

        let mut header = HeaderSlice::zeroed();
        q.pre_commit(&mut mgr).unwrap();
        q.commit_start(&mut header);
        q.commit_end(&mut mgr, &header).unwrap();

        let mut removed = vec![];
        loop {
            let outcome = q.try_remove(&mut mgr).unwrap();
            if outcome.is_empty() {
                break;
            }
            removed.push(outcome.page_id);
            if let Some(node_id) = outcome.pending_delete {
                mgr.delete_page(node_id, true).unwrap();
            }
        }
        assert_eq!(removed, vec![5, 10, 20, 30]);
    }

    #[test]
    fn barrier_holds_appends_across_the_epoch_boundary() {
        let mut mgr = manager(256, 4096);
        let mut q = PageQueue::create(&mut mgr, false, false).unwrap();

        q.append(&mut mgr, 100).unwrap();
        let mut header = HeaderSlice::zeroed();
        q.pre_commit(&mut mgr).unwrap();
        q.commit_start(&mut header);
        q.commit_end(&mut mgr, &header).unwrap();

        // Appended after the barrier moved; must not be visible yet.
        q.append(&mut mgr, 200).unwrap();

        let first = q.try_remove(&mut mgr).unwrap();
        assert_eq!(first.page_id, 100);
        let second = q.try_remove(&mut mgr).unwrap();
        assert!(second.is_empty(), "page 200 belongs to the next epoch");
    }

    #[test]
    fn empty_epoch_does_not_move_the_append_head() {
        let mut mgr = manager(256, 4096);
        let mut q = PageQueue::create(&mut mgr, false, false).unwrap();
        let before = q.append_head_id;

        let mut header = HeaderSlice::zeroed();
        q.pre_commit(&mut mgr).unwrap();
        q.commit_start(&mut header);
        q.commit_end(&mut mgr, &header).unwrap();

        assert_eq!(q.append_head_id, before);
        assert_eq!(header.append_head_id(), before);
    }

    #[test]
    fn verify_page_range_matches_a_synthetic_contiguous_run() {
        let mut mgr = manager(256, 4096);
        let mut q = PageQueue::create(&mut mgr, false, false).unwrap();

        for id in 10u64..20 {
            q.append(&mut mgr, id).unwrap();
        }
        let mut header = HeaderSlice::zeroed();
        q.pre_commit(&mut mgr).unwrap();
        q.commit_start(&mut header);
        q.commit_end(&mut mgr, &header).unwrap();

        assert!(q.verify_page_range(&mut mgr, 10, 20).unwrap());
        assert!(!q.verify_page_range(&mut mgr, 10, 19).unwrap());
    }

    #[test]
    fn trace_removable_pages_detects_a_double_free() {
        let mut mgr = manager(256, 4096);
        let mut q = PageQueue::create(&mut mgr, false, false).unwrap();
        q.append(&mut mgr, 42).unwrap();
        let mut header = HeaderSlice::zeroed();
        q.pre_commit(&mut mgr).unwrap();
        q.commit_start(&mut header);
        q.commit_end(&mut mgr, &header).unwrap();

        let mut bitset = crate::bitset::PageBitset::new_all_set(4096);
        bitset.clear(42); // already cleared by some other accounting

        let err = q.trace_removable_pages(&mut mgr, &mut bitset).unwrap_err();
        assert!(matches!(err, crate::Error::Corrupt(Corruption::DoublyFreedPage { page: 42 })));
    }

    #[test]
    fn many_appends_survive_repeated_inline_drains() {
        // A page-sized node here fits very few entries, so a handful of
        // appends is enough to trip should_drain and roll several nodes
        // while the caller keeps pushing more ids onto the heap.
        let mut mgr = manager(64, 4096);
        let mut q = PageQueue::create(&mut mgr, true, true).unwrap();

        for id in 1000u64..1050 {
            q.append(&mut mgr, id).unwrap();
        }

        let mut header = HeaderSlice::zeroed();
        q.pre_commit(&mut mgr).unwrap();
        q.commit_start(&mut header);
        q.commit_end(&mut mgr, &header).unwrap();

        let mut seen = vec![];
        loop {
            let outcome = q.try_remove(&mut mgr).unwrap();
            if outcome.is_empty() {
                break;
            }
            seen.push(outcome.page_id);
        }
        assert_eq!(seen, (1000u64..1050).collect::<Vec<_>>());
    }
}
