//! Branch target buffer (BTB) implementations.
//!
//! [`TargetCache`] is fully associative: any branch may occupy any line, and
//! replacement is strict LRU. Lines live in a fixed arena and are threaded
//! onto a recency list by index. Two sentinel nodes mark the MRU (head) and
//! LRU (tail) ends of the list, so promotion and eviction are O(1) once a line
//! is known. A tag index finds the line for an address.

use std::collections::HashMap;
use std::iter;
use std::num::NonZeroUsize;
use itertools::Itertools;

/// A resident (branch address, target address) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BtbEntry {
    /// Address of the branch (the tag)
    pub pc: u32,
    /// Cached target address for this branch
    pub tgt: u32,
}
impl BtbEntry {
    pub fn new(pc: u32, tgt: u32) -> Self {
        Self { pc, tgt }
    }
}

#[derive(Clone, Copy, Debug)]
struct CacheLine {
    /// `None` until the line is first filled
    tag: Option<u32>,
    tgt: u32,
    prev: usize,
    next: usize,
}
impl CacheLine {
    const INVALID: Self = Self { tag: None, tgt: 0, prev: 0, next: 0 };
}

/// A fixed-capacity, fully-associative target cache with LRU replacement.
#[derive(Clone, Debug)]
pub struct TargetCache {
    /// `capacity` lines, followed by the head and tail sentinels
    lines: Vec<CacheLine>,

    /// Map from a resident tag to the index of its line
    index: HashMap<u32, usize>,

    /// Number of usable lines
    capacity: usize,
}

impl TargetCache {
    /// Create a cache where every line is invalid.
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        let mut res = Self {
            lines: vec![CacheLine::INVALID; capacity + 2],
            index: HashMap::with_capacity(capacity),
            capacity,
        };
        res.link_all();
        res
    }

    fn head(&self) -> usize { self.capacity }
    fn tail(&self) -> usize { self.capacity + 1 }

    /// Thread every line onto the recency list in arena order.
    fn link_all(&mut self) {
        let (head, tail) = (self.head(), self.tail());
        let order = iter::once(head)
            .chain(0..self.capacity)
            .chain(iter::once(tail));
        for (a, b) in order.tuple_windows() {
            self.lines[a].next = b;
            self.lines[b].prev = a;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let CacheLine { prev, next, .. } = self.lines[idx];
        self.lines[prev].next = next;
        self.lines[next].prev = prev;
    }

    fn link_front(&mut self, idx: usize) {
        let head = self.head();
        let first = self.lines[head].next;
        self.lines[idx].prev = head;
        self.lines[idx].next = first;
        self.lines[first].prev = idx;
        self.lines[head].next = idx;
    }

    /// Make a line the most-recently-used.
    fn promote(&mut self, idx: usize) {
        if self.lines[self.head()].next != idx {
            self.unlink(idx);
            self.link_front(idx);
        }
    }

    /// Return the cached target for `pc`, promoting the line on a hit.
    pub fn lookup(&mut self, pc: u32) -> Option<u32> {
        let idx = *self.index.get(&pc)?;
        self.promote(idx);
        Some(self.lines[idx].tgt)
    }

    /// Return the cached target for `pc` without touching the recency order.
    pub fn peek(&self, pc: u32) -> Option<u32> {
        self.index.get(&pc).map(|&idx| self.lines[idx].tgt)
    }

    /// Returns true when `pc` is resident. Does not touch the recency order.
    pub fn contains(&self, pc: u32) -> bool {
        self.index.contains_key(&pc)
    }

    /// Insert a target for `pc`.
    ///
    /// A resident `pc` is only promoted: its stored target is left as-is.
    /// Otherwise the least-recently-used line is overwritten and promoted,
    /// and the valid entry it held (if any) is returned.
    pub fn insert(&mut self, pc: u32, tgt: u32) -> Option<BtbEntry> {
        if let Some(&idx) = self.index.get(&pc) {
            self.promote(idx);
            return None;
        }

        let victim = self.lines[self.tail()].prev;
        let line = &mut self.lines[victim];
        let evicted = line.tag.map(|old| BtbEntry::new(old, line.tgt));
        line.tag = Some(pc);
        line.tgt = tgt;

        if let Some(e) = evicted {
            self.index.remove(&e.pc);
        }
        self.index.insert(pc, victim);
        self.promote(victim);
        evicted
    }

    /// Invalidate every line.
    pub fn clear(&mut self) {
        self.lines.fill(CacheLine::INVALID);
        self.index.clear();
        self.link_all();
    }

    /// Number of lines in the cache.
    pub fn capacity(&self) -> usize { self.capacity }

    /// Number of valid lines.
    pub fn len(&self) -> usize { self.index.len() }

    pub fn is_empty(&self) -> bool { self.index.is_empty() }

    pub fn is_full(&self) -> bool { self.len() == self.capacity }

    /// Iterate over resident entries from most- to least-recently-used.
    pub fn iter(&self) -> Iter<'_> {
        Iter { cache: self, cur: self.lines[self.head()].next }
    }

    /// The most-recently-used entry.
    pub fn mru(&self) -> Option<BtbEntry> {
        self.iter().next()
    }

    /// The least-recently-used valid entry.
    pub fn lru(&self) -> Option<BtbEntry> {
        let mut cur = self.lines[self.tail()].prev;
        while cur != self.head() {
            let line = &self.lines[cur];
            if let Some(tag) = line.tag {
                return Some(BtbEntry::new(tag, line.tgt));
            }
            cur = line.prev;
        }
        None
    }
}

/// Iterator over the valid lines of a [`TargetCache`] in recency order.
pub struct Iter<'a> {
    cache: &'a TargetCache,
    cur: usize,
}
impl Iterator for Iter<'_> {
    type Item = BtbEntry;
    fn next(&mut self) -> Option<BtbEntry> {
        if self.cur == self.cache.tail() {
            return None;
        }
        // Invalid lines only ever sit at the LRU end.
        let line = &self.cache.lines[self.cur];
        let tag = line.tag?;
        self.cur = line.next;
        Some(BtbEntry::new(tag, line.tgt))
    }
}
