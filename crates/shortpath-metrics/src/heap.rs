use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// A key and the number of times it was counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCount {
    pub key: String,
    pub count: u64,
}

/// Max-heap of occurrence counts with O(log n) increment-or-insert.
///
/// Entries live in an array-backed binary heap ordered by count. A key to
/// slot index is kept alongside so an existing key is found without a scan.
/// Counts only grow, so restoring order after an increment is a sift-up.
///
/// Keys are never evicted: memory grows with the number of distinct keys.
#[derive(Debug, Default)]
pub struct CountHeap {
    entries: Vec<KeyCount>,
    slots: HashMap<String, usize>,
}

impl CountHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Increments the count of `key`, inserting it with a count of one if it
    /// is new. Returns the updated count.
    pub fn increment_or_insert(&mut self, key: &str) -> u64 {
        let slot = match self.slots.get(key) {
            Some(&slot) => {
                self.entries[slot].count += 1;
                slot
            }
            None => {
                let slot = self.entries.len();
                self.entries.push(KeyCount {
                    key: key.to_owned(),
                    count: 1,
                });
                self.slots.insert(key.to_owned(), slot);
                slot
            }
        };

        let slot = self.sift_up(slot);
        self.entries[slot].count
    }

    /// Returns up to `n` entries in descending count order.
    ///
    /// Walks the heap best-first from the root without mutating it, touching
    /// O(n) slots. Among equal counts the order follows the walk (shallower,
    /// then lower slot first) and is not otherwise guaranteed.
    pub fn top_n(&self, n: usize) -> Vec<KeyCount> {
        let mut top = Vec::with_capacity(n.min(self.entries.len()));
        if self.entries.is_empty() {
            return top;
        }

        let mut frontier = BinaryHeap::new();
        frontier.push((self.entries[0].count, Reverse(0usize)));

        while top.len() < n {
            let Some((_, Reverse(slot))) = frontier.pop() else {
                break;
            };
            top.push(self.entries[slot].clone());

            for child in [2 * slot + 1, 2 * slot + 2] {
                if let Some(entry) = self.entries.get(child) {
                    frontier.push((entry.count, Reverse(child)));
                }
            }
        }

        top
    }

    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.entries[parent].count >= self.entries[slot].count {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        for slot in [a, b] {
            if let Some(index) = self.slots.get_mut(&self.entries[slot].key) {
                *index = slot;
            }
        }
    }
}
