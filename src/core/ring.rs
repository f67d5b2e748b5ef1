//! Bounded address sets
//!
//! A [`BoundedAddressSet`] is a fixed-capacity ring of unique addresses.
//! Empty slots hold [`Address::EMPTY`] and the first empty slot ends the
//! logical contents of the set: every scan stops there, even if non-empty
//! slots follow in the backing storage.
//!
//! Insertion writes at a cursor that wraps to the start once it runs off
//! the end, silently overwriting whatever entry occupied that slot. This is
//! the eviction policy for every bounded peer list.

use crate::core::address::Address;
use rand::RngCore;

/// Largest non-empty length [`BoundedAddressSet::shuffle`] can permute
/// uniformly with a 16-bit random source.
pub const MAX_SHUFFLE_LEN: usize = 1 << 16;

// =============================================================================
// Random Source
// =============================================================================

/// Uniform random source bounded to 16 bits.
pub trait Rand16 {
    fn next_u16(&mut self) -> u16;
}

impl<R: RngCore + ?Sized> Rand16 for R {
    fn next_u16(&mut self) -> u16 {
        (self.next_u32() & 0xffff) as u16
    }
}

// =============================================================================
// Bounded Address Set
// =============================================================================

/// Fixed-capacity circular set of unique non-zero addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedAddressSet {
    slots: Vec<Address>,
    /// Next slot to write. May equal `capacity`, meaning the next write wraps.
    cursor: usize,
}

impl BoundedAddressSet {
    /// Create an empty set.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "bounded address set needs a non-zero capacity");
        Self {
            slots: vec![Address::EMPTY; capacity],
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot the next insertion writes to, always in `[0, capacity)`.
    pub fn next_slot(&self) -> usize {
        if self.cursor >= self.slots.len() {
            0
        } else {
            self.cursor
        }
    }

    /// True when the next insertion will wrap the cursor and overwrite
    /// the first slot.
    pub fn will_wrap(&self) -> bool {
        self.cursor >= self.slots.len()
    }

    /// Number of entries before the first empty slot
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .position(|a| a.is_empty())
            .unwrap_or(self.slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_empty()
    }

    /// Iterate the logical contents (up to the first empty slot)
    pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
        self.slots.iter().copied().take_while(|a| !a.is_empty())
    }

    /// Raw backing storage, including any slots after the first empty one
    pub fn as_slice(&self) -> &[Address] {
        &self.slots
    }

    /// Position of `value` in the logical contents.
    ///
    /// The scan stops at the first empty slot, so the sentinel itself is
    /// never found.
    pub fn find(&self, value: Address) -> Option<usize> {
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.is_empty() {
                break;
            }
            if *slot == value {
                return Some(i);
            }
        }
        None
    }

    pub fn contains(&self, value: Address) -> bool {
        self.find(value).is_some()
    }

    /// Insert `value` at the cursor unless it is the sentinel or already
    /// present. Returns true if the value was written.
    pub fn insert(&mut self, value: Address) -> bool {
        if value.is_empty() || self.contains(value) {
            return false;
        }
        self.write_at_cursor(value);
        true
    }

    /// Write `value` at the cursor without a duplicate check.
    ///
    /// Returns the non-empty entry that was overwritten, if the ring had
    /// wrapped onto an occupied slot. The sentinel is never written.
    pub fn push(&mut self, value: Address) -> Option<Address> {
        if value.is_empty() {
            return None;
        }
        let evicted = self.write_at_cursor(value);
        (!evicted.is_empty()).then_some(evicted)
    }

    fn write_at_cursor(&mut self, value: Address) -> Address {
        if self.cursor >= self.slots.len() {
            self.cursor = 0;
        }
        let old = std::mem::replace(&mut self.slots[self.cursor], value);
        self.cursor += 1;
        old
    }

    /// Remove `value`, shifting every later slot left by one and emptying
    /// the last slot. The cursor is pulled back by one if it pointed past
    /// the removed slot, so it keeps targeting the same logical slot.
    ///
    /// Returns false if `value` was not present.
    pub fn remove(&mut self, value: Address) -> bool {
        let Some(pos) = self.find(value) else {
            return false;
        };

        if self.cursor > pos {
            self.cursor -= 1;
        }
        self.slots.copy_within(pos + 1.., pos);
        let last = self.slots.len() - 1;
        self.slots[last] = Address::EMPTY;
        true
    }

    /// Empty every slot and reset the cursor.
    pub fn clear(&mut self) {
        self.slots.fill(Address::EMPTY);
        self.cursor = 0;
    }

    /// Shuffle the non-empty prefix in place (Durstenfeld's Fisher-Yates).
    ///
    /// The prefix length is found by scanning back from `len_hint - 1`
    /// over empty slots. Sets shorter than two entries are left alone.
    ///
    /// Every index `i` swaps with a draw from `[0, i]`, so an element may
    /// stay in place. This differs from a `% len` variant that always moves
    /// elements (a Sattolo cycle) and skips the final swap.
    ///
    /// The random source only yields 16 bits, so the permutation is only
    /// uniform for prefixes of at most [`MAX_SHUFFLE_LEN`] entries. Callers
    /// must not shuffle longer sets.
    pub fn shuffle<R: Rand16 + ?Sized>(&mut self, len_hint: usize, rng: &mut R) {
        let mut len = len_hint.min(self.slots.len());
        while len > 0 && self.slots[len - 1].is_empty() {
            len -= 1;
        }
        if len < 2 {
            return;
        }
        debug_assert!(len <= MAX_SHUFFLE_LEN, "shuffle length exceeds 16-bit range");

        for i in (1..len).rev() {
            let j = usize::from(rng.next_u16()) % (i + 1);
            self.slots.swap(i, j);
        }
    }
}
