// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User handle table: maps opaque handles to hook records.

use crate::hooks::RecordKey;
use crate::ids::UserHandle;

const FIRST_USER_HANDLE: u32 = 0x0020;
const LAST_USER_HANDLE: u32 = 0xffef;

/// Largest number of simultaneously allocated user handles
pub const MAX_USER_HANDLES: usize = (((LAST_USER_HANDLE - FIRST_USER_HANDLE) >> 1) + 1) as usize;

/// Allocation and lookup of the handles that name hooks to clients
pub trait HandleTable {
    /// Allocate a handle for a record, or `None` if the table is full
    fn alloc(&mut self, key: RecordKey) -> Option<UserHandle>;

    /// Resolve a handle to its record
    fn get(&self, handle: UserHandle) -> Option<RecordKey>;

    /// Release a handle; a stale or unknown handle is ignored
    fn free(&mut self, handle: UserHandle) -> Option<RecordKey>;

    /// Number of handles currently allocated
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug)]
struct Entry {
    key: Option<RecordKey>,
    generation: u16,
}

/// Slot-array handle table with per-slot generations.
///
/// A handle encodes its slot in the low word and the slot's generation in
/// the high word, so a handle to a freed slot stays invalid after the slot
/// is reused.
#[derive(Clone, Debug)]
pub struct UserHandleTable {
    entries: Vec<Entry>,
    free_slots: Vec<usize>,
    capacity: usize,
    allocated: usize,
}

impl UserHandleTable {
    /// Create a table holding at most `capacity` handles
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            free_slots: Vec::new(),
            capacity: capacity.min(MAX_USER_HANDLES),
            allocated: 0,
        }
    }

    fn encode(index: usize, generation: u16) -> UserHandle {
        let low = ((index as u32) << 1) + FIRST_USER_HANDLE;
        UserHandle(low | (u32::from(generation) << 16))
    }

    fn slot(&self, handle: UserHandle) -> Option<usize> {
        let low = handle.0 & 0xffff;
        if !(FIRST_USER_HANDLE..=LAST_USER_HANDLE).contains(&low) {
            return None;
        }
        let offset = low - FIRST_USER_HANDLE;
        if offset & 1 != 0 {
            return None;
        }
        let index = (offset >> 1) as usize;
        let entry = self.entries.get(index)?;
        if entry.key.is_some() && u32::from(entry.generation) == handle.0 >> 16 {
            Some(index)
        } else {
            None
        }
    }

    fn next_generation(generation: u16) -> u16 {
        match generation.wrapping_add(1) {
            0 | 0xffff => 1,
            next => next,
        }
    }
}

impl Default for UserHandleTable {
    fn default() -> Self {
        Self::new(MAX_USER_HANDLES)
    }
}

impl HandleTable for UserHandleTable {
    fn alloc(&mut self, key: RecordKey) -> Option<UserHandle> {
        let index = match self.free_slots.pop() {
            Some(index) => index,
            None if self.entries.len() < self.capacity => {
                self.entries.push(Entry {
                    key: None,
                    generation: 1,
                });
                self.entries.len() - 1
            }
            None => return None,
        };
        let entry = &mut self.entries[index];
        entry.key = Some(key);
        self.allocated += 1;
        Some(Self::encode(index, entry.generation))
    }

    fn get(&self, handle: UserHandle) -> Option<RecordKey> {
        let index = self.slot(handle)?;
        self.entries[index].key
    }

    fn free(&mut self, handle: UserHandle) -> Option<RecordKey> {
        let index = self.slot(handle)?;
        let entry = &mut self.entries[index];
        let key = entry.key.take();
        entry.generation = Self::next_generation(entry.generation);
        self.free_slots.push(index);
        self.allocated -= 1;
        key
    }

    fn len(&self) -> usize {
        self.allocated
    }
}

#[cfg(test)]
#[path = "handles_tests.rs"]
mod tests;
