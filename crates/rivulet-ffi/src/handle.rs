//! Generational handle table backing every opaque `u64` handle.
//!
//! A handle packs a slot index (high 32 bits) and the slot's generation
//! (low 32 bits). Removing a value bumps the generation, so a destroyed
//! handle resolves to `None` instead of to whatever reuses the slot.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Key {
    slot: u32,
    generation: u32,
}

impl Key {
    fn pack(self) -> u64 {
        (u64::from(self.slot) << 32) | u64::from(self.generation)
    }

    fn unpack(handle: u64) -> Self {
        Self {
            slot: (handle >> 32) as u32,
            generation: handle as u32,
        }
    }
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Owned values addressed by generational handles.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    /// Empty table, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Store `value` and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        let slot = match self.vacant.pop() {
            Some(slot) => slot,
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    value: None,
                });
                (self.entries.len() - 1) as u32
            }
        };
        let entry = &mut self.entries[slot as usize];
        entry.value = Some(value);
        Key {
            slot,
            generation: entry.generation,
        }
        .pack()
    }

    fn entry(&self, handle: u64) -> Option<&Entry<T>> {
        let key = Key::unpack(handle);
        self.entries
            .get(key.slot as usize)
            .filter(|e| e.generation == key.generation)
    }

    fn entry_mut(&mut self, handle: u64) -> Option<&mut Entry<T>> {
        let key = Key::unpack(handle);
        self.entries
            .get_mut(key.slot as usize)
            .filter(|e| e.generation == key.generation)
    }

    /// Value behind `handle`, or `None` if it is stale or was never issued.
    pub fn get(&self, handle: u64) -> Option<&T> {
        self.entry(handle)?.value.as_ref()
    }

    /// Mutable value behind `handle`.
    pub fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        self.entry_mut(handle)?.value.as_mut()
    }

    /// Take the value out and invalidate `handle`.
    ///
    /// Removing twice returns `None`. A slot whose generation wraps to 0
    /// is never reused, so handles from its first lifetime stay stale.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let slot = Key::unpack(handle).slot;
        let entry = self.entry_mut(handle)?;
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        if entry.generation != 0 {
            self.vacant.push(slot);
        }
        Some(value)
    }

    /// Number of live values.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_some()).count()
    }
}
