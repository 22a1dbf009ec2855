//! Handle-indexed storage for topology records.
//!
//! [`Arena`] is a dense slot vector with tombstone deletion and slot reuse.
//! Each slot carries a generation that is bumped when the slot is freed, so a
//! handle captured before a delete no longer matches the slot once it has been
//! reused and is rejected instead of silently reading unrelated data.
//!
//! [`AssociativeArena`] is a sparse map keyed by arbitrary keys, used for the
//! attribute layer (keyed by topology handles) and for builder point data.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::error::ArenaError;

/// A copyable, generation-tagged index into an [`Arena`].
pub trait ArenaHandle: Copy + Eq + Ord + Hash + Debug {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(self) -> u32;
    fn generation(self) -> u32;

    /// Placeholder handle that never refers to a live slot.
    fn dangling() -> Self {
        Self::from_parts(u32::MAX, 0)
    }

    fn is_dangling(self) -> bool {
        self.index() == u32::MAX
    }
}

/// Declare a typed, generation-tagged handle.
macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $crate::arena::ArenaHandle for $name {
            fn from_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            fn index(self) -> u32 {
                self.index
            }

            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({}v{})", stringify!($name), self.index, self.generation)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.index)
            }
        }
    };
}

pub(crate) use define_handle;

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Dense arena with tombstones and generation-checked handles.
#[derive(Debug, Clone)]
pub struct Arena<H: ArenaHandle, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    _handle: PhantomData<H>,
}

impl<H: ArenaHandle, T> Default for Arena<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ArenaHandle, T> Arena<H, T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _handle: PhantomData,
        }
    }

    /// Store a value, reusing a freed slot when one is available.
    pub fn create(&mut self, value: T) -> H {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return H::from_parts(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        assert!(index != u32::MAX, "arena exhausted");
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        H::from_parts(index, 0)
    }

    pub fn try_get(&self, handle: H) -> Result<&T, ArenaError> {
        let slot = self.slot(handle)?;
        slot.value.as_ref().ok_or(ArenaError::DeletedHandle {
            index: handle.index(),
            generation: handle.generation(),
        })
    }

    pub fn try_get_mut(&mut self, handle: H) -> Result<&mut T, ArenaError> {
        self.slot(handle)?;
        let slot = &mut self.slots[handle.index() as usize];
        slot.value.as_mut().ok_or(ArenaError::DeletedHandle {
            index: handle.index(),
            generation: handle.generation(),
        })
    }

    /// Panics if the handle is stale or was never allocated.
    #[track_caller]
    pub fn get(&self, handle: H) -> &T {
        match self.try_get(handle) {
            Ok(value) => value,
            Err(err) => panic!("{:?}: {}", handle, err),
        }
    }

    /// Panics if the handle is stale or was never allocated.
    #[track_caller]
    pub fn get_mut(&mut self, handle: H) -> &mut T {
        match self.try_get_mut(handle) {
            Ok(value) => value,
            Err(err) => panic!("{:?}: {}", handle, err),
        }
    }

    /// Tombstone the slot and hand back its value. O(1), storage never shrinks.
    #[track_caller]
    pub fn delete(&mut self, handle: H) -> T {
        if let Err(err) = self.try_get(handle) {
            panic!("{:?}: {}", handle, err);
        }
        let slot = &mut self.slots[handle.index() as usize];
        let Some(value) = slot.value.take() else {
            unreachable!("slot checked live above");
        };
        // A slot whose generation would wrap is retired instead of reused
        if let Some(generation) = slot.generation.checked_add(1) {
            slot.generation = generation;
            self.free.push(handle.index());
        }
        self.len -= 1;
        value
    }

    /// Whether the handle refers to a live value.
    pub fn has(&self, handle: H) -> bool {
        self.try_get(handle).is_ok()
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots, including tombstones
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live `(handle, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value
                .as_ref()
                .map(|value| (H::from_parts(i as u32, slot.generation), value))
        })
    }

    /// Live handles in slot order.
    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        self.iter().map(|(handle, _)| handle)
    }

    fn slot(&self, handle: H) -> Result<&Slot<T>, ArenaError> {
        let slot = self
            .slots
            .get(handle.index() as usize)
            .ok_or(ArenaError::OutOfRange {
                index: handle.index(),
                len: self.slots.len(),
            })?;
        if slot.generation != handle.generation() {
            return Err(ArenaError::DeletedHandle {
                index: handle.index(),
                generation: handle.generation(),
            });
        }
        Ok(slot)
    }
}

/// Sparse, key-addressed storage.
#[derive(Debug, Clone)]
pub struct AssociativeArena<K, V> {
    values: HashMap<K, V>,
    next_key: u32,
}

impl<K: Eq + Hash, V> Default for AssociativeArena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> AssociativeArena<K, V> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            next_key: 0,
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.values.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.values.get_mut(key)
    }

    /// Value for `key`, inserting `default` first if there is none.
    pub fn get_or_create(&mut self, key: K, default: V) -> &mut V {
        self.values.entry(key).or_insert(default)
    }

    pub fn delete(&mut self, key: &K) -> Option<V> {
        self.values.remove(key)
    }

    pub fn has(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.values.iter()
    }

    /// Drop every entry whose key fails the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.values.retain(|key, _| keep(key));
    }
}

impl<K: Eq + Hash, V: Default> AssociativeArena<K, V> {
    /// Value for `key`, default-initialized on first access.
    pub fn get_or_default(&mut self, key: K) -> &mut V {
        self.values.entry(key).or_default()
    }
}

impl<V> AssociativeArena<u32, V> {
    /// Store a value under the next unused sequential key.
    pub fn create(&mut self, value: V) -> u32 {
        while self.values.contains_key(&self.next_key) {
            self.next_key += 1;
        }
        let key = self.next_key;
        self.values.insert(key, value);
        self.next_key += 1;
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    define_handle!(TestId);

    #[test]
    fn test_create_and_get() {
        let mut arena: Arena<TestId, &str> = Arena::new();
        let a = arena.create("a");
        let b = arena.create("b");

        assert_eq!(*arena.get(a), "a");
        assert_eq!(*arena.get(b), "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_delete_tombstones_and_skips_iteration() {
        let mut arena: Arena<TestId, u32> = Arena::new();
        let a = arena.create(1);
        let b = arena.create(2);
        let c = arena.create(3);

        assert_eq!(arena.delete(b), 2);
        assert!(!arena.has(b));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.capacity(), 3);

        let live: Vec<_> = arena.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(live, vec![(a, 1), (c, 3)]);
    }

    #[test]
    fn test_reused_slot_rejects_stale_handle() {
        let mut arena: Arena<TestId, u32> = Arena::new();
        let a = arena.create(1);
        arena.delete(a);
        let b = arena.create(2);

        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(matches!(
            arena.try_get(a),
            Err(ArenaError::DeletedHandle { .. })
        ));
        assert_eq!(*arena.get(b), 2);
    }

    #[test]
    fn test_out_of_range_handle() {
        let arena: Arena<TestId, u32> = Arena::new();
        assert!(matches!(
            arena.try_get(TestId::from_parts(7, 0)),
            Err(ArenaError::OutOfRange { index: 7, len: 0 })
        ));
        assert!(!arena.has(TestId::dangling()));
    }

    #[test]
    fn test_exhausted_slot_is_retired() {
        let mut arena: Arena<TestId, u32> = Arena::new();
        arena.create(1);
        arena.slots[0].generation = u32::MAX;
        let last = TestId::from_parts(0, u32::MAX);

        assert_eq!(arena.delete(last), 1);
        let fresh = arena.create(2);

        assert_eq!(fresh.index(), 1);
        assert_eq!(arena.capacity(), 2);
        assert!(matches!(
            arena.try_get(last),
            Err(ArenaError::DeletedHandle { .. })
        ));
        assert!(!arena.has(TestId::from_parts(0, 0)));
    }

    #[test]
    #[should_panic(expected = "deleted")]
    fn test_get_deleted_panics() {
        let mut arena: Arena<TestId, u32> = Arena::new();
        let a = arena.create(1);
        arena.delete(a);
        arena.get(a);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_dangling_panics() {
        let arena: Arena<TestId, u32> = Arena::new();
        arena.get(TestId::dangling());
    }

    #[test]
    fn test_associative_get_or_create() {
        let mut arena: AssociativeArena<u32, f32> = AssociativeArena::new();
        *arena.get_or_create(40, 1.0) += 1.0;
        assert_eq!(arena.get(&40), Some(&2.0));
        assert_eq!(*arena.get_or_create(40, 10.0), 2.0);
        assert_eq!(*arena.get_or_default(3), 0.0);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_associative_create_skips_used_keys() {
        let mut arena: AssociativeArena<u32, &str> = AssociativeArena::new();
        arena.insert(1, "sparse");
        assert_eq!(arena.create("first"), 0);
        assert_eq!(arena.create("second"), 2);
        assert!(arena.has(&1));
        assert_eq!(arena.delete(&1), Some("sparse"));
        assert!(!arena.has(&1));
    }
}
