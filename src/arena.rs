//! Chunked slot allocator used as the node store of the tree collections.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A copyable handle to an object stored in a `TypedArena<T>`.
///
/// Handles stay valid until the object they refer to is freed, no matter how many other objects
/// are allocated or freed in the meantime.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Entry {
    chunk: usize,
    offset: usize,
}

enum Slot<T> {
    Occupied(T),
    Vacant(Option<Entry>),
}

/// An allocator for a single type of object that hands out `Entry` handles instead of
/// references.
///
/// Objects live in fixed-size chunks, so allocating never moves an existing object. Freed slots
/// are threaded onto a free list and reused by later allocations. Every object is dropped when the
/// arena is dropped or cleared.
///
/// # Examples
///
/// ```
/// use ordered_collections::arena::TypedArena;
///
/// let mut arena = TypedArena::new(16);
///
/// let x = arena.allocate("a");
/// let y = arena.allocate("b");
/// assert_eq!(arena[x], "a");
/// assert_eq!(arena.len(), 2);
///
/// assert_eq!(arena.free(x), "a");
/// assert_eq!(arena.get(x), None);
/// assert_eq!(arena[y], "b");
/// ```
pub struct TypedArena<T> {
    free_head: Option<Entry>,
    chunks: Vec<Vec<Slot<T>>>,
    chunk_size: usize,
    len: usize,
    capacity: usize,
}

impl<T> TypedArena<T> {
    /// Constructs a new, empty `TypedArena<T>` that reserves `chunk_size` slots at a time.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::new(1024);
    /// assert!(arena.is_empty());
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "Error: chunk size must be positive.");
        TypedArena {
            free_head: None,
            chunks: Vec::new(),
            chunk_size,
            len: 0,
            capacity: 0,
        }
    }

    fn slot(&self, entry: Entry) -> Option<&Slot<T>> {
        self.chunks
            .get(entry.chunk)
            .and_then(|chunk| chunk.get(entry.offset))
    }

    fn slot_mut(&mut self, entry: Entry) -> Option<&mut Slot<T>> {
        self.chunks
            .get_mut(entry.chunk)
            .and_then(|chunk| chunk.get_mut(entry.offset))
    }

    /// Moves `value` into the arena and returns its handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(2);
    /// let x = arena.allocate(1);
    /// arena[x] += 1;
    /// assert_eq!(arena[x], 2);
    /// ```
    pub fn allocate(&mut self, value: T) -> Entry {
        self.len += 1;

        if let Some(entry) = self.free_head.take() {
            let slot = self
                .slot_mut(entry)
                .expect("Expected free list to point inside the arena.");
            match mem::replace(slot, Slot::Occupied(value)) {
                Slot::Vacant(next) => self.free_head = next,
                Slot::Occupied(_) => panic!("Error: free list points to an occupied slot."),
            }
            return entry;
        }

        if self.len > self.capacity {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            self.capacity += self.chunk_size;
        }
        let chunk = self.chunks.len() - 1;
        let last_chunk = &mut self.chunks[chunk];
        last_chunk.push(Slot::Occupied(value));
        Entry {
            chunk,
            offset: last_chunk.len() - 1,
        }
    }

    /// Removes the object referred to by `entry` from the arena and returns it. The slot is reused
    /// by a later allocation.
    ///
    /// # Panics
    ///
    /// Panics if `entry` does not refer to a live object.
    pub fn free(&mut self, entry: Entry) -> T {
        let next = self.free_head;
        let slot = self
            .slot_mut(entry)
            .expect("Error: attempting to free an invalid slot.");
        match mem::replace(slot, Slot::Vacant(next)) {
            Slot::Occupied(value) => {
                self.len -= 1;
                self.free_head = Some(entry);
                value
            },
            Slot::Vacant(_) => panic!("Error: attempting to free a vacant slot."),
        }
    }

    /// Returns a reference to the object referred to by `entry`, or `None` if the handle is stale.
    pub fn get(&self, entry: Entry) -> Option<&T> {
        match self.slot(entry) {
            Some(Slot::Occupied(ref value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the object referred to by `entry`, or `None` if the handle
    /// is stale.
    pub fn get_mut(&mut self, entry: Entry) -> Option<&mut T> {
        match self.slot_mut(entry) {
            Some(Slot::Occupied(ref mut value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the number of live objects in the arena.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every object and releases all chunks.
    pub fn clear(&mut self) {
        self.free_head = None;
        self.chunks.clear();
        self.len = 0;
        self.capacity = 0;
    }
}

impl<T> Index<Entry> for TypedArena<T> {
    type Output = T;

    fn index(&self, entry: Entry) -> &Self::Output {
        self.get(entry).expect("Error: entry does not refer to a live object.")
    }
}

impl<T> IndexMut<Entry> for TypedArena<T> {
    fn index_mut(&mut self, entry: Entry) -> &mut Self::Output {
        self.get_mut(entry)
            .expect("Error: entry does not refer to a live object.")
    }
}
