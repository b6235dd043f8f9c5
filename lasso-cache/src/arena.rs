use lasso_error::{LassoResult, lasso_err};

/// A non-owning reference to a value stored in an [`Arena`].
///
/// Handles are `Copy` and carry the generation of the slot they were issued for, so a handle
/// to a value that has since been removed resolves to `None` rather than to whatever value
/// reused the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: usize,
    generation: u64,
}

impl Handle {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    value: Option<T>,
}

/// A slot allocator that owns its values and hands out generational [`Handle`]s.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Move `value` into the arena.
    pub fn insert(&mut self, value: T) -> Handle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.value = Some(value);
            return Handle {
                index,
                generation: slot.generation,
            };
        }

        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Like [`Arena::get`], but reports a stale or foreign handle as an error.
    pub fn try_get(&self, handle: Handle) -> LassoResult<&T> {
        self.get(handle)
            .ok_or_else(|| lasso_err!(OutOfBounds: handle.index, 0, self.slots.len()))
    }

    /// Take the value out of the arena, invalidating every copy of `handle`.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation += 1;
        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// The number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use lasso_error::LassoError;

    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut arena = Arena::new();
        let a = arena.insert("a".to_string());
        let b = arena.insert("b".to_string());
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a).map(String::as_str), Some("a"));

        arena.get_mut(b).unwrap().push('!');
        assert_eq!(arena.remove(b).as_deref(), Some("b!"));
        assert_eq!(arena.remove(b), None);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn stale_handles_do_not_alias_reused_slots() {
        let mut arena = Arena::new();
        let first = arena.insert(1);
        arena.remove(first);

        let second = arena.insert(2);
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());

        assert_eq!(arena.get(first), None);
        assert!(matches!(
            arena.try_get(first).unwrap_err(),
            LassoError::OutOfBounds(..)
        ));
        assert_eq!(arena.remove(first), None);
        assert_eq!(arena.get(second), Some(&2));
    }
}
