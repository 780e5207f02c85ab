use std::hash::Hash;
use std::marker::PhantomData;

/// Generational handle into a [`Pool`].
///
/// A handle stays valid until its slot is released; releasing bumps the slot
/// generation, so every outstanding copy of the handle fails closed afterwards.
#[derive(Debug)]
pub struct Handle<T> {
    pub slot: u16,
    pub generation: u16,
    phantom: PhantomData<T>,
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
        self.generation.hash(state);
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self {
            slot: Default::default(),
            generation: Default::default(),
            phantom: Default::default(),
        }
    }
}

pub struct Pool<T> {
    items: Vec<Option<T>>,
    empty: Vec<usize>,
    generation: Vec<u16>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new(256)
    }
}

impl<T> Pool<T> {
    pub fn new(initial_size: usize) -> Self {
        let mut p = Pool {
            items: Vec::with_capacity(initial_size),
            empty: Vec::with_capacity(initial_size),
            generation: vec![0; initial_size],
        };

        p.empty = (0..initial_size).collect();
        p.items.resize_with(initial_size, || None);
        p
    }

    pub fn insert(&mut self, item: T) -> Option<Handle<T>> {
        let slot = match self.empty.pop() {
            Some(slot) => slot,
            None => {
                let slot = self.items.len();
                if slot > u16::MAX as usize {
                    return None;
                }
                self.items.push(None);
                self.generation.push(0);
                slot
            }
        };

        self.items[slot] = Some(item);

        Some(Handle {
            slot: slot as u16,
            generation: self.generation[slot],
            phantom: PhantomData,
        })
    }

    /// Frees the slot and returns its contents. The generation bump makes every
    /// outstanding handle to this slot resolve to `None` from here on.
    pub fn release(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = handle.slot as usize;
        if self.generation.get(slot) != Some(&handle.generation) {
            return None;
        }

        let item = self.items[slot].take()?;
        self.generation[slot] = self.generation[slot].wrapping_add(1);
        self.empty.push(slot);
        Some(item)
    }

    pub fn get_ref(&self, handle: Handle<T>) -> Option<&T> {
        let slot = handle.slot as usize;
        if self.generation.get(slot) == Some(&handle.generation) {
            self.items[slot].as_ref()
        } else {
            None
        }
    }

    pub fn get_mut_ref(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = handle.slot as usize;
        if self.generation.get(slot) == Some(&handle.generation) {
            self.items[slot].as_mut()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_bumps_generation() {
        let mut pool = Pool::new(4);
        let h = pool.insert(7u32).unwrap();
        assert_eq!(pool.get_ref(h), Some(&7));

        assert_eq!(pool.release(h), Some(7));
        assert_eq!(pool.get_ref(h), None);
        assert_eq!(pool.release(h), None);

        // Slot reuse hands out a fresh generation; the stale handle stays dead.
        let h2 = pool.insert(9u32).unwrap();
        assert_eq!(h2.slot, h.slot);
        assert_ne!(h2.generation, h.generation);
        assert_eq!(pool.get_ref(h), None);
        assert_eq!(pool.get_ref(h2), Some(&9));
    }

    #[test]
    fn grows_past_initial_size() {
        let mut pool = Pool::new(1);
        let a = pool.insert(1u32).unwrap();
        let b = pool.insert(2u32).unwrap();
        assert_eq!(pool.get_ref(a), Some(&1));
        assert_eq!(pool.get_ref(b), Some(&2));
    }
}
