//! Fixed-capacity slot array.
//!
//! A declared-length array whose slots start empty. It never grows; tables
//! replace the whole array when they move to a larger capacity.

/// Slot array of a fixed length. Each slot is either empty or holds one `T`.
pub struct FixedArray<T> {
    slots: Box<[Option<T>]>,
}

impl<T> FixedArray<T> {
    pub fn new(len: usize) -> Self {
        let slots = std::iter::repeat_with(|| None).take(len).collect();
        Self { slots }
    }

    /// Declared length (number of slots, occupied or not).
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots[index].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots[index].as_mut()
    }

    #[inline]
    pub fn is_occupied(&self, index: usize) -> bool {
        self.slots[index].is_some()
    }

    /// Store `value` at `index`, returning whatever was there.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) -> Option<T> {
        self.slots[index].replace(value)
    }

    /// Empty the slot at `index`, returning its contents.
    #[inline]
    pub fn take(&mut self, index: usize) -> Option<T> {
        self.slots[index].take()
    }

    /// Occupied slots with their positions, in index order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }

    /// Consume the array, yielding the occupied slots in index order.
    pub fn into_occupied(self) -> impl Iterator<Item = T> {
        self.slots.into_vec().into_iter().flatten()
    }
}

impl<T: Clone> Clone for FixedArray<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}
