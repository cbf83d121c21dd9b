//! Single-element slot allocator over a [`BackingStore`].
//!
//! [`ScalarAllocator`] hands out element offsets from a LIFO free set of
//! released offsets, falling back to a monotonic cursor that extends the
//! store a page at a time. Released slots are not zeroed.

use indexmap::IndexSet;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::store::BackingStore;

/// Slot allocator for individual elements.
///
/// Owns the backing store exclusively. The free set and the cursor are the
/// only state; an offset is issued either by popping the free set or by
/// advancing the cursor, never both.
///
/// Reading a released offset before it is handed out again returns its
/// stale value. This is a documented hazard, not an error.
pub struct ScalarAllocator {
    store: BackingStore,
    /// Released offsets, most recent last. Insertion order gives LIFO reuse
    /// and set membership catches double releases.
    free: IndexSet<usize>,
    /// Next never-issued offset.
    cursor: usize,
}

impl ScalarAllocator {
    /// Create an allocator that owns `store`, starting at offset 0.
    pub fn new(store: BackingStore) -> Self {
        Self {
            store,
            free: IndexSet::new(),
            cursor: 0,
        }
    }

    /// Write `value`, allocating a slot when no location is given.
    ///
    /// With `Some(location)` the value is written in place and `location`
    /// returned. With `None` the most recently released offset is reused,
    /// or the cursor is advanced by one.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::OutOfBounds`] for an explicit location past the store.
    /// - [`ArenaError::CapacityExceeded`] if the store cannot grow; nothing
    ///   is written and no slot is consumed.
    pub fn write(&mut self, value: f64, location: Option<usize>) -> Result<usize, ArenaError> {
        let location = match location {
            Some(location) => {
                self.store.check_range(location, 1)?;
                location
            }
            None => self.reserve(1)?,
        };
        self.store.write(location, value);
        Ok(location)
    }

    /// Read the value at `location`.
    pub fn query(&self, location: usize) -> Result<f64, ArenaError> {
        self.store.get(location).ok_or(ArenaError::OutOfBounds {
            location,
            capacity: self.store.capacity(),
        })
    }

    /// Mark `location` reusable. The stored value is left untouched.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::NotAllocated`] if the cursor never reached `location`.
    /// - [`ArenaError::DoubleRelease`] if `location` is already free.
    pub fn release(&mut self, location: usize) -> Result<(), ArenaError> {
        self.push_free(location, 1)
    }

    /// Issue `width` contiguous elements: free set first, then the cursor.
    ///
    /// The store is grown until the run fits and the advanced cursor is
    /// strictly below capacity. Growth is checked against the page ceiling
    /// up front, so a refused growth leaves the allocator unchanged.
    pub(crate) fn reserve(&mut self, width: usize) -> Result<usize, ArenaError> {
        if let Some(location) = self.free.pop() {
            log::trace!("reusing released offset {location}");
            return Ok(location);
        }

        let base = self.cursor;
        let next = base + width;
        let per_page = ArenaConfig::PAGE_BYTES / self.store.element_type().width();
        let pages_needed = next / per_page + 1;
        if pages_needed > self.store.max_pages() as usize {
            log::warn!(
                "allocation of {width} elements at {base} needs {pages_needed} pages (max {})",
                self.store.max_pages()
            );
            return Err(ArenaError::CapacityExceeded {
                requested_pages: u32::try_from(pages_needed).unwrap_or(u32::MAX),
                max_pages: self.store.max_pages(),
            });
        }
        while next >= self.store.capacity() {
            self.store.grow()?;
        }

        self.cursor = next;
        log::trace!("issued fresh offset {base} (cursor now {next})");
        Ok(base)
    }

    /// Return a unit of `width` elements at `location` to the free set.
    pub(crate) fn push_free(&mut self, location: usize, width: usize) -> Result<(), ArenaError> {
        if location.saturating_add(width) > self.cursor {
            return Err(ArenaError::NotAllocated { location });
        }
        if !self.free.insert(location) {
            return Err(ArenaError::DoubleRelease { location });
        }
        log::trace!("released offset {location}");
        Ok(())
    }

    /// Whether `location` is currently in the free set.
    pub fn is_free(&self, location: usize) -> bool {
        self.free.contains(&location)
    }

    /// Next never-issued offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of released offsets awaiting reuse.
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// The backing store.
    pub fn store(&self) -> &BackingStore {
        &self.store
    }

    /// Mutable access to the backing store.
    pub fn store_mut(&mut self) -> &mut BackingStore {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use proptest::prelude::*;

    fn allocator(max_pages: u32) -> ScalarAllocator {
        ScalarAllocator::new(BackingStore::new(ElementType::F32, 1, max_pages).unwrap())
    }

    #[test]
    fn automatic_writes_advance_cursor() {
        let mut alloc = allocator(1);
        assert_eq!(alloc.write(1.0, None).unwrap(), 0);
        assert_eq!(alloc.write(2.0, None).unwrap(), 1);
        assert_eq!(alloc.cursor(), 2);
        assert_eq!(alloc.query(0).unwrap(), 1.0);
        assert_eq!(alloc.query(1).unwrap(), 2.0);
    }

    #[test]
    fn explicit_location_writes_in_place() {
        let mut alloc = allocator(1);
        assert_eq!(alloc.write(9.0, Some(100)).unwrap(), 100);
        assert_eq!(alloc.query(100).unwrap(), 9.0);
        assert_eq!(alloc.cursor(), 0);
    }

    #[test]
    fn explicit_location_past_store_is_error() {
        let mut alloc = allocator(1);
        assert!(matches!(
            alloc.write(1.0, Some(16_384)),
            Err(ArenaError::OutOfBounds { .. })
        ));
        assert!(alloc.query(16_384).is_err());
    }

    #[test]
    fn reuse_before_extend() {
        let mut alloc = allocator(1);
        let a = alloc.write(1.0, None).unwrap();
        let _b = alloc.write(2.0, None).unwrap();
        alloc.release(a).unwrap();
        assert_eq!(alloc.write(3.0, None).unwrap(), a);
        assert_eq!(alloc.cursor(), 2);
    }

    #[test]
    fn reuse_is_lifo() {
        let mut alloc = allocator(1);
        let o1 = alloc.write(1.0, None).unwrap();
        let o2 = alloc.write(2.0, None).unwrap();
        alloc.release(o1).unwrap();
        alloc.release(o2).unwrap();
        assert_eq!(alloc.write(0.0, None).unwrap(), o2);
        assert_eq!(alloc.write(0.0, None).unwrap(), o1);
    }

    #[test]
    fn release_keeps_stale_value() {
        let mut alloc = allocator(1);
        let a = alloc.write(5.0, None).unwrap();
        alloc.release(a).unwrap();
        assert_eq!(alloc.query(a).unwrap(), 5.0);
        assert!(alloc.is_free(a));
    }

    #[test]
    fn double_release_detected() {
        let mut alloc = allocator(1);
        let a = alloc.write(5.0, None).unwrap();
        alloc.release(a).unwrap();
        assert_eq!(alloc.release(a), Err(ArenaError::DoubleRelease { location: a }));
        assert_eq!(alloc.free_len(), 1);
    }

    #[test]
    fn release_of_unissued_offset_detected() {
        let mut alloc = allocator(1);
        assert_eq!(alloc.release(0), Err(ArenaError::NotAllocated { location: 0 }));
    }

    #[test]
    fn cursor_reaching_capacity_grows_store() {
        let mut alloc = allocator(2);
        for i in 0..16_383 {
            alloc.write(i as f64, None).unwrap();
        }
        assert_eq!(alloc.store().pages(), 1);
        let last = alloc.write(-1.0, None).unwrap();
        assert_eq!(last, 16_383);
        assert_eq!(alloc.store().pages(), 2);
        assert_eq!(alloc.query(0).unwrap(), 0.0);
        assert_eq!(alloc.query(16_382).unwrap(), 16_382.0);
        assert_eq!(alloc.query(last).unwrap(), -1.0);
    }

    #[test]
    fn refused_growth_consumes_nothing() {
        let mut alloc = allocator(1);
        for _ in 0..16_383 {
            alloc.write(1.0, None).unwrap();
        }
        let err = alloc.write(2.0, None).unwrap_err();
        assert!(matches!(err, ArenaError::CapacityExceeded { max_pages: 1, .. }));
        assert_eq!(alloc.cursor(), 16_383);
        assert_eq!(alloc.query(16_383).unwrap(), 0.0);

        // Freed slots stay usable at the ceiling.
        alloc.release(3).unwrap();
        assert_eq!(alloc.write(2.0, None).unwrap(), 3);
    }

    proptest! {
        #[test]
        fn write_query_round_trip(values in prop::collection::vec(-1.0e6f32..1.0e6, 1..64)) {
            let mut alloc = allocator(1);
            let offsets: Vec<usize> = values
                .iter()
                .map(|&v| alloc.write(f64::from(v), None).unwrap())
                .collect();
            for (&o, &v) in offsets.iter().zip(&values) {
                prop_assert_eq!(alloc.query(o).unwrap(), f64::from(v));
            }
        }

        #[test]
        fn released_offsets_come_back_in_reverse(count in 1usize..32) {
            let mut alloc = allocator(1);
            let offsets: Vec<usize> = (0..count)
                .map(|i| alloc.write(i as f64, None).unwrap())
                .collect();
            for &o in &offsets {
                alloc.release(o).unwrap();
            }
            for &o in offsets.iter().rev() {
                prop_assert_eq!(alloc.write(0.0, None).unwrap(), o);
            }
            prop_assert_eq!(alloc.cursor(), count);
        }
    }
}
