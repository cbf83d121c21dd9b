//! Paged, byte-addressed backing store.
//!
//! A [`BackingStore`] is one contiguous little-endian byte buffer viewed as
//! an array of fixed-width elements. It grows one page at a time by
//! appending, so offset 0 never moves relative to the buffer and every
//! offset handed out before a growth still names the same element after it.
//! The raw bytes double as the computation module's memory.

use crate::config::ArenaConfig;
use crate::element::ElementType;
use crate::error::ArenaError;

/// Growable element buffer shared with the computation module.
///
/// Capacity is always a whole number of pages. Offsets are in element
/// units; [`pointer()`](BackingStore::pointer) converts them to the byte
/// addresses the module expects.
pub struct BackingStore {
    /// Raw memory. Length is always `pages * PAGE_BYTES`.
    bytes: Vec<u8>,
    element_type: ElementType,
    pages: u32,
    max_pages: u32,
}

impl BackingStore {
    /// Create a zero-filled store of `initial_pages` pages.
    ///
    /// Page limits are checked by [`ArenaConfig::validate`]; this
    /// constructor only refuses a store that starts above its ceiling.
    pub fn new(
        element_type: ElementType,
        initial_pages: u32,
        max_pages: u32,
    ) -> Result<Self, ArenaError> {
        if initial_pages > max_pages {
            return Err(ArenaError::CapacityExceeded {
                requested_pages: initial_pages,
                max_pages,
            });
        }
        Ok(Self {
            bytes: vec![0; initial_pages as usize * ArenaConfig::PAGE_BYTES],
            element_type,
            pages: initial_pages,
            max_pages,
        })
    }

    /// Create a store from a validated [`ArenaConfig`].
    pub fn from_config(config: &ArenaConfig) -> Result<Self, ArenaError> {
        Self::new(config.element_type, config.initial_pages, config.max_pages)
    }

    /// Append one zero-filled page.
    ///
    /// Returns `Err(ArenaError::CapacityExceeded)` if the store is already
    /// at its page ceiling; the store is left unchanged in that case.
    pub fn grow(&mut self) -> Result<(), ArenaError> {
        let requested = self.pages + 1;
        if requested > self.max_pages {
            log::warn!(
                "backing store refused growth to {requested} pages (max {})",
                self.max_pages
            );
            return Err(ArenaError::CapacityExceeded {
                requested_pages: requested,
                max_pages: self.max_pages,
            });
        }
        self.bytes
            .resize(self.bytes.len() + ArenaConfig::PAGE_BYTES, 0);
        self.pages = requested;
        log::debug!(
            "backing store grew to {} pages ({} elements of {})",
            self.pages,
            self.capacity(),
            self.element_type
        );
        Ok(())
    }

    /// Write `value` at `offset`, converted to the store's element type.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.capacity()`.
    pub fn write(&mut self, offset: usize, value: f64) {
        let width = self.element_type.width();
        let start = offset * width;
        self.element_type
            .encode(value, &mut self.bytes[start..start + width]);
    }

    /// Read the element at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.capacity()`.
    pub fn read(&self, offset: usize) -> f64 {
        let width = self.element_type.width();
        let start = offset * width;
        self.element_type.decode(&self.bytes[start..start + width])
    }

    /// Read the element at `offset`, or `None` past the end of the store.
    pub fn get(&self, offset: usize) -> Option<f64> {
        (offset < self.capacity()).then(|| self.read(offset))
    }

    /// Write consecutive elements starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the run extends past the end of the store.
    pub fn write_run(&mut self, offset: usize, values: &[f64]) {
        for (i, &value) in values.iter().enumerate() {
            self.write(offset + i, value);
        }
    }

    /// Return `Err(ArenaError::OutOfBounds)` unless `len` elements fit at `offset`.
    pub fn check_range(&self, offset: usize, len: usize) -> Result<(), ArenaError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.capacity() => Ok(()),
            _ => Err(ArenaError::OutOfBounds {
                location: offset,
                capacity: self.capacity(),
            }),
        }
    }

    /// Byte address of `offset` in the module's memory.
    ///
    /// Only meaningful for offsets below [`capacity`](Self::capacity).
    /// Page ceilings are capped at 4GB, so every in-range offset fits.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not below the capacity.
    pub fn pointer(&self, offset: usize) -> u32 {
        assert!(
            offset < self.capacity(),
            "pointer for offset {offset} past capacity {}",
            self.capacity()
        );
        (offset * self.element_type.width()) as u32
    }

    /// Capacity in elements.
    pub fn capacity(&self) -> usize {
        self.bytes.len() / self.element_type.width()
    }

    /// Current size in pages.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Page ceiling.
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Current size in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Element representation of this store.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Raw bytes, as the module sees them.
    pub fn memory(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable raw bytes for the module binding.
    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_zeroed_whole_pages() {
        let store = BackingStore::new(ElementType::F32, 2, 4).unwrap();
        assert_eq!(store.pages(), 2);
        assert_eq!(store.byte_len(), 2 * ArenaConfig::PAGE_BYTES);
        assert_eq!(store.capacity(), 2 * 16_384);
        assert_eq!(store.read(0), 0.0);
        assert_eq!(store.read(store.capacity() - 1), 0.0);
    }

    #[test]
    fn write_read_round_trip() {
        let mut store = BackingStore::new(ElementType::F64, 1, 1).unwrap();
        store.write(7, 1.25);
        assert_eq!(store.read(7), 1.25);
        assert_eq!(store.read(6), 0.0);
    }

    #[test]
    fn write_applies_element_conversion() {
        let mut store = BackingStore::new(ElementType::I8, 1, 1).unwrap();
        store.write(0, 300.7);
        assert_eq!(store.read(0), 44.0);
    }

    #[test]
    fn grow_appends_one_page_and_keeps_values() {
        let mut store = BackingStore::new(ElementType::F32, 1, 3).unwrap();
        let last = store.capacity() - 1;
        store.write(0, 1.0);
        store.write(last, 2.0);

        store.grow().unwrap();
        assert_eq!(store.pages(), 2);
        assert_eq!(store.capacity(), 2 * 16_384);
        assert_eq!(store.read(0), 1.0);
        assert_eq!(store.read(last), 2.0);
        assert_eq!(store.read(last + 1), 0.0);
    }

    #[test]
    fn grow_refused_at_ceiling() {
        let mut store = BackingStore::new(ElementType::F32, 1, 1).unwrap();
        let err = store.grow().unwrap_err();
        assert_eq!(
            err,
            ArenaError::CapacityExceeded {
                requested_pages: 2,
                max_pages: 1
            }
        );
        assert_eq!(store.pages(), 1);
    }

    #[test]
    fn initial_above_ceiling_rejected() {
        assert!(BackingStore::new(ElementType::F32, 3, 2).is_err());
    }

    #[test]
    fn get_is_none_past_capacity() {
        let store = BackingStore::new(ElementType::U16, 1, 1).unwrap();
        assert_eq!(store.get(32_767), Some(0.0));
        assert_eq!(store.get(32_768), None);
    }

    #[test]
    #[should_panic]
    fn read_past_capacity_panics() {
        let store = BackingStore::new(ElementType::F32, 1, 1).unwrap();
        store.read(16_384);
    }

    #[test]
    fn pointer_is_offset_times_width() {
        for ty in ElementType::ALL {
            let store = BackingStore::new(ty, 1, 1).unwrap();
            assert_eq!(store.pointer(10), (10 * ty.width()) as u32);
        }
    }

    #[test]
    #[should_panic(expected = "past capacity")]
    fn pointer_past_capacity_panics() {
        let store = BackingStore::new(ElementType::F32, 1, 1).unwrap();
        assert_eq!(store.pointer(16_383), 65_532);
        store.pointer(16_384);
    }

    #[test]
    fn check_range_covers_whole_run() {
        let store = BackingStore::new(ElementType::F32, 1, 1).unwrap();
        assert!(store.check_range(16_382, 2).is_ok());
        assert!(matches!(
            store.check_range(16_383, 2),
            Err(ArenaError::OutOfBounds {
                location: 16_383,
                capacity: 16_384
            })
        ));
        assert!(store.check_range(usize::MAX, 2).is_err());
    }

    #[test]
    fn memory_is_little_endian_elements() {
        let mut store = BackingStore::new(ElementType::F32, 1, 1).unwrap();
        store.write_run(1, &[1.0, -2.0]);
        let mem = store.memory();
        assert_eq!(&mem[4..8], &1.0f32.to_le_bytes());
        assert_eq!(&mem[8..12], &(-2.0f32).to_le_bytes());
    }
}
