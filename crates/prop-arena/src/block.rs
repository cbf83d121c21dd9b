//! Fixed-width block allocator.
//!
//! [`BlockAllocator`] narrows a [`ScalarAllocator`] to units of
//! `block_size` contiguous elements. Its free set holds block bases only,
//! so a block is always either fully live or fully free. Lone elements can
//! be written in place but never allocated or released on their own.

use smallvec::SmallVec;

use crate::error::ArenaError;
use crate::scalar::ScalarAllocator;
use crate::store::BackingStore;

/// Block values staged before a write. Coordinate pairs stay inline.
pub type BlockValues = SmallVec<[f64; 4]>;

/// Allocator whose unit is a block of `block_size` elements.
pub struct BlockAllocator {
    inner: ScalarAllocator,
    block_size: usize,
}

impl BlockAllocator {
    /// Create a block allocator over `store`.
    ///
    /// Arenas check `block_size` with
    /// [`ArenaConfig::validate`](crate::ArenaConfig::validate) first.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    pub fn new(store: BackingStore, block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be non-zero");
        Self {
            inner: ScalarAllocator::new(store),
            block_size,
        }
    }

    /// Write one element inside an existing block.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::Unsupported`] when `location` is `None`: a block
    ///   region has no notion of a free lone element.
    /// - [`ArenaError::OutOfBounds`] for a location past the store.
    pub fn write_element(&mut self, value: f64, location: Option<usize>) -> Result<usize, ArenaError> {
        match location {
            Some(location) => self.inner.write(value, Some(location)),
            None => Err(ArenaError::Unsupported {
                operation: "write_element without a location",
            }),
        }
    }

    /// Write a whole block, allocating one when no location is given.
    ///
    /// `values` is truncated or zero-padded to exactly `block_size`
    /// entries. Without a location the most recently released block is
    /// reused, or the cursor advances by `block_size`. Returns the base
    /// offset of the block.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::OutOfBounds`] if an explicit block runs past the store.
    /// - [`ArenaError::CapacityExceeded`] if the store cannot grow.
    pub fn write_block(&mut self, values: &[f64], location: Option<usize>) -> Result<usize, ArenaError> {
        let mut block: BlockValues = values.iter().copied().take(self.block_size).collect();
        block.resize(self.block_size, 0.0);

        let base = match location {
            Some(location) => {
                self.inner.store().check_range(location, self.block_size)?;
                location
            }
            None => self.inner.reserve(self.block_size)?,
        };
        self.inner.store_mut().write_run(base, &block);
        Ok(base)
    }

    /// Read one element.
    pub fn query(&self, location: usize) -> Result<f64, ArenaError> {
        self.inner.query(location)
    }

    /// Read the whole block starting at `base`.
    pub fn read_block(&self, base: usize) -> Result<BlockValues, ArenaError> {
        let store = self.inner.store();
        store.check_range(base, self.block_size)?;
        Ok((base..base + self.block_size).map(|o| store.read(o)).collect())
    }

    /// Always fails: releasing part of a block would split it.
    pub fn release_element(&mut self, location: usize) -> Result<(), ArenaError> {
        log::debug!("refused single-element release at {location}");
        Err(ArenaError::Unsupported {
            operation: "release_element",
        })
    }

    /// Return the block at `base` to the free set. Values are left stale.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::Misaligned`] if `base` is not a multiple of `block_size`.
    /// - [`ArenaError::NotAllocated`] if the block was never issued.
    /// - [`ArenaError::DoubleRelease`] if the block is already free.
    pub fn release_block(&mut self, base: usize) -> Result<(), ArenaError> {
        if base % self.block_size != 0 {
            return Err(ArenaError::Misaligned {
                location: base,
                block_size: self.block_size,
            });
        }
        self.inner.push_free(base, self.block_size)
    }

    /// Whether the block at `base` is in the free set.
    pub fn is_free(&self, base: usize) -> bool {
        self.inner.is_free(base)
    }

    /// Elements per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Next never-issued block base.
    pub fn cursor(&self) -> usize {
        self.inner.cursor()
    }

    /// Number of released blocks awaiting reuse.
    pub fn free_len(&self) -> usize {
        self.inner.free_len()
    }

    /// Blocks currently issued and not released.
    pub fn live_blocks(&self) -> usize {
        self.cursor() / self.block_size - self.free_len()
    }

    /// The backing store.
    pub fn store(&self) -> &BackingStore {
        self.inner.store()
    }

    /// Mutable access to the backing store.
    pub fn store_mut(&mut self) -> &mut BackingStore {
        self.inner.store_mut()
    }
}
