//! The arena context shared by every coordinate handle.
//!
//! An [`Arena`] bundles a block allocator with the computation module bound
//! to its store. It is built once, explicitly, and passed by reference to
//! whoever creates handles; cloning it is cheap and yields the same arena.
//! Independent arenas can coexist, which keeps tests isolated.
//!
//! Everything here is single-threaded: the arena is neither `Send` nor
//! `Sync`, and every operation completes before returning.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::block::BlockAllocator;
use crate::config::{ArenaConfig, ConfigError};
use crate::coord::Coord;
use crate::element::ElementType;
use crate::error::ArenaError;
use crate::module::{ComputeModule, ModuleBinding};
use crate::store::BackingStore;

pub(crate) struct ArenaInner {
    pub(crate) allocator: BlockAllocator,
    pub(crate) binding: ModuleBinding,
}

/// Shared handle to one arena.
#[derive(Clone)]
pub struct Arena {
    inner: Rc<RefCell<ArenaInner>>,
    config: Rc<ArenaConfig>,
}

impl Arena {
    /// Build an arena: validate `config`, create the store, bind `module`
    /// to it, then put a block allocator in charge of the store.
    ///
    /// The module is bound before the arena exists, so no handle can ever
    /// observe an unbound arena.
    pub fn new(config: ArenaConfig, module: Box<dyn ComputeModule>) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = BackingStore::from_config(&config)?;
        let binding = ModuleBinding::instantiate(module, &store)?;
        let allocator = BlockAllocator::new(store, config.block_size);
        log::debug!(
            "arena ready: {} x {} blocks, {} initial pages, module '{}'",
            config.element_type,
            config.block_size,
            config.initial_pages,
            binding.module_name()
        );
        Ok(Self {
            inner: Rc::new(RefCell::new(ArenaInner { allocator, binding })),
            config: Rc::new(config),
        })
    }

    /// Allocate a coordinate handle holding `(x, y)`.
    pub fn coord(&self, x: f64, y: f64) -> Result<Coord, ArenaError> {
        Coord::new(self, x, y)
    }

    /// Inspect the block allocator.
    pub fn with_allocator<R>(&self, f: impl FnOnce(&BlockAllocator) -> R) -> R {
        f(&self.inner.borrow().allocator)
    }

    /// Configuration the arena was built from.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Element representation of the backing store.
    pub fn element_type(&self) -> ElementType {
        self.config.element_type
    }

    /// Elements per block.
    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    /// Whether `self` and `other` refer to the same arena.
    pub fn same_arena(&self, other: &Arena) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn borrow(&self) -> Ref<'_, ArenaInner> {
        self.inner.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, ArenaInner> {
        self.inner.borrow_mut()
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Arena")
            .field("element_type", &self.config.element_type)
            .field("block_size", &self.config.block_size)
            .field("pages", &inner.allocator.store().pages())
            .field("live_blocks", &inner.allocator.live_blocks())
            .field("module", &inner.binding.module_name())
            .finish()
    }
}
