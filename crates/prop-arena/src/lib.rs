//! Paged slot arena for 2D coordinates shared with a computation module.
//!
//! Every coordinate pair lives in one flat, growable byte buffer that is
//! also the memory of a separately built numeric module. The module only
//! understands byte pointers, so handles carry a pointer next to their
//! element offset and arithmetic is routed to the module by pointer.
//!
//! # Architecture
//!
//! ```text
//! Arena (shared context, Rc<RefCell<..>>)
//! ├── BlockAllocator (unit = block_size elements, free set of block bases)
//! │   └── ScalarAllocator (LIFO free set + monotonic cursor)
//! │       └── BackingStore (Vec<u8>, grows one 64KB page at a time)
//! └── ModuleBinding (Box<dyn ComputeModule>, checked against the store)
//!
//! Coord ──write_block──▶ BlockAllocator ──▶ BackingStore ◀──ptr── module
//! ```
//!
//! # Lifetimes of blocks
//!
//! There is no reclamation. A block stays live until its handle is passed
//! to [`Coord::release`]; a dropped handle leaks its block. Released blocks
//! keep their values until reissued, most recently released first.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod block;
pub mod config;
pub mod coord;
pub mod element;
pub mod error;
pub mod module;
pub mod pair;
pub mod scalar;
pub mod store;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use block::BlockAllocator;
pub use config::{ArenaConfig, ConfigError};
pub use coord::Coord;
pub use element::ElementType;
pub use error::ArenaError;
pub use module::{Call, ComputeModule, Export, ModuleBinding};
pub use pair::Pair;
pub use scalar::ScalarAllocator;
pub use store::BackingStore;
