//! Prop: arena-backed 2D coordinates with pointer-based vector arithmetic.
//!
//! This is the top-level facade crate that re-exports the public API of the
//! prop sub-crates and performs the one-shot initialisation sequence: bind a
//! computation module to a fresh backing store, then hand out the arena
//! that every coordinate handle is created from.
//!
//! # Quick start
//!
//! ```rust
//! use prop::prelude::*;
//!
//! let arena = prop::init(ArenaConfig::default()).unwrap();
//! let a = arena.coord(1.0, 2.0).unwrap();
//! let b = arena.coord(3.0, 4.0).unwrap();
//!
//! Coord::add(&a, &b).unwrap();
//! assert_eq!(a.to_array(), [4.0, 6.0]);
//! assert_eq!(b.to_array(), [3.0, 4.0]);
//!
//! // Blocks are not reclaimed automatically.
//! a.release().unwrap();
//! b.release().unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `prop-arena` | Backing store, allocators, `Coord`, `Pair`, module binding |
//! | [`kernels`] | `prop-kernels` | Native computation module |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Backing store, allocators, handles and module binding (`prop-arena`).
pub use prop_arena as arena;

/// Native computation module (`prop-kernels`).
pub use prop_kernels as kernels;

use prop_arena::{Arena, ArenaConfig, ComputeModule, ConfigError};
use prop_kernels::NativeKernels;

/// Build an arena backed by the native kernels for `config.element_type`.
///
/// # Errors
///
/// Returns the [`ConfigError`] from validating `config`.
pub fn init(config: ArenaConfig) -> Result<Arena, ConfigError> {
    let module = NativeKernels::boxed(config.element_type);
    init_with(config, module)
}

/// Build an arena backed by a caller-supplied computation module.
///
/// Binding completes before this returns, so no handle can be created
/// against an unbound store.
///
/// # Errors
///
/// Returns `Err` if `config` is invalid, or if `module` targets another
/// element type or lacks a required entry point.
pub fn init_with(
    config: ArenaConfig,
    module: Box<dyn ComputeModule>,
) -> Result<Arena, ConfigError> {
    let name = module.name().to_string();
    let arena = Arena::new(config, module)?;
    log::info!(
        "prop initialised: module '{name}', {} elements",
        arena.element_type()
    );
    Ok(arena)
}

/// Common imports for typical prop usage.
///
/// ```rust
/// use prop::prelude::*;
/// ```
pub mod prelude {
    pub use prop_arena::{
        Arena, ArenaConfig, ArenaError, ComputeModule, ConfigError, Coord, ElementType, Pair,
    };
    pub use prop_kernels::NativeKernels;
}
