//! Native vector kernels for the prop coordinate arena.
//!
//! The arena never computes on coordinates itself: it hands byte pointers
//! to a computation module that reads and writes the shared memory in
//! place. This crate provides that module as ordinary Rust code, built
//! for any [`ElementType`](prop_arena::ElementType) the arena supports.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod native;

pub use native::NativeKernels;
