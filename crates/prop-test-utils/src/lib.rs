//! Test utilities and mock modules for prop development.
//!
//! Provides arena fixtures, a [`RecordingModule`] that logs every call it
//! forwards, and one-line logger setup for tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::RefCell;
use std::rc::Rc;

use prop_arena::{Arena, ArenaConfig, ArenaError, Call, ComputeModule, ElementType, Export};
use prop_kernels::NativeKernels;

/// Install `env_logger` for tests. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Config with explicit page limits and the default block width.
pub fn config(element_type: ElementType, initial_pages: u32, max_pages: u32) -> ArenaConfig {
    ArenaConfig {
        element_type,
        initial_pages,
        max_pages,
        block_size: ArenaConfig::DEFAULT_BLOCK_SIZE,
    }
}

/// Arena over native kernels.
pub fn native_arena(element_type: ElementType, initial_pages: u32, max_pages: u32) -> Arena {
    init_logging();
    Arena::new(
        config(element_type, initial_pages, max_pages),
        NativeKernels::boxed(element_type),
    )
    .expect("fixture config is valid")
}

/// One-page float32 arena of coordinate pairs, allowed to grow to `max_pages`.
pub fn float32_arena(max_pages: u32) -> Arena {
    native_arena(ElementType::F32, 1, max_pages)
}

/// Shared log of the calls a [`RecordingModule`] has seen.
pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Wraps [`NativeKernels`] and records each call before forwarding it.
pub struct RecordingModule {
    inner: NativeKernels,
    exports: Vec<Export>,
    log: CallLog,
}

impl RecordingModule {
    /// Module with every required export. The returned log stays readable
    /// after the module is boxed into an arena.
    pub fn new(element_type: ElementType) -> (Self, CallLog) {
        Self::with_exports(element_type, Export::REQUIRED.to_vec())
    }

    /// Module advertising only `exports`.
    pub fn with_exports(element_type: ElementType, exports: Vec<Export>) -> (Self, CallLog) {
        let log = CallLog::default();
        let module = Self {
            inner: NativeKernels::new(element_type),
            exports,
            log: Rc::clone(&log),
        };
        (module, log)
    }
}

impl ComputeModule for RecordingModule {
    fn name(&self) -> &str {
        "recording"
    }

    fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    fn exports(&self) -> &[Export] {
        &self.exports
    }

    fn call(&self, memory: &mut [u8], call: Call) -> Result<Option<f64>, ArenaError> {
        self.log.borrow_mut().push(call);
        self.inner.call(memory, call)
    }
}

/// Allocate `count` coordinates `(i, -i)` and return their offsets.
///
/// The handles are leaked on purpose; tests use this to fill blocks.
pub fn fill(arena: &Arena, count: usize) -> Vec<usize> {
    (0..count)
        .map(|i| {
            let c = arena
                .coord(i as f64, -(i as f64))
                .expect("fill stays within fixture capacity");
            c.offset()
        })
        .collect()
}
