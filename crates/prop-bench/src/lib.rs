//! Benchmark profiles for the prop coordinate arena.
//!
//! - [`bench_arena`]: native-kernel arena sized for the benchmarks
//! - [`churn_offsets`]: deterministic release order for alloc/release churn

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use prop_arena::{Arena, ArenaConfig, ElementType};
use prop_kernels::NativeKernels;

/// Float32 arena starting at one page, allowed to grow to `max_pages`.
pub fn bench_arena(max_pages: u32) -> Arena {
    let config = ArenaConfig {
        max_pages,
        ..ArenaConfig::new(ElementType::F32)
    };
    match Arena::new(config, NativeKernels::boxed(ElementType::F32)) {
        Ok(arena) => arena,
        Err(e) => panic!("benchmark arena config rejected: {e}"),
    }
}

/// A permutation of `0..n` used to release handles out of order.
///
/// Walks with a stride coprime to `n` so consecutive releases are spread
/// across the store.
pub fn churn_offsets(n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let mut stride = n / 2 + 1;
    while gcd(stride, n) != 1 {
        stride += 1;
    }
    (0..n).map(|i| (i * stride) % n).collect()
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
