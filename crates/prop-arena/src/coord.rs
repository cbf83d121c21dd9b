//! Coordinate handles backed by arena blocks.
//!
//! A [`Coord`] names one block of its arena by base offset and keeps the
//! matching byte pointer for the computation module. It holds no copy of
//! its values: every read and write goes to the backing store, so the
//! handle and the module's in-place arithmetic can never disagree.
//!
//! Handles are released explicitly with [`Coord::release`]. Dropping a
//! handle without releasing it leaks its block for the arena's lifetime.

use std::fmt;

use crate::arena::Arena;
use crate::error::ArenaError;
use crate::module::Call;
use crate::pair::Pair;

/// A 2D coordinate stored in an [`Arena`].
///
/// Accessors take `&self`: the handle does not own its storage, it owns
/// the right to read and write it.
#[must_use = "dropping a Coord without calling release() leaks its block"]
pub struct Coord {
    arena: Arena,
    /// Base offset of the block, in elements.
    offset: usize,
    /// Byte address of the block in module memory.
    ptr: u32,
}

impl Coord {
    /// Allocate a block in `arena` holding `(x, y)`.
    pub fn new(arena: &Arena, x: f64, y: f64) -> Result<Self, ArenaError> {
        let mut inner = arena.borrow_mut();
        let offset = inner.allocator.write_block(&[x, y], None)?;
        let ptr = inner.allocator.store().pointer(offset);
        drop(inner);
        Ok(Self {
            arena: arena.clone(),
            offset,
            ptr,
        })
    }

    /// Current x value.
    pub fn x(&self) -> f64 {
        self.arena.borrow().allocator.store().read(self.offset)
    }

    /// Current y value.
    pub fn y(&self) -> f64 {
        self.arena.borrow().allocator.store().read(self.offset + 1)
    }

    /// Overwrite x.
    pub fn set_x(&self, x: f64) {
        self.arena.borrow_mut().allocator.store_mut().write(self.offset, x);
    }

    /// Overwrite y.
    pub fn set_y(&self, y: f64) {
        self.arena
            .borrow_mut()
            .allocator
            .store_mut()
            .write(self.offset + 1, y);
    }

    /// Overwrite both values.
    pub fn set(&self, x: f64, y: f64) {
        self.arena
            .borrow_mut()
            .allocator
            .store_mut()
            .write_run(self.offset, &[x, y]);
    }

    /// Overwrite both values from an `[x, y]` array.
    pub fn set_array(&self, [x, y]: [f64; 2]) {
        self.set(x, y);
    }

    /// Allocate a new handle with the same values. Never aliases `self`.
    pub fn copy(&self) -> Result<Coord, ArenaError> {
        Coord::new(&self.arena, self.x(), self.y())
    }

    /// `[x, y]`.
    pub fn to_array(&self) -> [f64; 2] {
        [self.x(), self.y()]
    }

    /// Detached value copy.
    pub fn to_pair(&self) -> Pair {
        Pair::new(self.x(), self.y())
    }

    /// Base offset of the block, in elements.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte address of the block in module memory (`offset * element width`).
    pub fn pointer(&self) -> u32 {
        self.ptr
    }

    /// The arena this handle lives in.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Return the block to the arena's free set.
    ///
    /// The stored values are not cleared; the block may be handed to the
    /// next allocation.
    pub fn release(self) -> Result<(), ArenaError> {
        self.arena.borrow_mut().allocator.release_block(self.offset)
    }

    // ── Module arithmetic ──────────────────────────────────────────

    /// `a += b`. Returns `a` for chaining.
    pub fn add<'a>(a: &'a Coord, b: &Coord) -> Result<&'a Coord, ArenaError> {
        a.invoke_with(b, Call::Add { dst: a.ptr, src: b.ptr })
    }

    /// `a -= b`. Returns `a` for chaining.
    pub fn subtract<'a>(a: &'a Coord, b: &Coord) -> Result<&'a Coord, ArenaError> {
        a.invoke_with(b, Call::Subtract { dst: a.ptr, src: b.ptr })
    }

    /// Element-wise `a *= b`. Returns `a` for chaining.
    pub fn multiply<'a>(a: &'a Coord, b: &Coord) -> Result<&'a Coord, ArenaError> {
        a.invoke_with(b, Call::Multiply { dst: a.ptr, src: b.ptr })
    }

    /// Element-wise `a /= b`. Returns `a` for chaining.
    pub fn divide<'a>(a: &'a Coord, b: &Coord) -> Result<&'a Coord, ArenaError> {
        a.invoke_with(b, Call::Divide { dst: a.ptr, src: b.ptr })
    }

    /// `c *= factor`. Returns `c` for chaining.
    pub fn scale(c: &Coord, factor: f64) -> Result<&Coord, ArenaError> {
        c.invoke(Call::Factor { dst: c.ptr, factor })?;
        Ok(c)
    }

    /// `c /= divisor`. Returns `c` for chaining.
    pub fn divide_scalar(c: &Coord, divisor: f64) -> Result<&Coord, ArenaError> {
        c.invoke(Call::Divisor { dst: c.ptr, divisor })?;
        Ok(c)
    }

    /// Euclidean distance between `a` and `b`. Mutates nothing.
    pub fn distance(a: &Coord, b: &Coord) -> Result<f64, ArenaError> {
        if !a.arena.same_arena(&b.arena) {
            return Err(ArenaError::ForeignHandle);
        }
        let out = a.invoke(Call::Dist { a: a.ptr, b: b.ptr })?;
        out.ok_or(ArenaError::Unsupported {
            operation: "dist returned no value",
        })
    }

    fn invoke_with<'a>(&'a self, other: &Coord, call: Call) -> Result<&'a Coord, ArenaError> {
        if !self.arena.same_arena(&other.arena) {
            return Err(ArenaError::ForeignHandle);
        }
        self.invoke(call)?;
        Ok(self)
    }

    fn invoke(&self, call: Call) -> Result<Option<f64>, ArenaError> {
        let mut guard = self.arena.borrow_mut();
        let inner = &mut *guard;
        inner.binding.call(inner.allocator.store_mut(), call)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coord")
            .field("x", &self.x())
            .field("y", &self.y())
            .field("offset", &self.offset)
            .field("ptr", &self.ptr)
            .finish()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}
