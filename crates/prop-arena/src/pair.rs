//! Plain coordinate pairs.
//!
//! [`Pair`] is the detached counterpart of [`Coord`]: an ordinary value with
//! the same arithmetic, computed directly instead of through the module.
//! Use it for short-lived intermediate values that should not occupy arena
//! blocks.

use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

use crate::arena::Arena;
use crate::coord::Coord;
use crate::error::ArenaError;

/// An `(x, y)` value, not stored in any arena.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pair {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Pair {
    /// Create a pair.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Overwrite both components.
    pub fn set(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// `[x, y]`.
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Allocate an arena-backed copy.
    pub fn to_coord(self, arena: &Arena) -> Result<Coord, ArenaError> {
        Coord::new(arena, self.x, self.y)
    }

    /// Element-wise product.
    pub fn multiply(self, other: Pair) -> Pair {
        Pair::new(self.x * other.x, self.y * other.y)
    }

    /// Element-wise quotient.
    pub fn divide(self, other: Pair) -> Pair {
        Pair::new(self.x / other.x, self.y / other.y)
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Pair) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<[f64; 2]> for Pair {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Pair> for [f64; 2] {
    fn from(p: Pair) -> Self {
        p.to_array()
    }
}

impl Add for Pair {
    type Output = Pair;

    fn add(self, rhs: Pair) -> Pair {
        Pair::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Pair {
    type Output = Pair;

    fn sub(self, rhs: Pair) -> Pair {
        Pair::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Pair {
    type Output = Pair;

    fn mul(self, factor: f64) -> Pair {
        Pair::new(self.x * factor, self.y * factor)
    }
}

impl Div<f64> for Pair {
    type Output = Pair;

    fn div(self, divisor: f64) -> Pair {
        Pair::new(self.x / divisor, self.y / divisor)
    }
}

/// `pair[0]` is x, `pair[1]` is y.
impl Index<usize> for Pair {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Pair index {i} out of range (0 or 1)"),
        }
    }
}

impl IndexMut<usize> for Pair {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("Pair index {i} out of range (0 or 1)"),
        }
    }
}
