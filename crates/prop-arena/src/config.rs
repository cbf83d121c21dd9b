//! Arena configuration parameters and construction errors.

use std::error::Error;
use std::fmt;

use crate::element::ElementType;
use crate::error::ArenaError;
use crate::module::Export;

/// Configuration for an [`Arena`](crate::Arena).
///
/// Controls the element representation, page limits and block width.
/// Checked by [`validate()`](ArenaConfig::validate) at construction; all
/// values are immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Numeric representation of every element in the backing store.
    ///
    /// Default: [`ElementType::F32`].
    pub element_type: ElementType,

    /// Pages allocated when the store is created.
    ///
    /// Default: 1. Must be at least 1.
    pub initial_pages: u32,

    /// Ceiling the store may grow to, in pages.
    ///
    /// Default: 256 (16MB). At most [`ArenaConfig::MAX_PAGES_LIMIT`], so that
    /// every byte pointer fits the module's 32-bit address space.
    pub max_pages: u32,

    /// Elements per block. Coordinate pairs use 2.
    ///
    /// At least [`ArenaConfig::MIN_BLOCK_SIZE`]: a handle reads and writes
    /// two elements from its base.
    pub block_size: usize,
}

impl ArenaConfig {
    /// Size of one page in bytes.
    pub const PAGE_BYTES: usize = 65_536;

    /// Largest permitted page count (4GB of 32-bit address space).
    pub const MAX_PAGES_LIMIT: u32 = 65_536;

    /// Smallest block that holds one `(x, y)` pair.
    pub const MIN_BLOCK_SIZE: usize = 2;

    /// Default initial page count.
    pub const DEFAULT_INITIAL_PAGES: u32 = 1;

    /// Default page ceiling.
    pub const DEFAULT_MAX_PAGES: u32 = 256;

    /// Default block width: one `(x, y)` pair.
    pub const DEFAULT_BLOCK_SIZE: usize = 2;

    /// Create a config for the given element type with default limits.
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            initial_pages: Self::DEFAULT_INITIAL_PAGES,
            max_pages: Self::DEFAULT_MAX_PAGES,
            block_size: Self::DEFAULT_BLOCK_SIZE,
        }
    }

    /// Create a config from a typed-array or short element type name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownElementType`] for unrecognised names.
    pub fn from_type_name(name: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(name.parse()?))
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `initial_pages` is zero or above `max_pages`
    /// - `max_pages` exceeds [`ArenaConfig::MAX_PAGES_LIMIT`]
    /// - `block_size` is below [`ArenaConfig::MIN_BLOCK_SIZE`] or a block
    ///   does not fit in one page
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_pages == 0
            || self.initial_pages > self.max_pages
            || self.max_pages > Self::MAX_PAGES_LIMIT
        {
            return Err(ConfigError::InvalidPages {
                initial: self.initial_pages,
                max: self.max_pages,
            });
        }
        let block_bytes = self.block_size.checked_mul(self.element_type.width());
        if self.block_size < Self::MIN_BLOCK_SIZE
            || block_bytes.is_none_or(|b| b > Self::PAGE_BYTES)
        {
            return Err(ConfigError::InvalidBlockSize {
                block_size: self.block_size,
            });
        }
        Ok(())
    }

    /// Elements that fit in one page.
    pub fn elements_per_page(&self) -> usize {
        Self::PAGE_BYTES / self.element_type.width()
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(ElementType::F32)
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Fatal errors detected while building an arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The element type name is not one of the supported representations.
    UnknownElementType {
        /// The unrecognised name.
        name: String,
    },
    /// Page limits are inconsistent.
    InvalidPages {
        /// Configured initial page count.
        initial: u32,
        /// Configured page ceiling.
        max: u32,
    },
    /// Block width is zero or larger than a page.
    InvalidBlockSize {
        /// The configured block width.
        block_size: usize,
    },
    /// The computation module works on a different element type than the store.
    ElementTypeMismatch {
        /// Element type the module was built for.
        module: ElementType,
        /// Element type of the backing store.
        store: ElementType,
    },
    /// The computation module lacks a required entry point.
    MissingExport {
        /// Name of the module.
        module: String,
        /// The missing entry point.
        export: Export,
    },
    /// Creating the backing store failed.
    Arena(ArenaError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownElementType { name } => {
                write!(f, "element type '{name}' not recognised")
            }
            Self::InvalidPages { initial, max } => {
                write!(
                    f,
                    "invalid page limits: initial {initial}, max {max} (need 1 <= initial <= max <= {})",
                    ArenaConfig::MAX_PAGES_LIMIT
                )
            }
            Self::InvalidBlockSize { block_size } => {
                write!(
                    f,
                    "block size {block_size} must hold a pair ({}) and fit in one page",
                    ArenaConfig::MIN_BLOCK_SIZE
                )
            }
            Self::ElementTypeMismatch { module, store } => {
                write!(f, "module operates on {module}, store holds {store}")
            }
            Self::MissingExport { module, export } => {
                write!(f, "module '{module}' does not export '{export}'")
            }
            Self::Arena(e) => write!(f, "arena: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for ConfigError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}
