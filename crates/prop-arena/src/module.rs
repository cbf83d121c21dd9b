//! Binding to the pointer-based computation module.
//!
//! The computation module is compiled separately and knows nothing about
//! handles: its entry points take byte pointers into a flat memory and
//! mutate the elements found there. [`ModuleBinding::instantiate`] is the
//! one-shot wiring step that checks a module against the backing store it
//! will run on; afterwards [`ModuleBinding::call`] lends the store's bytes
//! to the module as its memory for each call.

use std::fmt;

use crate::config::ConfigError;
use crate::element::ElementType;
use crate::error::ArenaError;
use crate::store::BackingStore;

/// Named entry point of a computation module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Export {
    /// `add(dst, src)`: `dst += src`, element-wise.
    Add,
    /// `subtract(dst, src)`: `dst -= src`, element-wise.
    Subtract,
    /// `multiply(dst, src)`: `dst *= src`, element-wise.
    Multiply,
    /// `divide(dst, src)`: `dst /= src`, element-wise.
    Divide,
    /// `factor(dst, k)`: `dst *= k`.
    Factor,
    /// `divisor(dst, k)`: `dst /= k`.
    Divisor,
    /// `dist(a, b)`: euclidean distance, no side effects.
    Dist,
}

impl Export {
    /// Every entry point a module must provide to back coordinate handles.
    pub const REQUIRED: [Export; 7] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Factor,
        Self::Divisor,
        Self::Dist,
    ];

    /// Symbol name of the entry point.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Factor => "factor",
            Self::Divisor => "divisor",
            Self::Dist => "dist",
        }
    }
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One invocation of a module entry point.
///
/// Pointers are byte addresses into the module memory. The element at
/// `dst` (and the one after it) is mutated in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Call {
    /// See [`Export::Add`].
    Add {
        /// Pointer to the block mutated in place.
        dst: u32,
        /// Pointer to the operand block.
        src: u32,
    },
    /// See [`Export::Subtract`].
    Subtract {
        /// Pointer to the block mutated in place.
        dst: u32,
        /// Pointer to the operand block.
        src: u32,
    },
    /// See [`Export::Multiply`].
    Multiply {
        /// Pointer to the block mutated in place.
        dst: u32,
        /// Pointer to the operand block.
        src: u32,
    },
    /// See [`Export::Divide`].
    Divide {
        /// Pointer to the block mutated in place.
        dst: u32,
        /// Pointer to the operand block.
        src: u32,
    },
    /// See [`Export::Factor`].
    Factor {
        /// Pointer to the block mutated in place.
        dst: u32,
        /// Scale factor.
        factor: f64,
    },
    /// See [`Export::Divisor`].
    Divisor {
        /// Pointer to the block mutated in place.
        dst: u32,
        /// Divisor applied to both elements.
        divisor: f64,
    },
    /// See [`Export::Dist`].
    Dist {
        /// Pointer to the first point.
        a: u32,
        /// Pointer to the second point.
        b: u32,
    },
}

impl Call {
    /// The entry point this call targets.
    pub fn export(&self) -> Export {
        match self {
            Self::Add { .. } => Export::Add,
            Self::Subtract { .. } => Export::Subtract,
            Self::Multiply { .. } => Export::Multiply,
            Self::Divide { .. } => Export::Divide,
            Self::Factor { .. } => Export::Factor,
            Self::Divisor { .. } => Export::Divisor,
            Self::Dist { .. } => Export::Dist,
        }
    }
}

/// A separately built numeric module operating on raw memory.
///
/// Implementations see only the memory bytes and the pointers in each
/// [`Call`]; they must not assume anything about how the memory is
/// allocated.
pub trait ComputeModule {
    /// Human-readable module name, for diagnostics.
    fn name(&self) -> &str;

    /// Element representation the module reads and writes.
    fn element_type(&self) -> ElementType;

    /// Entry points this module provides.
    fn exports(&self) -> &[Export];

    /// Run one entry point against `memory`.
    ///
    /// Returns `Ok(Some(value))` for entry points that produce a scalar
    /// (`dist`) and `Ok(None)` for those that mutate in place.
    fn call(&self, memory: &mut [u8], call: Call) -> Result<Option<f64>, ArenaError>;
}

/// A computation module wired to a backing store.
pub struct ModuleBinding {
    module: Box<dyn ComputeModule>,
}

impl ModuleBinding {
    /// Wire `module` to `store`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ElementTypeMismatch`] if the module was built for a
    ///   different element type than the store holds.
    /// - [`ConfigError::MissingExport`] if any of [`Export::REQUIRED`] is absent.
    pub fn instantiate(
        module: Box<dyn ComputeModule>,
        store: &BackingStore,
    ) -> Result<Self, ConfigError> {
        if module.element_type() != store.element_type() {
            return Err(ConfigError::ElementTypeMismatch {
                module: module.element_type(),
                store: store.element_type(),
            });
        }
        if let Some(export) = Export::REQUIRED
            .iter()
            .copied()
            .find(|e| !module.exports().contains(e))
        {
            return Err(ConfigError::MissingExport {
                module: module.name().to_string(),
                export,
            });
        }
        log::debug!(
            "bound module '{}' to {}-page store of {}",
            module.name(),
            store.pages(),
            store.element_type()
        );
        Ok(Self { module })
    }

    /// Invoke an entry point with `store`'s bytes as the module memory.
    pub fn call(&self, store: &mut BackingStore, call: Call) -> Result<Option<f64>, ArenaError> {
        self.module.call(store.memory_mut(), call)
    }

    /// Name of the bound module.
    pub fn module_name(&self) -> &str {
        self.module.name()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal f64 module used by the crate's own tests.
    pub(crate) struct PlainF64;

    fn load(memory: &[u8], ptr: u32) -> Result<[f64; 2], ArenaError> {
        let start = ptr as usize;
        let bytes = memory.get(start..start + 16).ok_or(ArenaError::BadPointer {
            pointer: ptr,
            memory_len: memory.len(),
        })?;
        Ok([
            ElementType::F64.decode(&bytes[..8]),
            ElementType::F64.decode(&bytes[8..]),
        ])
    }

    fn store(memory: &mut [u8], ptr: u32, v: [f64; 2]) {
        let start = ptr as usize;
        ElementType::F64.encode(v[0], &mut memory[start..start + 8]);
        ElementType::F64.encode(v[1], &mut memory[start + 8..start + 16]);
    }

    impl ComputeModule for PlainF64 {
        fn name(&self) -> &str {
            "plain-f64"
        }

        fn element_type(&self) -> ElementType {
            ElementType::F64
        }

        fn exports(&self) -> &[Export] {
            &Export::REQUIRED
        }

        fn call(&self, memory: &mut [u8], call: Call) -> Result<Option<f64>, ArenaError> {
            let (dst, out) = match call {
                Call::Add { dst, src } => {
                    let (a, b) = (load(memory, dst)?, load(memory, src)?);
                    (dst, [a[0] + b[0], a[1] + b[1]])
                }
                Call::Subtract { dst, src } => {
                    let (a, b) = (load(memory, dst)?, load(memory, src)?);
                    (dst, [a[0] - b[0], a[1] - b[1]])
                }
                Call::Multiply { dst, src } => {
                    let (a, b) = (load(memory, dst)?, load(memory, src)?);
                    (dst, [a[0] * b[0], a[1] * b[1]])
                }
                Call::Divide { dst, src } => {
                    let (a, b) = (load(memory, dst)?, load(memory, src)?);
                    (dst, [a[0] / b[0], a[1] / b[1]])
                }
                Call::Factor { dst, factor } => {
                    let a = load(memory, dst)?;
                    (dst, [a[0] * factor, a[1] * factor])
                }
                Call::Divisor { dst, divisor } => {
                    let a = load(memory, dst)?;
                    (dst, [a[0] / divisor, a[1] / divisor])
                }
                Call::Dist { a, b } => {
                    let (a, b) = (load(memory, a)?, load(memory, b)?);
                    return Ok(Some((b[0] - a[0]).hypot(b[1] - a[1])));
                }
            };
            store(memory, dst, out);
            Ok(None)
        }
    }

    struct Partial;

    impl ComputeModule for Partial {
        fn name(&self) -> &str {
            "partial"
        }

        fn element_type(&self) -> ElementType {
            ElementType::F64
        }

        fn exports(&self) -> &[Export] {
            &[Export::Add, Export::Subtract]
        }

        fn call(&self, _memory: &mut [u8], call: Call) -> Result<Option<f64>, ArenaError> {
            Err(ArenaError::Unsupported {
                operation: call.export().name(),
            })
        }
    }

    #[test]
    fn instantiate_checks_element_type() {
        let store = BackingStore::new(ElementType::F32, 1, 1).unwrap();
        let err = ModuleBinding::instantiate(Box::new(PlainF64), &store)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ConfigError::ElementTypeMismatch {
                module: ElementType::F64,
                store: ElementType::F32
            }
        );
    }

    #[test]
    fn instantiate_checks_exports() {
        let store = BackingStore::new(ElementType::F64, 1, 1).unwrap();
        let err = ModuleBinding::instantiate(Box::new(Partial), &store)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ConfigError::MissingExport {
                module: "partial".into(),
                export: Export::Multiply
            }
        );
    }

    #[test]
    fn call_runs_against_store_memory() {
        let mut store = BackingStore::new(ElementType::F64, 1, 1).unwrap();
        store.write_run(0, &[1.0, 2.0, 3.0, 4.0]);
        let binding = ModuleBinding::instantiate(Box::new(PlainF64), &store).unwrap();
        assert_eq!(binding.module_name(), "plain-f64");

        let out = binding
            .call(&mut store, Call::Add { dst: 0, src: 16 })
            .unwrap();
        assert_eq!(out, None);
        assert_eq!(store.read(0), 4.0);
        assert_eq!(store.read(1), 6.0);
        assert_eq!(store.read(2), 3.0);
    }

    #[test]
    fn call_export_mapping() {
        assert_eq!(Call::Factor { dst: 0, factor: 2.0 }.export(), Export::Factor);
        assert_eq!(Call::Dist { a: 0, b: 8 }.export().name(), "dist");
        assert_eq!(Export::Divisor.to_string(), "divisor");
    }
}
