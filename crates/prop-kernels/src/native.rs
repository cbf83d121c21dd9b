//! Pointer-addressed pair arithmetic.
//!
//! Each entry point decodes the pair(s) found at its byte pointers,
//! computes in `f64`, and encodes the result back over the first pair.
//! Results pass through the element type's conversion on the way back,
//! so integer stores truncate and wrap exactly as a direct write would.
//! Division by zero follows float rules before that conversion.

use prop_arena::{ArenaError, Call, ComputeModule, ElementType, Export};

/// Elements touched per pointer: one `(x, y)` pair.
const PAIR: usize = 2;

/// The native computation module.
#[derive(Clone, Debug)]
pub struct NativeKernels {
    element_type: ElementType,
}

impl NativeKernels {
    /// Build the module for stores holding `element_type` elements.
    pub fn new(element_type: ElementType) -> Self {
        Self { element_type }
    }

    /// Boxed, ready for [`Arena::new`](prop_arena::Arena::new).
    pub fn boxed(element_type: ElementType) -> Box<dyn ComputeModule> {
        Box::new(Self::new(element_type))
    }

    fn span(&self, memory_len: usize, ptr: u32) -> Result<(usize, usize), ArenaError> {
        let start = ptr as usize;
        let end = start + PAIR * self.element_type.width();
        if end > memory_len {
            return Err(ArenaError::BadPointer {
                pointer: ptr,
                memory_len,
            });
        }
        Ok((start, end))
    }

    fn load(&self, memory: &[u8], ptr: u32) -> Result<[f64; PAIR], ArenaError> {
        let (start, end) = self.span(memory.len(), ptr)?;
        let width = self.element_type.width();
        let bytes = &memory[start..end];
        Ok([
            self.element_type.decode(&bytes[..width]),
            self.element_type.decode(&bytes[width..]),
        ])
    }

    fn store(&self, memory: &mut [u8], ptr: u32, [x, y]: [f64; PAIR]) -> Result<(), ArenaError> {
        let (start, end) = self.span(memory.len(), ptr)?;
        let width = self.element_type.width();
        let bytes = &mut memory[start..end];
        self.element_type.encode(x, &mut bytes[..width]);
        self.element_type.encode(y, &mut bytes[width..]);
        Ok(())
    }

    /// Apply `op` to the pairs at `dst` and `src`, writing over `dst`.
    fn binary(
        &self,
        memory: &mut [u8],
        dst: u32,
        src: u32,
        op: impl Fn(f64, f64) -> f64,
    ) -> Result<(), ArenaError> {
        let a = self.load(memory, dst)?;
        let b = self.load(memory, src)?;
        self.store(memory, dst, [op(a[0], b[0]), op(a[1], b[1])])
    }

    fn unary(
        &self,
        memory: &mut [u8],
        dst: u32,
        op: impl Fn(f64) -> f64,
    ) -> Result<(), ArenaError> {
        let a = self.load(memory, dst)?;
        self.store(memory, dst, [op(a[0]), op(a[1])])
    }
}

impl ComputeModule for NativeKernels {
    fn name(&self) -> &str {
        "prop-native"
    }

    fn element_type(&self) -> ElementType {
        self.element_type
    }

    fn exports(&self) -> &[Export] {
        &Export::REQUIRED
    }

    fn call(&self, memory: &mut [u8], call: Call) -> Result<Option<f64>, ArenaError> {
        log::trace!("{} {:?}", call.export(), call);
        match call {
            Call::Add { dst, src } => self.binary(memory, dst, src, |a, b| a + b)?,
            Call::Subtract { dst, src } => self.binary(memory, dst, src, |a, b| a - b)?,
            Call::Multiply { dst, src } => self.binary(memory, dst, src, |a, b| a * b)?,
            Call::Divide { dst, src } => self.binary(memory, dst, src, |a, b| a / b)?,
            Call::Factor { dst, factor } => self.unary(memory, dst, |a| a * factor)?,
            Call::Divisor { dst, divisor } => self.unary(memory, dst, |a| a / divisor)?,
            Call::Dist { a, b } => {
                let p = self.load(memory, a)?;
                let q = self.load(memory, b)?;
                let d = ((q[0] - p[0]).powi(2) + (q[1] - p[1]).powi(2)).sqrt();
                return Ok(Some(d));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn memory(ty: ElementType, values: &[f64]) -> Vec<u8> {
        let width = ty.width();
        let mut mem = vec![0u8; 64];
        for (i, &v) in values.iter().enumerate() {
            ty.encode(v, &mut mem[i * width..(i + 1) * width]);
        }
        mem
    }

    fn read(ty: ElementType, mem: &[u8], index: usize) -> f64 {
        let width = ty.width();
        ty.decode(&mem[index * width..(index + 1) * width])
    }

    #[test]
    fn add_mutates_first_pair_only() {
        let ty = ElementType::F32;
        let k = NativeKernels::new(ty);
        let mut mem = memory(ty, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(k.call(&mut mem, Call::Add { dst: 0, src: 8 }).unwrap(), None);
        assert_eq!(read(ty, &mem, 0), 4.0);
        assert_eq!(read(ty, &mem, 1), 6.0);
        assert_eq!(read(ty, &mem, 2), 3.0);
        assert_eq!(read(ty, &mem, 3), 4.0);
    }

    #[test]
    fn every_export_on_f64() {
        let ty = ElementType::F64;
        let k = NativeKernels::new(ty);
        let mut mem = memory(ty, &[6.0, 8.0, 2.0, 4.0]);

        k.call(&mut mem, Call::Subtract { dst: 0, src: 16 }).unwrap();
        assert_eq!([read(ty, &mem, 0), read(ty, &mem, 1)], [4.0, 4.0]);
        k.call(&mut mem, Call::Multiply { dst: 0, src: 16 }).unwrap();
        assert_eq!([read(ty, &mem, 0), read(ty, &mem, 1)], [8.0, 16.0]);
        k.call(&mut mem, Call::Divide { dst: 0, src: 16 }).unwrap();
        assert_eq!([read(ty, &mem, 0), read(ty, &mem, 1)], [4.0, 4.0]);
        k.call(&mut mem, Call::Factor { dst: 0, factor: 0.5 }).unwrap();
        assert_eq!([read(ty, &mem, 0), read(ty, &mem, 1)], [2.0, 2.0]);
        k.call(&mut mem, Call::Divisor { dst: 0, divisor: 4.0 }).unwrap();
        assert_eq!([read(ty, &mem, 0), read(ty, &mem, 1)], [0.5, 0.5]);
    }

    #[test]
    fn dist_returns_scalar_without_writing() {
        let ty = ElementType::F32;
        let k = NativeKernels::new(ty);
        let mut mem = memory(ty, &[1.0, 1.0, 4.0, 5.0]);
        let before = mem.clone();
        assert_eq!(k.call(&mut mem, Call::Dist { a: 0, b: 8 }).unwrap(), Some(5.0));
        assert_eq!(mem, before);
    }

    #[test]
    fn integer_results_wrap() {
        let ty = ElementType::I8;
        let k = NativeKernels::new(ty);
        let mut mem = memory(ty, &[100.0, -100.0, 100.0, -100.0]);
        k.call(&mut mem, Call::Add { dst: 0, src: 2 }).unwrap();
        assert_eq!(read(ty, &mem, 0), -56.0);
        assert_eq!(read(ty, &mem, 1), 56.0);
    }

    #[test]
    fn integer_division_by_zero_becomes_zero() {
        let ty = ElementType::I32;
        let k = NativeKernels::new(ty);
        let mut mem = memory(ty, &[7.0, -7.0]);
        k.call(&mut mem, Call::Divisor { dst: 0, divisor: 0.0 }).unwrap();
        assert_eq!(read(ty, &mem, 0), 0.0);
        assert_eq!(read(ty, &mem, 1), 0.0);
    }

    #[test]
    fn float_division_by_zero_is_infinite() {
        let ty = ElementType::F32;
        let k = NativeKernels::new(ty);
        let mut mem = memory(ty, &[1.0, -1.0]);
        k.call(&mut mem, Call::Divisor { dst: 0, divisor: 0.0 }).unwrap();
        assert_eq!(read(ty, &mem, 0), f64::INFINITY);
        assert_eq!(read(ty, &mem, 1), f64::NEG_INFINITY);
    }

    #[test]
    fn pointer_past_memory_rejected() {
        let k = NativeKernels::new(ElementType::F32);
        let mut mem = vec![0u8; 16];
        assert!(k.call(&mut mem, Call::Add { dst: 8, src: 0 }).is_ok());
        assert_eq!(
            k.call(&mut mem, Call::Add { dst: 12, src: 0 }),
            Err(ArenaError::BadPointer {
                pointer: 12,
                memory_len: 16
            })
        );
        assert!(k.call(&mut mem, Call::Dist { a: 0, b: 9 }).is_err());
    }

    #[test]
    fn exports_cover_required_set() {
        let k = NativeKernels::new(ElementType::U16);
        for e in Export::REQUIRED {
            assert!(k.exports().contains(&e));
        }
        assert_eq!(k.element_type(), ElementType::U16);
    }

    proptest! {
        #[test]
        fn dist_is_symmetric(
            ax in -1000i32..1000, ay in -1000i32..1000,
            bx in -1000i32..1000, by in -1000i32..1000,
        ) {
            let ty = ElementType::F64;
            let k = NativeKernels::new(ty);
            let mut mem = memory(ty, &[
                f64::from(ax), f64::from(ay), f64::from(bx), f64::from(by),
            ]);
            let ab = k.call(&mut mem, Call::Dist { a: 0, b: 16 }).unwrap().unwrap();
            let ba = k.call(&mut mem, Call::Dist { a: 16, b: 0 }).unwrap().unwrap();
            prop_assert!((ab - ba).abs() < 1e-9);
            prop_assert!(ab >= 0.0);
        }
    }
}
