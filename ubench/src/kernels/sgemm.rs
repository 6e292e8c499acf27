//! The single-precision GEMM micro-kernel.
//!
//! This measures the register-blocked inner kernel of a BLIS-style matrix
//! multiply: C (mr x nr, strided by `rs_c`/`cs_c`) accumulates A (mr x k,
//! packed) times B (k x nr, packed), scaled by alpha with beta applied to
//! the destination.

use super::{
    buffer_size, parse_u32, require_positive, Arguments, ArgumentBuffer, ArgumentError,
    Kernel, ParameterError, Parameters,
};

/// The `sgemm` kernel.
pub struct Sgemm;

impl Kernel for Sgemm {
    fn name(&self) -> &'static str {
        "sgemm"
    }

    fn symbol(&self) -> &'static str {
        "sgemm"
    }

    fn parameters(&self) -> Box<dyn Parameters> {
        Box::new(SgemmParameters {
            k: 128,
            mr: 6,
            nr: 16,
            rs_c: 1,
            cs_c: 6,
        })
    }
}

/// Accumulation depth, register-block shape, and destination strides.
struct SgemmParameters {
    k: u32,
    mr: u32,
    nr: u32,
    rs_c: u32,
    cs_c: u32,
}

impl Parameters for SgemmParameters {
    fn set(&mut self, name: &[u8], value: &[u8]) -> Result<(), ParameterError> {
        match name {
            b"k" => self.k = parse_u32("k", value)?,
            b"mr" => self.mr = parse_u32("mr", value)?,
            b"nr" => self.nr = parse_u32("nr", value)?,
            b"rs_c" => self.rs_c = parse_u32("rs_c", value)?,
            b"cs_c" => self.cs_c = parse_u32("cs_c", value)?,
            _ => {
                return Err(ParameterError::UnknownName(
                    String::from_utf8_lossy(name).into_owned(),
                ))
            }
        }
        Ok(())
    }

    fn arguments(&self) -> Result<Box<dyn Arguments>, ArgumentError> {
        require_positive("k", self.k)?;
        require_positive("mr", self.mr)?;
        require_positive("nr", self.nr)?;
        require_positive("rs_c", self.rs_c)?;
        require_positive("cs_c", self.cs_c)?;

        let a = ArgumentBuffer::anonymous(buffer_size("a", &[self.k, self.mr])?, 0)?;
        let b = ArgumentBuffer::anonymous(buffer_size("b", &[self.k, self.nr])?, 0)?;
        let c = ArgumentBuffer::anonymous(
            buffer_size("c", &[self.mr, self.rs_c, self.nr, self.cs_c])?,
            0,
        )?;

        // The record carries alpha and beta by address; boxing them gives
        // the pointers a home that moves with the arguments, not a
        // process-lifetime static.
        let alpha = Box::new(1.0_f32);
        let beta = Box::new(0.0_f32);

        let record = SgemmRecord {
            k: self.k as usize,
            alpha: &*alpha,
            a: a.as_ptr() as *const f32,
            b: b.as_ptr() as *const f32,
            beta: &*beta,
            c: c.as_ptr() as *mut f32,
            rs_c: self.rs_c as usize,
            cs_c: self.cs_c as usize,
        };
        Ok(Box::new(SgemmArguments {
            record,
            a,
            b,
            c,
            alpha,
            beta,
        }))
    }
}

/// The argument record an `sgemm` image reads.
#[repr(C)]
struct SgemmRecord {
    k: usize,
    alpha: *const f32,
    a: *const f32,
    b: *const f32,
    beta: *const f32,
    c: *mut f32,
    rs_c: usize,
    cs_c: usize,
}

struct SgemmArguments {
    record: SgemmRecord,
    a: ArgumentBuffer,
    b: ArgumentBuffer,
    c: ArgumentBuffer,
    alpha: Box<f32>,
    beta: Box<f32>,
}

impl Arguments for SgemmArguments {
    fn record(&self) -> *const u8 {
        &self.record as *const SgemmRecord as *const u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shape_and_scalars() {
        let arguments = Sgemm.parameters().arguments().unwrap();
        let record = unsafe { &*(arguments.record() as *const SgemmRecord) };

        assert_eq!(record.k, 128);
        assert_eq!(record.rs_c, 1);
        assert_eq!(record.cs_c, 6);
        unsafe {
            assert_eq!(*record.alpha, 1.0);
            assert_eq!(*record.beta, 0.0);
        }
    }

    #[test]
    fn buffer_extents_match_the_block_shape() {
        let mut parameters = Sgemm.parameters();
        let overrides: [(&[u8], &[u8]); 5] = [
            (b"k", b"128"),
            (b"mr", b"6"),
            (b"nr", b"16"),
            (b"rs_c", b"1"),
            (b"cs_c", b"6"),
        ];
        for (name, value) in overrides {
            parameters.set(name, value).unwrap();
        }
        let arguments = parameters.arguments().unwrap();
        let record = unsafe { &*(arguments.record() as *const SgemmRecord) };

        // A is 128*6, B is 128*16, C is (6*1)x(16*6) f32 elements; the last
        // element of each must be inside its mapping.
        unsafe {
            assert_eq!(*record.a.add(128 * 6 - 1), 0.0);
            assert_eq!(*record.b.add(128 * 16 - 1), 0.0);
            let c_last = record.c.add((6 * 1) * (16 * 6) - 1);
            c_last.write(2.5);
            assert_eq!(*c_last, 2.5);
        }
    }

    #[test]
    fn every_dimension_must_be_positive() {
        for name in ["k", "mr", "nr", "rs_c", "cs_c"] {
            let mut parameters = Sgemm.parameters();
            parameters.set(name.as_bytes(), b"0").unwrap();
            assert!(
                matches!(parameters.arguments(), Err(ArgumentError::Zero(n)) if n == name),
                "{name}=0 was not rejected"
            );
        }
    }
}
