//! The single-precision dot-product kernel.

use super::{
    buffer_size, check_offset, parse_u32, require_positive, Arguments, ArgumentBuffer,
    ArgumentError, Kernel, ParameterError, Parameters, OFFSET_SLACK,
};

/// The `sdot` kernel: `rho = x · y` over strided single-precision vectors.
pub struct Sdot;

impl Kernel for Sdot {
    fn name(&self) -> &'static str {
        "sdot"
    }

    fn symbol(&self) -> &'static str {
        "sdot"
    }

    fn parameters(&self) -> Box<dyn Parameters> {
        Box::new(SdotParameters {
            n: 1024,
            incx: 1,
            offx: 0,
            incy: 1,
            offy: 0,
        })
    }
}

/// Element count, per-vector element strides, and per-vector byte offsets.
struct SdotParameters {
    n: u32,
    incx: u32,
    offx: u32,
    incy: u32,
    offy: u32,
}

impl Parameters for SdotParameters {
    fn set(&mut self, name: &[u8], value: &[u8]) -> Result<(), ParameterError> {
        match name {
            b"n" => self.n = parse_u32("n", value)?,
            b"incx" => self.incx = parse_u32("incx", value)?,
            b"offx" => self.offx = parse_u32("offx", value)?,
            b"incy" => self.incy = parse_u32("incy", value)?,
            b"offy" => self.offy = parse_u32("offy", value)?,
            _ => {
                return Err(ParameterError::UnknownName(
                    String::from_utf8_lossy(name).into_owned(),
                ))
            }
        }
        Ok(())
    }

    fn arguments(&self) -> Result<Box<dyn Arguments>, ArgumentError> {
        require_positive("n", self.n)?;
        require_positive("incx", self.incx)?;
        require_positive("incy", self.incy)?;
        check_offset("offx", self.offx)?;
        check_offset("offy", self.offy)?;

        let x = ArgumentBuffer::anonymous(
            buffer_size("x", &[self.n, self.incx])? + OFFSET_SLACK,
            self.offx as usize,
        )?;
        let y = ArgumentBuffer::anonymous(
            buffer_size("y", &[self.n, self.incy])? + OFFSET_SLACK,
            self.offy as usize,
        )?;

        let record = SdotRecord {
            n: self.n as usize,
            x: x.as_ptr() as *const f32,
            incx: self.incx as usize,
            y: y.as_ptr() as *const f32,
            incy: self.incy as usize,
        };
        Ok(Box::new(SdotArguments { record, x, y }))
    }
}

/// The argument record an `sdot` image reads.
#[repr(C)]
struct SdotRecord {
    n: usize,
    x: *const f32,
    incx: usize,
    y: *const f32,
    incy: usize,
}

struct SdotArguments {
    record: SdotRecord,
    x: ArgumentBuffer,
    y: ArgumentBuffer,
}

impl Arguments for SdotArguments {
    fn record(&self) -> *const u8 {
        &self.record as *const SdotRecord as *const u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arguments_for(query: &[(&[u8], &[u8])]) -> Result<Box<dyn Arguments>, ArgumentError> {
        let mut parameters = Sdot.parameters();
        for (name, value) in query {
            parameters.set(name, value).unwrap();
        }
        parameters.arguments()
    }

    #[test]
    fn unit_stride_shape() {
        let arguments = arguments_for(&[(b"n", b"1024")]).unwrap();
        let record = unsafe { &*(arguments.record() as *const SdotRecord) };

        assert_eq!(record.n, 1024);
        assert_eq!(record.incx, 1);
        assert_eq!(record.incy, 1);
        // 1024 * 1 * 4 + 64 bytes were mapped for each vector; both are
        // readable across their full published extent.
        for i in 0..record.n {
            unsafe {
                assert_eq!(*record.x.add(i * record.incx), 0.0);
                assert_eq!(*record.y.add(i * record.incy), 0.0);
            }
        }
    }

    #[test]
    fn offsets_move_the_vector_pointers() {
        let plain = arguments_for(&[]).unwrap();
        let offset = arguments_for(&[(b"offx", b"16"), (b"offy", b"60")]).unwrap();

        let plain = unsafe { &*(plain.record() as *const SdotRecord) };
        let offset = unsafe { &*(offset.record() as *const SdotRecord) };
        assert_eq!(plain.x as usize % 4096, 0);
        assert_eq!(offset.x as usize % 4096, 16);
        assert_eq!(offset.y as usize % 4096, 60);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            arguments_for(&[(b"n", b"0")]),
            Err(ArgumentError::Zero("n"))
        ));
        assert!(matches!(
            arguments_for(&[(b"incx", b"0")]),
            Err(ArgumentError::Zero("incx"))
        ));
        assert!(matches!(
            arguments_for(&[(b"incy", b"0")]),
            Err(ArgumentError::Zero("incy"))
        ));
    }

    #[test]
    fn offsets_beyond_the_slack_are_rejected() {
        assert!(matches!(
            arguments_for(&[(b"offx", b"65")]),
            Err(ArgumentError::OffsetOutOfRange { name: "offx", offset: 65 })
        ));
        assert!(arguments_for(&[(b"offx", b"64")]).is_ok());
    }

    #[test]
    fn oversized_vectors_are_rejected_before_mapping() {
        assert!(matches!(
            arguments_for(&[(b"n", b"4294967295"), (b"incx", b"4294967295")]),
            Err(ArgumentError::Oversized("x"))
        ));
    }
}
