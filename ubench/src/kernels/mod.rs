//! The registry of benchmarkable kernels.
//!
//! Each kernel in the registry names the symbol a submitted image must
//! export, declares its tunable parameters with their defaults, and knows
//! how to turn a parameter set into the argument record the kernel's
//! prologue will read. The set of kernels is closed at build time; the wire
//! name of a request is resolved against [`KERNELS`] by byte comparison.

use std::io;
use std::str;

use thiserror::Error;

use crate::counter::Counter;
use crate::measure::{self, Samples};

mod buffer;
mod playground;
mod sdot;
mod sgemm;

pub use buffer::ArgumentBuffer;
pub use playground::Playground;
pub use sdot::Sdot;
pub use sgemm::Sgemm;

/// The calling convention every benchmarkable kernel follows: one pointer
/// to its argument record, nothing returned.
pub type KernelFn = unsafe extern "C" fn(*const u8);

/// Every buffer is over-allocated by this much so the `off*` parameters can
/// push the published pointer off its natural alignment by up to a cache
/// line without running past the mapping.
pub const OFFSET_SLACK: usize = 64;

/// A parameter override that could not be applied.
#[derive(Debug, Error)]
pub enum ParameterError {
    /// The kernel has no parameter by this name. Callers treat this as
    /// ignorable: an unknown name is reported, not fatal.
    #[error("unknown parameter {0:?}")]
    UnknownName(String),

    /// The value did not parse as the positive integer the schema wants.
    #[error("invalid value {value:?} for parameter {name}")]
    InvalidValue {
        /// Parameter the value was destined for.
        name: &'static str,
        /// The rejected bytes, lossily decoded for display.
        value: String,
    },
}

/// A parameter set that cannot be turned into kernel arguments.
#[derive(Debug, Error)]
pub enum ArgumentError {
    /// A dimension-like parameter was zero.
    #[error("parameter {0} must be positive")]
    Zero(&'static str),

    /// An offset parameter exceeded [`OFFSET_SLACK`].
    #[error("offset {name}={offset} exceeds the {OFFSET_SLACK}-byte slack")]
    OffsetOutOfRange {
        /// The offending parameter.
        name: &'static str,
        /// Its value.
        offset: u32,
    },

    /// A buffer size overflowed the address space.
    #[error("buffer {0} does not fit in the address space")]
    Oversized(&'static str),

    /// The operating system refused a buffer mapping.
    #[error("failed to map argument buffer: {0}")]
    Map(#[from] io::Error),
}

/// One benchmarkable operation.
pub trait Kernel: Sync {
    /// The name a request selects this kernel by.
    fn name(&self) -> &'static str;

    /// The symbol the submitted image must define.
    fn symbol(&self) -> &'static str;

    /// A freshly defaulted parameter set.
    fn parameters(&self) -> Box<dyn Parameters>;
}

/// A kernel's parameter record: every field defaulted, overridable by name.
pub trait Parameters {
    /// Apply one `name=value` override from the request query.
    fn set(&mut self, name: &[u8], value: &[u8]) -> Result<(), ParameterError>;

    /// Allocate and initialise the arguments the kernel expects.
    fn arguments(&self) -> Result<Box<dyn Arguments>, ArgumentError>;
}

/// A kernel's argument record plus everything it points into.
///
/// Implementations own their buffers; dropping the arguments releases the
/// original mappings in full, however far into them the record's pointers
/// reach.
pub trait Arguments {
    /// The argument record the kernel's prologue will read.
    fn record(&self) -> *const u8;

    /// Drive the measurement loop for this kernel.
    ///
    /// # Safety
    ///
    /// `kernel` must follow the [`KernelFn`] convention and expect exactly
    /// the record layout this implementation builds.
    unsafe fn profile(
        &self,
        kernel: KernelFn,
        counter: &mut Counter,
        samples: &mut Samples,
    ) -> u64 {
        measure::profile(kernel, self.record(), counter, samples)
    }
}

/// The closed set of kernels this build understands.
pub static KERNELS: &[&dyn Kernel] = &[&Playground, &Sdot, &Sgemm];

/// Resolve a wire name to its kernel.
pub fn lookup(name: &[u8]) -> Option<&'static dyn Kernel> {
    KERNELS.iter().copied().find(|k| k.name().as_bytes() == name)
}

/// Parse a query value as a `u32`, for the parameter named in errors.
fn parse_u32(name: &'static str, value: &[u8]) -> Result<u32, ParameterError> {
    parse_integer(name, value)
}

/// Parse a query value as a `u64`, for the parameter named in errors.
fn parse_u64(name: &'static str, value: &[u8]) -> Result<u64, ParameterError> {
    parse_integer(name, value)
}

fn parse_integer<T: str::FromStr>(
    name: &'static str,
    value: &[u8],
) -> Result<T, ParameterError> {
    str::from_utf8(value)
        .ok()
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| ParameterError::InvalidValue {
            name,
            value: String::from_utf8_lossy(value).into_owned(),
        })
}

/// Reject a zero where the schema wants a dimension.
fn require_positive(name: &'static str, value: u32) -> Result<(), ArgumentError> {
    if value == 0 {
        Err(ArgumentError::Zero(name))
    } else {
        Ok(())
    }
}

/// Reject an offset beyond the slack the buffers reserve for it.
fn check_offset(name: &'static str, offset: u32) -> Result<(), ArgumentError> {
    if offset as usize > OFFSET_SLACK {
        Err(ArgumentError::OffsetOutOfRange { name, offset })
    } else {
        Ok(())
    }
}

/// Multiply out a buffer size in `f32` elements, refusing overflow.
fn buffer_size(name: &'static str, elements: &[u32]) -> Result<usize, ArgumentError> {
    let mut size = std::mem::size_of::<f32>();
    for &count in elements {
        size = size
            .checked_mul(count as usize)
            .ok_or(ArgumentError::Oversized(name))?;
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_knows_its_kernels() {
        assert_eq!(lookup(b"playground").unwrap().name(), "playground");
        assert_eq!(lookup(b"sdot").unwrap().name(), "sdot");
        assert_eq!(lookup(b"sgemm").unwrap().name(), "sgemm");
    }

    #[test]
    fn lookup_is_exact() {
        assert!(lookup(b"nope").is_none());
        assert!(lookup(b"sdo").is_none());
        assert!(lookup(b"sdots").is_none());
        assert!(lookup(b"").is_none());
        assert!(lookup(b"SDOT").is_none());
    }

    #[test]
    fn unknown_parameter_is_reported_by_every_kernel() {
        for kernel in KERNELS {
            let mut parameters = kernel.parameters();
            match parameters.set(b"no_such_parameter", b"1") {
                Err(ParameterError::UnknownName(name)) => {
                    assert_eq!(name, "no_such_parameter");
                }
                other => panic!("{}: expected UnknownName, got {other:?}", kernel.name()),
            }
        }
    }

    #[test]
    fn defaults_build_arguments_for_every_kernel() {
        for kernel in KERNELS {
            let parameters = kernel.parameters();
            let arguments = parameters
                .arguments()
                .unwrap_or_else(|err| panic!("{}: {err}", kernel.name()));
            assert!(!arguments.record().is_null());
        }
    }

    #[test]
    fn bad_values_name_the_parameter() {
        let mut parameters = lookup(b"sdot").unwrap().parameters();
        match parameters.set(b"n", b"zebra") {
            Err(ParameterError::InvalidValue { name, value }) => {
                assert_eq!(name, "n");
                assert_eq!(value, "zebra");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn argument_lifecycle_leaves_no_mappings_behind() {
        fn mapping_count() -> usize {
            std::fs::read_to_string("/proc/self/maps")
                .expect("no /proc on this system?")
                .lines()
                .count()
        }

        for kernel in KERNELS {
            // One throwaway round first, so allocator growth from the boxes
            // does not show up as a leak.
            drop(kernel.parameters().arguments().unwrap());

            let before = mapping_count();
            drop(kernel.parameters().arguments().unwrap());
            assert_eq!(
                mapping_count(),
                before,
                "{} leaked a mapping",
                kernel.name()
            );
        }
    }

    #[test]
    fn buffer_size_checks_overflow() {
        assert!(buffer_size("x", &[1024, 1]).is_ok());
        assert!(matches!(
            buffer_size("x", &[u32::MAX, u32::MAX, u32::MAX]),
            Err(ArgumentError::Oversized("x"))
        ));
    }
}
