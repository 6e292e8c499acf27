//! The measurement loop.
//!
//! One call to [`profile`] produces one count for one counter. The protocol
//! subtracts the fixed cost of reading the counter itself: an overhead-only
//! pass times nothing but the reads and the serialising instructions, a
//! computation pass times the same frame with the kernel call inside it,
//! and the result is the difference of the two medians. Both passes bracket
//! the timed region with `CPUID`, which retires everything in flight before
//! the counter is read; the overhead pass issues it twice so the
//! serialisation cost cancels in the subtraction.

use core::arch::x86_64::__cpuid;

use crate::counter::Counter;
use crate::kernels::KernelFn;
use crate::stats;

/// Returned when a counter produced no usable samples at all.
pub const SENTINEL: u64 = u64::MAX;

/// Samples collected per pass.
pub const ITERATIONS: usize = 100;

/// Force in-order retirement of every preceding instruction.
#[inline(always)]
fn serialize() {
    // CPUID leaf 0 is the cheapest architecturally-serialising instruction
    // available in user mode; the returned identification bytes are not
    // interesting here.
    unsafe {
        __cpuid(0);
    }
}

/// Scratch storage for one measurement pass pair.
///
/// The sample arrays are allocated up front so that [`profile`] itself
/// never allocates: the loop runs inside the request sandbox, where the
/// allocator cannot be trusted to stay within the permitted syscalls.
pub struct Samples {
    overhead: Vec<u64>,
    computation: Vec<u64>,
    budget: usize,
}

impl Samples {
    /// Reserve room for `budget` samples per pass.
    pub fn new(budget: usize) -> Samples {
        Samples {
            overhead: Vec::with_capacity(budget),
            computation: Vec::with_capacity(budget),
            budget,
        }
    }
}

impl Default for Samples {
    fn default() -> Samples {
        Samples::new(ITERATIONS)
    }
}

/// Measure one kernel under one counter.
///
/// `record` is the pointer handed to the kernel on every call; the caller
/// keeps the argument storage it points into alive for the duration.
/// Returns the median computation count minus the median overhead count,
/// clamped at zero, or [`SENTINEL`] when either pass lost every sample
/// (which is how a counter that never got scheduled announces itself).
///
/// # Safety
///
/// `kernel` is executed, `samples.budget` times, with `record` as its only
/// argument. The caller vouches that the pointee matches the argument
/// record the kernel expects and that executing the kernel is itself sound.
pub unsafe fn profile(
    kernel: KernelFn,
    record: *const u8,
    counter: &mut Counter,
    samples: &mut Samples,
) -> u64 {
    samples.overhead.clear();
    for _ in 0..samples.budget {
        let Some(start) = counter.read_raw() else {
            continue;
        };

        serialize();
        serialize();

        let Some(end) = counter.read_raw() else {
            continue;
        };
        samples.overhead.push(end.wrapping_sub(start));
    }
    if samples.overhead.is_empty() {
        // Counter isn't functional.
        return SENTINEL;
    }

    samples.computation.clear();
    for _ in 0..samples.budget {
        let Some(start) = counter.read_raw() else {
            continue;
        };

        serialize();
        kernel(record);
        serialize();

        let Some(end) = counter.read_raw() else {
            continue;
        };
        samples.computation.push(end.wrapping_sub(start));
    }
    if samples.computation.is_empty() {
        return SENTINEL;
    }

    let overhead = stats::median(&mut samples.overhead);
    let computation = stats::median(&mut samples.computation);
    computation.saturating_sub(overhead)
}
