//! Hardware performance-counter benchmarking of caller-supplied native
//! kernels.
//!
//! This crate is the execution pipeline behind a remote micro-benchmarking
//! service: a caller submits a freshly compiled ELF image containing one
//! named kernel function (a BLAS micro-kernel, a SIMD inner loop, a piece of
//! hand-written assembly) and the pipeline measures it under the hardware
//! counters of the current processor.
//!
//! The pieces, in the order a request uses them:
//!
//! -   [`kernels`] is the registry of benchmarkable operations. Each kernel
//!     describes its parameters, knows how to build the argument record its
//!     prologue will read, and owns every buffer that record points into.
//!
//! -   [`loader`] turns the submitted ELF image into a callable function
//!     pointer inside a freshly mapped executable region.
//!
//! -   [`cpuid`] and [`events`] identify the processor and select the raw
//!     PMU events that are valid on it; [`counter`] opens one kernel counter
//!     file per event via `perf_event_open`.
//!
//! -   [`sandbox`] confines the process to a minimal syscall surface before
//!     any untrusted code runs.
//!
//! -   [`measure`] drives the overhead-subtracted, serialised, median-of-N
//!     timing protocol and produces one count per counter.
//!
//! The crate measures the *calling task* (`pid = 0, cpu = -1`), which keeps
//! the PMU state private to one benchmark at a time; running measurements
//! concurrently in one address space is deliberately unsupported.
//!
//! Everything here is built on the Linux [`perf_event_open`][man] system
//! call; that documentation has the authoritative explanations of exactly
//! what the counters mean.
//!
//! [man]: http://man7.org/linux/man-pages/man2/perf_event_open.2.html

#[cfg(not(all(target_arch = "x86_64", target_os = "linux")))]
compile_error!("ubench measures x86-64 CPUs through Linux perf_event_open and builds nowhere else");

use std::io;

pub mod counter;
pub mod cpuid;
pub mod events;
pub mod kernels;
pub mod loader;
pub mod measure;
pub mod sandbox;
pub mod stats;

pub use crate::counter::{Counter, CounterSet};
pub use crate::cpuid::CpuInfo;
pub use crate::kernels::{Kernel, KernelFn};
pub use crate::loader::LoadedKernel;
pub use crate::measure::{Samples, SENTINEL};

/// Produce an `io::Result` from an errno-style system call.
///
/// An 'errno-style' system call is one that reports failure by returning -1
/// and setting the C `errno` value when an error occurs.
pub(crate) fn check_errno_syscall<F, R>(f: F) -> io::Result<R>
where
    F: FnOnce() -> R,
    R: PartialOrd + Default,
{
    let result = f();
    if result < R::default() {
        Err(io::Error::last_os_error())
    } else {
        Ok(result)
    }
}
