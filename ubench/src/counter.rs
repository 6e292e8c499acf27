//! Kernel counter file handles, opened through `perf_event_open`.

use std::fs::File;
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};

use perf_event_open_sys as sys;
use sys::bindings::perf_event_attr;

use crate::check_errno_syscall;
use crate::cpuid::CpuInfo;
use crate::events;

/// A single performance counter.
///
/// A `Counter` is a thin wrapper around the file descriptor returned by
/// `perf_event_open`, configured the only way the measurement loop can use
/// it: created disabled, observing the calling task on any CPU, and
/// excluding kernel-mode and hypervisor time so the counts belong to the
/// benchmarked code alone.
///
/// When a `Counter` is dropped, its kernel resources are freed along with
/// it.
pub struct Counter {
    /// The file descriptor for this counter, returned by `perf_event_open`.
    file: File,
}

impl Counter {
    /// Open a generic hardware counter (`PERF_TYPE_HARDWARE`).
    pub fn open_hardware(config: u64) -> io::Result<Counter> {
        Counter::open(sys::bindings::PERF_TYPE_HARDWARE, config)
    }

    /// Open a raw, model-specific counter (`PERF_TYPE_RAW`).
    ///
    /// `config` is the encoded event-select word; see
    /// [`EventDesc::config`](crate::events::EventDesc::config).
    pub fn open_raw(config: u64) -> io::Result<Counter> {
        Counter::open(sys::bindings::PERF_TYPE_RAW, config)
    }

    fn open(type_: u32, config: u64) -> io::Result<Counter> {
        let mut attrs = perf_event_attr {
            size: std::mem::size_of::<perf_event_attr>() as u32,
            type_,
            config,
            ..perf_event_attr::default()
        };

        attrs.set_disabled(1);
        attrs.set_exclude_kernel(1); // don't count time in kernel
        attrs.set_exclude_hv(1); // don't count time in hypervisor

        let file = unsafe {
            File::from_raw_fd(check_errno_syscall(|| {
                sys::perf_event_open(&mut attrs, 0, -1, -1, 0)
            })?)
        };

        Ok(Counter { file })
    }

    /// Allow this `Counter` to begin counting its designated event.
    pub fn enable(&mut self) -> io::Result<()> {
        check_errno_syscall(|| unsafe { sys::ioctls::ENABLE(self.file.as_raw_fd(), 0) })
            .map(|_| ())
    }

    /// Make this `Counter` stop counting its designated event. Its count is
    /// unaffected.
    pub fn disable(&mut self) -> io::Result<()> {
        check_errno_syscall(|| unsafe { sys::ioctls::DISABLE(self.file.as_raw_fd(), 0) })
            .map(|_| ())
    }

    /// Read the current count, or `None` if the kernel returned anything
    /// other than a complete value.
    ///
    /// A counter that could not be scheduled on the PMU shows up here as a
    /// short read; the measurement loop treats that as a lost sample rather
    /// than an error, so this returns an `Option` rather than a `Result`.
    pub fn read_raw(&mut self) -> Option<u64> {
        let mut value = [0_u8; 8];
        match self.file.read(&mut value) {
            Ok(8) => Some(u64::from_ne_bytes(value)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "Counter {{ fd: {} }}", self.file.as_raw_fd())
    }
}

impl AsRawFd for Counter {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

/// A counter together with the name it is reported under.
#[derive(Debug)]
pub struct NamedCounter {
    /// Name written on the wire, e.g. `Cycles` or `UOPS_ISSUED.ANY`.
    pub name: &'static str,
    /// The open counter handle.
    pub counter: Counter,
}

/// Every counter one benchmark run reports: the two generic hardware
/// counters, plus whatever the catalogue knows about the running CPU.
#[derive(Debug, Default)]
pub struct CounterSet {
    counters: Vec<NamedCounter>,
}

impl CounterSet {
    /// Open the full counter set for the given processor.
    ///
    /// "Cycles" and "Instructions" are always attempted; the raw events
    /// come from [`events::model_events`]. A counter the kernel refuses to
    /// open is logged and left out; the benchmark still runs with the
    /// counters that remain.
    pub fn open(cpu: CpuInfo) -> CounterSet {
        let model_events = events::model_events(cpu);
        let mut set = CounterSet {
            counters: Vec::with_capacity(2 + model_events.len()),
        };

        set.push(
            "Cycles",
            Counter::open_hardware(sys::bindings::PERF_COUNT_HW_CPU_CYCLES as u64),
        );
        set.push(
            "Instructions",
            Counter::open_hardware(sys::bindings::PERF_COUNT_HW_INSTRUCTIONS as u64),
        );
        for desc in model_events {
            set.push(desc.name, Counter::open_raw(desc.config()));
        }

        set
    }

    fn push(&mut self, name: &'static str, counter: io::Result<Counter>) {
        match counter {
            Ok(counter) => self.counters.push(NamedCounter { name, counter }),
            Err(err) => log::debug!("could not open counter {name}: {err}"),
        }
    }

    /// The counters that opened, in catalogue order.
    pub fn counters_mut(&mut self) -> &mut [NamedCounter] {
        &mut self.counters
    }

    /// How many counters opened.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// True when not a single counter could be opened.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counter tests need a kernel that lets unprivileged processes open
    // task-scoped events; skip quietly where it does not.
    fn cycles() -> Option<Counter> {
        Counter::open_hardware(sys::bindings::PERF_COUNT_HW_CPU_CYCLES as u64).ok()
    }

    #[test]
    fn open_enable_read() {
        let Some(mut counter) = cycles() else {
            return;
        };

        counter.enable().unwrap();
        let mut spin = 0_u64;
        for i in 0..10_000_u64 {
            spin = spin.wrapping_add(i);
        }
        assert_ne!(spin, 0);
        counter.disable().unwrap();

        let count = counter.read_raw().expect("short read from counter");
        assert!(count > 0);
    }

    #[test]
    fn disabled_counter_stays_at_zero() {
        let Some(mut counter) = cycles() else {
            return;
        };
        assert_eq!(counter.read_raw(), Some(0));
    }

    #[test]
    fn set_for_unknown_cpu_has_only_generic_counters() {
        if cycles().is_none() {
            return;
        }

        let unknown = CpuInfo {
            display_family: 0x99,
            display_model: 0x01,
        };
        let mut set = CounterSet::open(unknown);
        let names: Vec<_> = set.counters_mut().iter().map(|c| c.name).collect();
        assert_eq!(names, ["Cycles", "Instructions"]);
    }
}
