//! The request coordinator: everything that happens between accepting a
//! connection and the child's exit.
//!
//! One child process serves one request, in a fixed order: read and parse,
//! resolve the kernel, apply parameter overrides, load the image, open the
//! counters, build the arguments, install the sandbox, and only then run
//! and report. Failures before the sandbox propagate out as
//! [`RequestError`] and are logged by the caller; after the sandbox there
//! is nothing left to log to, and the only exits are `process::exit`.

use std::convert::Infallible;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::os::fd::OwnedFd;
use std::os::unix::io::AsRawFd;
use std::process;

use memchr::memchr;
use thiserror::Error;

use ubench::kernels::{self, ArgumentError, Kernel, ParameterError, Parameters};
use ubench::loader::{self, LoadError};
use ubench::measure::SENTINEL;
use ubench::{sandbox, CounterSet, CpuInfo, Samples};

use crate::http::{self, HttpError, Query};

/// Why a request child is about to exit unhappily.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request never made it off the socket.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The target was not `/<command>/<uarch>?<query>`.
    #[error("invalid target {0:?}")]
    BadTarget(String),

    /// The command existed but is not `run`.
    #[error("unsupported command {0:?}")]
    UnsupportedCommand(String),

    /// No query parameters at all.
    #[error("required parameter `kernel` not specified")]
    MissingKernel,

    /// Something other than `kernel` led the query.
    #[error("unexpected parameter {0:?} in place of required parameter `kernel`")]
    MisplacedKernel(String),

    /// `kernel` came with no value.
    #[error("required parameter `kernel` specified without value")]
    MissingKernelValue,

    /// The named kernel is not in the registry.
    #[error("unknown kernel {0:?}")]
    UnknownKernel(String),

    /// A known parameter carried an unusable value.
    #[error(transparent)]
    Parameter(ParameterError),

    /// The submitted image could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The parameters do not describe a runnable argument set.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The sandbox would not install; the child must not run the kernel.
    #[error("failed to install sandbox: {0}")]
    Sandbox(std::io::Error),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Monitor,
}

impl Command {
    fn parse(bytes: &[u8]) -> Option<Command> {
        match bytes {
            b"run" => Some(Command::Run),
            b"monitor" => Some(Command::Monitor),
            _ => None,
        }
    }
}

/// A resolved request: which kernel, with which parameters.
struct Benchmark {
    kernel: &'static dyn Kernel,
    parameters: Box<dyn Parameters>,
}

/// Interpret the request target: `/<command>/<uarch>?kernel=<k>[&p=v...]`.
///
/// The `<uarch>` label is the client's name for what it thinks it is
/// talking to; the server does not interpret it. The first query parameter
/// must be `kernel`; later ones are kernel-specific, and unknown names
/// among them are logged and dropped rather than failing a request that is
/// otherwise well-formed.
fn resolve(target: &[u8]) -> Result<Benchmark, RequestError> {
    let path = target.strip_prefix(b"/").unwrap_or(target);
    let slash = memchr(b'/', path).ok_or_else(|| bad_target(target))?;
    let command = &path[..slash];
    if Command::parse(command) != Some(Command::Run) {
        return Err(RequestError::UnsupportedCommand(lossy(command)));
    }

    let rest = &path[slash + 1..];
    let question = memchr(b'?', rest).ok_or_else(|| bad_target(target))?;
    log::debug!(
        "request for uarch label {:?}",
        String::from_utf8_lossy(&rest[..question])
    );

    let mut query = Query::new(&rest[question..]);
    let selector = query.next().ok_or(RequestError::MissingKernel)?;
    if selector.name != b"kernel" {
        return Err(RequestError::MisplacedKernel(lossy(selector.name)));
    }
    let name = selector.value.ok_or(RequestError::MissingKernelValue)?;
    let kernel =
        kernels::lookup(name).ok_or_else(|| RequestError::UnknownKernel(lossy(name)))?;

    let mut parameters = kernel.parameters();
    for parameter in query {
        if parameter.name.is_empty() {
            log::error!("empty parameter in request query");
            continue;
        }
        let Some(value) = parameter.value else {
            log::error!(
                "parameter {:?} specified without value",
                String::from_utf8_lossy(parameter.name)
            );
            continue;
        };
        match parameters.set(parameter.name, value) {
            Ok(()) => {}
            Err(ParameterError::UnknownName(name)) => {
                log::warn!("ignoring unknown parameter {name:?}");
            }
            Err(err) => return Err(RequestError::Parameter(err)),
        }
    }

    Ok(Benchmark { kernel, parameters })
}

/// Serve one connection, then exit the process.
///
/// Returns only on failures that happen before the sandbox is installed;
/// the caller logs them and exits non-zero. Once the sandbox is up, drop
/// glue is off the table (unwinding would close counter descriptors, and
/// the filter has no `close`), so the success path and the post-sandbox
/// failure paths all end in `process::exit`, which releases everything at
/// once.
pub fn serve(connection: OwnedFd) -> Result<Infallible, RequestError> {
    let mut socket = File::from(connection);

    let request = http::read_request(&mut socket)?;
    let benchmark = resolve(&request.target)?;
    log::debug!(
        "benchmarking kernel {} ({} byte image)",
        benchmark.kernel.name(),
        request.body.len()
    );

    let image = loader::load(&request.body, benchmark.kernel.symbol())?;
    let mut counters = CounterSet::open(CpuInfo::detect());
    let arguments = benchmark.parameters.arguments()?;
    let mut samples = Samples::default();
    // Reserved now: the report loop formats into this buffer, and the
    // allocator is off-limits once the filter is up.
    let mut line = String::with_capacity(128);

    sandbox::install(socket.as_raw_fd()).map_err(RequestError::Sandbox)?;

    if http::respond_ok(&mut socket).is_err() {
        process::exit(1);
    }

    let kernel_fn = image.entry();
    for slot in counters.counters_mut() {
        let _ = slot.counter.enable();
        let count = unsafe { arguments.profile(kernel_fn, &mut slot.counter, &mut samples) };
        let _ = slot.counter.disable();

        // A counter that never yielded a sample is omitted, not reported
        // as anything.
        if count != SENTINEL {
            line.clear();
            let _ = writeln!(line, "{}: {}", slot.name, count);
            if socket.write_all(line.as_bytes()).is_err() {
                process::exit(1);
            }
        }
    }

    process::exit(0);
}

fn bad_target(target: &[u8]) -> RequestError {
    RequestError::BadTarget(lossy(target))
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_plain_run_request() {
        let benchmark = resolve(b"/run/any?kernel=playground&iterations=1").unwrap();
        assert_eq!(benchmark.kernel.name(), "playground");
    }

    #[test]
    fn resolves_kernel_parameters() {
        let benchmark =
            resolve(b"/run/hsw?kernel=sdot&n=64&incx=2&offx=8&incy=1&offy=0").unwrap();
        assert_eq!(benchmark.kernel.name(), "sdot");
        assert!(benchmark.parameters.arguments().is_ok());
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let benchmark = resolve(b"/run/any?kernel=sdot&bogus=3&n=16").unwrap();
        assert_eq!(benchmark.kernel.name(), "sdot");
    }

    #[test]
    fn invalid_parameter_values_fail_the_request() {
        assert!(matches!(
            resolve(b"/run/any?kernel=sdot&n=zebra"),
            Err(RequestError::Parameter(ParameterError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn unknown_kernels_are_rejected() {
        assert!(matches!(
            resolve(b"/run/any?kernel=nope"),
            Err(RequestError::UnknownKernel(name)) if name == "nope"
        ));
    }

    #[test]
    fn the_kernel_parameter_must_lead_the_query() {
        assert!(matches!(
            resolve(b"/run/any?n=1024&kernel=sdot"),
            Err(RequestError::MisplacedKernel(name)) if name == "n"
        ));
        assert!(matches!(
            resolve(b"/run/any?"),
            Err(RequestError::MissingKernel)
        ));
        assert!(matches!(
            resolve(b"/run/any?kernel"),
            Err(RequestError::MissingKernelValue)
        ));
    }

    #[test]
    fn only_the_run_command_is_supported() {
        assert!(matches!(
            resolve(b"/monitor/any?kernel=sdot"),
            Err(RequestError::UnsupportedCommand(command)) if command == "monitor"
        ));
        assert!(matches!(
            resolve(b"/frobnicate/any?kernel=sdot"),
            Err(RequestError::UnsupportedCommand(_))
        ));
    }

    #[test]
    fn targets_missing_their_pieces_are_rejected() {
        assert!(matches!(resolve(b"/run"), Err(RequestError::BadTarget(_))));
        assert!(matches!(
            resolve(b"/run/any"),
            Err(RequestError::BadTarget(_))
        ));
    }
}
