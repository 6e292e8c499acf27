//! The benchmark server: accept, fork, serve, wait.
//!
//! Requests are served strictly one at a time. The parent accepts a
//! connection, forks a child that owns it for the whole benchmark, and
//! waits for that child before accepting again. The serialisation is the
//! point, not a simplification: a concurrent benchmark would share the PMU
//! and the cores with this one and corrupt both measurements.

use std::convert::Infallible;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{FromRawFd, OwnedFd};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};
use std::time::SystemTime;

use clap::Parser;
use nix::errno::Errno;
use nix::sys::socket::{
    accept, bind, getpeername, listen, setsockopt, socket, sockopt, AddressFamily, Backlog,
    SockFlag, SockProtocol, SockType, SockaddrIn,
};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult};
use thiserror::Error;

mod http;
mod request;

#[derive(Parser)]
#[command(about = "Benchmark submitted kernels under hardware performance counters")]
struct Options {
    /// File that receives one line per accepted connection (default: stdout).
    #[arg(long, value_name = "PATH")]
    access_log: Option<PathBuf>,

    /// File that receives server diagnostics (default: stderr).
    #[arg(long, value_name = "PATH")]
    error_log: Option<PathBuf>,

    /// The TCP/IP port to listen on.
    #[arg(short, long, default_value_t = 8081)]
    port: u16,

    /// The size of the queue for the listening socket.
    #[arg(short, long, default_value_t = 10,
          value_parser = clap::value_parser!(i32).range(1..))]
    queue_size: i32,
}

#[derive(Debug, Error)]
enum ServerError {
    #[error("failed to open log file {path:?}: {err}")]
    LogFile { path: PathBuf, err: io::Error },

    #[error("failed to create server socket: {0}")]
    Socket(Errno),

    #[error("failed to bind 0.0.0.0:{port}: {err}")]
    Bind { port: u16, err: Errno },

    #[error("failed to listen on server socket: {0}")]
    Listen(Errno),

    #[error("failed to accept connection: {0}")]
    Accept(Errno),
}

fn main() -> ExitCode {
    let options = Options::parse();

    if let Err(err) = init_logging(options.error_log.as_deref()) {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    match run(&options) {
        Ok(never) => match never {},
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Route the `log` facade at stderr, or at the requested error-log file.
/// The file must already exist; it is appended to, never truncated.
fn init_logging(error_log: Option<&Path>) -> Result<(), ServerError> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = error_log {
        let file = open_log(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn open_log(path: &Path) -> Result<File, ServerError> {
    OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|err| ServerError::LogFile {
            path: path.to_owned(),
            err,
        })
}

/// One timestamped line per accepted connection.
struct AccessLog {
    sink: Box<dyn Write>,
}

impl AccessLog {
    fn open(path: Option<&Path>) -> Result<AccessLog, ServerError> {
        let sink: Box<dyn Write> = match path {
            Some(path) => Box::new(open_log(path)?),
            None => Box::new(io::stdout()),
        };
        Ok(AccessLog { sink })
    }

    fn record(&mut self, peer: Option<SockaddrIn>) {
        let now = humantime::format_rfc3339_seconds(SystemTime::now());
        let written = match peer {
            Some(peer) => writeln!(self.sink, "[{now}] connection from {peer}"),
            None => writeln!(self.sink, "[{now}] connection from unknown peer"),
        };
        if written.is_err() {
            log::error!("failed to write access log entry");
        }
        let _ = self.sink.flush();
    }
}

fn run(options: &Options) -> Result<Infallible, ServerError> {
    let mut access_log = AccessLog::open(options.access_log.as_deref())?;

    let listener = socket(
        AddressFamily::Inet,
        SockType::Stream,
        SockFlag::empty(),
        SockProtocol::Tcp,
    )
    .map_err(ServerError::Socket)?;

    // Best effort: losing REUSEADDR only hurts quick restarts.
    if let Err(err) = setsockopt(&listener, sockopt::ReuseAddr, &true) {
        log::error!("failed to set SO_REUSEADDR: {err}");
    }

    let address = SockaddrIn::new(0, 0, 0, 0, options.port);
    bind(listener.as_raw_fd(), &address).map_err(|err| ServerError::Bind {
        port: options.port,
        err,
    })?;
    let backlog = Backlog::new(options.queue_size).map_err(ServerError::Listen)?;
    listen(&listener, backlog).map_err(ServerError::Listen)?;
    log::info!("listening on 0.0.0.0:{}", options.port);

    loop {
        match accept(listener.as_raw_fd()) {
            Ok(fd) => {
                let connection = unsafe { OwnedFd::from_raw_fd(fd) };
                access_log.record(getpeername::<SockaddrIn>(connection.as_raw_fd()).ok());
                dispatch(&listener, connection);
            }
            // The connection died between arriving and being accepted;
            // the server has not.
            Err(err @ (Errno::ECONNABORTED | Errno::EINTR | Errno::EPROTO)) => {
                log::error!("failed to accept connection: {err}");
            }
            Err(err) => return Err(ServerError::Accept(err)),
        }
    }
}

/// Hand `connection` to a fresh child and wait it out.
fn dispatch(listener: &OwnedFd, connection: OwnedFd) {
    match unsafe { fork() } {
        Err(err) => {
            // This request is lost; the server keeps accepting.
            log::error!("failed to fork request child: {err}");
        }
        Ok(ForkResult::Child) => {
            // The child's copy of the listener must not outlive the
            // request, or a dying parent would leave the port held.
            unsafe { libc::close(listener.as_raw_fd()) };
            match request::serve(connection) {
                Ok(never) => match never {},
                Err(err) => {
                    log::error!("request failed: {err}");
                    process::exit(1);
                }
            }
        }
        Ok(ForkResult::Parent { child }) => {
            drop(connection);
            match waitpid(child, None) {
                Ok(WaitStatus::Exited(_, 0)) => {}
                Ok(WaitStatus::Exited(_, code)) => {
                    log::warn!("request child exited with status {code}");
                }
                Ok(WaitStatus::Signaled(_, signal, _)) => {
                    log::warn!("request child killed by {signal:?}");
                }
                Ok(status) => log::warn!("unexpected request child status {status:?}"),
                Err(err) => log::error!("failed to wait for request child: {err}"),
            }
        }
    }
}
