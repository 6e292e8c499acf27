//! Sandbox closure: once installed, the filter must kill a process that
//! strays off the allow-list, while leaving the connection socket usable.
//!
//! Kept as a single test so this binary's harness stays single-threaded:
//! the test forks, and forking a multi-threaded harness can wedge the
//! child inside the allocator.

use std::io::Read;
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixStream;

use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult};

fn in_sandboxed_child(child_body: impl FnOnce(&UnixStream)) -> (WaitStatus, UnixStream) {
    let (parent_end, child_end) = UnixStream::pair().expect("socketpair failed");

    match unsafe { fork() }.expect("fork failed") {
        ForkResult::Child => {
            if ubench::sandbox::install(child_end.as_raw_fd()).is_err() {
                unsafe { libc::_exit(2) };
            }
            child_body(&child_end);
            unsafe { libc::_exit(0) };
        }
        ForkResult::Parent { child } => {
            drop(child_end);
            let status = waitpid(child, None).expect("waitpid failed");
            (status, parent_end)
        }
    }
}

#[test]
fn sandbox_closes_over_the_syscall_surface() {
    // A kernel that tries to open a file dies on the spot: openat is not in
    // the allow-list, so the filter traps and SIGSYS's default disposition
    // kills the child.
    let (status, _) = in_sandboxed_child(|_socket| unsafe {
        libc::syscall(
            libc::SYS_openat,
            libc::AT_FDCWD,
            b"/etc/passwd\0".as_ptr(),
            libc::O_RDONLY,
        );
        // Only reachable if the filter let openat through.
        libc::_exit(3);
    });
    assert_eq!(status_signal(status), Some(Signal::SIGSYS));

    // Writing to any descriptor other than the connection is a kill, even
    // one as ordinary as stderr.
    let (status, _) = in_sandboxed_child(|_socket| unsafe {
        libc::write(libc::STDERR_FILENO, b"escape\n".as_ptr().cast(), 7);
        libc::_exit(3);
    });
    assert_eq!(status_signal(status), Some(Signal::SIGSYS));

    // The connection socket itself stays writable, and a clean exit is
    // still possible afterwards.
    let (status, mut parent_end) = in_sandboxed_child(|socket| unsafe {
        libc::write(socket.as_raw_fd(), b"ok".as_ptr().cast(), 2);
    });
    assert!(
        matches!(status, WaitStatus::Exited(_, 0)),
        "sandboxed child did not exit cleanly: {status:?}"
    );
    let mut reply = [0_u8; 2];
    parent_end.read_exact(&mut reply).expect("no bytes arrived");
    assert_eq!(&reply, b"ok");
}

fn status_signal(status: WaitStatus) -> Option<Signal> {
    match status {
        WaitStatus::Signaled(_, signal, _) => Some(signal),
        _ => None,
    }
}
