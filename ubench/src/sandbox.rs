//! Confinement for the process about to run a submitted kernel.
//!
//! Installed once per request child, after the counters are open and the
//! argument buffers exist, immediately before the first untrusted
//! instruction executes. Three layers, in order:
//!
//! 1.  a CPU-time rlimit, so a kernel that spins is killed by the operating
//!     system after three seconds;
//! 2.  `PR_SET_NO_NEW_PRIVS`, which both drops privilege escalation and is
//!     what lets an unprivileged process install a seccomp filter at all;
//! 3.  a seccomp-BPF filter that reduces the syscall surface to what the
//!     measurement loop itself needs.
//!
//! The filter admits counter reads and control (`read`, `ioctl`), the
//! allocator's anonymous mappings (`mmap` with fd -1, `munmap`), runtime
//! odds and ends (`clock_gettime`, `futex`, `sched_yield`, `rt_sigreturn`),
//! and process exit. Writing is possible on exactly one descriptor, the
//! connection socket, whose number is baked into the filter, along with
//! the `lseek`/`fstat` the C library may issue on it. Touching any other
//! descriptor is an immediate kill; any syscall outside the list traps with
//! `SIGSYS`. Nothing here can be undone: once installed, the filter holds
//! until the process exits.

use std::io;
use std::mem;
use std::os::unix::io::RawFd;

use libc::{sock_filter, sock_fprog};
use memoffset::offset_of;

use crate::check_errno_syscall;

/// Soft and hard CPU-time limit for the request child, in seconds.
const CPU_TIME_LIMIT: u64 = 3;

/// `AUDIT_ARCH_X86_64` from `linux/audit.h` (`EM_X86_64 | __AUDIT_ARCH_64BIT |
/// __AUDIT_ARCH_LE`); not exposed by the `libc` crate.
const AUDIT_ARCH_X86_64: u32 = 0xc000_003e;

/// Install the full sandbox around the calling process.
///
/// `connection` is the only descriptor the process will be able to write
/// to afterwards. Each failing step is reported as the error of the prctl
/// or setrlimit call behind it; a caller that sees any error must treat
/// the process as unusable for untrusted code and exit.
pub fn install(connection: RawFd) -> io::Result<()> {
    let cpu_limit = libc::rlimit {
        rlim_cur: CPU_TIME_LIMIT,
        rlim_max: CPU_TIME_LIMIT,
    };
    check_errno_syscall(|| unsafe { libc::setrlimit(libc::RLIMIT_CPU, &cpu_limit) })?;

    check_errno_syscall(|| unsafe {
        libc::prctl(libc::PR_SET_NO_NEW_PRIVS, 1_u64, 0_u64, 0_u64, 0_u64)
    })?;

    let filter = build_filter(connection);
    let program = sock_fprog {
        len: filter.len() as u16,
        filter: filter.as_ptr() as *mut sock_filter,
    };
    check_errno_syscall(|| unsafe {
        libc::prctl(
            libc::PR_SET_SECCOMP,
            libc::SECCOMP_MODE_FILTER as libc::c_ulong,
            &program as *const sock_fprog,
        )
    })?;

    Ok(())
}

const LOAD_WORD: u16 = (libc::BPF_LD | libc::BPF_W | libc::BPF_ABS) as u16;
const JUMP_EQ: u16 = (libc::BPF_JMP | libc::BPF_JEQ | libc::BPF_K) as u16;
const RETURN: u16 = (libc::BPF_RET | libc::BPF_K) as u16;

const fn stmt(code: u16, k: u32) -> sock_filter {
    sock_filter {
        code,
        jt: 0,
        jf: 0,
        k,
    }
}

const fn jump_eq(k: u32, jt: u8, jf: u8) -> sock_filter {
    sock_filter {
        code: JUMP_EQ,
        jt,
        jf,
        k,
    }
}

fn arch_offset() -> u32 {
    offset_of!(libc::seccomp_data, arch) as u32
}

fn nr_offset() -> u32 {
    offset_of!(libc::seccomp_data, nr) as u32
}

/// Offset of the low word of syscall argument `n`. BPF loads are 32-bit;
/// for the descriptor comparisons the low word is the whole story.
fn arg_offset(n: usize) -> u32 {
    (offset_of!(libc::seccomp_data, args) + n * mem::size_of::<u64>()) as u32
}

fn build_filter(connection: RawFd) -> Vec<sock_filter> {
    let connection = connection as u32;

    let mut filter = vec![
        // Syscall numbers are only meaningful within one architecture.
        stmt(LOAD_WORD, arch_offset()),
        jump_eq(AUDIT_ARCH_X86_64, 1, 0),
        stmt(RETURN, libc::SECCOMP_RET_KILL),
        stmt(LOAD_WORD, nr_offset()),
    ];

    // Unconditionally allowed.
    for nr in [
        libc::SYS_rt_sigreturn,
        libc::SYS_exit_group,
        libc::SYS_exit,
        libc::SYS_read,
        libc::SYS_munmap,
        libc::SYS_ioctl,
        libc::SYS_clock_gettime,
        libc::SYS_futex,
        libc::SYS_sched_yield,
    ] {
        filter.push(jump_eq(nr as u32, 0, 1));
        filter.push(stmt(RETURN, libc::SECCOMP_RET_ALLOW));
    }

    // Allowed only against the connection socket. lseek and fstat are what
    // the C library issues around writes to a descriptor it has not seen
    // before.
    for nr in [libc::SYS_write, libc::SYS_lseek, libc::SYS_fstat] {
        filter.extend(argument_gated(nr as u32, 0, connection));
    }

    // Allow only anonymous mappings (descriptor argument == -1).
    filter.extend(argument_gated(libc::SYS_mmap as u32, 4, u32::MAX));

    filter.push(stmt(RETURN, libc::SECCOMP_RET_TRAP));
    filter
}

/// Admit syscall `nr` only when the low word of argument `arg` equals
/// `expected`; a mismatch kills the process. The accumulator is clobbered
/// only on paths that return, so fall-through still holds the syscall
/// number.
fn argument_gated(nr: u32, arg: usize, expected: u32) -> [sock_filter; 5] {
    [
        jump_eq(nr, 0, 4),
        stmt(LOAD_WORD, arg_offset(arg)),
        jump_eq(expected, 0, 1),
        stmt(RETURN, libc::SECCOMP_RET_ALLOW),
        stmt(RETURN, libc::SECCOMP_RET_KILL),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_fits_a_bpf_program() {
        let filter = build_filter(7);
        // sock_fprog.len is 16 bits and the kernel caps programs at
        // BPF_MAXINSNS (4096).
        assert!(filter.len() <= 4096);

        // Every instruction uses one of the three opcodes the builder
        // knows.
        for instruction in &filter {
            assert!([LOAD_WORD, JUMP_EQ, RETURN].contains(&instruction.code));
        }

        // Last resort is the trap, not a fall off the end of the program.
        assert_eq!(filter.last().unwrap().code, RETURN);
        assert_eq!(filter.last().unwrap().k, libc::SECCOMP_RET_TRAP);
    }

    #[test]
    fn filter_bakes_in_the_connection_descriptor() {
        let with_7 = build_filter(7);
        let with_9 = build_filter(9);
        assert_eq!(with_7.len(), with_9.len());

        let differing: Vec<_> = with_7
            .iter()
            .zip(&with_9)
            .filter(|(a, b)| (a.code, a.jt, a.jf, a.k) != (b.code, b.jt, b.jf, b.k))
            .collect();
        // Exactly one comparison per descriptor-gated syscall: write,
        // lseek, fstat.
        assert_eq!(differing.len(), 3);
        for (a, b) in differing {
            assert_eq!(a.k, 7);
            assert_eq!(b.k, 9);
        }
    }

    #[test]
    fn jump_targets_stay_inside_the_program() {
        let filter = build_filter(5);
        for (index, instruction) in filter.iter().enumerate() {
            if instruction.code == JUMP_EQ {
                assert!(index + 1 + (instruction.jt as usize) < filter.len());
                assert!(index + 1 + (instruction.jf as usize) < filter.len());
            }
        }
    }
}
