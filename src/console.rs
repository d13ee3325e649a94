//! The terminal contract the core depends on, and a real implementation of it.
//!
//! The simulator core never touches stdin/stdout raw-mode plumbing directly;
//! it only calls [`ConsoleIo::check_key`] and [`ConsoleIo::read_char`]. That
//! keeps the instruction handlers and memory-mapped I/O testable against a
//! scripted fake, and keeps the one piece of `unsafe`-adjacent OS interaction
//! (termios) confined to this module.

use std::io::{self, Read, Write};
use std::mem;
use std::os::unix::io::RawFd;
use termios::{tcgetattr, tcsetattr, Termios, ECHO, ICANON, TCSANOW};

/// The two capabilities `mem_read`/the TRAP routines need from the host
/// terminal: a non-blocking poll and a blocking single-byte read.
pub trait ConsoleIo {
    /// True iff stdin currently has at least one byte available without
    /// blocking.
    fn check_key(&mut self) -> bool;

    /// Blocking read of one byte, not echoed.
    fn read_char(&mut self) -> u8;
}

const STDIN_FILENO: RawFd = 0;

/// Raw-mode terminal adapter. Disables canonical line mode and echo on
/// construction; restores the prior mode on drop, so that any return path
/// out of `main` (success, error, or unwind) leaves the user's shell intact.
pub struct Terminal {
    original: Termios,
}

impl Terminal {
    /// Switches stdin to non-canonical, non-echoing mode and returns a guard
    /// that restores it when dropped.
    pub fn acquire() -> io::Result<Terminal> {
        let original = tcgetattr(STDIN_FILENO)?;

        let mut raw = original;
        raw.c_lflag &= !(ICANON | ECHO);
        tcsetattr(STDIN_FILENO, TCSANOW, &raw)?;

        Ok(Terminal { original })
    }

    /// Restores the terminal mode captured at [`Terminal::acquire`]. Swallows
    /// errors since there is nothing more to do if the restore itself fails
    /// during shutdown.
    pub fn restore(&self) {
        restore_termios(&self.original);
    }

    /// A cheap, independently ownable handle on the original terminal mode,
    /// for handing to a signal handler that outlives any borrow of `self`.
    pub fn restore_handle(&self) -> RestoreHandle {
        RestoreHandle {
            original: self.original,
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.restore();
    }
}

/// An owned snapshot of the pre-raw-mode terminal settings, cheap to move
/// into a `'static` closure such as a `ctrlc` handler.
pub struct RestoreHandle {
    original: Termios,
}

impl RestoreHandle {
    pub fn restore(&self) {
        restore_termios(&self.original);
    }
}

fn restore_termios(original: &Termios) {
    let _ = tcsetattr(STDIN_FILENO, TCSANOW, original);
}

impl ConsoleIo for Terminal {
    fn check_key(&mut self) -> bool {
        // SAFETY: `readfds` is a plain-old-data `fd_set` zeroed and populated
        // before the call; `select` is given a zeroed `timeval` so it polls
        // without blocking and returns immediately.
        unsafe {
            let mut readfds: libc::fd_set = mem::zeroed();
            libc::FD_ZERO(&mut readfds);
            libc::FD_SET(STDIN_FILENO, &mut readfds);

            let mut timeout = libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            };

            let ready = libc::select(
                STDIN_FILENO + 1,
                &mut readfds,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                &mut timeout,
            );

            ready == 1
        }
    }

    fn read_char(&mut self) -> u8 {
        let mut buffer = [0; 1];
        io::stdin()
            .read_exact(&mut buffer)
            .expect("unable to read from stdin");
        buffer[0]
    }
}

/// Emits `text` to `out` and flushes immediately; every TRAP that produces
/// console output defeats line buffering this way (spec: OUT/PUTS/IN/PUTSP/
/// HALT all flush).
pub fn write_flushed(out: &mut dyn Write, text: &str) {
    let _ = out.write_all(text.as_bytes());
    let _ = out.flush();
}

#[cfg(test)]
pub(crate) mod fake {
    use super::ConsoleIo;

    /// A scripted `ConsoleIo` for tests: yields queued bytes one at a time,
    /// reporting a key as available only while the queue is non-empty.
    pub struct FakeConsole {
        pending: std::collections::VecDeque<u8>,
    }

    impl FakeConsole {
        pub fn new(bytes: &[u8]) -> Self {
            Self {
                pending: bytes.iter().copied().collect(),
            }
        }
    }

    impl ConsoleIo for FakeConsole {
        fn check_key(&mut self) -> bool {
            !self.pending.is_empty()
        }

        fn read_char(&mut self) -> u8 {
            self.pending.pop_front().unwrap_or(0)
        }
    }
}
