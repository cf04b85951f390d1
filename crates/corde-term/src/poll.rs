// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Non-blocking stdin reads.
//
// The editor runs render and update on one thread. Instead of a reader
// thread feeding a channel, each update waits on stdin with `poll(2)` for
// at most one frame and reads whatever arrived. A quiet terminal costs one
// timed-out poll per frame.

use std::io;
use std::time::Duration;

/// Bytes read per poll. A keypress is 1-16 bytes; a paste can be more and
/// simply spills into the next frame.
pub const READ_BUF_SIZE: usize = 4096;

/// What a poll found on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Nothing arrived before the timeout.
    Timeout,
    /// This many bytes were read into the buffer.
    Data(usize),
    /// Stdin is closed.
    Eof,
}

/// Wait up to `timeout` for stdin to become readable, then read into `buf`.
///
/// Interrupted polls (`EINTR`, e.g. from `SIGWINCH`) count as a timeout.
///
/// # Errors
///
/// Returns the OS error if `poll` or `read` fails for any other reason.
#[cfg(unix)]
pub fn poll_stdin(buf: &mut [u8], timeout: Duration) -> io::Result<Readiness> {
    let ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);

    let mut pfd = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    let ready = unsafe { libc::poll(&raw mut pfd, 1, ms) };

    if ready < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(Readiness::Timeout);
        }
        return Err(err);
    }
    if ready == 0 {
        return Ok(Readiness::Timeout);
    }
    if pfd.revents & libc::POLLIN == 0 {
        // POLLHUP / POLLERR without data.
        return Ok(Readiness::Eof);
    }

    let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
    match n {
        0 => Ok(Readiness::Eof),
        n if n < 0 => {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                Ok(Readiness::Timeout)
            } else {
                Err(err)
            }
        }
        #[allow(clippy::cast_sign_loss)] // n > 0 here.
        n => Ok(Readiness::Data(n as usize)),
    }
}

/// Without `poll(2)` there is no way to wait with a timeout; report nothing.
#[cfg(not(unix))]
pub fn poll_stdin(_buf: &mut [u8], timeout: Duration) -> io::Result<Readiness> {
    std::thread::sleep(timeout);
    Ok(Readiness::Timeout)
}
