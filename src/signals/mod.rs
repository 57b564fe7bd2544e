//! OS signal wiring.
//!
//! Handlers do as little as possible. The interrupt handler forwards a
//! shutdown event from ctrlc's dedicated thread; the Unix USR1/ALRM handler
//! writes one tag byte to a self-pipe. A watcher thread drains the pipe and
//! turns tag bytes into control events, so everything that touches locks,
//! channels, or the allocator runs on ordinary threads.

use crate::monitor::ControlSender;

/// Install all signal handlers.
///
/// SIGINT requests shutdown. On Unix, SIGUSR1 additionally requests a
/// reshuffle and SIGALRM forces an immediate dump.
pub fn install(events: ControlSender) -> Result<(), Box<dyn std::error::Error>> {
    let interrupt_events = events.clone();
    ctrlc::set_handler(move || {
        interrupt_events.shutdown();
    })?;

    #[cfg(unix)]
    self_pipe::install(events)?;
    #[cfg(not(unix))]
    let _ = events;

    Ok(())
}

#[cfg(unix)]
mod self_pipe {
    use crate::monitor::ControlSender;
    use log::{debug, warn};
    use std::io;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::thread;

    /// Write end of the notification pipe, shared with the signal handler.
    static PIPE_WRITE_FD: AtomicI32 = AtomicI32::new(-1);

    /// Signal handler: only async-signal-safe calls are allowed here, so it
    /// writes the signal number as one tag byte and returns.
    extern "C" fn forward_signal(signal: libc::c_int) {
        let fd = PIPE_WRITE_FD.load(Ordering::Relaxed);
        if fd >= 0 {
            let tag = [signal as u8];
            unsafe {
                libc::write(fd, tag.as_ptr() as *const libc::c_void, 1);
            }
        }
    }

    pub fn install(events: ControlSender) -> Result<(), Box<dyn std::error::Error>> {
        let mut fds = [0 as libc::c_int; 2];
        if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
            return Err(Box::new(io::Error::last_os_error()));
        }
        let (read_fd, write_fd) = (fds[0], fds[1]);
        // The handler must never block on a full pipe.
        if unsafe { libc::fcntl(write_fd, libc::F_SETFL, libc::O_NONBLOCK) } != 0 {
            return Err(Box::new(io::Error::last_os_error()));
        }
        PIPE_WRITE_FD.store(write_fd, Ordering::SeqCst);

        for signal in [libc::SIGUSR1, libc::SIGALRM] {
            register(signal)?;
        }

        // The watcher lives for the rest of the process; it is never joined.
        thread::Builder::new()
            .name("signal-watcher".to_string())
            .spawn(move || watch(read_fd, events))
            .map_err(|e| format!("failed to spawn signal watcher: {}", e))?;
        Ok(())
    }

    fn register(signal: libc::c_int) -> io::Result<()> {
        let handler: extern "C" fn(libc::c_int) = forward_signal;
        let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
        action.sa_sigaction = handler as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        unsafe {
            libc::sigemptyset(&mut action.sa_mask);
            if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    /// Blocking read loop on the pipe. One read may batch several
    /// deliveries; each distinct tag in a batch forwards at most one event.
    fn watch(read_fd: libc::c_int, events: ControlSender) {
        let mut buf = [0u8; 64];
        loop {
            let n = unsafe {
                libc::read(read_fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len())
            };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.raw_os_error() == Some(libc::EINTR) {
                    continue;
                }
                warn!("signal pipe read failed: {}", err);
                return;
            }
            if n == 0 {
                return;
            }
            let batch = &buf[..n as usize];
            if batch.contains(&(libc::SIGUSR1 as u8)) {
                debug!("reshuffle signal received");
                events.reshuffle();
            }
            if batch.contains(&(libc::SIGALRM as u8)) {
                debug!("dump signal received");
                events.dump();
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::monitor::{control_channel, ControlEvent};
    use std::time::Duration;

    // One test exercises both signals; ctrlc allows only one handler
    // installation per process.
    #[test]
    fn raised_signals_become_events() {
        let (tx, rx) = control_channel();
        install(tx).unwrap();

        unsafe { libc::raise(libc::SIGUSR1) };
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            ControlEvent::Reshuffle
        );

        unsafe { libc::raise(libc::SIGALRM) };
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            ControlEvent::Dump
        );
    }
}
