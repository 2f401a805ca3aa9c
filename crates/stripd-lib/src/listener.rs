//! UDP listener — single-threaded receive loop feeding the dispatcher.
//!
//! The loop waits on the socket with a read timeout that expires at the
//! next pending status restore (capped at [`POLL_INTERVAL`] so the running
//! flag is observed promptly), handles at most one datagram, then runs any
//! restores that came due.

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::dispatch::{Dispatcher, Outcome};
use crate::driver::LedDriver;
use crate::error::Result;

/// Default UDP port.
pub const DEFAULT_PORT: u16 = 8089;

/// Largest datagram read; longer payloads are truncated by the socket.
pub const MAX_DATAGRAM: usize = 1024;

/// Longest single wait on the socket.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Listener lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Unbound,
    Listening,
    Processing,
    Terminated,
}

/// Why [`Listener::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `restart()` received.
    Restart,
    /// Running flag cleared (Ctrl+C / SIGTERM).
    Shutdown,
}

pub struct Listener<D: LedDriver> {
    socket: Option<UdpSocket>,
    dispatcher: Dispatcher<D>,
    state: ListenerState,
}

impl<D: LedDriver> Listener<D> {
    pub fn new(dispatcher: Dispatcher<D>) -> Self {
        Listener {
            socket: None,
            dispatcher,
            state: ListenerState::Unbound,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn dispatcher(&self) -> &Dispatcher<D> {
        &self.dispatcher
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Bind the socket and show the ready flash.
    pub fn bind(&mut self, addr: impl ToSocketAddrs) -> Result<SocketAddr> {
        let socket = UdpSocket::bind(addr)?;
        let local = socket.local_addr()?;
        self.socket = Some(socket);
        self.state = ListenerState::Listening;
        log::info!("[listener] listening on udp://{local}");
        self.dispatcher.ready(Instant::now());
        Ok(local)
    }

    /// Wait up to `max_wait` (or until the next restore) for one datagram.
    ///
    /// Returns the outcome of the datagram handled, or `None` on timeout.
    pub fn poll_once(&mut self, max_wait: Duration) -> Result<Option<Outcome>> {
        let Some(socket) = self.socket.as_ref() else {
            return Err(std::io::Error::new(ErrorKind::NotConnected, "listener is not bound").into());
        };

        let now = Instant::now();
        let wait = match self.dispatcher.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(now).min(max_wait),
            None => max_wait,
        };
        // A zero timeout is rejected by the socket layer.
        socket.set_read_timeout(Some(wait.max(Duration::from_millis(1))))?;

        let mut buf = [0u8; MAX_DATAGRAM];
        let outcome = match socket.recv_from(&mut buf) {
            Ok((len, src)) => {
                self.state = ListenerState::Processing;
                log::debug!(
                    "[listener] {len} bytes from {src}: {:?}",
                    String::from_utf8_lossy(&buf[..len])
                );
                let outcome = self.dispatcher.handle(&buf[..len], Instant::now());
                self.state = if outcome == Outcome::Restart {
                    ListenerState::Terminated
                } else {
                    ListenerState::Listening
                };
                Some(outcome)
            }
            Err(e) if is_idle(&e) => None,
            // Oversized datagrams (WSAEMSGSIZE on Windows) and stray ICMP
            // errors land here; the socket itself is still usable.
            Err(e) => {
                log::warn!("[listener] receive failed: {e}");
                Some(self.dispatcher.reject(Instant::now()))
            }
        };

        self.dispatcher.tick(Instant::now());
        Ok(outcome)
    }

    /// Serve until `restart()` arrives or `running` is cleared.
    ///
    /// On shutdown the strip is blanked; on restart it is left as is for
    /// the next process to take over.
    pub fn run(&mut self, running: &AtomicBool) -> Result<ExitReason> {
        while running.load(Ordering::SeqCst) {
            if self.poll_once(POLL_INTERVAL)? == Some(Outcome::Restart) {
                return Ok(ExitReason::Restart);
            }
        }
        log::info!("[listener] shutting down");
        self.state = ListenerState::Terminated;
        self.dispatcher.shutdown();
        Ok(ExitReason::Shutdown)
    }
}

/// Receive errors that only mean no datagram arrived in time.
fn is_idle(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
    )
}
