//! Serial link lifecycle: open, write, poll-read, degrade-on-failure
//!
//! A [`LinkChannel`] is generic over any `Read + Write` transport; production
//! code uses a serial port behind the `serial` feature, tests drive it with
//! in-memory transports. A link that fails to open becomes [Degraded]
//! instead of failing the caller: every operation turns into a logged no-op
//! so the rest of the system (input sources, persistence) stays usable with
//! no robot attached.
//!
//! [Degraded]: LinkState::Degraded

use std::io::{self, Read, Write};
use std::time::Duration;

use crate::{Error, Result};

/// Serial connection parameters
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Serial port path (e.g. "/dev/ttyUSB0" or "COM7")
    pub port: String,
    /// Baud rate (default 9600, matching the executor firmware)
    pub baudrate: u32,
    /// Per-read timeout; reads returning nothing within it count as "no data"
    pub read_timeout: Duration,
}

impl LinkConfig {
    /// Default baud rate of the executor's UART
    pub const DEFAULT_BAUDRATE: u32 = 9600;

    /// Create a config for the given port at the default baud rate
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baudrate: Self::DEFAULT_BAUDRATE,
            read_timeout: Duration::from_millis(100),
        }
    }

    /// Set the baud rate
    pub fn with_baudrate(mut self, baudrate: u32) -> Self {
        self.baudrate = baudrate;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new("/dev/ttyUSB0")
    }
}

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Not connected; `close()` was called or the link was never opened
    Closed,
    /// Transport is live
    Open,
    /// Open attempt or a later write failed; operations are logged no-ops
    Degraded,
}

/// Whether a line actually went out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    NotSent,
}

/// A line-oriented channel over a byte transport.
///
/// Owns the partial-line receive buffer; [`LinkChannel::poll_line`] yields
/// complete lines lazily and can be called forever; the sequence ends only
/// with channel closure or caller cancellation.
pub struct LinkChannel<S> {
    io: Option<S>,
    state: LinkState,
    rx: Vec<u8>,
    fault: Option<String>,
}

impl<S: Read + Write> LinkChannel<S> {
    /// Wrap an already-open transport.
    pub fn over(io: S) -> Self {
        Self {
            io: Some(io),
            state: LinkState::Open,
            rx: Vec::new(),
            fault: None,
        }
    }

    /// Create a degraded channel that accepts and discards every operation.
    pub fn degraded(fault: impl Into<String>) -> Self {
        Self {
            io: None,
            state: LinkState::Degraded,
            rx: Vec::new(),
            fault: Some(fault.into()),
        }
    }

    /// Current lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Whether the transport is live
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == LinkState::Open
    }

    /// The open-time or write-time failure that degraded this link, if any
    #[must_use]
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// Write one line synchronously.
    ///
    /// Never returns an error: on a Degraded or Closed link the line is
    /// dropped with a debug log, and a write failure on an Open link degrades
    /// the channel. Callers observe the result through the outcome.
    pub fn send_line(&mut self, line: &str) -> SendOutcome {
        match self.state {
            LinkState::Open => {}
            LinkState::Degraded => {
                tracing::debug!("link degraded; dropping outgoing line");
                return SendOutcome::NotSent;
            }
            LinkState::Closed => {
                tracing::debug!("link closed; dropping outgoing line");
                return SendOutcome::NotSent;
            }
        }

        let io = self.io.as_mut().expect("open link has a transport");
        match io.write_all(line.as_bytes()) {
            Ok(()) => {
                tracing::trace!(bytes = line.len(), "sent line");
                SendOutcome::Sent
            }
            Err(e) => {
                tracing::warn!(error = %e, "serial write failed; degrading link");
                self.degrade(format!("write failed: {}", e));
                SendOutcome::NotSent
            }
        }
    }

    /// Poll for the next complete line, without blocking beyond the
    /// transport's own read timeout.
    ///
    /// Accumulates available bytes until a `\n` terminator and returns the
    /// line without it. Returns `None` when no complete line is buffered;
    /// call again later. A read failure degrades the channel.
    pub fn poll_line(&mut self) -> Option<String> {
        if let Some(line) = self.take_buffered_line() {
            return Some(line);
        }

        let io = match self.io.as_mut() {
            Some(io) => io,
            None => return None,
        };

        let mut chunk = [0u8; 64];
        loop {
            match io.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    self.rx.extend_from_slice(&chunk[..n]);
                    if self.rx.contains(&b'\n') {
                        break;
                    }
                }
                Err(e)
                    if e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::WouldBlock =>
                {
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "serial read failed; degrading link");
                    self.degrade(format!("read failed: {}", e));
                    break;
                }
            }
        }

        self.take_buffered_line()
    }

    /// Close the transport. Idempotent and safe from any state, including
    /// Degraded.
    pub fn close(&mut self) {
        if self.state == LinkState::Open {
            tracing::info!("closing link");
        }
        self.io = None;
        self.rx.clear();
        self.state = LinkState::Closed;
    }

    fn degrade(&mut self, fault: String) {
        self.io = None;
        self.state = LinkState::Degraded;
        self.fault = Some(fault);
    }

    fn take_buffered_line(&mut self) -> Option<String> {
        let pos = self.rx.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.rx.drain(..=pos).take(pos).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// A link channel over a real serial port
#[cfg(feature = "serial")]
pub type SerialLink = LinkChannel<Box<dyn serialport::SerialPort>>;

#[cfg(feature = "serial")]
impl SerialLink {
    /// Open a serial port, failing with [`Error::LinkUnavailable`].
    ///
    /// For callers that treat a missing link as fatal; most should use
    /// [`SerialLink::open`].
    pub fn try_open(config: &LinkConfig) -> Result<Self> {
        match serialport::new(&config.port, config.baudrate)
            .timeout(config.read_timeout)
            .open()
        {
            Ok(port) => {
                tracing::info!(port = %config.port, baud = config.baudrate, "serial link open");
                Ok(Self::over(port))
            }
            Err(e) => Err(Error::LinkUnavailable(format!(
                "could not open {}: {}",
                config.port, e
            ))),
        }
    }

    /// Open a serial port, degrading on failure instead of failing.
    pub fn open(config: &LinkConfig) -> Self {
        match Self::try_open(config) {
            Ok(link) => link,
            Err(e) => {
                tracing::warn!(error = %e, "serial link degraded");
                Self::degraded(e.to_string())
            }
        }
    }
}
