//! Channels connecting input sources to the control thread
//!
//! Any producer of validated position vectors, whether a GUI thread reading
//! sliders, a remote listener decoding wire lines, hands them to the
//! control thread through one of these. Thin wrappers over
//! crossbeam-channel that map disconnection and backpressure onto the
//! crate's error taxonomy.

use std::time::Duration;

use crossbeam_channel::{self as cc, RecvTimeoutError, TryRecvError, TrySendError};

use crate::{Error, Result};

/// Sender half of an input-source channel
#[derive(Debug)]
pub struct Sender<T> {
    inner: cc::Sender<T>,
}

impl<T> Sender<T> {
    /// Send a value, blocking until space is available
    #[inline]
    pub fn send(&self, value: T) -> Result<()> {
        self.inner.send(value).map_err(|_| Error::ChannelClosed)
    }

    /// Try to send without blocking
    #[inline]
    pub fn try_send(&self, value: T) -> Result<()> {
        match self.inner.try_send(value) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(Error::ChannelFull),
            Err(TrySendError::Disconnected(_)) => Err(Error::ChannelClosed),
        }
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Receiver half of an input-source channel
#[derive(Debug)]
pub struct Receiver<T> {
    inner: cc::Receiver<T>,
}

impl<T> Receiver<T> {
    /// Receive a value, blocking until one is available
    #[inline]
    pub fn recv(&self) -> Result<T> {
        self.inner.recv().map_err(|_| Error::ChannelClosed)
    }

    /// Try to receive without blocking; `Ok(None)` when the channel is empty
    #[inline]
    pub fn try_recv(&self) -> Result<Option<T>> {
        match self.inner.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    /// Receive with a timeout; `Ok(None)` when nothing arrived in time
    #[inline]
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<T>> {
        match self.inner.recv_timeout(timeout) {
            Ok(value) => Ok(Some(value)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::ChannelClosed),
        }
    }
}

/// Create a bounded channel. An input source hitting the bound observes
/// [`Error::ChannelFull`] from `try_send` rather than racing the controller.
pub fn bounded_channel<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = cc::bounded(capacity);
    (Sender { inner: tx }, Receiver { inner: rx })
}

/// Create an unbounded channel
pub fn unbounded_channel<T>() -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = cc::unbounded();
    (Sender { inner: tx }, Receiver { inner: rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_recv() {
        let (tx, rx) = bounded_channel(4);
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        assert_eq!(rx.recv().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), Some(2));
        assert_eq!(rx.try_recv().unwrap(), None);
    }

    #[test]
    fn test_full_bounded_channel() {
        let (tx, _rx) = bounded_channel(1);
        tx.try_send(1).unwrap();
        assert!(matches!(tx.try_send(2), Err(Error::ChannelFull)));
    }

    #[test]
    fn test_closed_channel() {
        let (tx, rx) = bounded_channel::<u32>(1);
        drop(rx);
        assert!(matches!(tx.send(1), Err(Error::ChannelClosed)));

        let (tx, rx) = bounded_channel::<u32>(1);
        drop(tx);
        assert!(matches!(rx.recv(), Err(Error::ChannelClosed)));
    }

    #[test]
    fn test_recv_timeout_empty() {
        let (_tx, rx) = bounded_channel::<u32>(1);
        let got = rx.recv_timeout(Duration::from_millis(5)).unwrap();
        assert_eq!(got, None);
    }
}
