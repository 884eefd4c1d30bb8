//! Input sources feeding the control thread
//!
//! The controller consumes position vectors from any producer honoring the
//! input contract: exactly [`NUM_JOINTS`](crate::joints::NUM_JOINTS)
//! in-range angles. A GUI thread reading sliders and the remote listener
//! below are interchangeable.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::comm::{decode_line, LinkChannel, Sender, WireFrame};
use crate::joints::PositionVector;
use crate::{Error, Result};

/// Idle delay between receive polls
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spawn a reader thread that decodes position vectors off `link` and
/// forwards them into `tx`.
///
/// The loop checks `stop` every iteration and sleeps [`POLL_INTERVAL`]
/// when no line is pending, so cancellation lands between polls, never
/// mid-read. Undecodable lines are logged and dropped; legacy
/// single-index frames are ignored at debug level. The thread also exits
/// when the receiving side hangs up.
pub fn spawn_remote_listener<S>(
    mut link: LinkChannel<S>,
    tx: Sender<PositionVector>,
    stop: Arc<AtomicBool>,
) -> Result<JoinHandle<()>>
where
    S: Read + Write + Send + 'static,
{
    thread::Builder::new()
        .name("remote-listener".into())
        .spawn(move || {
            tracing::info!("remote listener started");
            while !stop.load(Ordering::Relaxed) {
                match link.poll_line() {
                    Some(line) => match decode_line(&line) {
                        Ok(WireFrame::Vector(positions)) => {
                            if tx.send(positions).is_err() {
                                tracing::debug!("input channel closed; stopping listener");
                                break;
                            }
                        }
                        Ok(WireFrame::Index(index)) => {
                            tracing::debug!(index, "ignoring legacy single-position frame");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "dropping undecodable input line");
                        }
                    },
                    None => thread::sleep(POLL_INTERVAL),
                }
            }
            tracing::info!("remote listener stopped");
        })
        .map_err(|e| Error::Config(format!("failed to spawn listener thread: {}", e)))
}
