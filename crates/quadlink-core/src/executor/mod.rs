//! Device-side executor: decode wire lines, drive PWM outputs
//!
//! The executor is the consuming end of the wire contract. Its listener
//! polls the link for complete lines, decodes them, and fans each joint
//! angle out to a [`PwmDriver`], the seam in front of the physical PWM
//! peripherals. Decode failures are logged and dropped; nothing a peer
//! sends can take the listener down.

pub mod pwm;

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::comm::{decode_line, LinkChannel, WireFrame};
use crate::Result;

pub use pwm::{degrees_to_duty, PwmConfig};

/// Sink for per-joint duty values; implemented over the PWM peripherals
pub trait PwmDriver: Send {
    /// Apply a 16-bit duty value to one joint's PWM output
    fn set_duty(&mut self, joint: usize, duty: u16) -> Result<()>;
}

/// Listener tuning
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Idle delay between receive polls
    pub idle_interval: Duration,
    /// Pulse mapping for the PWM outputs
    pub pulse: PwmConfig,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            idle_interval: Duration::from_millis(100),
            pulse: PwmConfig::default(),
        }
    }
}

/// Run the receive loop until `stop` is set.
///
/// Polls `link` for complete lines, sleeping `idle_interval` between empty
/// polls to avoid busy-waiting; the stop flag is checked once per
/// iteration, so cancellation is cooperative and never interrupts the
/// handling of a line already received. Fails only on invalid
/// configuration; wire-level problems are logged and survived.
pub fn run_listener<S, D>(
    link: &mut LinkChannel<S>,
    driver: &mut D,
    config: &ListenerConfig,
    stop: &AtomicBool,
) -> Result<()>
where
    S: Read + Write,
    D: PwmDriver,
{
    config.pulse.validate()?;
    tracing::info!("executor listener started");

    while !stop.load(Ordering::Relaxed) {
        match link.poll_line() {
            Some(line) => handle_line(&line, driver, &config.pulse),
            None => thread::sleep(config.idle_interval),
        }
    }

    tracing::info!("executor listener stopped");
    Ok(())
}

fn handle_line<D: PwmDriver>(line: &str, driver: &mut D, pulse: &PwmConfig) {
    match decode_line(line) {
        Ok(WireFrame::Vector(positions)) => {
            for (joint, degrees) in positions.iter().enumerate() {
                let duty = degrees_to_duty(degrees, pulse);
                if let Err(e) = driver.set_duty(joint, duty) {
                    tracing::warn!(joint, error = %e, "PWM write failed");
                }
            }
        }
        Ok(WireFrame::Index(index)) => {
            // Legacy single-position frame; accepted but deprecated.
            tracing::debug!(position = index, "position acquired");
        }
        Err(e) => {
            tracing::warn!(error = %e, "dropping undecodable line");
        }
    }
}
