//! Drive the controller end of the link from the command line.
//!
//! Opens the serial port named by the first argument (degrading gracefully
//! when no robot is attached), applies the startup pose, then runs the
//! canned demo: snapshot, sit, stand, wave, undo.
//!
//! Run with: cargo run --example teleop -- /dev/ttyUSB0

use std::sync::atomic::AtomicBool;

use quadlink_core::{
    JsonFileStore, LinkConfig, PositionVector, SerialLink, StateController,
};

fn main() -> quadlink_core::Result<()> {
    tracing_subscriber::fmt::init();

    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    let link = SerialLink::open(&LinkConfig::new(port));
    let store = JsonFileStore::open("robot-state")?;
    let mut controller = StateController::new(link, store);

    let startup = PositionVector::default();
    controller.apply(&startup);
    controller.snapshot_current(&startup)?;

    controller.toggle_sit_stand()?;
    controller.toggle_sit_stand()?;

    let cancel = AtomicBool::new(false);
    controller.wave(&cancel)?;

    controller.undo()?;
    controller.close();
    Ok(())
}
