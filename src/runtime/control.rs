//! Operator stop signals: Ctrl-C or a `q`/`quit`/`stop` line on stdin.

use std::fmt;
use std::io::BufRead;
use std::thread;

use crossbeam_channel::{bounded, Sender};
use tracing::{debug, warn};

/// Why the poller was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// SIGINT / Ctrl-C.
    Interrupted,
    /// The operator typed a stop command.
    Operator,
    /// Neither signal source is available any more.
    ControlLost,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => f.write_str("interrupted"),
            Self::Operator => f.write_str("operator request"),
            Self::ControlLost => f.write_str("control channel lost"),
        }
    }
}

/// Whether a line typed by the operator asks to stop.
#[must_use]
pub fn is_stop_command(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "q" | "quit" | "stop")
}

/// Block until Ctrl-C arrives or the operator types a stop command.
///
/// End of input on stdin is not a stop request; the poller keeps running
/// detached from a terminal until it is interrupted.
#[must_use]
pub fn wait_for_stop_signal() -> StopReason {
    let (tx, rx) = bounded::<StopReason>(2);

    spawn_listener("poller-signal", tx.clone(), listen_for_interrupt);
    spawn_listener("poller-stdin", tx, listen_for_command);

    rx.recv().unwrap_or(StopReason::ControlLost)
}

fn spawn_listener(name: &str, tx: Sender<StopReason>, listen: fn(&Sender<StopReason>)) {
    let spawned = thread::Builder::new()
        .name(name.into())
        .spawn(move || listen(&tx));
    if let Err(e) = spawned {
        warn!(listener = name, error = %e, "Failed to spawn stop listener");
    }
}

fn listen_for_interrupt(tx: &Sender<StopReason>) {
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            warn!(error = %e, "Failed to create signal runtime; Ctrl-C will not stop gracefully");
            return;
        }
    };
    match rt.block_on(tokio::signal::ctrl_c()) {
        Ok(()) => {
            debug!("Ctrl-C received");
            let _ = tx.send(StopReason::Interrupted);
        }
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
    }
}

fn listen_for_command(tx: &Sender<StopReason>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) if is_stop_command(&line) => {
                debug!("Stop command received on stdin");
                let _ = tx.send(StopReason::Operator);
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Stopped reading stdin");
                return;
            }
        }
    }
    debug!("stdin closed");
}
