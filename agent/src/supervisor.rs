//! Capture subprocess lifecycle: spawn, monitor, restart, terminate (§4.3).
//!
//! Grounded in this codebase's UDP hub loop (`uwb_hub.rs`'s "never crash on
//! recv error, just warn and continue") but for a child process rather than
//! a socket: an unexpected exit is logged and the process is respawned,
//! never propagated as a fatal error.

use std::process::{Child, Command};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

pub struct CaptureSupervisor {
    argv: Vec<String>,
    running: Arc<AtomicBool>,
}

impl CaptureSupervisor {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    fn spawn(&self) -> std::io::Result<Child> {
        let (cmd, args) = self.argv.split_first().expect("argv must be non-empty");
        Command::new(cmd).args(args).spawn()
    }

    /// Run the supervision loop on the calling thread until `stop()` is
    /// called from another thread. Intended to be the body of its own
    /// dedicated supervisor thread.
    pub fn run(&self) {
        self.running.store(true, Ordering::SeqCst);
        let mut child = match self.spawn() {
            Ok(c) => c,
            Err(e) => {
                warn!("capture subprocess failed to start: {e}");
                return;
            }
        };

        loop {
            thread::sleep(Duration::from_secs(1));
            match child.try_wait() {
                Ok(Some(status)) => {
                    if self.running.load(Ordering::SeqCst) {
                        warn!("capture subprocess exited unexpectedly ({status}); restarting");
                        match self.spawn() {
                            Ok(c) => child = c,
                            Err(e) => {
                                warn!("capture subprocess failed to restart: {e}");
                                return;
                            }
                        }
                    } else {
                        break;
                    }
                }
                Ok(None) => {
                    if !self.running.load(Ordering::SeqCst) {
                        terminate_gracefully(&mut child);
                        break;
                    }
                }
                Err(e) => {
                    warn!("error polling capture subprocess: {e}");
                }
            }
        }
    }

    /// Request graceful shutdown. The running supervisor loop notices at its
    /// next 1s poll boundary, attempts graceful termination, waits up to 5s,
    /// then force-kills.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

fn terminate_gracefully(child: &mut Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    // SIGTERM first, give the process up to 5s to exit on its own, then
    // force-kill. std::process::Child::kill() is always SIGKILL, so the
    // graceful half of this needs nix.
    let _ = kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM);
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                info!("capture subprocess stopped (exit: {status})");
                return;
            }
            Ok(None) if std::time::Instant::now() >= deadline => {
                warn!("capture subprocess did not stop within 5s; force-killing");
                let _ = child.kill();
                let _ = child.wait();
                return;
            }
            Ok(None) => thread::sleep(Duration::from_millis(100)),
            Err(e) => {
                warn!("error waiting for capture subprocess to stop: {e}");
                return;
            }
        }
    }
}
