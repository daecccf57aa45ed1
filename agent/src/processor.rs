//! Per-sniffer pipe creation and blocking read loop (§4.4).

use std::fs::{File, OpenOptions};
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use tracing::{debug, warn};

use bt_types::{decode, SnifferMode};

use crate::error::AgentError;
use crate::store::FingerprintStore;

/// Create `pipes/<mode>`: directory mode 0700, remove any stale file, then
/// `mkfifo`. Returns the pipe's path.
pub fn create_pipe(pipes_dir: &Path, mode: SnifferMode) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(pipes_dir)?;
    std::fs::set_permissions(pipes_dir, std::fs::Permissions::from_mode(0o700))?;

    let pipe_path = pipes_dir.join(mode.pipe_name());
    if pipe_path.exists() {
        std::fs::remove_file(&pipe_path)?;
    }
    mkfifo(&pipe_path, Mode::S_IRUSR | Mode::S_IWUSR)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    Ok(pipe_path)
}

pub struct Processor {
    mode: SnifferMode,
    pipe_path: PathBuf,
    store: Arc<FingerprintStore>,
    antenna_id: u32,
    running: Arc<AtomicBool>,
}

impl Processor {
    pub fn new(
        mode: SnifferMode,
        pipe_path: PathBuf,
        store: Arc<FingerprintStore>,
        antenna_id: u32,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            mode,
            pipe_path,
            store,
            antenna_id,
            running,
        }
    }

    /// Open the pipe and loop: read exactly one record, decode, ingest.
    /// Intended to run on its own dedicated worker thread.
    pub fn run(&self) -> Result<(), AgentError> {
        let mut pipe = OpenOptions::new()
            .read(true)
            .open(&self.pipe_path)
            .map_err(|e| {
                AgentError::Resource(format!("opening pipe {}: {e}", self.pipe_path.display()))
            })?;

        let record_size = self.mode.record_size();
        let mut buf = vec![0u8; record_size];

        loop {
            match read_exact_or_eof(&mut pipe, &mut buf) {
                ReadOutcome::Eof => {
                    debug!("pipe {} closed", self.pipe_path.display());
                    return Ok(());
                }
                ReadOutcome::Read => match decode(self.mode, &buf) {
                    Ok(packet) => {
                        self.store.ingest(self.antenna_id, &packet)?;
                    }
                    Err(e) => {
                        if !self.running.load(Ordering::SeqCst) {
                            debug!("decode failure during shutdown, swallowed: {e}");
                            return Ok(());
                        }
                        return Err(AgentError::from(e));
                    }
                },
                ReadOutcome::Err(e) => {
                    if !self.running.load(Ordering::SeqCst) {
                        return Ok(());
                    }
                    warn!("pipe read error: {e}");
                    return Err(AgentError::Resource(format!("pipe read: {e}")));
                }
            }
        }
    }
}

enum ReadOutcome {
    Read,
    Eof,
    Err(std::io::Error),
}

fn read_exact_or_eof(pipe: &mut File, buf: &mut [u8]) -> ReadOutcome {
    let mut filled = 0;
    while filled < buf.len() {
        match pipe.read(&mut buf[filled..]) {
            Ok(0) => {
                return if filled == 0 {
                    ReadOutcome::Eof
                } else {
                    ReadOutcome::Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "short record before EOF",
                    ))
                }
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return ReadOutcome::Err(e),
        }
    }
    ReadOutcome::Read
}
