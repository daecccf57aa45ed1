//! Antenna-ID bootstrap: resolve this node's server-assigned identifier
//! before any reporter is allowed to send a fingerprint tied to it (§4.7).

use std::sync::{Condvar, Mutex};

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::AgentError;

#[derive(Deserialize)]
struct AntennaResponse {
    #[serde(rename = "antennaId")]
    antenna_id: u32,
}

/// Shared hand-off point: `None` until the bootstrap POST succeeds, then set
/// once and read immutably thereafter.
pub struct AntennaHandle {
    id: Mutex<Option<u32>>,
    cv: Condvar,
}

impl AntennaHandle {
    pub fn new() -> Self {
        Self {
            id: Mutex::new(None),
            cv: Condvar::new(),
        }
    }

    /// POST `hardware_mac` to `/api/Antenna` and populate the handle from the
    /// `{"antennaId": N}` response. Wakes every reporter blocked in `wait()`.
    pub fn bootstrap(
        &self,
        client: &reqwest::blocking::Client,
        base_url: &str,
        hardware_mac: &str,
    ) -> Result<u32, AgentError> {
        let url = format!("{base_url}/api/Antenna");
        let resp = client
            .post(&url)
            .header("Accept", "text/plain")
            .json(&json!({ "address": hardware_mac }))
            .send()
            .map_err(|e| AgentError::Transport(format!("antenna bootstrap: {e}")))?;

        if !resp.status().is_success() {
            return Err(AgentError::Transport(format!(
                "antenna bootstrap: server returned {}",
                resp.status()
            )));
        }

        let parsed: AntennaResponse = resp
            .json()
            .map_err(|e| AgentError::Transport(format!("antenna bootstrap: bad body: {e}")))?;

        let mut guard = self.id.lock().expect("antenna mutex poisoned");
        *guard = Some(parsed.antenna_id);
        info!("antenna bootstrap complete: antennaId={}", parsed.antenna_id);
        self.cv.notify_all();
        Ok(parsed.antenna_id)
    }

    /// Block until the antenna id is known, then return it.
    pub fn wait(&self) -> u32 {
        let mut guard = self.id.lock().expect("antenna mutex poisoned");
        while guard.is_none() {
            guard = self.cv.wait(guard).expect("antenna mutex poisoned");
        }
        guard.expect("loop only exits once Some")
    }
}

impl Default for AntennaHandle {
    fn default() -> Self {
        Self::new()
    }
}
