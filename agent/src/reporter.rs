//! Periodic pull from a fingerprint store, formatted for the ingestion API
//! and handed to the HTTP sink (§4.6's sibling for device fingerprints).

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bt_types::{format_mac_reversed, Fingerprint};
use serde_json::json;

use crate::sink::{HttpSink, Request};
use crate::store::FingerprintStore;

pub struct Reporter {
    store: Arc<FingerprintStore>,
    sink: Arc<HttpSink>,
    interval: Duration,
}

impl Reporter {
    pub fn new(store: Arc<FingerprintStore>, sink: Arc<HttpSink>, interval: Duration) -> Self {
        Self {
            store,
            sink,
            interval,
        }
    }

    /// Loop forever: sleep, snapshot-and-prune, enqueue one HTTP request per
    /// reportable fingerprint. Intended to run on its own thread.
    pub fn run(&self) {
        loop {
            thread::sleep(self.interval);
            for fp in self.store.snapshot_and_prune() {
                self.sink.enqueue(to_request(&fp));
            }
        }
    }
}

fn to_request(fp: &Fingerprint) -> Request {
    match fp {
        Fingerprint::Btbr(f) => Request::new(
            "/api/Btbr",
            json!({
                "uap": f.uap.map(|u| format!("{u:02x}")),
                "lap": format!("{:06x}", f.lap),
                "nap": f.nap.map(|n| format!("{n:04x}")),
                "firstSeen": f.first_seen,
                "lastSeen": f.last_seen,
                "antennaId": f.antenna_id,
            }),
        ),
        Fingerprint::Btle(f) => Request::new(
            "/api/Btle",
            json!({
                "accessAddress": f.access_address,
                "rssi": f.rssi.mean,
                "std": f.rssi.std,
                "mean": f.rssi.mean,
                "firstSeen": f.first_seen,
                "lastSeen": f.last_seen,
                "antennaId": f.antenna_id,
            }),
        ),
        Fingerprint::BtleAdv(f) => Request::new(
            "/api/MacAddr",
            json!({
                "macAddress": format_mac_reversed(&f.mac),
                "rssi": f.rssi.mean,
                "std": f.rssi.std,
                "mean": f.rssi.mean,
                "firstSeen": f.first_seen,
                "lastSeen": f.last_seen,
                "antennaId": f.antenna_id,
            }),
        ),
    }
}
