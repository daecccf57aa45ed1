//! Periodic publishing of the antenna's own coordinates (§4.6).
//!
//! The coordinate stream is modeled as a pull iterator with an external
//! cancellation token (§9): `LocationSource` is any `Iterator<Item = (f64, f64)>`
//! that never ends on its own; `CancelToken` lets the reporter thread stop
//! pulling from it at a loop boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::json;

use crate::sink::{HttpSink, Request};

#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An infinite, cancellable sequence of `(lat, lng)`. The default
/// implementation is a stationary placeholder; swap in a GNSS-backed source
/// without touching the reporter.
pub trait LocationSource: Send {
    fn next(&mut self) -> (f64, f64);
}

pub struct FixedLocation {
    pub lat: f64,
    pub lng: f64,
}

impl LocationSource for FixedLocation {
    fn next(&mut self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

pub struct LocationReporter {
    source: Box<dyn LocationSource>,
    sink: Arc<HttpSink>,
    antenna_id: u32,
    interval: Duration,
    cancel: CancelToken,
}

impl LocationReporter {
    pub fn new(
        source: Box<dyn LocationSource>,
        sink: Arc<HttpSink>,
        antenna_id: u32,
        interval: Duration,
        cancel: CancelToken,
    ) -> Self {
        Self {
            source,
            sink,
            antenna_id,
            interval,
            cancel,
        }
    }

    /// Loop forever (until cancelled): pull the next coordinate, post it to
    /// `/api/AntennaMetadata`, sleep for `interval`.
    pub fn run(&mut self) {
        while !self.cancel.is_cancelled() {
            let (lat, lng) = self.source.next();
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();

            self.sink.enqueue(Request::new(
                "/api/AntennaMetadata",
                json!({
                    "longitude": lng,
                    "latitude": lat,
                    "timestamp": timestamp,
                    "antennaId": self.antenna_id,
                }),
            ));

            thread::sleep(self.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_stops_after_cancel() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }
}
