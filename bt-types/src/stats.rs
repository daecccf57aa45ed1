//! Online mean/standard-deviation estimator for RSSI samples.

use serde::{Deserialize, Serialize};

/// Running `(n, mean, std)` over a sequence of samples, updated one at a time.
///
/// `std` is the population standard deviation of all samples seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamingStats {
    pub n: u64,
    pub mean: f64,
    pub std: f64,
}

impl StreamingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one new sample.
    pub fn update(&mut self, x: f64) {
        if self.n == 0 {
            self.mean = x;
            self.std = 0.0;
            self.n = 1;
            return;
        }

        let n = self.n as f64;
        let new_mean = (n * self.mean + x) / (n + 1.0);
        let new_std = (((n * (self.std.powi(2) + (new_mean - self.mean).powi(2)))
            + (new_mean - x).powi(2))
            / (n + 1.0))
            .sqrt();

        self.mean = new_mean;
        self.std = new_std;
        self.n += 1;
    }
}
