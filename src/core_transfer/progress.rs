use std::time::Instant;

/// A snapshot handed to the progress callback.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub bytes_done: u64,
    /// Zero when the size is unknown.
    pub bytes_total: u64,
    pub started: Instant,
    pub now: Instant,
}

impl Progress {
    pub fn elapsed_secs(&self) -> f64 {
        self.now.duration_since(self.started).as_secs_f64()
    }

    /// Fraction done in `0.0..=1.0`, or `None` if the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        if self.bytes_total == 0 {
            None
        } else {
            Some(self.bytes_done as f64 / self.bytes_total as f64)
        }
    }

    /// Bytes per second. The extra second keeps t=0 finite and biases early estimates low.
    pub fn speed(&self) -> f64 {
        self.bytes_done as f64 / (self.elapsed_secs() + 1.0)
    }

    pub fn seconds_left(&self) -> Option<u64> {
        if self.bytes_total == 0 {
            return None;
        }
        let speed = self.speed();
        if speed <= 0.0 {
            return None;
        }
        let remaining = self.bytes_total.saturating_sub(self.bytes_done);
        Some((remaining as f64 / speed) as u64)
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_done == self.bytes_total
    }
}

/// Byte accounting for one transfer.
///
/// Per-chunk snapshots never report `done == total`; only `finish` does, so
/// the completion snapshot is always the last one a callback sees even when
/// the advertised size turns out to be wrong.
#[derive(Debug)]
pub struct ProgressTracker {
    bytes_done: u64,
    advertised_total: u64,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(advertised_total: u64) -> Self {
        Self {
            bytes_done: 0,
            advertised_total,
            started: Instant::now(),
        }
    }

    pub fn bytes_done(&self) -> u64 {
        self.bytes_done
    }

    pub fn advance(&mut self, bytes: usize) -> Progress {
        self.bytes_done += bytes as u64;
        let bytes_total = if self.advertised_total > self.bytes_done {
            self.advertised_total
        } else {
            0
        };
        Progress {
            bytes_done: self.bytes_done,
            bytes_total,
            started: self.started,
            now: Instant::now(),
        }
    }

    pub fn finish(&self) -> Progress {
        Progress {
            bytes_done: self.bytes_done,
            bytes_total: self.bytes_done,
            started: self.started,
            now: Instant::now(),
        }
    }
}
