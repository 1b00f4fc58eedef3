use std::time::{Duration, Instant};

/// Something which wants to hear about a clone's progress.
///
/// Callbacks happen on the thread doing the cloning, at whatever granularity
/// the transport feels like (typically once per object received or file
/// checked out).
pub trait Progress {
    /// A new clone is starting. `total_units` is `0` when the total isn't
    /// known up front.
    fn start(&mut self, total_units: usize);

    /// Some more work was completed.
    fn update(&mut self, completed_units: usize);
}

/// Prints a heartbeat whenever a clone has been running for a while, so a
/// large repository isn't mistaken for a hung process.
///
/// This is purely informational and never affects the clone itself.
#[derive(Debug, Clone)]
pub struct StallReporter {
    name: String,
    threshold: Duration,
    total_units: usize,
    start_time: Instant,
    last_check: Instant,
    heartbeats: usize,
}

impl StallReporter {
    pub const DEFAULT_THRESHOLD: Duration = Duration::from_secs(10);

    pub fn new<S: Into<String>>(name: S) -> StallReporter {
        StallReporter::with_threshold(name, StallReporter::DEFAULT_THRESHOLD)
    }

    pub fn with_threshold<S: Into<String>>(name: S, threshold: Duration) -> StallReporter {
        let now = Instant::now();

        StallReporter {
            name: name.into(),
            threshold,
            total_units: 0,
            start_time: now,
            last_check: now,
            heartbeats: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many heartbeats have been emitted so far.
    pub fn heartbeats(&self) -> usize {
        self.heartbeats
    }

    pub fn start_at(&mut self, total_units: usize, now: Instant) {
        self.total_units = total_units;
        self.start_time = now;
        self.last_check = now;
    }

    /// Record an update at `now`, returning whether a heartbeat was emitted.
    pub fn update_at(&mut self, completed_units: usize, now: Instant) -> bool {
        let since_last_check = now.saturating_duration_since(self.last_check);

        if since_last_check < self.threshold {
            return false;
        }

        let running = now.saturating_duration_since(self.start_time).as_secs();

        if self.total_units > 0 {
            println!(
                "Still cloning {} ({}/{}, {}s so far)... Don't give up on me :)",
                self.name, completed_units, self.total_units, running
            );
        } else {
            println!(
                "Still cloning {} ({}s so far)... Don't give up on me :)",
                self.name, running
            );
        }

        self.last_check = now;
        self.heartbeats += 1;
        true
    }
}

impl Progress for StallReporter {
    fn start(&mut self, total_units: usize) {
        self.start_at(total_units, Instant::now());
    }

    fn update(&mut self, completed_units: usize) {
        self.update_at(completed_units, Instant::now());
    }
}
