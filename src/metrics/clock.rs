use chrono::{DateTime, Utc};

/// Source of timestamps for the tracker.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for simulating time in tests.
#[cfg(test)]
pub struct ManualClock {
    now: parking_lot::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    /// Starts at `ms` milliseconds past the Unix epoch.
    pub fn at_millis(ms: i64) -> Self {
        Self {
            now: parking_lot::Mutex::new(millis(ms)),
        }
    }

    pub fn advance_millis(&self, ms: i64) {
        *self.now.lock() += chrono::Duration::milliseconds(ms);
    }

    pub fn set_millis(&self, ms: i64) {
        *self.now.lock() = millis(ms);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Timestamp `ms` milliseconds past the Unix epoch.
#[cfg(test)]
pub fn millis(ms: i64) -> DateTime<Utc> {
    use chrono::TimeZone;
    Utc.timestamp_millis_opt(ms)
        .single()
        .expect("timestamp in range")
}
