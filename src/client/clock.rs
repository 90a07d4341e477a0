use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Time source for probe caching, record timestamps and day keys.
pub trait Clock: Send + Sync + 'static {
    /// Monotonic time, used only to age the availability cache.
    fn now(&self) -> Instant;
    fn utc_now(&self) -> DateTime<Utc>;
    /// The caller's local calendar day.
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock that only moves when told to. The wall clock's UTC date doubles
/// as the local day.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    state: Mutex<(Duration, DateTime<Utc>)>,
}

impl ManualClock {
    pub fn new(wall: DateTime<Utc>) -> Self {
        Self {
            start: Instant::now(),
            state: Mutex::new((Duration::ZERO, wall)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.0 += by;
        if let Ok(step) = chrono::Duration::from_std(by) {
            state.1 += step;
        }
    }

    fn snapshot(&self) -> (Duration, DateTime<Utc>) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.snapshot().0
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.snapshot().1
    }

    fn today(&self) -> NaiveDate {
        self.snapshot().1.date_naive()
    }
}
