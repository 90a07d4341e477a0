//! Client-side data access: remote first, local store on any failure.

pub mod availability;
pub mod clock;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod local;
pub mod remote;
pub mod repository;
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_support;

pub use availability::{AvailabilityMonitor, ConnectionStatus};
pub use clock::{Clock, ManualClock, SystemClock};
pub use diagnostics::{DiagnosticsReport, DiagnosticsReporter};
pub use error::{FetchFailure, LocalStorageError, ValidationError};
pub use local::{LocalStore, Namespace};
pub use remote::RemoteStore;
pub use repository::{TodayOverview, WellnessRepository};
pub use watcher::spawn_status_watcher;
