use chrono::NaiveDate;
use std::sync::Arc;
use validator::Validate;

use super::availability::{AvailabilityMonitor, ConnectionStatus};
use super::clock::{Clock, SystemClock};
use super::diagnostics::DiagnosticsReporter;
use super::error::{FetchFailure, ValidationError};
use super::http::Endpoint;
use super::local::{LocalStore, Namespace};
use super::remote::RemoteStore;
use crate::config::ClientConfig;
use crate::models::achievement::{AchievementLog, AddAchievementRequest, NewBadge};
use crate::models::hydration::{check_amount, AddHydrationRequest, HydrationLog};
use crate::models::meal::{AddMealRequest, MealLog, NewMeal};
use crate::models::mood::{Mood, MoodEntry, SaveMoodRequest};
use crate::models::stats::{SaveStatsRequest, StatsSnapshot};
use crate::models::{day_key, WriteAck};

/// Today's mood, meals and hydration, loaded together.
#[derive(Debug, Clone, PartialEq)]
pub struct TodayOverview {
    pub mood: Option<MoodEntry>,
    pub meals: MealLog,
    pub hydration: HydrationLog,
}

/// Read and write access to every wellness domain.
///
/// Each call tries the remote service first. Any remote failure is absorbed
/// by repeating the same operation against the local store, so callers get
/// the same shape back whichever store answered. Only invalid input on a
/// write is reported as an error.
///
/// Records written locally during an outage stay local; nothing replays
/// them once the service is reachable again.
pub struct WellnessRepository {
    remote: RemoteStore,
    local: LocalStore,
    monitor: Arc<AvailabilityMonitor>,
    clock: Arc<dyn Clock>,
    user_id: String,
}

impl WellnessRepository {
    pub fn connect(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let local = match &config.data_dir {
            Some(dir) => LocalStore::in_directory(dir),
            None => LocalStore::in_memory(),
        };
        Self::with_parts(config, Arc::new(SystemClock), local)
    }

    pub fn with_parts(
        config: &ClientConfig,
        clock: Arc<dyn Clock>,
        local: LocalStore,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        let endpoint = Endpoint::new(http, &config.api_base_url, &config.api_key);
        let reporter = DiagnosticsReporter::new(endpoint.clone(), config.diagnostics_timeout);
        let monitor = Arc::new(AvailabilityMonitor::new(
            endpoint.clone(),
            clock.clone(),
            config.health_check_interval,
            config.probe_timeout,
            reporter,
        ));
        let remote = RemoteStore::new(endpoint, monitor.clone(), config.request_timeout);

        Ok(Self {
            remote,
            local,
            monitor,
            clock,
            user_id: config.user_id.clone(),
        })
    }

    pub fn monitor(&self) -> Arc<AvailabilityMonitor> {
        self.monitor.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.monitor.ensure_checked().await
    }

    /// User-initiated retry: probes immediately regardless of the cache.
    pub async fn retry_connection(&self) -> bool {
        self.monitor.force_recheck().await
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.monitor.status()
    }

    // ── Mood ────────────────────────────────────────────────────────────

    pub async fn log_mood(&self, mood: Mood) -> WriteAck<()> {
        let date = self.clock.today();
        let request = SaveMoodRequest {
            user_id: Some(self.user_id.clone()),
            date: Some(date),
            mood: Some(mood),
        };

        match self.remote.post::<_, WriteAck<()>>("/mood", &request).await {
            Ok(ack) => ack,
            Err(failure) => {
                log_fallback("log_mood", &failure);
                let entry = MoodEntry::new(mood, self.clock.utc_now());
                self.local.put_day(Namespace::Mood, &day_key(date), entry);
                WriteAck::ok()
            }
        }
    }

    pub async fn get_mood(&self, date: Option<NaiveDate>) -> Option<MoodEntry> {
        let day = self.day(date);
        let path = format!("/mood/{}/{}", self.user_id, day);
        match self.remote.get::<Option<MoodEntry>>(&path).await {
            Ok(entry) => entry,
            Err(failure) => {
                log_fallback("get_mood", &failure);
                self.local.read_day(Namespace::Mood, &day)
            }
        }
    }

    // ── Meals ───────────────────────────────────────────────────────────

    pub async fn log_meal(&self, meal: NewMeal) -> Result<WriteAck<MealLog>, ValidationError> {
        meal.validate_all()
            .map_err(|e| ValidationError::new("meal", e.to_string()))?;

        let date = self.clock.today();
        let request = AddMealRequest {
            user_id: Some(self.user_id.clone()),
            date: Some(date),
            meal: Some(meal.clone()),
        };

        match self.remote.post::<_, WriteAck<MealLog>>("/meals", &request).await {
            Ok(ack) => Ok(ack),
            Err(failure) => {
                log_fallback("log_meal", &failure);
                let now = self.clock.utc_now();
                let log = self
                    .local
                    .update_day(Namespace::Meals, &day_key(date), |log: &mut MealLog| {
                        log.append(meal, now)
                    });
                Ok(WriteAck::with_data(log))
            }
        }
    }

    pub async fn get_meals(&self, date: Option<NaiveDate>) -> MealLog {
        let day = self.day(date);
        let path = format!("/meals/{}/{}", self.user_id, day);
        match self.remote.get::<MealLog>(&path).await {
            Ok(log) => log,
            Err(failure) => {
                log_fallback("get_meals", &failure);
                self.local.read_day(Namespace::Meals, &day).unwrap_or_default()
            }
        }
    }

    // ── Hydration ───────────────────────────────────────────────────────

    pub async fn log_hydration(&self, amount: f64) -> Result<WriteAck<HydrationLog>, ValidationError> {
        check_amount(amount).map_err(|message| ValidationError::new("amount", message))?;

        let date = self.clock.today();
        let request = AddHydrationRequest {
            user_id: Some(self.user_id.clone()),
            date: Some(date),
            amount: Some(amount),
        };

        match self
            .remote
            .post::<_, WriteAck<HydrationLog>>("/hydration", &request)
            .await
        {
            Ok(ack) => Ok(ack),
            Err(failure) => {
                log_fallback("log_hydration", &failure);
                let now = self.clock.utc_now();
                let log = self.local.update_day(
                    Namespace::Hydration,
                    &day_key(date),
                    |log: &mut HydrationLog| log.record(amount, now),
                );
                Ok(WriteAck::with_data(log))
            }
        }
    }

    pub async fn get_hydration(&self, date: Option<NaiveDate>) -> HydrationLog {
        let day = self.day(date);
        let path = format!("/hydration/{}/{}", self.user_id, day);
        match self.remote.get::<HydrationLog>(&path).await {
            Ok(log) => log,
            Err(failure) => {
                log_fallback("get_hydration", &failure);
                self.local.read_day(Namespace::Hydration, &day).unwrap_or_default()
            }
        }
    }

    // ── Stats ───────────────────────────────────────────────────────────

    pub async fn get_stats(&self) -> StatsSnapshot {
        let path = format!("/stats/{}", self.user_id);
        match self.remote.get::<StatsSnapshot>(&path).await {
            Ok(stats) => stats,
            Err(failure) => {
                log_fallback("get_stats", &failure);
                self.local.read(Namespace::Stats, StatsSnapshot::default())
            }
        }
    }

    pub async fn replace_stats(&self, stats: StatsSnapshot) -> Result<WriteAck<()>, ValidationError> {
        stats
            .validate()
            .map_err(|e| ValidationError::new("stats", e.to_string()))?;

        let request = SaveStatsRequest {
            user_id: Some(self.user_id.clone()),
            stats: Some(stats.clone()),
        };

        match self.remote.post::<_, WriteAck<()>>("/stats", &request).await {
            Ok(ack) => Ok(ack),
            Err(failure) => {
                log_fallback("replace_stats", &failure);
                self.local.write(Namespace::Stats, &stats);
                Ok(WriteAck::ok())
            }
        }
    }

    // ── Achievements ────────────────────────────────────────────────────

    pub async fn get_achievements(&self) -> AchievementLog {
        let path = format!("/achievements/{}", self.user_id);
        match self.remote.get::<AchievementLog>(&path).await {
            Ok(log) => log,
            Err(failure) => {
                log_fallback("get_achievements", &failure);
                self.local.read(Namespace::Achievements, AchievementLog::default())
            }
        }
    }

    pub async fn add_achievement(
        &self,
        badge: NewBadge,
    ) -> Result<WriteAck<AchievementLog>, ValidationError> {
        badge
            .validate()
            .map_err(|e| ValidationError::new("badge", e.to_string()))?;

        let request = AddAchievementRequest {
            user_id: Some(self.user_id.clone()),
            badge: Some(badge.clone()),
        };

        match self
            .remote
            .post::<_, WriteAck<AchievementLog>>("/achievements", &request)
            .await
        {
            Ok(ack) => Ok(ack),
            Err(failure) => {
                log_fallback("add_achievement", &failure);
                let mut log = self.local.read(Namespace::Achievements, AchievementLog::default());
                log.award(badge, self.clock.utc_now());
                self.local.write(Namespace::Achievements, &log);
                Ok(WriteAck::with_data(log))
            }
        }
    }

    // ── Overview ────────────────────────────────────────────────────────

    /// Loads today's mood, meals and hydration concurrently.
    pub async fn today_overview(&self) -> TodayOverview {
        let (mood, meals, hydration) = tokio::join!(
            self.get_mood(None),
            self.get_meals(None),
            self.get_hydration(None),
        );
        TodayOverview {
            mood,
            meals,
            hydration,
        }
    }

    fn day(&self, date: Option<NaiveDate>) -> String {
        day_key(date.unwrap_or_else(|| self.clock.today()))
    }
}

fn log_fallback(operation: &'static str, failure: &FetchFailure) {
    tracing::warn!(operation, error = %failure, "Remote unavailable, using local store");
}
