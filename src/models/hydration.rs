use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DAILY_GOAL_ML: f64 = 2000.0;
pub const GLASS_ML: f64 = 250.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HydrationEntry {
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// A day's water intake. `total` always equals the sum of `entries[].amount`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HydrationLog {
    #[serde(default)]
    pub entries: Vec<HydrationEntry>,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationProgress {
    pub percent_of_goal: f64,
    pub glasses: u32,
}

impl HydrationLog {
    pub fn record(&mut self, amount: f64, timestamp: DateTime<Utc>) {
        self.entries.push(HydrationEntry { amount, timestamp });
        self.total = self.entries.iter().map(|e| e.amount).sum();
    }

    pub fn progress(&self) -> HydrationProgress {
        HydrationProgress {
            percent_of_goal: (self.total / DAILY_GOAL_ML * 100.0).min(100.0),
            glasses: (self.total / GLASS_ML).round().max(0.0) as u32,
        }
    }
}

/// Amounts must be finite, positive millilitres.
pub fn check_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(format!("Hydration amount must be a positive number of ml, got {amount}"));
    }
    Ok(())
}

/// POST /hydration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHydrationRequest {
    pub user_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
}
