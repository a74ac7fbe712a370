use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const STORAGE_KEY_HOURLY: &str = "hourlyWage";
pub const STORAGE_KEY_DAILY_HOURS: &str = "dailyHours";
pub const STORAGE_KEY_SALARY_TYPE: &str = "salaryType";
pub const STORAGE_KEY_SALARY_AMOUNT: &str = "salaryAmount";

pub const DEFAULT_DAILY_HOURS: f64 = 8.0;
pub const MAX_DAILY_HOURS: f64 = 24.0;

/// Wage configuration read by every replacement pass.
///
/// `hourly_wage` is `None` when nothing is configured; conversion is then a
/// no-op and prices keep their original display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub hourly_wage: Option<f64>,
    pub daily_hours: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hourly_wage: None,
            daily_hours: DEFAULT_DAILY_HOURS,
        }
    }
}

impl Settings {
    pub fn new(hourly_wage: Option<f64>, daily_hours: f64) -> Self {
        Self {
            hourly_wage: sanitize_wage(hourly_wage.map(serde_json::Value::from).as_ref()),
            daily_hours: sanitize_daily_hours(Some(&serde_json::Value::from(daily_hours))),
        }
    }

    /// Builds settings from raw store values, dropping anything that breaks
    /// the wage/hours invariants.
    pub fn from_stored(values: &HashMap<String, serde_json::Value>) -> Self {
        Self {
            hourly_wage: sanitize_wage(values.get(STORAGE_KEY_HOURLY)),
            daily_hours: sanitize_daily_hours(values.get(STORAGE_KEY_DAILY_HOURS)),
        }
    }

    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(wage) = update.hourly_wage {
            self.hourly_wage = wage;
        }
        if let Some(hours) = update.daily_hours {
            self.daily_hours = hours;
        }
    }

    pub fn is_active(&self) -> bool {
        self.hourly_wage.is_some()
    }
}

/// Wage values arrive untyped from storage: anything that is not a finite
/// positive number means "no wage".
pub fn sanitize_wage(value: Option<&serde_json::Value>) -> Option<f64> {
    match value.and_then(serde_json::Value::as_f64) {
        Some(wage) if wage.is_finite() && wage > 0.0 => Some(wage),
        Some(wage) => {
            tracing::warn!("Ignoring invalid hourly wage {}", wage);
            None
        }
        None => None,
    }
}

pub fn sanitize_daily_hours(value: Option<&serde_json::Value>) -> f64 {
    match value {
        None | Some(serde_json::Value::Null) => DEFAULT_DAILY_HOURS,
        Some(raw) => match raw.as_f64() {
            Some(hours) if hours > 0.0 && hours <= MAX_DAILY_HOURS => hours,
            _ => {
                tracing::warn!(
                    "Daily hours {} outside (0, {}], using {}",
                    raw,
                    MAX_DAILY_HOURS,
                    DEFAULT_DAILY_HOURS
                );
                DEFAULT_DAILY_HOURS
            }
        },
    }
}

/// Partial settings change derived from one store notification.
/// `hourly_wage: Some(None)` clears the wage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsUpdate {
    pub hourly_wage: Option<Option<f64>>,
    pub daily_hours: Option<f64>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.hourly_wage.is_none() && self.daily_hours.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    Sync,
    Local,
}

impl std::fmt::Display for StorageArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageArea::Sync => write!(f, "sync"),
            StorageArea::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageChangeEvent {
    pub area: StorageArea,
    pub changes: HashMap<String, ValueChange>,
}

/// Pristine copy of a price element, captured before its first mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PristineCopy {
    /// Text the price is parsed from.
    pub source: String,
    /// Full text content of the element.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whole: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offscreen: Option<String>,
}

/// Counters for one replacement pass over the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub containers: usize,
    pub standalone: usize,
    pub converted: usize,
    pub unchanged: usize,
    pub restored: usize,
    pub skipped: usize,
}

impl PassReport {
    /// Number of elements whose display was written during the pass.
    pub fn written(&self) -> usize {
        self.converted + self.restored
    }
}
