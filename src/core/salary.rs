use crate::domain::model::{
    sanitize_daily_hours, StorageArea, DEFAULT_DAILY_HOURS, MAX_DAILY_HOURS,
    STORAGE_KEY_DAILY_HOURS, STORAGE_KEY_HOURLY, STORAGE_KEY_SALARY_AMOUNT,
    STORAGE_KEY_SALARY_TYPE,
};
use crate::domain::ports::SettingsStore;
use crate::utils::error::{Result, WageClockError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

pub const WORK_DAYS_PER_MONTH: f64 = 22.0;
pub const WORK_DAYS_PER_YEAR: f64 = 260.0;

pub const DEFAULT_HOURLY_WAGE: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SalaryType {
    #[default]
    Hourly,
    Monthly,
    Yearly,
}

impl SalaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryType::Hourly => "hourly",
            SalaryType::Monthly => "monthly",
            SalaryType::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hourly" => Some(SalaryType::Hourly),
            "monthly" => Some(SalaryType::Monthly),
            "yearly" => Some(SalaryType::Yearly),
            _ => None,
        }
    }
}

impl std::fmt::Display for SalaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hourly equivalent of a salary, using average working days.
pub fn convert_to_hourly(amount: f64, salary_type: SalaryType, daily_hours: f64) -> Option<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    let hourly = match salary_type {
        SalaryType::Hourly => amount,
        SalaryType::Monthly => amount / (WORK_DAYS_PER_MONTH * daily_hours),
        SalaryType::Yearly => amount / (WORK_DAYS_PER_YEAR * daily_hours),
    };
    Some(hourly)
}

/// What the user enters on the options surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryForm {
    pub salary_type: SalaryType,
    pub salary_amount: f64,
    pub daily_hours: f64,
}

impl Default for SalaryForm {
    fn default() -> Self {
        Self {
            salary_type: SalaryType::Hourly,
            salary_amount: DEFAULT_HOURLY_WAGE,
            daily_hours: DEFAULT_DAILY_HOURS,
        }
    }
}

impl SalaryForm {
    pub fn new(salary_type: SalaryType, salary_amount: f64, daily_hours: f64) -> Self {
        Self {
            salary_type,
            salary_amount,
            daily_hours,
        }
    }

    /// Checks the form and returns the hourly wage it stands for.
    pub fn validate(&self) -> Result<f64> {
        if !self.salary_amount.is_finite() || self.salary_amount <= 0.0 {
            return Err(WageClockError::ValidationError {
                message: "Enter a valid amount.".to_string(),
            });
        }
        if !self.daily_hours.is_finite()
            || self.daily_hours <= 0.0
            || self.daily_hours > MAX_DAILY_HOURS
        {
            return Err(WageClockError::ValidationError {
                message: "Enter valid daily work hours (0.5-24).".to_string(),
            });
        }
        match convert_to_hourly(self.salary_amount, self.salary_type, self.daily_hours) {
            Some(hourly) if hourly.is_finite() && hourly > 0.0 => Ok(hourly),
            _ => Err(WageClockError::ValidationError {
                message: "Invalid calculation.".to_string(),
            }),
        }
    }

    fn to_values(self, hourly_wage: f64) -> HashMap<String, Value> {
        HashMap::from([
            (STORAGE_KEY_HOURLY.to_string(), json!(hourly_wage)),
            (STORAGE_KEY_SALARY_TYPE.to_string(), json!(self.salary_type.as_str())),
            (STORAGE_KEY_SALARY_AMOUNT.to_string(), json!(self.salary_amount)),
            (STORAGE_KEY_DAILY_HOURS.to_string(), json!(self.daily_hours)),
        ])
    }
}

/// Validates the form and writes all four keys to the sync area in one
/// update. Returns the stored hourly wage.
pub async fn save_salary<S: SettingsStore + ?Sized>(store: &S, form: &SalaryForm) -> Result<f64> {
    let hourly = form.validate()?;
    store.set(StorageArea::Sync, form.to_values(hourly)).await?;
    tracing::info!(
        "Saved {} salary {} ({} h/day) as {:.2}/h",
        form.salary_type,
        form.salary_amount,
        form.daily_hours,
        hourly
    );
    Ok(hourly)
}

/// Reads the stored form. A store with neither a wage nor a salary amount
/// is seeded with the default preset first.
pub async fn load_or_seed<S: SettingsStore + ?Sized>(store: &S) -> Result<SalaryForm> {
    let stored = store
        .get(
            StorageArea::Sync,
            &[
                STORAGE_KEY_HOURLY,
                STORAGE_KEY_SALARY_TYPE,
                STORAGE_KEY_SALARY_AMOUNT,
                STORAGE_KEY_DAILY_HOURS,
            ],
        )
        .await?;

    let hourly = positive(stored.get(STORAGE_KEY_HOURLY));
    let amount = positive(stored.get(STORAGE_KEY_SALARY_AMOUNT));

    if hourly.is_none() && amount.is_none() {
        let form = SalaryForm::default();
        tracing::info!("No salary stored, seeding {:.0}/h default", DEFAULT_HOURLY_WAGE);
        store
            .set(StorageArea::Sync, form.to_values(DEFAULT_HOURLY_WAGE))
            .await?;
        return Ok(form);
    }

    let salary_type = stored
        .get(STORAGE_KEY_SALARY_TYPE)
        .and_then(Value::as_str)
        .and_then(SalaryType::parse)
        .unwrap_or_default();

    Ok(SalaryForm {
        salary_type,
        // 舊資料只有時薪
        salary_amount: amount.or(hourly).unwrap_or(DEFAULT_HOURLY_WAGE),
        daily_hours: sanitize_daily_hours(stored.get(STORAGE_KEY_DAILY_HOURS)),
    })
}

fn positive(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::settings_store::MemorySettingsStore;

    #[test]
    fn test_convert_to_hourly() {
        assert_eq!(convert_to_hourly(25.0, SalaryType::Hourly, 8.0), Some(25.0));
        assert_eq!(convert_to_hourly(3520.0, SalaryType::Monthly, 8.0), Some(20.0));
        assert_eq!(convert_to_hourly(52000.0, SalaryType::Yearly, 8.0), Some(25.0));
        assert_eq!(convert_to_hourly(0.0, SalaryType::Hourly, 8.0), None);
        assert_eq!(convert_to_hourly(f64::NAN, SalaryType::Yearly, 8.0), None);
    }

    #[test]
    fn test_validate_messages() {
        let bad_amount = SalaryForm::new(SalaryType::Hourly, -1.0, 8.0);
        assert_eq!(
            bad_amount.validate().unwrap_err().to_string(),
            "Validation error: Enter a valid amount."
        );

        let bad_hours = SalaryForm::new(SalaryType::Monthly, 4000.0, 25.0);
        assert!(bad_hours
            .validate()
            .unwrap_err()
            .to_string()
            .contains("Enter valid daily work hours (0.5-24)."));

        assert_eq!(SalaryForm::new(SalaryType::Yearly, 52000.0, 10.0).validate().unwrap(), 20.0);
    }

    #[test]
    fn test_salary_type_serde() {
        assert_eq!(serde_json::to_string(&SalaryType::Monthly).unwrap(), "\"monthly\"");
        assert_eq!(SalaryType::parse("yearly"), Some(SalaryType::Yearly));
        assert_eq!(SalaryType::parse("weekly"), None);
    }

    #[tokio::test]
    async fn test_seed_then_save() {
        let store = MemorySettingsStore::new();
        let form = load_or_seed(&store).await.unwrap();
        assert_eq!(form, SalaryForm::default());

        let stored = store.get(StorageArea::Sync, &[STORAGE_KEY_HOURLY]).await.unwrap();
        assert_eq!(stored.get(STORAGE_KEY_HOURLY), Some(&json!(90.0)));

        let hourly = save_salary(&store, &SalaryForm::new(SalaryType::Monthly, 4400.0, 8.0))
            .await
            .unwrap();
        assert_eq!(hourly, 25.0);
        let form = load_or_seed(&store).await.unwrap();
        assert_eq!(form.salary_type, SalaryType::Monthly);
        assert_eq!(form.salary_amount, 4400.0);
    }

    #[tokio::test]
    async fn test_legacy_hourly_only() {
        let store = MemorySettingsStore::with_sync_values(HashMap::from([(
            STORAGE_KEY_HOURLY.to_string(),
            json!(31),
        )]));
        let form = load_or_seed(&store).await.unwrap();
        assert_eq!(form, SalaryForm::new(SalaryType::Hourly, 31.0, 8.0));
    }
}
