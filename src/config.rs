use std::env;

use chrono::FixedOffset;

use crate::models::policy::{parse_weekday, BusinessHoursPolicy, PolicyError};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub auth_username: Option<String>,
    pub auth_password: Option<String>,
    /// Offset of the single business timezone, e.g. "-05:00".
    pub utc_offset: String,
    pub workdays: String,
    pub open_hour: u32,
    pub close_hour: u32,
    pub slot_minutes: u32,
    pub availability_window_days: u64,
    /// Longest date range one availability query may span.
    pub max_availability_days: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            database_url: "appointments.db".to_string(),
            auth_username: None,
            auth_password: None,
            utc_offset: "+00:00".to_string(),
            workdays: "mon,tue,wed,thu,fri".to_string(),
            open_hour: 9,
            close_hour: 17,
            slot_minutes: 30,
            availability_window_days: 7,
            max_availability_days: 62,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed_var("PORT").unwrap_or(defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            auth_username: non_empty_var("AUTH_USERNAME"),
            auth_password: non_empty_var("AUTH_PASSWORD"),
            utc_offset: env::var("BUSINESS_UTC_OFFSET").unwrap_or(defaults.utc_offset),
            workdays: env::var("BUSINESS_WORKDAYS").unwrap_or(defaults.workdays),
            open_hour: parsed_var("BUSINESS_OPEN_HOUR").unwrap_or(defaults.open_hour),
            close_hour: parsed_var("BUSINESS_CLOSE_HOUR").unwrap_or(defaults.close_hour),
            slot_minutes: parsed_var("SLOT_MINUTES").unwrap_or(defaults.slot_minutes),
            availability_window_days: parsed_var("AVAILABILITY_WINDOW_DAYS")
                .unwrap_or(defaults.availability_window_days),
            max_availability_days: parsed_var("MAX_AVAILABILITY_DAYS")
                .unwrap_or(defaults.max_availability_days),
        }
    }

    pub fn business_policy(&self) -> Result<BusinessHoursPolicy, PolicyError> {
        let workdays = self
            .workdays
            .split(',')
            .filter(|d| !d.trim().is_empty())
            .map(parse_weekday)
            .collect::<Result<Vec<_>, _>>()?;

        BusinessHoursPolicy::new(workdays, self.open_hour, self.close_hour, self.slot_minutes)
    }

    pub fn business_offset(&self) -> anyhow::Result<FixedOffset> {
        self.utc_offset
            .parse::<FixedOffset>()
            .map_err(|_| anyhow::anyhow!("invalid BUSINESS_UTC_OFFSET: {}", self.utc_offset))
    }

    /// Basic auth is only enforced when both halves of the credential are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.auth_username, &self.auth_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
