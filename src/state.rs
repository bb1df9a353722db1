use std::sync::{Arc, Mutex, MutexGuard};

use chrono::FixedOffset;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::BusinessHoursPolicy;
use crate::services::clock::Clock;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub policy: BusinessHoursPolicy,
    pub offset: FixedOffset,
    pub clock: Box<dyn Clock>,
}

impl AppState {
    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database lock poisoned")))
    }
}
