use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single consumption record in a day's log.
///
/// `servings` positivity is the caller's responsibility; the log stores what
/// it is given. `timestamp` is unix seconds at insertion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub food_id: String,
    pub servings: u32,
    pub timestamp: i64,
}

impl LogEntry {
    pub fn new(food_id: impl Into<String>, servings: u32, timestamp: i64) -> Self {
        Self {
            food_id: food_id.into(),
            servings,
            timestamp,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.food_id, self.servings)?;
        if let Some(time) = DateTime::from_timestamp(self.timestamp, 0) {
            write!(f, " (logged {})", time.format("%Y-%m-%d %H:%M"))?;
        }
        Ok(())
    }
}
