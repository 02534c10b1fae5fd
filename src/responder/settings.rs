//! Operator-configurable settings and their defaults.

use std::collections::HashMap;

pub const BOT_ACTIVE: &str = "bot_active";
pub const GREETING: &str = "greeting";
pub const WORK_START: &str = "work_start";
pub const WORK_END: &str = "work_end";
pub const WORKING_DAYS: &str = "working_days";
pub const AFTER_HOURS_MSG: &str = "after_hours_msg";

/// Every recognized key with the value seeded on first run.
pub const DEFAULTS: [(&str, &str); 6] = [
    (BOT_ACTIVE, "true"),
    (GREETING, "Здравствуйте! Спасибо за сообщение."),
    (WORK_START, "09:00"),
    (WORK_END, "18:00"),
    (WORKING_DAYS, "1,2,3,4,5"),
    (AFTER_HOURS_MSG, "Мы вне рабочего времени. Ответим в рабочие часы."),
];

pub fn default_for(key: &str) -> Option<&'static str> {
    DEFAULTS.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Snapshot of the settings table, read once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bot_active: bool,
    pub greeting: String,
    pub work_start: String,
    pub work_end: String,
    pub working_days: String,
    pub after_hours_msg: String,
}

impl Settings {
    /// Build from raw rows. Absent keys take their defaults.
    pub fn from_rows(mut rows: HashMap<String, String>) -> Self {
        let mut take = |key: &str| {
            rows.remove(key)
                .unwrap_or_else(|| default_for(key).unwrap_or_default().to_string())
        };
        Self {
            bot_active: take(BOT_ACTIVE) == "true",
            greeting: take(GREETING),
            work_start: take(WORK_START),
            work_end: take(WORK_END),
            working_days: take(WORKING_DAYS),
            after_hours_msg: take(AFTER_HOURS_MSG),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_rows(HashMap::new())
    }
}
