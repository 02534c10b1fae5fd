//! Operator command parsing.
//!
//! Commands are recognized by literal prefix, checked in a fixed order.
//! The first prefix that matches wins, so `/start@my_bot` is `/start` and
//! `/onward` is `/on`.

use chrono::NaiveTime;

use crate::responder::schedule::parse_time;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    /// `/add keyword | response`. `None` when the arguments are malformed.
    Add(Option<(String, String)>),
    List,
    Delete(String),
    Greeting(String),
    On,
    Off,
    Stats,
    Schedule,
    /// `/set_hours HH:MM HH:MM`. `None` when the arguments are malformed.
    SetHours(Option<(NaiveTime, NaiveTime)>),
    SetDays(String),
    AfterHours(String),
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        if text.starts_with("/start") {
            Command::Start
        } else if let Some(rest) = text.strip_prefix("/add ") {
            Command::Add(parse_add(rest))
        } else if text.starts_with("/list") {
            Command::List
        } else if let Some(rest) = text.strip_prefix("/delete ") {
            Command::Delete(rest.trim().to_string())
        } else if let Some(rest) = text.strip_prefix("/greeting ") {
            Command::Greeting(rest.trim().to_string())
        } else if text.starts_with("/on") {
            Command::On
        } else if text.starts_with("/off") {
            Command::Off
        } else if text.starts_with("/stats") {
            Command::Stats
        } else if text.starts_with("/schedule") {
            Command::Schedule
        } else if let Some(rest) = text.strip_prefix("/set_hours ") {
            Command::SetHours(parse_hours(rest))
        } else if let Some(rest) = text.strip_prefix("/set_days ") {
            Command::SetDays(rest.trim().to_string())
        } else if let Some(rest) = text.strip_prefix("/after_hours ") {
            Command::AfterHours(rest.trim().to_string())
        } else {
            Command::Unknown
        }
    }
}

/// Split on the first `|`. Both sides must be non-empty after trimming;
/// an empty keyword would match every message.
fn parse_add(args: &str) -> Option<(String, String)> {
    let (keyword, response) = args.split_once('|')?;
    let (keyword, response) = (keyword.trim(), response.trim());
    if keyword.is_empty() || response.is_empty() {
        return None;
    }
    Some((keyword.to_string(), response.to_string()))
}

fn parse_hours(args: &str) -> Option<(NaiveTime, NaiveTime)> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let [start, end] = parts.as_slice() else {
        return None;
    };
    Some((parse_time(start)?, parse_time(end)?))
}
