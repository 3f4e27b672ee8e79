//! Trading-session calendar
//!
//! Decides whether the exchange is currently in a trading session, in the
//! exchange's local timezone. Two fixed weekdays are non-trading days; the
//! remaining days have a fixed local time-of-day window. No ad-hoc holiday
//! calendar is consulted.

use crate::config::SessionConfig;
use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

/// Why the market is open or closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Inside the regular trading window
    TradingSession,
    /// A configured weekly non-trading day
    WeeklyHoliday,
    /// A trading day, outside the session window
    OutsideHours,
}

/// Result of a session-calendar query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketStatus {
    pub open: bool,
    pub reason: SessionState,
}

/// Pure calendar over a weekly-holiday set and a local session window
#[derive(Debug, Clone)]
pub struct SessionCalendar {
    timezone: Tz,
    open: NaiveTime,
    close: NaiveTime,
    holidays: Vec<Weekday>,
}

impl SessionCalendar {
    /// Build a calendar from configuration
    ///
    /// Fails if the timezone is not a valid IANA name or the session
    /// times do not parse as "HH:MM".
    pub fn new(config: &SessionConfig, timezone: &str) -> anyhow::Result<Self> {
        let timezone: Tz = timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid exchange timezone {timezone:?}: {e}"))?;
        let open = parse_session_time(&config.open)?;
        let close = parse_session_time(&config.close)?;
        if open >= close {
            anyhow::bail!("Session open {open} is not before close {close}");
        }
        Ok(Self {
            timezone,
            open,
            close,
            holidays: config.holidays.clone(),
        })
    }

    /// Session status at the given instant
    pub fn status(&self, now: DateTime<Utc>) -> MarketStatus {
        let local = now.with_timezone(&self.timezone);

        if self.holidays.contains(&local.weekday()) {
            return MarketStatus {
                open: false,
                reason: SessionState::WeeklyHoliday,
            };
        }

        let time = local.time();
        if time >= self.open && time <= self.close {
            MarketStatus {
                open: true,
                reason: SessionState::TradingSession,
            }
        } else {
            MarketStatus {
                open: false,
                reason: SessionState::OutsideHours,
            }
        }
    }

    /// The given instant in the exchange's local timezone
    pub fn local_now(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        now.with_timezone(&self.timezone)
    }

    /// The exchange timezone
    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

fn parse_session_time(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|e| anyhow::anyhow!("Invalid session time {s:?}: {e}"))
}
