//! Reporting periods and their resolution to concrete time windows.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SalesError;

/// Reporting period requested by a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Resolve to a half-open `[start, end)` window ending at the close of
    /// the current local day in `tz`.
    pub fn window(&self, now: DateTime<Utc>, tz: Tz, month_window: MonthWindow) -> TimeWindow {
        let today = now.with_timezone(&tz).date_naive();
        let first_day = match (self, month_window) {
            (Period::Today, _) => today,
            (Period::Week, _) => today - Duration::days(6),
            (Period::Month, MonthWindow::Rolling) => today - Duration::days(29),
            (Period::Month, MonthWindow::Calendar) => today.with_day(1).unwrap_or(today),
        };
        let next_day = today + Duration::days(1);

        TimeWindow {
            start: local_midnight(tz, first_day),
            end: local_midnight(tz, next_day),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(SalesError::Validation(format!(
                "unknown period '{}', expected today, week or month",
                other
            ))),
        }
    }
}

/// How the `month` period is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthWindow {
    /// Last 30 days, today included.
    #[default]
    Rolling,
    /// From the first of the current month.
    Calendar,
}

impl FromStr for MonthWindow {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rolling" => Ok(MonthWindow::Rolling),
            "calendar" => Ok(MonthWindow::Calendar),
            other => Err(SalesError::Validation(format!(
                "unknown month window '{}', expected rolling or calendar",
                other
            ))),
        }
    }
}

/// Half-open interval of UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

// When midnight falls in a DST gap the day starts at the first local instant
// after the gap. Gaps are whole multiples of 15 minutes.
fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=96)
        .map(|step| midnight + Duration::minutes(15 * step))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_today_window_utc() {
        let window = Period::Today.window(at(2024, 3, 15, 13), Tz::UTC, MonthWindow::Rolling);
        assert_eq!(window.start, at(2024, 3, 15, 0));
        assert_eq!(window.end, at(2024, 3, 16, 0));
        assert!(window.contains(at(2024, 3, 15, 0)));
        assert!(!window.contains(at(2024, 3, 16, 0)));
    }

    #[test]
    fn test_week_and_month_include_today() {
        let now = at(2024, 3, 15, 13);
        let week = Period::Week.window(now, Tz::UTC, MonthWindow::Rolling);
        assert_eq!(week.start, at(2024, 3, 9, 0));
        assert_eq!(week.end, at(2024, 3, 16, 0));

        let month = Period::Month.window(now, Tz::UTC, MonthWindow::Rolling);
        assert_eq!(month.start, at(2024, 2, 15, 0));
        assert_eq!(month.end, at(2024, 3, 16, 0));
    }

    #[test]
    fn test_calendar_month() {
        let month = Period::Month.window(at(2024, 3, 15, 13), Tz::UTC, MonthWindow::Calendar);
        assert_eq!(month.start, at(2024, 3, 1, 0));
        assert_eq!(month.end, at(2024, 3, 16, 0));
    }

    #[test]
    fn test_timezone_shifts_local_day() {
        // 22:00 UTC on the 15th is already the 16th in Baghdad (UTC+3).
        let window = Period::Today.window(
            at(2024, 3, 15, 22),
            chrono_tz::Asia::Baghdad,
            MonthWindow::Rolling,
        );
        assert_eq!(window.start, at(2024, 3, 15, 21));
        assert_eq!(window.end, at(2024, 3, 16, 21));
    }

    #[test]
    fn test_day_starting_in_dst_gap() {
        // Santiago skipped 00:00-01:00 on 2022-09-11, moving from -04 to -03.
        let tz = chrono_tz::America::Santiago;
        let window = Period::Today.window(at(2022, 9, 11, 15), tz, MonthWindow::Rolling);
        assert_eq!(window.start, at(2022, 9, 11, 4));
        assert_eq!(window.end, at(2022, 9, 12, 3));

        // 23:30 on the 10th, local time.
        let previous_evening = Utc.with_ymd_and_hms(2022, 9, 11, 3, 30, 0).unwrap();
        assert!(!window.contains(previous_evening));
        assert!(window.contains(at(2022, 9, 11, 4)));
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert!(matches!(
            "year".parse::<Period>(),
            Err(SalesError::Validation(_))
        ));
        assert_eq!(
            "calendar".parse::<MonthWindow>().unwrap(),
            MonthWindow::Calendar
        );
    }
}
