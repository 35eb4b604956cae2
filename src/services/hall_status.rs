//! Open/closed status of a dining hall derived from its meal periods.
//!
//! Everything here is pure: callers hand in the periods already loaded for a
//! restaurant and date, plus the instant being looked at and the reference
//! "today". Periods whose times cannot be read are skipped and reported back
//! in [`HallStatusReport::skipped`] instead of failing the whole derivation.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Late-night windows that start before this hour belong to the following day.
const LATENIGHT_ROLLOVER_HOUR: u32 = 6;

/// One meal period as delivered by the periods source.
/// Times are 24-hour "military" strings such as `"0715"` or `"1430"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodHours {
    pub name: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl PeriodHours {
    pub fn new(name: impl Into<String>, start: &str, end: &str) -> Self {
        Self {
            name: name.into(),
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }
    }
}

/// Concrete opening and closing instants, in the hall's local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    pub open: NaiveDateTime,
    pub close: NaiveDateTime,
}

impl PeriodWindow {
    /// Half-open containment: a hall closing at 22:00 is closed at 22:00.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.open <= at && at < self.close
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HallStatus {
    Open,
    Closed,
    Preview,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeriodTimeError {
    #[error("period '{period}' has no start time")]
    MissingStart { period: String },
    #[error("period '{period}' has no end time")]
    MissingEnd { period: String },
    #[error("period '{period}' has an unreadable time '{raw}'")]
    InvalidTime { period: String, raw: String },
    #[error("period '{period}' closes before it opens")]
    InvertedWindow { period: String },
    #[error("period '{period}' runs past the last representable date")]
    OutOfRange { period: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HallStatusReport {
    pub available_period_times: BTreeMap<String, PeriodWindow>,
    pub status: HallStatus,
    pub open_time: Option<NaiveDateTime>,
    pub close_time: Option<NaiveDateTime>,
    pub skipped: Vec<PeriodTimeError>,
}

impl HallStatusReport {
    fn closed() -> Self {
        Self {
            available_period_times: BTreeMap::new(),
            status: HallStatus::Closed,
            open_time: None,
            close_time: None,
            skipped: Vec::new(),
        }
    }
}

/// Parse a time of day written as `HHMM`, `HMM`, `HH:MM` or `HH:MM:SS`.
pub fn parse_military(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [compact] if (3..=4).contains(&compact.len()) && compact.is_ascii() => {
            let (h, m) = compact.split_at(compact.len() - 2);
            (h, m, "0")
        }
        [h, m] => (*h, *m, "0"),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };

    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(hours) || !all_digits(minutes) || !all_digits(seconds) {
        return None;
    }

    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, seconds.parse().ok()?)
}

pub fn is_latenight(name: &str) -> bool {
    let normalized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    normalized == "latenight"
}

/// Anchor one period to `day`, rolling late-night service into the next day.
pub fn period_window(
    period: &PeriodHours,
    day: NaiveDate,
) -> Result<PeriodWindow, PeriodTimeError> {
    let name = || period.name.clone();

    let start_raw = period
        .start
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PeriodTimeError::MissingStart { period: name() })?;
    let end_raw = period
        .end
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PeriodTimeError::MissingEnd { period: name() })?;

    let parse = |raw: &str| {
        parse_military(raw).ok_or_else(|| PeriodTimeError::InvalidTime {
            period: name(),
            raw: raw.to_string(),
        })
    };
    let start = parse(start_raw)?;
    let end = parse(end_raw)?;

    let mut open = day.and_time(start);
    let mut close = day.and_time(end);
    let next_day = |t: NaiveDateTime| {
        t.checked_add_days(Days::new(1))
            .ok_or_else(|| PeriodTimeError::OutOfRange { period: name() })
    };

    if is_latenight(&period.name) {
        if close <= open {
            close = next_day(close)?;
        } else if start.hour() < LATENIGHT_ROLLOVER_HOUR {
            open = next_day(open)?;
            close = next_day(close)?;
        }
    } else if close <= open {
        return Err(PeriodTimeError::InvertedWindow { period: name() });
    }

    Ok(PeriodWindow { open, close })
}

/// Derive the per-period windows and the hall status for `selected`.
///
/// `today` is the reference date of the viewer; when the computed opening
/// falls on another weekday the data is a preview of a different day.
pub fn derive(
    periods: &[PeriodHours],
    selected: Option<NaiveDateTime>,
    today: NaiveDate,
) -> HallStatusReport {
    let Some(selected) = selected else {
        return HallStatusReport::closed();
    };
    if periods.is_empty() {
        return HallStatusReport::closed();
    }

    let day = selected.date();
    let mut available_period_times = BTreeMap::new();
    let mut skipped = Vec::new();
    let mut earliest_open: Option<NaiveDateTime> = None;
    let mut latest_close: Option<NaiveDateTime> = None;

    for period in periods {
        match period_window(period, day) {
            Ok(window) => {
                earliest_open = Some(earliest_open.map_or(window.open, |t| t.min(window.open)));
                latest_close = Some(latest_close.map_or(window.close, |t| t.max(window.close)));
                available_period_times.insert(period.name.clone(), window);
            }
            Err(e) => {
                warn!("Hall status: skipping period: {}", e);
                skipped.push(e);
            }
        }
    }

    let status = match (earliest_open, latest_close) {
        (Some(open), Some(close)) => classify(selected, today, PeriodWindow { open, close }),
        _ => HallStatus::Error,
    };

    HallStatusReport {
        available_period_times,
        status,
        open_time: earliest_open,
        close_time: latest_close,
        skipped,
    }
}

fn classify(selected: NaiveDateTime, today: NaiveDate, hours: PeriodWindow) -> HallStatus {
    if today.weekday() != hours.open.weekday() {
        HallStatus::Preview
    } else if hours.contains(selected) {
        HallStatus::Open
    } else {
        HallStatus::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        day.and_hms_opt(h, m, 0).unwrap()
    }

    fn full_day() -> Vec<PeriodHours> {
        vec![
            PeriodHours::new("breakfast", "0700", "1100"),
            PeriodHours::new("lunch", "1100", "1630"),
            PeriodHours::new("dinner", "1630", "2200"),
        ]
    }

    #[test]
    fn test_parse_military() {
        assert_eq!(parse_military("1430"), NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(parse_military("715"), NaiveTime::from_hms_opt(7, 15, 0));
        assert_eq!(parse_military("07:15"), NaiveTime::from_hms_opt(7, 15, 0));
        assert_eq!(parse_military(" 0000 "), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_military("22:00:00"), NaiveTime::from_hms_opt(22, 0, 0));
        assert_eq!(parse_military("2460"), None);
        assert_eq!(parse_military("2500"), None);
        assert_eq!(parse_military("7"), None);
        assert_eq!(parse_military("ab30"), None);
        assert_eq!(parse_military(""), None);
    }

    #[test]
    fn test_latenight_names() {
        assert!(is_latenight("latenight"));
        assert!(is_latenight("Late Night"));
        assert!(is_latenight("late-night"));
        assert!(!is_latenight("dinner"));
    }

    #[test]
    fn test_status_is_idempotent() {
        let today = date(2025, 3, 4);
        let periods = full_day();
        let first = derive(&periods, Some(at(today, 12, 0)), today);
        let second = derive(&periods, Some(at(today, 12, 0)), today);
        assert_eq!(first, second);
        assert_eq!(periods, full_day());
    }

    #[test]
    fn test_every_parsed_period_is_reported() {
        let today = date(2025, 3, 4);
        let mut periods = full_day();
        periods.push(PeriodHours::new("brunch", "10h", "1400"));
        let report = derive(&periods, Some(at(today, 9, 0)), today);

        let names: Vec<&str> = report.available_period_times.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["breakfast", "dinner", "lunch"]);
        assert_eq!(
            report.skipped,
            vec![PeriodTimeError::InvalidTime {
                period: "brunch".into(),
                raw: "10h".into()
            }]
        );
        assert_eq!(report.status, HallStatus::Open);
    }

    #[test]
    fn test_latenight_rolls_into_next_day() {
        let today = date(2025, 3, 4);
        let periods = vec![PeriodHours::new("latenight", "2200", "0200")];
        let report = derive(&periods, Some(at(today, 23, 0)), today);

        let window = report.available_period_times["latenight"];
        assert_eq!(window.open, at(today, 22, 0));
        assert_eq!(window.close, at(date(2025, 3, 5), 2, 0));
        assert_eq!(report.status, HallStatus::Open);
    }

    #[test]
    fn test_after_midnight_latenight_moves_to_next_day() {
        let today = date(2025, 3, 4);
        let window = period_window(&PeriodHours::new("latenight", "0000", "0200"), today).unwrap();
        assert_eq!(window.open, at(date(2025, 3, 5), 0, 0));
        assert_eq!(window.close, at(date(2025, 3, 5), 2, 0));
    }

    #[test]
    fn test_latenight_extends_latest_close() {
        let today = date(2025, 3, 4);
        let mut periods = full_day();
        periods.push(PeriodHours::new("latenight", "2000", "0100"));
        let report = derive(&periods, Some(at(today, 23, 30)), today);

        assert_eq!(report.open_time, Some(at(today, 7, 0)));
        assert_eq!(report.close_time, Some(at(date(2025, 3, 5), 1, 0)));
        assert_eq!(report.status, HallStatus::Open);
    }

    #[test]
    fn test_status_boundaries() {
        let today = date(2025, 3, 4);
        let periods = vec![PeriodHours::new("allday", "0700", "2200")];

        let open = derive(&periods, Some(at(today, 7, 0)), today);
        assert_eq!(open.status, HallStatus::Open);
        assert_eq!(open.open_time, Some(at(today, 7, 0)));
        assert_eq!(open.close_time, Some(at(today, 22, 0)));

        assert_eq!(derive(&periods, Some(at(today, 6, 59)), today).status, HallStatus::Closed);
        assert_eq!(derive(&periods, Some(at(today, 22, 0)), today).status, HallStatus::Closed);
    }

    #[test]
    fn test_other_day_is_preview() {
        let today = date(2025, 3, 4);
        let tomorrow = date(2025, 3, 5);
        let report = derive(&full_day(), Some(at(tomorrow, 12, 0)), today);
        assert_eq!(report.status, HallStatus::Preview);
        assert_eq!(report.open_time, Some(at(tomorrow, 7, 0)));
    }

    #[test]
    fn test_empty_or_missing_inputs_are_closed() {
        let today = date(2025, 3, 4);

        let empty = derive(&[], Some(at(today, 12, 0)), today);
        assert_eq!(empty.status, HallStatus::Closed);
        assert!(empty.available_period_times.is_empty());
        assert_eq!(empty.open_time, None);

        let no_selection = derive(&full_day(), None, today);
        assert_eq!(no_selection.status, HallStatus::Closed);
        assert!(no_selection.available_period_times.is_empty());
    }

    #[test]
    fn test_all_periods_unreadable_is_error() {
        let today = date(2025, 3, 4);
        let periods = vec![
            PeriodHours::new("breakfast", "soon", "1100"),
            PeriodHours {
                name: "lunch".into(),
                start: Some("1100".into()),
                end: None,
            },
        ];
        let report = derive(&periods, Some(at(today, 12, 0)), today);
        assert_eq!(report.status, HallStatus::Error);
        assert!(report.available_period_times.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.open_time, None);
    }

    #[test]
    fn test_partial_period_excluded_from_hours() {
        let today = date(2025, 3, 4);
        let periods = vec![
            PeriodHours {
                name: "breakfast".into(),
                start: Some("0500".into()),
                end: None,
            },
            PeriodHours::new("lunch", "1100", "1400"),
        ];
        let report = derive(&periods, Some(at(today, 12, 0)), today);
        assert_eq!(report.open_time, Some(at(today, 11, 0)));
        assert_eq!(
            report.skipped,
            vec![PeriodTimeError::MissingEnd {
                period: "breakfast".into()
            }]
        );
    }

    #[test]
    fn test_latenight_on_last_date_is_skipped() {
        let last = NaiveDate::MAX;
        let periods = vec![
            PeriodHours::new("dinner", "1700", "2000"),
            PeriodHours::new("latenight", "2200", "0200"),
        ];
        let report = derive(&periods, Some(at(last, 18, 0)), last);
        assert_eq!(
            report.skipped,
            vec![PeriodTimeError::OutOfRange {
                period: "latenight".into()
            }]
        );
        assert_eq!(report.close_time, Some(at(last, 20, 0)));
        assert_eq!(report.status, HallStatus::Open);
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let today = date(2025, 3, 4);
        let err = period_window(&PeriodHours::new("dinner", "2200", "1700"), today).unwrap_err();
        assert_eq!(
            err,
            PeriodTimeError::InvertedWindow {
                period: "dinner".into()
            }
        );
    }
}
