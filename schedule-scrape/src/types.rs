//! Core types for scraped schedules and weekday identification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A teaching day of the week. Sunday is never part of a published schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All teaching days in calendar order.
    pub const ALL: [Weekday; 6] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// The identifier used in the schedule document (`td#monday`, ...) and
    /// as the serialized key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
        }
    }

    /// Russian display name, capitalised as on the chat keyboard.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Monday => "Понедельник",
            Self::Tuesday => "Вторник",
            Self::Wednesday => "Среда",
            Self::Thursday => "Четверг",
            Self::Friday => "Пятница",
            Self::Saturday => "Суббота",
        }
    }

    /// Zero-based position from Monday.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse a document key (`"monday"`) or a Russian display name
    /// (`"Понедельник"`), case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|day| {
            day.key() == needle || day.display_name().to_lowercase() == needle
        })
    }

    /// Map a chrono weekday; `None` for Sunday.
    pub fn from_chrono(day: chrono::Weekday) -> Option<Self> {
        match day {
            chrono::Weekday::Mon => Some(Self::Monday),
            chrono::Weekday::Tue => Some(Self::Tuesday),
            chrono::Weekday::Wed => Some(Self::Wednesday),
            chrono::Weekday::Thu => Some(Self::Thursday),
            chrono::Weekday::Fri => Some(Self::Friday),
            chrono::Weekday::Sat => Some(Self::Saturday),
            chrono::Weekday::Sun => None,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Lessons of a single day, in document order.
///
/// Each lesson is the raw list-item text and usually embeds the lesson slot
/// number and the instructor name. An empty list means a day off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub lessons: Vec<String>,
    /// Localized date (`1 декабря 2025`), empty if unresolved.
    #[serde(default)]
    pub date: String,
}

/// One group's schedule for one week.
///
/// Serialized as a flat JSON object: `date_range`, `current_day` and one key
/// per weekday present in the document. A weekday missing from `days` was
/// not present in the document at all, which is different from a present day
/// with no lessons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSchedule {
    /// Raw `dd.mm.yyyy-dd.mm.yyyy`, empty if the document had none.
    #[serde(default)]
    pub date_range: String,
    /// Localized date of "today" inside the range, empty if not applicable.
    #[serde(default)]
    pub current_day: String,
    #[serde(flatten)]
    pub days: BTreeMap<Weekday, DaySchedule>,
}

impl WeekSchedule {
    /// True when the document contained no weekday cells at all.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, day: Weekday) -> Option<&DaySchedule> {
        self.days.get(&day)
    }

    /// Days that have at least one non-blank lesson.
    pub fn days_with_lessons(&self) -> Vec<Weekday> {
        self.days
            .iter()
            .filter(|(_, d)| d.lessons.iter().any(|l| !l.trim().is_empty()))
            .map(|(day, _)| *day)
            .collect()
    }

    /// Serialize to the JSON payload stored by the persistence layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Result of fetching one group's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was fetched and contained at least one weekday cell.
    Published(WeekSchedule),
    /// The page was fetched but contained no weekday cells.
    NotPublished,
    /// The page could not be fetched.
    TransportError(String),
    /// The page was fetched but the extractor itself failed.
    ExtractError(String),
}

impl FetchOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }

    /// Collapse into the schedule to persist: an empty schedule for every
    /// outcome other than [`FetchOutcome::Published`].
    pub fn into_schedule(self) -> WeekSchedule {
        match self {
            Self::Published(schedule) => schedule,
            Self::NotPublished | Self::TransportError(_) | Self::ExtractError(_) => {
                WeekSchedule::default()
            }
        }
    }
}
